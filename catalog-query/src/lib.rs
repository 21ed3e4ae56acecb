//! Catalog query AST
//!
//! Typed queries for the catalogo document store. Controllers build these
//! values; the store's executor evaluates them against a collection.
//!
//! ```
//! use catalog_query::*;
//!
//! // name, director or synopsis mention "dune", genre mentions "sci"
//! let search = Filter::any_of([
//!     Filter::icontains(Field::named("nome"), "dune"),
//!     Filter::icontains(Field::named("diretor"), "dune"),
//!     Filter::icontains(Field::Body, "dune"),
//! ]);
//! let query = Find::new(Filter::all_of([search, Filter::icontains(Field::named("genero"), "sci")]))
//!     .sort(Sort::asc(Field::named("nome")))
//!     .skip(10)
//!     .limit(10);
//! assert_eq!(query.limit, Some(10));
//! ```

mod ast;

pub use ast::*;
