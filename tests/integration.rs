//! Integration tests for catalogo
//!
//! Exercises the controllers end to end against a store in a temp directory.

use catalogo::config::StoreConfig;
use catalogo::controllers::movies::MovieQuery;
use catalogo::controllers::PageRequest;
use catalogo::models::{CommentInput, CommentPatch, MovieInput};
use catalogo::storage::Store;
use catalogo::{Catalog, Error};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Helper to create a catalog over a fresh store
async fn setup_catalog() -> (TempDir, Catalog) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = Store::connect(tmp.path().to_str().unwrap(), "catalogo_test")
        .await
        .expect("Failed to connect");
    let catalog = Catalog::with_store(store, "filmes", "comentarios")
        .await
        .expect("Failed to open catalog");
    (tmp, catalog)
}

fn movie(value: Value) -> MovieInput {
    serde_json::from_value(value).expect("movie input")
}

fn comment(value: Value) -> CommentInput {
    serde_json::from_value(value).expect("comment input")
}

async fn add_movie(catalog: &Catalog, name: &str, genre: &str, year: i64) -> String {
    catalog
        .movies
        .create(&movie(json!({ "nome": name, "genero": genre, "anolancemento": year })))
        .await
        .unwrap()
        .data
        .unwrap()
        .id
        .to_string()
}

async fn movie_files(tmp: &TempDir) -> usize {
    std::fs::read_dir(tmp.path().join("catalogo_test/filmes"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
        .count()
}

// =============================================================================
// Movie Tests
// =============================================================================

#[tokio::test]
async fn test_create_then_get_returns_normalized_movie() {
    let (_tmp, catalog) = setup_catalog().await;

    let created = catalog
        .movies
        .create(&movie(json!({
            "nome": "  Interestelar ",
            "genero": "Ficção Científica",
            "anolancemento": "2014",
            "diretor": "Christopher Nolan",
            "duracao": 169,
            "avaliacao": "8.6",
            "sinopse": "Exploradores viajam por um buraco de minhoca."
        })))
        .await
        .unwrap();
    assert!(created.success);
    assert_eq!(created.message, "Movie created successfully!");
    let id = created.data.unwrap().id.to_string();

    let fetched = catalog.movies.get(&id).await.unwrap();
    assert_eq!(fetched.message, "Movie found");
    let record = fetched.data.unwrap();
    assert_eq!(record.movie.name, "Interestelar");
    assert_eq!(record.movie.release_year, 2014);
    assert_eq!(record.movie.rating, 8.6);
    assert_eq!(record.movie.duration_minutes, 169);
    assert_eq!(record.movie.poster_url, "");
    assert_eq!(record.movie.synopsis, "Exploradores viajam por um buraco de minhoca.");
}

#[tokio::test]
async fn test_create_rejects_out_of_range_year_without_writing() {
    let (tmp, catalog) = setup_catalog().await;

    let err = catalog
        .movies
        .create(&movie(json!({ "nome": "Antigo", "genero": "drama", "anolancemento": 1799 })))
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Validation(v) if v.touches("anolancemento")));
    assert_eq!(err.status(), 400);
    assert_eq!(movie_files(&tmp).await, 0);
}

#[tokio::test]
async fn test_create_reports_every_violation() {
    let (_tmp, catalog) = setup_catalog().await;

    let err = catalog
        .movies
        .create(&movie(json!({ "duracao": 601, "avaliacao": 11 })))
        .await
        .unwrap_err();

    match err {
        Error::Validation(violations) => {
            for field in ["nome", "genero", "anolancemento", "duracao", "avaliacao"] {
                assert!(violations.touches(field), "missing violation for {field}");
            }
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_missing_movie_leaves_store_unchanged() {
    let (tmp, catalog) = setup_catalog().await;
    add_movie(&catalog, "Matrix", "ação", 1999).await;

    let err = catalog
        .movies
        .update(
            "0b5d6c1e-9f4a-4c1e-8a55-3f2b9d7e6a10",
            &movie(json!({ "nome": "Fantasma", "genero": "terror", "anolancemento": 2000 })),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(err.to_string(), "Movie not found");
    assert_eq!(movie_files(&tmp).await, 1);
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let (_tmp, catalog) = setup_catalog().await;
    let id = catalog
        .movies
        .create(&movie(json!({
            "nome": "The Batman",
            "genero": "ação",
            "anolancemento": 2022,
            "diretor": "Matt Reeves",
            "avaliacao": 7.8
        })))
        .await
        .unwrap()
        .data
        .unwrap()
        .id
        .to_string();

    let updated = catalog
        .movies
        .update(
            &id,
            &movie(json!({ "nome": "The Batman - Special Edition", "genero": "ação", "anolancemento": 2023 })),
        )
        .await
        .unwrap();
    assert_eq!(updated.message, "Movie updated successfully!");

    let record = catalog.movies.get(&id).await.unwrap().data.unwrap();
    assert_eq!(record.movie.name, "The Batman - Special Edition");
    assert_eq!(record.movie.release_year, 2023);
    // Fields left out are reset, not kept
    assert_eq!(record.movie.director, "");
    assert_eq!(record.movie.rating, 0.0);
}

#[tokio::test]
async fn test_update_with_identical_input_succeeds() {
    let (_tmp, catalog) = setup_catalog().await;
    let input = movie(json!({
        "nome": "Parasita",
        "genero": "Drama",
        "anolancemento": 2019,
        "diretor": "Bong Joon-ho",
        "duracao": 132,
        "avaliacao": 8.5,
        "sinopse": "Uma família pobre se infiltra na casa de uma família rica."
    }));
    let id = catalog.movies.create(&input).await.unwrap().data.unwrap().id.to_string();
    let before = catalog.movies.get(&id).await.unwrap().data.unwrap();

    let updated = catalog.movies.update(&id, &input).await.unwrap();
    assert!(updated.success);
    assert_eq!(updated.message, "Movie updated successfully!");
    assert_eq!(updated.data.unwrap().movie, before);

    let after = catalog.movies.get(&id).await.unwrap().data.unwrap();
    assert_eq!(after, before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_update_never_revives_deleted_movie() {
    let (_tmp, catalog) = setup_catalog().await;
    let synopsis = "Uma longa sinopse. ".repeat(10_000);

    for round in 0..50 {
        let id = catalog
            .movies
            .create(&movie(json!({
                "nome": format!("Filme {round}"),
                "genero": "drama",
                "anolancemento": 2020,
                "sinopse": synopsis
            })))
            .await
            .unwrap()
            .data
            .unwrap()
            .id
            .to_string();

        let update = {
            let movies = catalog.movies.clone();
            let id = id.clone();
            let input = movie(json!({
                "nome": format!("Filme {round} (editado)"),
                "genero": "drama",
                "anolancemento": 2020,
                "sinopse": synopsis
            }));
            tokio::spawn(async move { movies.update(&id, &input).await })
        };
        let delete = {
            let movies = catalog.movies.clone();
            let id = id.clone();
            tokio::spawn(async move { movies.delete(&id).await })
        };

        let updated = update.await.unwrap();
        let deleted = delete.await.unwrap();
        assert!(deleted.is_ok(), "delete failed in round {round}");
        if let Err(err) = updated {
            // Lost the race: the movie was already gone
            assert!(matches!(err, Error::NotFound { .. }));
        }

        assert!(
            matches!(catalog.movies.get(&id).await, Err(Error::NotFound { .. })),
            "movie came back after delete in round {round}"
        );
    }
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let (_tmp, catalog) = setup_catalog().await;
    let id = add_movie(&catalog, "Coringa", "drama", 2019).await;

    let deleted = catalog.movies.delete(&id).await.unwrap();
    assert_eq!(deleted.message, "Movie deleted successfully!");
    assert_eq!(deleted.data.unwrap().movie.movie.name, "Coringa");

    assert!(matches!(catalog.movies.get(&id).await, Err(Error::NotFound { .. })));
    assert!(matches!(catalog.movies.delete(&id).await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_malformed_id_is_rejected_before_lookup() {
    let (_tmp, catalog) = setup_catalog().await;

    let err = catalog.movies.get("not-an-id").await.unwrap_err();
    assert!(matches!(err, Error::InvalidId { .. }));
    assert_eq!(err.to_string(), "Invalid movie ID");
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_pagination_over_many_movies() {
    let (_tmp, catalog) = setup_catalog().await;
    for i in 0..23 {
        add_movie(&catalog, &format!("Filme {i:02}"), "drama", 2000 + i).await;
    }

    let first = catalog
        .movies
        .list(&MovieQuery {
            page: PageRequest::parse(Some("1"), Some("10")),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    let pagination = first.pagination.unwrap();
    assert_eq!(pagination.total, 23);
    assert_eq!(pagination.total_pages, 3);
    assert!(pagination.has_next);
    assert!(!pagination.has_prev);
    assert_eq!(first.data.as_ref().unwrap().len(), 10);
    assert_eq!(first.data.unwrap()[0].movie.name, "Filme 00");

    let last = catalog
        .movies
        .list(&MovieQuery {
            page: PageRequest::parse(Some("3"), Some("10")),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    let pagination = last.pagination.unwrap();
    assert!(!pagination.has_next);
    assert!(pagination.has_prev);
    assert_eq!(last.message, "3 movie(s) found");
    assert_eq!(last.data.unwrap()[2].movie.name, "Filme 22");
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let (_tmp, catalog) = setup_catalog().await;
    add_movie(&catalog, "Único", "drama", 2001).await;

    let envelope = catalog
        .movies
        .list(&MovieQuery {
            page: PageRequest::parse(Some("5"), None),
            ..MovieQuery::default()
        })
        .await
        .unwrap();

    assert!(envelope.data.unwrap().is_empty());
    assert_eq!(envelope.message, "0 movie(s) found");
    assert_eq!(envelope.pagination.unwrap().total, 1);
}

#[tokio::test]
async fn test_search_and_genre_filters() {
    let (_tmp, catalog) = setup_catalog().await;
    catalog
        .movies
        .create(&movie(json!({
            "nome": "A Origem",
            "genero": "Ficção Científica",
            "anolancemento": 2010,
            "diretor": "Christopher Nolan"
        })))
        .await
        .unwrap();
    catalog
        .movies
        .create(&movie(json!({
            "nome": "Parasita",
            "genero": "Drama",
            "anolancemento": 2019,
            "sinopse": "Uma família pobre se infiltra na casa de uma família rica."
        })))
        .await
        .unwrap();

    let by_director = catalog
        .movies
        .list(&MovieQuery {
            search: Some("nolan".into()),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_director.data.unwrap()[0].movie.name, "A Origem");

    let by_synopsis = catalog
        .movies
        .list(&MovieQuery {
            search: Some("FAMÍLIA".into()),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_synopsis.data.unwrap()[0].movie.name, "Parasita");

    let by_genre = catalog
        .movies
        .list(&MovieQuery {
            genre: Some("drama".into()),
            search: Some("nolan".into()),
            ..MovieQuery::default()
        })
        .await
        .unwrap();
    assert!(by_genre.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_genre_matches_substring_case_insensitively() {
    let (_tmp, catalog) = setup_catalog().await;
    add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;
    add_movie(&catalog, "Interestelar", "ficção científica", 2014).await;
    add_movie(&catalog, "Coringa", "drama", 2019).await;

    let envelope = catalog.movies.list_by_genre("ficção").await.unwrap();
    let names: Vec<_> = envelope
        .data
        .unwrap()
        .into_iter()
        .map(|m| m.movie.name)
        .collect();

    assert_eq!(names, ["Duna", "Interestelar"]);
    assert_eq!(envelope.message, "2 movie(s) found in genre \"ficção\"");
}

#[tokio::test]
async fn test_statistics_counts_genres_and_averages_rated_movies() {
    let (_tmp, catalog) = setup_catalog().await;
    for (name, genre, rating) in [
        ("Matrix", "ação", 8.7),
        ("Mad Max", "ação", 8.1),
        ("Parasita", "drama", 8.5),
        ("Sem nota", "drama", 0.0),
        ("Toy Story", "animação", 8.3),
    ] {
        catalog
            .movies
            .create(&movie(json!({
                "nome": name,
                "genero": genre,
                "anolancemento": 2000,
                "avaliacao": rating
            })))
            .await
            .unwrap();
    }

    let stats = catalog.movies.statistics().await.unwrap().data.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.average_rating, 8.4);
    assert_eq!(stats.by_genre[0].total, 2);
    assert_eq!(stats.by_genre.last().unwrap().genre, "animação");
}

#[tokio::test]
async fn test_delete_all_movies() {
    let (tmp, catalog) = setup_catalog().await;
    add_movie(&catalog, "Um", "drama", 2001).await;
    add_movie(&catalog, "Dois", "drama", 2002).await;

    let envelope = catalog.movies.delete_all().await.unwrap();
    assert_eq!(envelope.data.unwrap().deleted_count, 2);
    assert_eq!(envelope.message, "2 movie(s) deleted successfully!");
    assert_eq!(movie_files(&tmp).await, 0);
}

// =============================================================================
// Comment Tests
// =============================================================================

#[tokio::test]
async fn test_comment_lifecycle() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;

    let created = catalog
        .comments
        .create(&comment(json!({
            "filmeId": movie_id,
            "autor": "Ana",
            "texto": "Visualmente impressionante.",
            "avaliacao": 9
        })))
        .await
        .unwrap();
    assert_eq!(created.message, "Comment added successfully!");
    let saved = created.data.unwrap();
    assert!(saved.comment.comment.edited_at.is_none());
    let id = saved.id.to_string();

    let updated = catalog
        .comments
        .update(&id, &serde_json::from_value::<CommentPatch>(json!({ "texto": "Obra-prima." })).unwrap())
        .await
        .unwrap();
    assert_eq!(updated.message, "Comment updated successfully!");
    let record = updated.data.unwrap();
    assert_eq!(record.comment.text, "Obra-prima.");
    assert_eq!(record.comment.rating, 9.0);
    assert!(record.comment.edited_at.unwrap() >= record.comment.created_at);

    let fetched = catalog.comments.get(&id).await.unwrap().data.unwrap();
    assert_eq!(fetched, record);

    catalog.comments.delete(&id).await.unwrap();
    assert!(matches!(catalog.comments.get(&id).await, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_comment_rating_defaults_to_zero_and_is_bounded() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;

    let saved = catalog
        .comments
        .create(&comment(json!({ "filmeId": movie_id, "autor": "Bia", "texto": "Bom." })))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(saved.comment.comment.rating, 0.0);

    for rating in [json!(-1), json!(10.5)] {
        let err = catalog
            .comments
            .create(&comment(json!({
                "filmeId": movie_id,
                "autor": "Bia",
                "texto": "Bom.",
                "avaliacao": rating
            })))
            .await
            .unwrap_err();
        assert!(matches!(&err, Error::Validation(v) if v.touches("avaliacao")));
    }

    let edge = catalog
        .comments
        .create(&comment(json!({
            "filmeId": movie_id,
            "autor": "Bia",
            "texto": "Perfeito.",
            "avaliacao": 10
        })))
        .await
        .unwrap();
    assert!(edge.success);
}

#[tokio::test]
async fn test_comment_text_length_limit() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;

    let too_long = "a".repeat(1001);
    let err = catalog
        .comments
        .create(&comment(json!({ "filmeId": movie_id, "autor": "Caio", "texto": too_long })))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Validation(v) if v.touches("texto")));

    let just_fits = "é".repeat(1000);
    let saved = catalog
        .comments
        .create(&comment(json!({ "filmeId": movie_id, "autor": "Caio", "texto": just_fits })))
        .await
        .unwrap();
    assert!(saved.success);
}

#[tokio::test]
async fn test_comment_patch_needs_a_change() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;
    let id = catalog
        .comments
        .create(&comment(json!({ "filmeId": movie_id, "autor": "Davi", "texto": "Ok." })))
        .await
        .unwrap()
        .data
        .unwrap()
        .id
        .to_string();

    let err = catalog
        .comments
        .update(&id, &CommentPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_comments_listed_newest_first_with_stats() {
    let (_tmp, catalog) = setup_catalog().await;
    let duna = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;
    let other = add_movie(&catalog, "Coringa", "drama", 2019).await;

    for (author, rating) in [("Ana", 8), ("Bia", 9), ("Caio", 0)] {
        catalog
            .comments
            .create(&comment(json!({
                "filmeId": duna,
                "autor": author,
                "texto": "Comentário",
                "avaliacao": rating
            })))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    catalog
        .comments
        .create(&comment(json!({ "filmeId": other, "autor": "Eva", "texto": "Outro filme" })))
        .await
        .unwrap();

    let listed = catalog.comments.list_by_movie(&duna).await.unwrap();
    assert_eq!(listed.message, "3 comment(s) found");
    let authors: Vec<_> = listed
        .data
        .unwrap()
        .into_iter()
        .map(|c| c.comment.author)
        .collect();
    assert_eq!(authors, ["Caio", "Bia", "Ana"]);

    let stats = catalog
        .comments
        .statistics_for_movie(&duna)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.average_rating, 5.7);
}

#[tokio::test]
async fn test_statistics_for_movie_without_comments() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;

    let stats = catalog
        .comments
        .statistics_for_movie(&movie_id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.average_rating, 0.0);
}

#[tokio::test]
async fn test_deleting_movie_keeps_comments_until_removed() {
    let (_tmp, catalog) = setup_catalog().await;
    let movie_id = add_movie(&catalog, "Duna", "Ficção Científica", 2021).await;
    for author in ["Ana", "Bia"] {
        catalog
            .comments
            .create(&comment(json!({ "filmeId": movie_id, "autor": author, "texto": "Ótimo" })))
            .await
            .unwrap();
    }

    catalog.movies.delete(&movie_id).await.unwrap();
    let orphans = catalog.comments.list_by_movie(&movie_id).await.unwrap();
    assert_eq!(orphans.data.unwrap().len(), 2);

    let deleted = catalog.comments.delete_all_for_movie(&movie_id).await.unwrap();
    assert_eq!(deleted.data.unwrap().deleted_count, 2);
    assert_eq!(deleted.message, "2 comment(s) deleted");
    assert!(catalog
        .comments
        .list_by_movie(&movie_id)
        .await
        .unwrap()
        .data
        .unwrap()
        .is_empty());
}

// =============================================================================
// Connection Tests
// =============================================================================

#[tokio::test]
async fn test_open_from_config_creates_collections() {
    let tmp = TempDir::new().unwrap();
    let config = StoreConfig {
        store_url: format!("file://{}", tmp.path().display()),
        database: "catalogo".into(),
        movies_collection: "filmes".into(),
        comments_collection: "comentarios".into(),
    };

    let catalog = Catalog::open(&config).await.unwrap();
    assert!(tmp.path().join("catalogo/filmes").is_dir());
    assert!(tmp.path().join("catalogo/comentarios").is_dir());

    let id = add_movie(&catalog, "Persistido", "drama", 2005).await;
    catalog.close();

    let reopened = Catalog::open(&config).await.unwrap();
    let record = reopened.movies.get(&id).await.unwrap().data.unwrap();
    assert_eq!(record.movie.name, "Persistido");
}

#[tokio::test]
async fn test_operations_fail_after_close() {
    let (_tmp, catalog) = setup_catalog().await;
    catalog.close();

    let err = catalog.movies.list(&MovieQuery::default()).await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_unsupported_connection_scheme() {
    let config = StoreConfig {
        store_url: "mongodb://localhost:27017".into(),
        database: "catalogo".into(),
        movies_collection: "filmes".into(),
        comments_collection: "comentarios".into(),
    };

    assert!(matches!(Catalog::open(&config).await, Err(Error::Connection(_))));
}
