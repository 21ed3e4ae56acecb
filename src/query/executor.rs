//! Query execution engine

use crate::storage::collection::Collection;
use crate::storage::document::{Document, Value};
use crate::Result;
use catalog_query::{Accumulator, Aggregate, Direction, Filter, Find};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::filter::{self, Matcher};

/// One row of an aggregation: the group key and one value per accumulator alias
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Value,
    pub values: BTreeMap<String, Value>,
}

impl Group {
    pub fn get(&self, alias: &str) -> Option<&Value> {
        self.values.get(alias)
    }

    pub fn get_f64(&self, alias: &str) -> Option<f64> {
        self.get(alias).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, alias: &str) -> Option<i64> {
        self.get(alias).and_then(Value::as_i64)
    }
}

/// Filter, sort and page a collection
pub async fn find(collection: &Collection, query: &Find) -> Result<Vec<Document>> {
    let mut docs = select(collection, &query.filter).await?;

    // Documents equal on every sort key fall back to identifier order so
    // consecutive pages never overlap
    docs.sort_by(|a, b| {
        for sort in &query.sort {
            let a_val = filter::value_of(&sort.field, a);
            let b_val = filter::value_of(&sort.field, b);

            let cmp = filter::sort_order(a_val.as_deref(), b_val.as_deref());
            if cmp != Ordering::Equal {
                return match sort.direction {
                    Direction::Asc => cmp,
                    Direction::Desc => cmp.reverse(),
                };
            }
        }
        a.id.cmp(&b.id)
    });

    // Apply skip
    if let Some(skip) = query.skip {
        if skip < docs.len() {
            docs.drain(..skip);
        } else {
            docs.clear();
        }
    }

    // Apply limit
    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }

    Ok(docs)
}

/// Number of documents matching a filter
pub async fn count(collection: &Collection, filter: &Filter) -> Result<usize> {
    Ok(select(collection, filter).await?.len())
}

/// Delete every document matching a filter, returning how many went
pub async fn delete_where(collection: &Collection, filter: &Filter) -> Result<usize> {
    let mut removed = 0;
    for doc in select(collection, filter).await? {
        if collection.delete(&doc.id).await? {
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::debug!(collection = %collection.name, removed, "deleted matching documents");
    }
    Ok(removed)
}

/// Group matching documents and compute accumulators per group.
///
/// Groups come back in the order their first document was read. Nothing
/// matching yields no groups at all.
pub async fn aggregate(collection: &Collection, query: &Aggregate) -> Result<Vec<Group>> {
    let docs = select(collection, &query.filter).await?;

    let mut buckets: Vec<(Value, Vec<Document>)> = Vec::new();
    for doc in docs {
        let key = match &query.group_by {
            Some(field) => filter::value_of(field, &doc)
                .map(|v| v.into_owned())
                .unwrap_or(Value::Null),
            None => Value::Null,
        };

        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(doc),
            None => buckets.push((key, vec![doc])),
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(key, members)| {
            let values = query
                .accumulators
                .iter()
                .map(|acc| (acc.alias().to_string(), accumulate(acc, &members)))
                .collect();
            Group { key, values }
        })
        .collect())
}

fn accumulate(acc: &Accumulator, members: &[Document]) -> Value {
    match acc {
        Accumulator::Count { .. } => Value::Int(members.len() as i64),
        Accumulator::Avg { field, .. } => {
            // Missing and non-numeric values are left out of the average
            let numbers: Vec<f64> = members
                .iter()
                .filter_map(|doc| filter::value_of(field, doc).and_then(|v| v.as_f64()))
                .collect();
            if numbers.is_empty() {
                Value::Null
            } else {
                Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
    }
}

async fn select(collection: &Collection, filter: &Filter) -> Result<Vec<Document>> {
    let matcher = Matcher::compile(filter)?;
    let mut docs = collection.list().await?;
    docs.retain(|doc| matcher.matches(doc));
    Ok(docs)
}
