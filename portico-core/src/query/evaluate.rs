//! In-process query engine shared by every content adapter.
//!
//! Documents embed their relations, media, and components as nested objects
//! (or arrays of objects). Projection mirrors the REST query contract: nested
//! values only appear when populated, scalar attributes follow the `fields`
//! selection, and `id`/`documentId` are always returned.

use serde_json::{Map, Value};

use portico_model::{PaginationMeta, QueryEnvelope};

use super::types::{ALWAYS_SELECTED, Populate, ShapedQuery};

/// Filter, sort, paginate, then project `documents` according to `query`.
pub fn evaluate(documents: Vec<Value>, query: &ShapedQuery) -> QueryEnvelope {
    let mut matched: Vec<Value> = documents
        .into_iter()
        .filter(|document| {
            query
                .filters
                .as_ref()
                .is_none_or(|filter| filter.matches(document))
        })
        .collect();

    if let Some(sort) = &query.sort {
        matched.sort_by(|left, right| sort.compare(left, right));
    }

    let total = matched.len() as u64;
    let (page, page_size, window): (u32, u32, Vec<Value>) = match query.pagination {
        Some(request) => {
            let page = request.page.max(1);
            let page_size = request.page_size.max(1);
            let start = (page as usize - 1).saturating_mul(page_size as usize);
            let window = matched
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .collect();
            (page, page_size, window)
        }
        None => (1, total.max(1) as u32, matched),
    };

    let data = window
        .iter()
        .map(|document| project(document, query.fields.as_deref(), &query.populate))
        .collect();

    QueryEnvelope::new(data, PaginationMeta::new(page, page_size, total))
}

fn project(document: &Value, fields: Option<&[String]>, populate: &Populate) -> Value {
    let Some(object) = document.as_object() else {
        return document.clone();
    };
    // Uploaded files carry no relations; their nested objects are attributes.
    let media = is_media_asset(object);

    let mut projected = Map::new();
    for (key, value) in object {
        let keep = if ALWAYS_SELECTED.contains(&key.as_str()) {
            true
        } else if let Some(fields) = fields {
            fields.iter().any(|field| field == key)
        } else {
            media || !is_relational(value)
        };
        if keep {
            projected.insert(key.clone(), value.clone());
        }
    }

    match populate {
        Populate::None => {}
        Populate::All => {
            for (key, value) in object {
                if is_relational(value) && !projected.contains_key(key) {
                    projected.insert(key.clone(), project_relation(value, None, &Populate::None));
                }
            }
        }
        Populate::Relations(relations) => {
            for (name, entry) in relations {
                if let Some(value) = object.get(name) {
                    projected.insert(
                        name.clone(),
                        project_relation(value, entry.fields.as_deref(), &entry.populate),
                    );
                }
            }
        }
    }

    Value::Object(projected)
}

fn project_relation(value: &Value, fields: Option<&[String]>, populate: &Populate) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project(item, fields, populate))
                .collect(),
        ),
        Value::Object(_) => project(value, fields, populate),
        other => other.clone(),
    }
}

/// Empty arrays count as relations, so an unpopulated relation is omitted
/// whether or not it has entries.
fn is_relational(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().all(Value::is_object),
        _ => false,
    }
}

fn is_media_asset(object: &Map<String, Value>) -> bool {
    object.get("url").is_some_and(Value::is_string) && object.contains_key("mime")
}
