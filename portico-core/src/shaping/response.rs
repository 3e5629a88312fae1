use serde_json::{Map, Value};
use tracing::{debug, warn};

use portico_model::{QueryMode, SizePreference};

use crate::collections::{CollectionSpec, MediaTarget, SizePolicy};
use crate::media::{carries_catalog, resolve_value};

/// Reshapes an executor envelope for the mode a request was accepted under.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShaper<'a> {
    spec: &'a CollectionSpec,
}

impl<'a> ResponseShaper<'a> {
    pub fn new(spec: &'a CollectionSpec) -> Self {
        Self { spec }
    }

    /// Bodies without `data` are returned untouched, as is everything when
    /// `mode` is unknown.
    pub fn shape(&self, mode: Option<QueryMode>, body: Value) -> Value {
        if body.get("data").is_none_or(Value::is_null) {
            return body;
        }
        let Some(mode) = mode else {
            warn!(
                collection = %self.spec.name,
                "no shaping mode recorded, passing payload through"
            );
            return body;
        };
        let Value::Object(mut envelope) = body else {
            return body;
        };

        let data = match envelope.remove("data") {
            Some(Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.resolve_item(mode, item))
                    .collect(),
            ),
            Some(single) => self.resolve_item(mode, single),
            None => Value::Null,
        };

        match mode {
            QueryMode::Homepage => {
                debug!(collection = %self.spec.name, "returning bare data for homepage");
                data
            }
            QueryMode::Detail => match data {
                Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
                single => single,
            },
            QueryMode::List | QueryMode::Searching => {
                envelope.insert("data".to_string(), data);
                Value::Object(envelope)
            }
        }
    }

    fn resolve_item(&self, mode: QueryMode, item: Value) -> Value {
        let Value::Object(mut object) = item else {
            return item;
        };

        for rule in &self.spec.media {
            let Some(policy) = rule.policy(mode) else {
                continue;
            };
            match &rule.target {
                MediaTarget::Field(field) => resolve_field(&mut object, field, policy),
                MediaTarget::Nested { relation, field } => match object.get_mut(relation) {
                    Some(Value::Array(related)) => {
                        for entry in related.iter_mut() {
                            if let Value::Object(entry) = entry {
                                resolve_field(entry, field, policy);
                            }
                        }
                    }
                    Some(Value::Object(entry)) => resolve_field(entry, field, policy),
                    _ => {}
                },
            }
        }

        strip_catalogs(Value::Object(object))
    }
}

fn resolve_field(object: &mut Map<String, Value>, field: &str, policy: &SizePolicy) {
    if let Some(media) = object.get_mut(field) {
        let preference = policy.preference_for(media);
        *media = resolve_value(media.take(), preference);
    }
}

/// Media no rule covers is served as the original upload.
fn strip_catalogs(value: Value) -> Value {
    if carries_catalog(&value) {
        return resolve_value(value, SizePreference::Original);
    }
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (key, strip_catalogs(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_catalogs).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::collections::builtin;

    fn image(size: f64) -> Value {
        json!({
            "url": "/uploads/original.png",
            "mime": "image/png",
            "size": size,
            "formats": {
                "thumbnail": { "url": "/uploads/thumbnail_x.png", "size": 5.0, "mime": "image/png" },
                "small": { "url": "/uploads/small_x.png", "size": 20.0, "mime": "image/png" },
                "large": { "url": "/uploads/large_x.png", "size": 300.0, "mime": "image/png" }
            }
        })
    }

    fn envelope(items: Vec<Value>) -> Value {
        let total = items.len();
        json!({
            "data": items,
            "meta": { "pagination": { "page": 1, "pageSize": 10, "pageCount": 1, "total": total } }
        })
    }

    #[test]
    fn homepage_returns_the_bare_array() {
        let spec = builtin::news();
        let shaped = ResponseShaper::new(&spec).shape(
            Some(QueryMode::Homepage),
            envelope(vec![json!({ "id": 1, "title": "a", "cover_picture": image(50.0) })]),
        );
        let items = shaped.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["cover_picture"]["url"], "/uploads/small_x.png");
        assert!(items[0]["cover_picture"].get("formats").is_none());
    }

    #[test]
    fn empty_homepage_is_an_empty_array() {
        let spec = builtin::news();
        let shaped = ResponseShaper::new(&spec).shape(Some(QueryMode::Homepage), envelope(vec![]));
        assert_eq!(shaped, json!([]));
    }

    #[test]
    fn detail_returns_first_item_or_null() {
        let spec = builtin::news();
        let shaper = ResponseShaper::new(&spec);
        let shaped = shaper.shape(
            Some(QueryMode::Detail),
            envelope(vec![json!({ "id": 1, "cover_picture": image(50.0) }), json!({ "id": 2 })]),
        );
        assert_eq!(shaped["id"], 1);
        assert_eq!(shaped["cover_picture"]["url"], "/uploads/large_x.png");

        assert_eq!(shaper.shape(Some(QueryMode::Detail), envelope(vec![])), Value::Null);
    }

    #[test]
    fn list_keeps_the_envelope() {
        let spec = builtin::publications();
        let body = envelope(vec![json!({ "id": 3, "cover_picture": image(10.0) })]);
        let shaped = ResponseShaper::new(&spec).shape(Some(QueryMode::List), body);
        assert_eq!(shaped["meta"]["pagination"]["total"], 1);
        assert_eq!(shaped["data"][0]["cover_picture"]["url"], "/uploads/small_x.png");
    }

    #[test]
    fn oversize_uploads_follow_the_threshold() {
        let spec = builtin::grants();
        let shaper = ResponseShaper::new(&spec);
        let big = shaper.shape(
            Some(QueryMode::Detail),
            envelope(vec![json!({ "id": 1, "graphical_abstract": image(2500.0) })]),
        );
        assert_eq!(big["graphical_abstract"]["url"], "/uploads/large_x.png");

        let small = shaper.shape(
            Some(QueryMode::Detail),
            envelope(vec![json!({ "id": 1, "graphical_abstract": image(900.0) })]),
        );
        assert_eq!(small["graphical_abstract"]["url"], "/uploads/original.png");
        assert!(small["graphical_abstract"].get("formats").is_none());
    }

    #[test]
    fn nested_logos_are_resolved_per_related_entry() {
        let spec = builtin::grants();
        let shaped = ResponseShaper::new(&spec).shape(
            Some(QueryMode::Detail),
            envelope(vec![json!({
                "id": 1,
                "collaborators": [
                    { "id": 7, "name": "Lab", "logo": image(10.0) },
                    { "id": 8, "name": "Other", "logo": null }
                ]
            })]),
        );
        assert_eq!(shaped["collaborators"][0]["logo"]["url"], "/uploads/small_x.png");
        assert_eq!(shaped["collaborators"][1]["logo"], Value::Null);
    }

    #[test]
    fn uncovered_media_loses_its_catalog() {
        let spec = builtin::grants();
        let shaped = ResponseShaper::new(&spec).shape(
            Some(QueryMode::Detail),
            envelope(vec![json!({
                "id": 1,
                "team_members": [{ "name": "A", "photo": image(10.0) }]
            })]),
        );
        let photo = &shaped["team_members"][0]["photo"];
        assert_eq!(photo["url"], "/uploads/original.png");
        assert!(photo.get("formats").is_none());
    }

    #[test]
    fn bodies_without_data_pass_through() {
        let spec = builtin::news();
        let shaper = ResponseShaper::new(&spec);
        let body = json!({ "data": null, "error": { "status": 404 } });
        assert_eq!(shaper.shape(Some(QueryMode::List), body.clone()), body);

        let body = json!({ "error": { "status": 500 } });
        assert_eq!(shaper.shape(Some(QueryMode::Homepage), body.clone()), body);
    }

    #[test]
    fn unknown_mode_passes_through() {
        let spec = builtin::news();
        let body = envelope(vec![json!({ "id": 1, "cover_picture": image(10.0) })]);
        assert_eq!(ResponseShaper::new(&spec).shape(None, body.clone()), body);
    }
}
