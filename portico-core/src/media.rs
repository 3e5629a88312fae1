//! Rendition selection for populated image fields.

use serde_json::Value;
use tracing::debug;

use portico_model::{MediaAsset, SizePreference};

/// Key under which uploads carry their rendition catalog.
pub const CATALOG_KEY: &str = "formats";

/// Pick the best rendition for `preference` and drop the catalog.
///
/// The first rendition of the preference's fallback chain that exists
/// replaces the asset's url, dimensions, size, and mime type. The catalog is
/// removed whether or not anything was chosen.
pub fn resolve(asset: MediaAsset, preference: SizePreference) -> MediaAsset {
    let chosen = asset
        .formats
        .as_ref()
        .and_then(|catalog| catalog.select(preference))
        .cloned();

    match chosen {
        Some(rendition) => asset.with_rendition(&rendition).without_catalog(),
        None => asset.without_catalog(),
    }
}

/// [`resolve`] over a raw JSON field.
///
/// Anything that is not an object with a catalog is returned untouched. A
/// catalog that does not parse is dropped and the field kept as-is.
pub fn resolve_value(field: Value, preference: SizePreference) -> Value {
    let Value::Object(mut object) = field else {
        return field;
    };
    match object.get(CATALOG_KEY) {
        None => return Value::Object(object),
        Some(Value::Null) => {
            object.remove(CATALOG_KEY);
            return Value::Object(object);
        }
        Some(_) => {}
    }

    match serde_json::from_value::<MediaAsset>(Value::Object(object.clone())) {
        Ok(asset) => match serde_json::to_value(resolve(asset, preference)) {
            Ok(Value::Object(mut resolved)) => {
                // Keys the upload carried stay present, as null when unset.
                for (key, _) in object.into_iter().filter(|(key, _)| key != CATALOG_KEY) {
                    resolved.entry(key).or_insert(Value::Null);
                }
                Value::Object(resolved)
            }
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(error = %err, "failed to re-encode media asset");
                object.remove(CATALOG_KEY);
                Value::Object(object)
            }
        },
        Err(err) => {
            debug!(error = %err, "dropping unreadable rendition catalog");
            object.remove(CATALOG_KEY);
            Value::Object(object)
        }
    }
}

/// True for objects shaped like an uploaded file with a catalog attached.
pub fn carries_catalog(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key(CATALOG_KEY) && object.contains_key("url"))
}
