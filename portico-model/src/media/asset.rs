use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::sizes::SizePreference;

/// One stored size variant of an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendition {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Size in kilobytes, as reported by the upload pipeline.
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub mime: Option<String>,
}

/// The `formats` object attached to an uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenditionCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Rendition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<Rendition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Rendition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<Rendition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Rendition>,
}

impl RenditionCatalog {
    pub fn get(&self, size: SizePreference) -> Option<&Rendition> {
        match size {
            SizePreference::Thumbnail => self.thumbnail.as_ref(),
            SizePreference::Small => self.small.as_ref(),
            SizePreference::Medium => self.medium.as_ref(),
            SizePreference::Large => self.large.as_ref(),
            SizePreference::Original => self.original.as_ref(),
        }
    }

    /// First rendition of `preference`'s fallback chain present in the catalog.
    pub fn select(&self, preference: SizePreference) -> Option<&Rendition> {
        preference
            .fallback_chain()
            .iter()
            .find_map(|candidate| self.get(*candidate))
    }
}

/// A populated media field. Attributes the shaper never touches (name,
/// caption, alternativeText, hash, ...) ride along in `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<RenditionCatalog>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl MediaAsset {
    /// Replace the top-level representation with `rendition`'s values.
    pub fn with_rendition(mut self, rendition: &Rendition) -> Self {
        self.url = Some(rendition.url.clone());
        self.width = rendition.width;
        self.height = rendition.height;
        self.size = rendition.size;
        self.mime = rendition.mime.clone();
        self
    }

    pub fn without_catalog(mut self) -> Self {
        self.formats = None;
        self
    }
}
