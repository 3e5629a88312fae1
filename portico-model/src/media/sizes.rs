use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Rendition size requested for a media field in a given viewing context.
///
/// The same names double as the keys of a rendition catalog, so
/// `SizePreference::Original` appearing inside a fallback chain means the
/// catalog's `original` entry, while asking for `Original` directly skips
/// the catalog altogether.
#[derive(Debug, Clone, Copy, PartialEq, Hash, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreference {
    Thumbnail,
    Small,
    Medium,
    Large,
    Original,
}

impl Display for SizePreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SizePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            SizePreference::Thumbnail => "thumbnail",
            SizePreference::Small => "small",
            SizePreference::Medium => "medium",
            SizePreference::Large => "large",
            SizePreference::Original => "original",
        }
    }

    /// Catalog entries tried in order; the first one present wins.
    pub fn fallback_chain(self) -> &'static [SizePreference] {
        use SizePreference::*;
        match self {
            Thumbnail => &[Thumbnail, Medium, Small],
            Small => &[Small, Medium, Thumbnail],
            Medium => &[Medium, Small, Large],
            Large => &[Large, Medium, Small, Thumbnail, Original],
            Original => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_never_consults_the_catalog() {
        assert!(SizePreference::Original.fallback_chain().is_empty());
    }

    #[test]
    fn large_falls_back_through_every_rendition() {
        assert_eq!(
            SizePreference::Large.fallback_chain(),
            &[
                SizePreference::Large,
                SizePreference::Medium,
                SizePreference::Small,
                SizePreference::Thumbnail,
                SizePreference::Original,
            ]
        );
    }
}
