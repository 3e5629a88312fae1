use std::collections::BTreeMap;

use serde_json::Value;

use portico_model::{QueryMode, SizePreference};

use crate::query::{Populate, SortKey};

/// Attribute holding the identifier a `detail` request is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKey {
    Id,
    DocumentId,
}

impl DetailKey {
    pub fn field(self) -> &'static str {
        match self {
            DetailKey::Id => "id",
            DetailKey::DocumentId => "documentId",
        }
    }
}

/// What a collection serves in one query mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSpec {
    pub fields: Option<Vec<String>>,
    pub populate: Populate,
    pub sort: Option<SortKey>,
    pub page_size: u32,
}

impl Default for ModeSpec {
    fn default() -> Self {
        Self {
            fields: None,
            populate: Populate::None,
            sort: None,
            page_size: 10,
        }
    }
}

impl ModeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|field| field.to_string()).collect());
        self
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate = populate;
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// How a `searching` request parameter turns into a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchKind {
    /// Case-insensitive substring match on any of the fields.
    Text(Vec<String>),
    /// Exact match on one field.
    Exact(String),
    /// Calendar-year range on any of the fields.
    Year(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParam {
    pub name: String,
    pub kind: SearchKind,
}

impl SearchParam {
    pub fn text(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: SearchKind::Text(fields.iter().map(|f| f.to_string()).collect()),
        }
    }

    pub fn exact(name: &str, field: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SearchKind::Exact(field.to_string()),
        }
    }

    pub fn year(name: &str, fields: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: SearchKind::Year(fields.iter().map(|f| f.to_string()).collect()),
        }
    }
}

/// Where a media field sits on an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTarget {
    Field(String),
    /// `field` on every object of a populated relation.
    Nested { relation: String, field: String },
}

/// Rendition preference for a media field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizePolicy {
    Fixed(SizePreference),
    /// `above` when the upload's own size exceeds `threshold_kb`.
    Oversize {
        threshold_kb: f64,
        above: SizePreference,
        otherwise: SizePreference,
    },
}

impl SizePolicy {
    pub fn preference_for(&self, media: &Value) -> SizePreference {
        match *self {
            SizePolicy::Fixed(preference) => preference,
            SizePolicy::Oversize {
                threshold_kb,
                above,
                otherwise,
            } => {
                let size = media.get("size").and_then(Value::as_f64);
                if size.is_some_and(|size| size > threshold_kb) {
                    above
                } else {
                    otherwise
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaRule {
    pub target: MediaTarget,
    pub policies: BTreeMap<QueryMode, SizePolicy>,
}

impl MediaRule {
    pub fn field(name: &str) -> Self {
        Self {
            target: MediaTarget::Field(name.to_string()),
            policies: BTreeMap::new(),
        }
    }

    pub fn nested(relation: &str, field: &str) -> Self {
        Self {
            target: MediaTarget::Nested {
                relation: relation.to_string(),
                field: field.to_string(),
            },
            policies: BTreeMap::new(),
        }
    }

    pub fn when(mut self, modes: &[QueryMode], policy: SizePolicy) -> Self {
        for mode in modes {
            self.policies.insert(*mode, policy);
        }
        self
    }

    pub fn policy(&self, mode: QueryMode) -> Option<&SizePolicy> {
        self.policies.get(&mode)
    }
}

/// Declarative description of one content collection's read contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub route: String,
    pub detail_key: DetailKey,
    pub modes: BTreeMap<QueryMode, ModeSpec>,
    pub search: Vec<SearchParam>,
    pub media: Vec<MediaRule>,
}

impl CollectionSpec {
    pub fn builder(name: &str, route: &str) -> CollectionSpecBuilder {
        CollectionSpecBuilder {
            spec: CollectionSpec {
                name: name.to_string(),
                route: route.to_string(),
                detail_key: DetailKey::DocumentId,
                modes: BTreeMap::new(),
                search: Vec::new(),
                media: Vec::new(),
            },
        }
    }

    pub fn mode(&self, mode: QueryMode) -> Option<&ModeSpec> {
        self.modes.get(&mode)
    }

    pub fn supports(&self, mode: QueryMode) -> bool {
        self.modes.contains_key(&mode)
    }

    /// Modes in the order they are advertised to clients.
    pub fn supported_modes(&self) -> Vec<QueryMode> {
        QueryMode::ALL
            .into_iter()
            .filter(|mode| self.supports(*mode))
            .collect()
    }
}

#[derive(Debug)]
pub struct CollectionSpecBuilder {
    spec: CollectionSpec,
}

impl CollectionSpecBuilder {
    pub fn detail_key(mut self, key: DetailKey) -> Self {
        self.spec.detail_key = key;
        self
    }

    pub fn homepage(self, mode: ModeSpec) -> Self {
        self.mode(QueryMode::Homepage, mode)
    }

    pub fn list(self, mode: ModeSpec) -> Self {
        self.mode(QueryMode::List, mode)
    }

    pub fn detail(self, mode: ModeSpec) -> Self {
        self.mode(QueryMode::Detail, mode)
    }

    pub fn searching(self, mode: ModeSpec) -> Self {
        self.mode(QueryMode::Searching, mode)
    }

    pub fn mode(mut self, mode: QueryMode, spec: ModeSpec) -> Self {
        self.spec.modes.insert(mode, spec);
        self
    }

    pub fn search(mut self, param: SearchParam) -> Self {
        self.spec.search.push(param);
        self
    }

    pub fn media(mut self, rule: MediaRule) -> Self {
        self.spec.media.push(rule);
        self
    }

    pub fn build(self) -> CollectionSpec {
        self.spec
    }
}
