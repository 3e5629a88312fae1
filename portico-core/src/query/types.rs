use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use super::filter::FilterNode;

/// Fields every projection keeps regardless of the selection list.
pub const ALWAYS_SELECTED: [&str; 2] = ["id", "documentId"];

/// A fully specified repository query, built fresh for each request.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedQuery {
    pub collection: String,
    /// `None` selects every scalar attribute.
    pub fields: Option<Vec<String>>,
    pub populate: Populate,
    pub filters: Option<FilterNode>,
    pub sort: Option<SortKey>,
    /// `None` returns the whole matching set in one page.
    pub pagination: Option<PageRequest>,
}

impl ShapedQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            fields: None,
            populate: Populate::None,
            filters: None,
            sort: None,
            pagination: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_populate(mut self, populate: Populate) -> Self {
        self.populate = populate;
        self
    }

    pub fn with_filters(mut self, filters: FilterNode) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_pagination(mut self, page: u32, page_size: u32) -> Self {
        self.pagination = Some(PageRequest { page, page_size });
        self
    }

    /// Strapi-style rendering used in debug logs.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        if let Some(fields) = &self.fields {
            out.insert("fields".into(), json!(fields));
        }
        if !self.populate.is_none() {
            out.insert("populate".into(), self.populate.to_json());
        }
        if let Some(filters) = &self.filters {
            out.insert("filters".into(), filters.to_json());
        }
        if let Some(sort) = &self.sort {
            out.insert("sort".into(), Value::String(sort.to_string()));
        }
        if let Some(page) = &self.pagination {
            out.insert(
                "pagination".into(),
                json!({ "page": page.page, "pageSize": page.page_size }),
            );
        }
        Value::Object(out)
    }
}

/// Which embedded relations, media, and components to include.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Populate {
    #[default]
    None,
    /// Every relation one level deep, all of its scalar fields.
    All,
    Relations(BTreeMap<String, PopulateEntry>),
}

impl Populate {
    pub fn relation(name: impl Into<String>, entry: PopulateEntry) -> Self {
        Populate::None.and(name, entry)
    }

    pub fn and(self, name: impl Into<String>, entry: PopulateEntry) -> Self {
        let mut relations = match self {
            Populate::Relations(relations) => relations,
            Populate::None | Populate::All => BTreeMap::new(),
        };
        relations.insert(name.into(), entry);
        Populate::Relations(relations)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Populate::None)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Populate::None => Value::Bool(false),
            Populate::All => Value::String("*".into()),
            Populate::Relations(relations) => Value::Object(
                relations
                    .iter()
                    .map(|(name, entry)| (name.clone(), entry.to_json()))
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateEntry {
    pub fields: Option<Vec<String>>,
    pub populate: Populate,
}

impl PopulateEntry {
    /// Every scalar field of the relation, nothing nested.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn fields(fields: &[&str]) -> Self {
        Self {
            fields: Some(fields.iter().map(|field| field.to_string()).collect()),
            populate: Populate::None,
        }
    }

    pub fn populate(mut self, populate: Populate) -> Self {
        self.populate = populate;
        self
    }

    fn to_json(&self) -> Value {
        if self.fields.is_none() && self.populate.is_none() {
            return Value::Bool(true);
        }
        let mut out = Map::new();
        if let Some(fields) = &self.fields {
            out.insert("fields".into(), json!(fields));
        }
        if !self.populate.is_none() {
            out.insert("populate".into(), self.populate.to_json());
        }
        Value::Object(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Orders two documents by the sort field. Missing or null values sort
    /// last in either direction.
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        let left = left.get(&self.field).filter(|value| !value.is_null());
        let right = right.get(&self.field).filter(|value| !value.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => {
                let ordering = compare_scalars(left, right);
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", self.field, direction)
    }
}

fn compare_scalars(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}
