use std::collections::HashMap;

use thiserror::Error;

use portico_model::QueryMode;

use crate::collections::{CollectionSpec, ModeSpec, SearchKind};
use crate::query::{FilterNode, ShapedQuery};

pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Client mistakes that reject a request before it reaches the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("Invalid query. Use {usage}")]
    InvalidMode { usage: String },

    #[error("Invalid query. Detail mode requires an id: ?mode=detail&id=...")]
    MissingId,

    #[error("Invalid query. '{param}' must be a positive integer, got '{value}'")]
    InvalidNumber { param: &'static str, value: String },

    #[error("Invalid query. 'year' must be a four-digit year, got '{0}'")]
    InvalidYear(String),
}

/// Raw query-string parameters of one request.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

impl From<HashMap<String, String>> for QueryParams {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

/// The mode a request was accepted under, plus its executor query.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRequest {
    pub mode: QueryMode,
    pub query: ShapedQuery,
}

#[derive(Debug, Clone, Copy)]
pub struct RequestShaper<'a> {
    spec: &'a CollectionSpec,
    max_page_size: u32,
}

impl<'a> RequestShaper<'a> {
    pub fn new(spec: &'a CollectionSpec) -> Self {
        Self {
            spec,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    /// Build the executor query for `params`, replacing anything the caller
    /// sent besides the recognised parameters.
    pub fn shape(&self, params: &QueryParams) -> Result<ShapedRequest, ShapeError> {
        let (mode, mode_spec) = params
            .get("mode")
            .and_then(|raw| raw.parse::<QueryMode>().ok())
            .and_then(|mode| self.spec.mode(mode).map(|spec| (mode, spec)))
            .ok_or_else(|| ShapeError::InvalidMode {
                usage: self.usage(),
            })?;

        let mut query = ShapedQuery::new(self.spec.name.clone())
            .with_populate(mode_spec.populate.clone());
        query.fields = mode_spec.fields.clone();
        query.sort = mode_spec.sort.clone();

        let query = match mode {
            QueryMode::Homepage => query.with_pagination(1, mode_spec.page_size),
            QueryMode::List => {
                let (page, page_size) = self.paging(params, mode_spec)?;
                query.with_pagination(page, page_size)
            }
            QueryMode::Detail => {
                let id = params.get("id").ok_or(ShapeError::MissingId)?;
                query
                    .with_filters(FilterNode::eq(self.spec.detail_key.field(), id))
                    .with_pagination(1, 1)
            }
            QueryMode::Searching => {
                let (page, page_size) = self.paging(params, mode_spec)?;
                query
                    .with_filters(FilterNode::And(self.search_clauses(params)?))
                    .with_pagination(page, page_size)
            }
        };

        Ok(ShapedRequest { mode, query })
    }

    fn paging(&self, params: &QueryParams, mode_spec: &ModeSpec) -> Result<(u32, u32), ShapeError> {
        let page = match params.get("page") {
            Some(raw) => positive(raw, "page")?,
            None => 1,
        };
        let page_size = match params.get("limit") {
            Some(raw) => positive(raw, "limit")?.min(self.max_page_size),
            None => mode_spec.page_size,
        };
        Ok((page, page_size))
    }

    /// One clause per search parameter present on the request.
    fn search_clauses(&self, params: &QueryParams) -> Result<Vec<FilterNode>, ShapeError> {
        let mut clauses = Vec::new();
        for param in &self.spec.search {
            let Some(value) = params.get(&param.name) else {
                continue;
            };
            let clause = match &param.kind {
                SearchKind::Text(fields) => FilterNode::any(
                    fields
                        .iter()
                        .map(|field| FilterNode::contains_i(field.as_str(), value))
                        .collect(),
                ),
                SearchKind::Exact(field) => FilterNode::eq(field.as_str(), value),
                SearchKind::Year(fields) => {
                    let year = parse_year(value)?;
                    FilterNode::any(
                        fields
                            .iter()
                            .filter_map(|field| FilterNode::year(field.as_str(), year))
                            .collect(),
                    )
                }
            };
            clauses.push(clause);
        }
        Ok(clauses)
    }

    /// e.g. `?mode=homepage, ?mode=list, or ?mode=detail&id=...`
    fn usage(&self) -> String {
        let mut usages: Vec<&str> = self
            .spec
            .supported_modes()
            .into_iter()
            .map(QueryMode::usage)
            .collect();
        match usages.pop() {
            None => "a supported mode".to_string(),
            Some(last) if usages.is_empty() => last.to_string(),
            Some(last) => format!("{}, or {last}", usages.join(", ")),
        }
    }
}

fn positive(raw: &str, param: &'static str) -> Result<u32, ShapeError> {
    raw.parse::<u32>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| ShapeError::InvalidNumber {
            param,
            value: raw.to_string(),
        })
}

fn parse_year(raw: &str) -> Result<i32, ShapeError> {
    if raw.len() == 4 && raw.bytes().all(|byte| byte.is_ascii_digit()) {
        raw.parse()
            .map_err(|_| ShapeError::InvalidYear(raw.to_string()))
    } else {
        Err(ShapeError::InvalidYear(raw.to_string()))
    }
}
