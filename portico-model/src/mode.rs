use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Request-level shaping branch selected by the `mode` query parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Homepage,
    List,
    Detail,
    Searching,
}

impl QueryMode {
    pub const ALL: [QueryMode; 4] = [
        QueryMode::Homepage,
        QueryMode::List,
        QueryMode::Searching,
        QueryMode::Detail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::Homepage => "homepage",
            QueryMode::List => "list",
            QueryMode::Detail => "detail",
            QueryMode::Searching => "searching",
        }
    }

    /// Example query string shown to clients when a request is rejected.
    pub fn usage(self) -> &'static str {
        match self {
            QueryMode::Homepage => "?mode=homepage",
            QueryMode::List => "?mode=list",
            QueryMode::Detail => "?mode=detail&id=...",
            QueryMode::Searching => "?mode=searching",
        }
    }
}

impl Display for QueryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "homepage" => Ok(QueryMode::Homepage),
            "list" => Ok(QueryMode::List),
            "detail" => Ok(QueryMode::Detail),
            "searching" => Ok(QueryMode::Searching),
            other => Err(ModelError::UnknownMode(other.to_string())),
        }
    }
}
