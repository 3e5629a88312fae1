use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// Name under which an aggregate snapshot is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsKey {
    Grants,
    Publications,
}

impl StatsKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StatsKey::Grants => "grant-stats",
            StatsKey::Publications => "publication-stats",
        }
    }

    /// Maps the reader's `?mode=` value onto a stored key.
    pub fn from_mode(mode: &str) -> Result<Self, ModelError> {
        match mode {
            "grants" => Ok(StatsKey::Grants),
            "publication" => Ok(StatsKey::Publications),
            other => Err(ModelError::UnknownStatsMode(other.to_string())),
        }
    }
}

impl Display for StatsKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted aggregate, replaced wholesale on every recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub id: i64,
    pub key: String,
    pub data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantStats {
    pub total_funding: f64,
    pub total_grants: u64,
    pub total_national_grants: u64,
    pub total_industry_grants: u64,
    pub total_internal_grants: u64,
    /// Share of grants delivered on time, `0.0` when there are none.
    pub delivery_rate: f64,
    pub total_paper: u64,
    pub total_patent: u64,
    pub total_master: u64,
    pub total_phd: u64,
    pub updated_this_month: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationStats {
    pub total_papers: u64,
    pub classification_counts: ClassificationCounts,
    pub updated_this_month: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    #[serde(rename = "WWoS Q1")]
    pub wwos_q1: u64,
    #[serde(rename = "WWoS Q2")]
    pub wwos_q2: u64,
    #[serde(rename = "WWoS Q3")]
    pub wwos_q3: u64,
    #[serde(rename = "WWoS Q4")]
    pub wwos_q4: u64,
    #[serde(rename = "Conference Paper")]
    pub conference_paper: u64,
    #[serde(rename = "Scopus-indexed")]
    pub scopus_indexed: u64,
    #[serde(rename = "Non-indexed")]
    pub non_indexed: u64,
    #[serde(rename = "Patent Granted")]
    pub patent_granted: u64,
    #[serde(rename = "Patent Filed")]
    pub patent_filed: u64,
}

impl ClassificationCounts {
    /// Counts one publication's indexing classification. Values outside the
    /// fixed class list are ignored.
    pub fn record_classification(&mut self, classification: &str) {
        let slot = match classification {
            "WWoS Q1" => &mut self.wwos_q1,
            "WWoS Q2" => &mut self.wwos_q2,
            "WWoS Q3" => &mut self.wwos_q3,
            "WWoS Q4" => &mut self.wwos_q4,
            "Conference Paper" => &mut self.conference_paper,
            "Scopus-indexed" => &mut self.scopus_indexed,
            "Non-indexed" => &mut self.non_indexed,
            _ => return,
        };
        *slot += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_modes_map_to_store_keys() {
        assert_eq!(StatsKey::from_mode("grants"), Ok(StatsKey::Grants));
        assert_eq!(
            StatsKey::from_mode("publication").map(StatsKey::as_str),
            Ok("publication-stats")
        );
        assert!(StatsKey::from_mode("publications").is_err());
    }

    #[test]
    fn unknown_classifications_are_not_counted() {
        let mut counts = ClassificationCounts::default();
        counts.record_classification("WWoS Q2");
        counts.record_classification("Preprint");
        assert_eq!(counts.wwos_q2, 1);
        assert_eq!(counts, ClassificationCounts { wwos_q2: 1, ..Default::default() });
    }
}
