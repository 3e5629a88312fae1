use chrono::{DateTime, Utc};
use serde_json::Value;

use portico_model::{PublicationStats, StatsKey};

use super::{StatsCalculator, updated_this_month};
use crate::error::Result;
use crate::query::{FilterNode, ShapedQuery};

pub const PUBLICATIONS_COLLECTION: &str = "publics";

#[derive(Debug, Clone, Copy, Default)]
pub struct PublicationStatsCalculator;

impl StatsCalculator for PublicationStatsCalculator {
    fn key(&self) -> StatsKey {
        StatsKey::Publications
    }

    fn collection(&self) -> &'static str {
        PUBLICATIONS_COLLECTION
    }

    /// Drafts carry no `publishedAt` and are left out.
    fn source_query(&self) -> ShapedQuery {
        ShapedQuery::new(PUBLICATIONS_COLLECTION)
            .with_fields(["indexing_classification", "publication_type", "updatedAt"])
            .with_filters(FilterNode::not_null("publishedAt"))
    }

    fn compute(&self, entries: &[Value], now: DateTime<Utc>) -> Result<Value> {
        let mut stats = PublicationStats {
            total_papers: entries.len() as u64,
            updated_this_month: updated_this_month(entries, now),
            ..PublicationStats::default()
        };

        for publication in entries {
            if let Some(classification) = publication
                .get("indexing_classification")
                .and_then(Value::as_str)
            {
                stats
                    .classification_counts
                    .record_classification(classification);
            }

            let kind = publication
                .get("publication_type")
                .and_then(Value::as_str)
                .map(str::to_lowercase);
            match kind.as_deref() {
                Some("granted patent") => stats.classification_counts.patent_granted += 1,
                Some("filed patent") => stats.classification_counts.patent_filed += 1,
                _ => {}
            }
        }

        Ok(serde_json::to_value(stats)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn counts_fixed_classes_and_patents() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();
        let entries = vec![
            json!({ "indexing_classification": "WWoS Q1", "publication_type": "Journal" }),
            json!({ "indexing_classification": "WWoS Q1", "updatedAt": "2025-01-03T10:00:00.000Z" }),
            json!({ "indexing_classification": "Conference Paper" }),
            json!({ "indexing_classification": "Book chapter" }),
            json!({ "publication_type": "Granted Patent" }),
            json!({ "publication_type": "FILED PATENT" }),
        ];

        let value = PublicationStatsCalculator.compute(&entries, now).unwrap();
        assert_eq!(value["totalPapers"], 6);
        assert_eq!(value["updatedThisMonth"], 1);
        let counts = &value["classificationCounts"];
        assert_eq!(counts["WWoS Q1"], 2);
        assert_eq!(counts["WWoS Q2"], 0);
        assert_eq!(counts["Conference Paper"], 1);
        assert_eq!(counts["Non-indexed"], 0);
        assert_eq!(counts["Patent Granted"], 1);
        assert_eq!(counts["Patent Filed"], 1);
    }

    #[test]
    fn source_query_skips_drafts() {
        let query = PublicationStatsCalculator.source_query();
        let filter = query.filters.unwrap();
        assert!(filter.matches(&json!({ "publishedAt": "2024-01-01T00:00:00.000Z" })));
        assert!(!filter.matches(&json!({ "publishedAt": null })));
        assert!(!filter.matches(&json!({ "title": "draft" })));
    }
}
