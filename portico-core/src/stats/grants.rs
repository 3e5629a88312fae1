use chrono::{DateTime, Utc};
use serde_json::Value;

use portico_model::{GrantStats, StatsKey};

use super::{StatsCalculator, number, updated_this_month};
use crate::error::Result;
use crate::query::{Populate, PopulateEntry, ShapedQuery};

pub const GRANTS_COLLECTION: &str = "grants-n-projects";

#[derive(Debug, Clone, Copy, Default)]
pub struct GrantStatsCalculator;

impl StatsCalculator for GrantStatsCalculator {
    fn key(&self) -> StatsKey {
        StatsKey::Grants
    }

    fn collection(&self) -> &'static str {
        GRANTS_COLLECTION
    }

    fn source_query(&self) -> ShapedQuery {
        ShapedQuery::new(GRANTS_COLLECTION)
            .with_fields(["total_funding", "on_time", "type_of_grants", "updatedAt"])
            .with_populate(Populate::relation(
                "project_output",
                PopulateEntry::fields(&["master", "phd", "paper_citation", "patent_citation"])
                    .populate(Populate::All),
            ))
    }

    fn compute(&self, entries: &[Value], now: DateTime<Utc>) -> Result<Value> {
        let mut stats = GrantStats {
            total_grants: entries.len() as u64,
            updated_this_month: updated_this_month(entries, now),
            ..GrantStats::default()
        };
        let mut on_time = 0u64;

        for grant in entries {
            stats.total_funding += number(grant.get("total_funding"));
            match grant.get("type_of_grants").and_then(Value::as_str) {
                Some("national grants") => stats.total_national_grants += 1,
                Some("industry grants") => stats.total_industry_grants += 1,
                Some("internal grants") => stats.total_internal_grants += 1,
                _ => {}
            }
            if grant.get("on_time") == Some(&Value::Bool(true)) {
                on_time += 1;
            }

            let Some(output) = grant.get("project_output").filter(|o| o.is_object()) else {
                continue;
            };
            stats.total_paper += citations(output.get("paper_citation"));
            stats.total_patent += citations(output.get("patent_citation"));
            stats.total_master += number(output.get("master")) as u64;
            stats.total_phd += number(output.get("phd")) as u64;
        }

        if stats.total_grants > 0 {
            stats.delivery_rate = on_time as f64 / stats.total_grants as f64;
        }

        Ok(serde_json::to_value(stats)?)
    }
}

fn citations(value: Option<&Value>) -> u64 {
    value
        .and_then(Value::as_array)
        .map_or(0, |items| items.len() as u64)
}
