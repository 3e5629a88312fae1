use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// Boolean combination of field-level match conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    /// Case-insensitive substring match.
    ContainsI { field: String, value: String },
    Eq { field: String, value: String },
    /// Inclusive on both ends, compared on the calendar date.
    DateRange {
        field: String,
        from: NaiveDate,
        to: NaiveDate,
    },
    NotNull { field: String },
}

impl FilterNode {
    pub fn contains_i(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterNode::ContainsI {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        FilterNode::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        FilterNode::NotNull {
            field: field.into(),
        }
    }

    /// `YYYY-01-01 ..= YYYY-12-31` on `field`.
    pub fn year(field: impl Into<String>, year: i32) -> Option<Self> {
        Some(FilterNode::DateRange {
            field: field.into(),
            from: NaiveDate::from_ymd_opt(year, 1, 1)?,
            to: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Disjunction over `predicates`; a single predicate is returned bare.
    pub fn any(mut predicates: Vec<FilterNode>) -> Self {
        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            FilterNode::Or(predicates)
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        match self {
            FilterNode::And(clauses) => clauses.iter().all(|c| c.matches(document)),
            FilterNode::Or(clauses) => clauses.iter().any(|c| c.matches(document)),
            FilterNode::ContainsI { field, value } => document
                .get(field)
                .and_then(scalar_text)
                .is_some_and(|text| text.to_lowercase().contains(&value.to_lowercase())),
            FilterNode::Eq { field, value } => document
                .get(field)
                .and_then(scalar_text)
                .is_some_and(|text| text == *value),
            FilterNode::DateRange { field, from, to } => document
                .get(field)
                .and_then(calendar_date)
                .is_some_and(|date| *from <= date && date <= *to),
            FilterNode::NotNull { field } => {
                document.get(field).is_some_and(|value| !value.is_null())
            }
        }
    }

    /// Strapi-style filter syntax, e.g. `{"$and": [{"title": {"$containsi": "x"}}]}`.
    pub fn to_json(&self) -> Value {
        match self {
            FilterNode::And(clauses) => {
                json!({ "$and": clauses.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            FilterNode::Or(clauses) => {
                json!({ "$or": clauses.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            FilterNode::ContainsI { field, value } => {
                json!({ field: { "$containsi": value } })
            }
            FilterNode::Eq { field, value } => json!({ field: { "$eq": value } }),
            FilterNode::DateRange { field, from, to } => json!({
                field: {
                    "$gte": from.format("%Y-%m-%d").to_string(),
                    "$lte": to.format("%Y-%m-%d").to_string(),
                }
            }),
            FilterNode::NotNull { field } => json!({ field: { "$notNull": true } }),
        }
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Accepts both `2023-04-01` date fields and RFC 3339 timestamps (UTC).
fn calendar_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_is_inclusive_on_both_ends() {
        let filter = FilterNode::year("date", 2023).unwrap();
        assert!(filter.matches(&json!({ "date": "2023-01-01" })));
        assert!(filter.matches(&json!({ "date": "2023-12-31" })));
        assert!(filter.matches(&json!({ "date": "2023-12-31T23:59:59.000Z" })));
        assert!(!filter.matches(&json!({ "date": "2022-12-31" })));
        assert!(!filter.matches(&json!({ "date": "2024-01-01" })));
        assert!(!filter.matches(&json!({ "date": null })));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let filter = FilterNode::contains_i("title", "CANCER");
        assert!(filter.matches(&json!({ "title": "Early cancer detection" })));
        assert!(!filter.matches(&json!({ "title": "Diabetes" })));
        assert!(!filter.matches(&json!({})));
    }

    #[test]
    fn eq_compares_numbers_by_text() {
        let filter = FilterNode::eq("id", "42");
        assert!(filter.matches(&json!({ "id": 42 })));
        assert!(!filter.matches(&json!({ "id": 4 })));
    }

    #[test]
    fn empty_conjunction_matches_everything() {
        assert!(FilterNode::And(vec![]).matches(&json!({ "title": "x" })));
    }

    #[test]
    fn single_predicate_disjunction_is_emitted_bare() {
        let node = FilterNode::any(vec![FilterNode::eq("type", "journal")]);
        assert_eq!(node.to_json(), json!({ "type": { "$eq": "journal" } }));
    }
}
