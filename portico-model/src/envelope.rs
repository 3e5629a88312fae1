use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{data, meta}` payload returned by the query executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEnvelope {
    pub data: Vec<Value>,
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        let page_count = if page_size == 0 {
            0
        } else {
            total.div_ceil(u64::from(page_size)) as u32
        };
        Self {
            page,
            page_size,
            page_count,
            total,
        }
    }
}

impl QueryEnvelope {
    pub fn new(data: Vec<Value>, pagination: PaginationMeta) -> Self {
        Self {
            data,
            meta: ResponseMeta { pagination },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(PaginationMeta::new(1, 10, 21).page_count, 3);
        assert_eq!(PaginationMeta::new(1, 10, 20).page_count, 2);
        assert_eq!(PaginationMeta::new(1, 10, 0).page_count, 0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let envelope = QueryEnvelope::new(vec![], PaginationMeta::new(2, 5, 7));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["meta"]["pagination"]["pageSize"], 5);
        assert_eq!(json["meta"]["pagination"]["pageCount"], 2);
    }
}
