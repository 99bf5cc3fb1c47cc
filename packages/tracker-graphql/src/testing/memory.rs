use crate::{
    ordering::{OrderField, OrderSpec},
    paging::Limit,
    self_prelude::*,
    source::{DataSource, DataSourceError, DataSourceResult, DateRange, Row, Window, WindowQuery},
};
use chrono::{DateTime, NaiveDate};
use futures::stream;
use std::{cmp::Ordering, marker::PhantomData};

#[derive(Clone, Debug)]
struct MemoryRecord {
    key: String,
    owner: Option<String>,
    node: JsonValue,
}

/// A [`DataSource`] over records held in a `Vec`.
///
/// Records are sorted by the requested field, then by key. Numeric keys
/// compare as numbers.
#[derive(Clone, Debug)]
pub struct MemorySource<F> {
    records: Vec<MemoryRecord>,
    timestamp_field: Option<&'static str>,
    query_failure: Option<String>,
    row_failure: Option<(usize, String)>,
    _field: PhantomData<fn() -> F>,
}

impl<F> Default for MemorySource<F> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            timestamp_field: None,
            query_failure: None,
            row_failure: None,
            _field: PhantomData,
        }
    }
}

impl<F: OrderField> MemorySource<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, owner: Option<&str>, node: JsonValue) -> Self {
        self.records.push(MemoryRecord {
            key: key.into(),
            owner: owner.map(str::to_string),
            node,
        });
        self
    }

    /// Enables date range filtering on this node field. Without one, a
    /// bounded date range fails the query.
    pub fn with_timestamp_field(mut self, field: &'static str) -> Self {
        self.timestamp_field = Some(field);
        self
    }

    /// Fail every query before any row is produced.
    pub fn fail_query(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }

    /// Yield `rows` rows, then fail.
    pub fn fail_rows_after(mut self, rows: usize, message: impl Into<String>) -> Self {
        self.row_failure = Some((rows, message.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn in_range(&self, record: &MemoryRecord, range: &DateRange) -> bool {
        let field = match self.timestamp_field {
            Some(field) if !range.is_unbounded() => field,
            _ => return range.is_unbounded(),
        };
        record.node[field]
            .as_str()
            .and_then(parse_day)
            .map_or(false, |day| range.contains(day))
    }
}

#[async_trait]
impl<F: OrderField> DataSource for MemorySource<F> {
    type Node = JsonValue;
    type Field = F;

    async fn fetch_window(&self, query: &WindowQuery<F>) -> DataSourceResult<Window<JsonValue>> {
        if let Some(message) = &self.query_failure {
            return Err(DataSourceError::Query(message.clone()));
        }
        if self.timestamp_field.is_none() && !query.date_range.is_unbounded() {
            return Err(DataSourceError::Query(
                "date range requested on records without a timestamp field".to_string(),
            ));
        }

        let mut filtered: Vec<&MemoryRecord> = self
            .records
            .iter()
            .filter(|r| query.owner.allows(&r.key, r.owner.as_deref()))
            .filter(|r| self.in_range(r, &query.date_range))
            .collect();
        filtered.sort_by(|a, b| compare_records(a, b, query.order.as_ref()));

        let total = filtered.len();
        let position = |key: &String| filtered.iter().position(|r| &r.key == key);
        let lower = query
            .after
            .as_ref()
            .and_then(position)
            .map_or(0, |i| i + 1);
        let upper = query.before.as_ref().and_then(position).unwrap_or(total);

        let (start, end) = if lower < upper {
            let n = query.limit.count() as usize;
            match query.limit {
                Limit::First(_) => (lower, upper.min(lower.saturating_add(n))),
                Limit::Last(_) => (upper.saturating_sub(n).max(lower), upper),
            }
        } else {
            (lower, lower)
        };

        let (has_previous_page, has_next_page) = if start < end {
            (start > 0, end < total)
        } else {
            (false, false)
        };

        let mut rows: Vec<DataSourceResult<Row<JsonValue>>> = filtered[start..end]
            .iter()
            .map(|r| {
                Ok(Row {
                    key: r.key.clone(),
                    node: r.node.clone(),
                })
            })
            .collect();
        if !query.limit.is_forward() {
            rows.reverse();
        }
        if let Some((count, message)) = &self.row_failure {
            rows.truncate(*count);
            rows.push(Err(DataSourceError::Row(message.clone())));
        }

        Ok(Window {
            total_count: total as u64,
            has_next_page,
            has_previous_page,
            rows: Box::pin(stream::iter(rows)),
        })
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn compare_records<F: OrderField>(
    a: &MemoryRecord,
    b: &MemoryRecord,
    order: Option<&OrderSpec<F>>,
) -> Ordering {
    let Some(order) = order else {
        return compare_keys(&a.key, &b.key);
    };
    let field = order.field.field_name();
    let ordering =
        compare_json(&a.node[field], &b.node[field]).then_with(|| compare_keys(&a.key, &b.key));
    if order.direction.is_descending() {
        ordering.reverse()
    } else {
        ordering
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn json_rank(value: &JsonValue) -> u8 {
    match value {
        JsonValue::Null => 0,
        JsonValue::Bool(_) => 1,
        JsonValue::Number(_) => 2,
        JsonValue::String(_) => 3,
        JsonValue::Array(_) => 4,
        JsonValue::Object(_) => 5,
    }
}

fn compare_json(a: &JsonValue, b: &JsonValue) -> Ordering {
    match (a, b) {
        (JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
        (JsonValue::Number(a), JsonValue::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
        _ => json_rank(a).cmp(&json_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connections::spf::SpfOrderField, ordering::OrderDirection, source::OwnerFilter,
    };
    use futures::TryStreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn query(limit: Limit) -> WindowQuery<SpfOrderField> {
        WindowQuery {
            owner: OwnerFilter::All,
            order: None,
            after: None,
            before: None,
            limit,
            date_range: DateRange::default(),
        }
    }

    fn source() -> MemorySource<SpfOrderField> {
        (1..=10).fold(MemorySource::new(), |source, i| {
            source.insert(i.to_string(), None, json!({ "lookups": i % 3 }))
        })
    }

    async fn keys(window: Window<JsonValue>) -> Vec<String> {
        let rows: Vec<Row<JsonValue>> = window.rows.try_collect().await.unwrap();
        rows.into_iter().map(|r| r.key).collect()
    }

    #[tokio::test]
    async fn test_numeric_keys_sort_numerically() {
        let window = source().fetch_window(&query(Limit::First(3))).await.unwrap();
        assert_eq!(window.total_count, 10);
        assert!(window.has_next_page);
        assert!(!window.has_previous_page);
        assert_eq!(keys(window).await, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_last_rows_arrive_reversed() {
        let window = source().fetch_window(&query(Limit::Last(2))).await.unwrap();
        assert!(window.has_previous_page);
        assert!(!window.has_next_page);
        assert_eq!(keys(window).await, vec!["10", "9"]);
    }

    #[tokio::test]
    async fn test_ties_break_on_key_in_direction() {
        let mut q = query(Limit::First(4));
        q.order = Some(OrderSpec::new(SpfOrderField::Lookups, OrderDirection::Desc));
        let window = source().fetch_window(&q).await.unwrap();
        // lookups == 2 for keys 2, 5, 8
        assert_eq!(keys(window).await, vec!["8", "5", "2", "10"]);
    }

    #[tokio::test]
    async fn test_crossed_bounds_are_empty() {
        let mut q = query(Limit::First(4));
        q.after = Some("6".to_string());
        q.before = Some("3".to_string());
        let window = source().fetch_window(&q).await.unwrap();
        assert_eq!(window.total_count, 10);
        assert!(!window.has_next_page && !window.has_previous_page);
        assert!(keys(window).await.is_empty());
    }

    #[tokio::test]
    async fn test_date_range_without_timestamp_field_fails() {
        let mut q = query(Limit::First(3));
        q.date_range = DateRange::new(NaiveDate::from_ymd_opt(2023, 1, 2), None);

        let err = source().fetch_window(&q).await.err().unwrap();
        assert_eq!(
            err.to_string(),
            "Query failed: date range requested on records without a timestamp field"
        );

        let dated = source()
            .insert("11", None, json!({ "lookups": 0, "timestamp": "2020-06-01" }))
            .insert("12", None, json!({ "lookups": 0, "timestamp": "2023-01-02" }))
            .with_timestamp_field("timestamp");
        let window = dated.fetch_window(&q).await.unwrap();
        assert_eq!(window.total_count, 1);
        assert_eq!(keys(window).await, vec!["12"]);
    }

    #[test]
    fn test_parse_day() {
        assert_eq!(
            parse_day("2023-01-02T23:59:59Z"),
            NaiveDate::from_ymd_opt(2023, 1, 2)
        );
        assert_eq!(parse_day("2023-01-02"), NaiveDate::from_ymd_opt(2023, 1, 2));
        assert_eq!(parse_day("yesterday"), None);
    }
}
