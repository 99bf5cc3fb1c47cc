use crate::{
    connection::ConnectionNode,
    ordering::{OrderField, OrderSpec},
    paging::Limit,
    self_prelude::*,
};
use chrono::NaiveDate;
use futures::stream::BoxStream;
use thiserror::Error;

pub type DataSourceResult<T> = Result<T, DataSourceError>;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Failed to read record: {0}")]
    Row(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which records a connection may see.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OwnerFilter {
    #[default]
    All,
    /// Records whose owner reference equals this key.
    Owner(String),
    /// Records with one of these keys.
    Keys(Vec<String>),
}

impl OwnerFilter {
    pub fn owner(key: impl Into<String>) -> Self {
        Self::Owner(key.into())
    }

    pub fn allows(&self, key: &str, owner: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Owner(expected) => owner == Some(expected.as_str()),
            Self::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }
}

/// Inclusive calendar-day range on a record's timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.map_or(true, |start| day >= start)
            && self.end.map_or(true, |end| day <= end)
    }
}

/// A request for one page of records.
///
/// `after` and `before` are record keys. A bound naming a key that is not in
/// the filtered set is ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowQuery<F> {
    pub owner: OwnerFilter,
    pub order: Option<OrderSpec<F>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: Limit,
    pub date_range: DateRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row<N> {
    pub key: String,
    pub node: N,
}

pub type RowStream<N> = BoxStream<'static, DataSourceResult<Row<N>>>;

/// One page as produced by a [`DataSource`].
///
/// For [`Limit::Last`] rows are yielded nearest-to-the-end first. Counts and
/// flags describe the owner and date filtered set, before `after`/`before`.
pub struct Window<N> {
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub rows: RowStream<N>,
}

impl<N> fmt::Debug for Window<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("total_count", &self.total_count)
            .field("has_next_page", &self.has_next_page)
            .field("has_previous_page", &self.has_previous_page)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    type Node: ConnectionNode + Send + 'static;
    type Field: OrderField;

    async fn fetch_window(
        &self,
        query: &WindowQuery<Self::Field>,
    ) -> DataSourceResult<Window<Self::Node>>;
}

#[async_trait]
impl<S: DataSource + ?Sized> DataSource for Arc<S> {
    type Node = S::Node;
    type Field = S::Field;

    async fn fetch_window(
        &self,
        query: &WindowQuery<Self::Field>,
    ) -> DataSourceResult<Window<Self::Node>> {
        (**self).fetch_window(query).await
    }
}
