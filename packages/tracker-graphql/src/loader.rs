use crate::{
    connection::{Connection, ConnectionNode, Edge, PageInfo},
    cursor::CursorCodec,
    error::{ConnectionError, ConnectionResult},
    log::{ConnectionLog, TracingLog},
    paging::{ArgumentValidator, Limit, PaginationArgs},
    self_prelude::*,
    source::{DataSource, DateRange, OwnerFilter, Row, WindowQuery},
};
use futures::TryStreamExt;
use tracing::debug;
use tracker_lib::{config::PaginationConfig, defaults, utils::cleanse_input};

/// Static facts about one connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    /// Used in cursors and log lines, e.g. `spfLoaderConnectionsByDomainId`.
    pub name: &'static str,
    /// Used in client messages, e.g. `SPF`.
    pub label: &'static str,
    /// Used in load-failure messages, e.g. `SPF scan(s)`.
    pub resource: &'static str,
    /// Node field carrying the record timestamp, if date ranges apply.
    pub timestamp_field: Option<&'static str>,
}

pub type Sanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Loads one page of a connection from a [`DataSource`].
pub struct ConnectionLoader<S> {
    descriptor: ConnectionDescriptor,
    source: S,
    log: Arc<dyn ConnectionLog>,
    sanitize: Sanitizer,
    max_page_size: u64,
}

impl<S> fmt::Debug for ConnectionLoader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLoader")
            .field("descriptor", &self.descriptor)
            .field("max_page_size", &self.max_page_size)
            .finish_non_exhaustive()
    }
}

impl<S: DataSource> ConnectionLoader<S> {
    pub fn new(descriptor: ConnectionDescriptor, source: S) -> Self {
        Self {
            descriptor,
            source,
            log: Arc::new(TracingLog),
            sanitize: Arc::new(cleanse_input),
            max_page_size: defaults::MAX_PAGE_SIZE,
        }
    }

    pub fn with_log(mut self, log: Arc<dyn ConnectionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_sanitizer(
        mut self,
        sanitize: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.sanitize = Arc::new(sanitize);
        self
    }

    pub fn with_config(mut self, config: &PaginationConfig) -> Self {
        self.max_page_size = config.max_page_size;
        self
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    /// Load the page `args` describes, limited to records `owner` allows.
    ///
    /// `caller` only appears in log lines.
    pub async fn load(
        &self,
        caller: &str,
        owner: OwnerFilter,
        args: PaginationArgs<S::Field>,
    ) -> ConnectionResult<Connection<S::Node>> {
        let name = self.descriptor.name;

        let paging = ArgumentValidator::new(&self.descriptor, self.max_page_size, &*self.log)
            .validate(caller, args)?;

        let date_range = match self.descriptor.timestamp_field {
            Some(_) => paging.date_range,
            None => {
                if !paging.date_range.is_unbounded() {
                    debug!(connection = name, "Ignoring date range on undated connection.");
                }
                DateRange::default()
            }
        };

        let query = WindowQuery {
            owner,
            order: paging.order,
            after: self.bound_key(paging.after.as_deref(), "after"),
            before: self.bound_key(paging.before.as_deref(), "before"),
            limit: paging.limit,
            date_range,
        };

        let window = match self.source.fetch_window(&query).await {
            Ok(window) => window,
            Err(e) => {
                self.log.error(
                    name,
                    &format!(
                        "Database error occurred while user: {caller} was trying to query {} in {name}, error: {e}",
                        self.descriptor.resource
                    ),
                );
                return Err(ConnectionError::Database {
                    resource: self.descriptor.resource,
                });
            }
        };

        let mut rows: Vec<Row<S::Node>> = match window.rows.try_collect().await {
            Ok(rows) => rows,
            Err(e) => {
                self.log.error(
                    name,
                    &format!(
                        "Cursor error occurred while user: {caller} was trying to gather {} in {name}, error: {e}",
                        self.descriptor.resource
                    ),
                );
                return Err(ConnectionError::Cursor {
                    resource: self.descriptor.resource,
                });
            }
        };

        rows.truncate(query.limit.count() as usize);
        if let Limit::Last(_) = query.limit {
            rows.reverse();
        }

        let edges: Vec<Edge<S::Node>> = rows
            .into_iter()
            .map(|Row { key, mut node }| {
                node.assign_id(&key);
                Edge {
                    cursor: CursorCodec::encode(name, &key),
                    node,
                }
            })
            .collect();

        let page_info = match (edges.first(), edges.last()) {
            (Some(start), Some(end)) => PageInfo {
                has_next_page: window.has_next_page,
                has_previous_page: window.has_previous_page,
                start_cursor: start.cursor.clone(),
                end_cursor: end.cursor.clone(),
            },
            _ => PageInfo::default(),
        };

        Ok(Connection {
            edges,
            total_count: window.total_count,
            page_info,
        })
    }

    /// Sanitized key of a bound cursor. Cursors that do not decode to a key of
    /// this connection are dropped.
    fn bound_key(&self, cursor: Option<&str>, arg: &str) -> Option<String> {
        let cursor = (self.sanitize)(cursor?);
        match CursorCodec::decode_for(self.descriptor.name, &cursor) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(
                    connection = self.descriptor.name,
                    "Ignoring `{arg}` cursor: {e}"
                );
                None
            }
        }
    }
}
