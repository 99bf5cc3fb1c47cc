use crate::{
    postgres::{begin_snapshot, window_query, CollectionTable, WindowSelect},
    TrackerConnectionPool,
};
use async_trait::async_trait;
use futures::{channel::mpsc, SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use sqlx::{postgres::PgRow, PgPool, Row as _};
use std::marker::PhantomData;
use tracing::debug;
use tracker_graphql::{
    DataSource, DataSourceError, DataSourceResult, OrderField, Row, Window, WindowQuery,
};
use tracker_lib::utils::format_sql_query;

/// Rows buffered between the query task and the consumer.
const ROW_BUFFER: usize = 16;

/// A [`DataSource`] reading one [`CollectionTable`].
#[derive(Clone, Debug)]
pub struct PostgresSource<F> {
    pool: PgPool,
    table: CollectionTable,
    _field: PhantomData<fn() -> F>,
}

impl<F: OrderField> PostgresSource<F> {
    pub fn new(pool: &TrackerConnectionPool, table: CollectionTable) -> Self {
        let pool = match pool {
            TrackerConnectionPool::Postgres(pool) => pool.clone(),
        };
        Self {
            pool,
            table,
            _field: PhantomData,
        }
    }

    pub fn table(&self) -> &CollectionTable {
        &self.table
    }
}

fn decode_row(row: PgRow) -> DataSourceResult<Row<JsonValue>> {
    let key: String = row
        .try_get("__key")
        .map_err(|e| DataSourceError::Row(e.to_string()))?;
    let node: JsonValue = row
        .try_get("node")
        .map_err(|e| DataSourceError::Row(e.to_string()))?;
    Ok(Row { key, node })
}

#[async_trait]
impl<F: OrderField> DataSource for PostgresSource<F> {
    type Node = JsonValue;
    type Field = F;

    async fn fetch_window(&self, query: &WindowQuery<F>) -> DataSourceResult<Window<JsonValue>> {
        let mut summary = window_query(&self.table, query, WindowSelect::Summary)?;
        // Built here so an invalid query fails before anything is spawned.
        let mut rows_query = window_query(&self.table, query, WindowSelect::Rows)?;
        debug!(
            table = self.table.table,
            "Window summary: {}",
            format_sql_query(summary.sql().to_string())
        );

        let mut tx = begin_snapshot(&self.pool)
            .await
            .map_err(|e| DataSourceError::Query(e.to_string()))?;
        let row = summary
            .build()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DataSourceError::Query(e.to_string()))?;
        let read = |column: &str| DataSourceError::Query(format!("missing `{column}`"));
        let total_count: i64 = row.try_get("total_count").map_err(|_| read("total_count"))?;
        let has_next_page: bool = row
            .try_get("has_next_page")
            .map_err(|_| read("has_next_page"))?;
        let has_previous_page: bool = row
            .try_get("has_previous_page")
            .map_err(|_| read("has_previous_page"))?;

        let table = self.table.table;
        let (mut sender, rx) = mpsc::channel(ROW_BUFFER);
        tokio::spawn(async move {
            {
                let mut rows = rows_query.build().fetch(&mut *tx);
                while let Some(row) = rows.next().await {
                    let item = row
                        .map_err(|e| DataSourceError::Row(e.to_string()))
                        .and_then(decode_row);
                    let failed = item.is_err();
                    if sender.send(item).await.is_err() || failed {
                        break;
                    }
                }
            }
            if let Err(e) = tx.rollback().await {
                debug!(table, "Failed to close window snapshot: {e}");
            }
        });

        Ok(Window {
            total_count: u64::try_from(total_count).unwrap_or_default(),
            has_next_page,
            has_previous_page,
            rows: rx.boxed(),
        })
    }
}
