//! Window queries over a single Postgres table.
//!
//! Both queries share one CTE chain: `filtered` applies the owner and date
//! filters and numbers rows in the requested order, `bounds` resolves the
//! `after`/`before` keys to positions, `bounded` keeps the rows strictly
//! between them and `page` takes the requested number of rows from the
//! appropriate end. The two queries of one window run inside
//! [`begin_snapshot`].

use sqlx::{pool::PoolConnection, PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracker_graphql::{
    DataSourceError, DataSourceResult, Limit, OrderDirection, OrderField, OwnerFilter,
    WindowQuery,
};

/// Where the records of one connection live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionTable {
    pub table: &'static str,
    /// Sortable in creation order; exposed as the record key.
    pub key_column: &'static str,
    pub owner_column: Option<&'static str>,
    pub timestamp_column: Option<&'static str>,
}

impl CollectionTable {
    pub fn new(table: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            key_column,
            owner_column: None,
            timestamp_column: None,
        }
    }

    pub fn owned_by(mut self, column: &'static str) -> Self {
        self.owner_column = Some(column);
        self
    }

    pub fn timestamped_by(mut self, column: &'static str) -> Self {
        self.timestamp_column = Some(column);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowSelect {
    /// `total_count`, `has_next_page`, `has_previous_page`.
    Summary,
    /// `__key` and the `node` JSON object of each row in the page.
    Rows,
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the summary or rows query for `query` against `table`.
pub fn window_query<F: OrderField>(
    table: &CollectionTable,
    query: &WindowQuery<F>,
    select: WindowSelect,
) -> DataSourceResult<QueryBuilder<'static, Postgres>> {
    let key = quote_ident(table.key_column);
    let direction = query
        .order
        .map_or(OrderDirection::Asc, |order| order.direction)
        .as_sql();
    let order_by = match &query.order {
        Some(order) => format!(
            "t.{} {direction}, t.{key} {direction}",
            quote_ident(order.field.field_name())
        ),
        None => format!("t.{key} {direction}"),
    };
    let page_order = match query.limit {
        Limit::First(_) => "ASC",
        Limit::Last(_) => "DESC",
    };

    let mut builder = QueryBuilder::new(format!(
        "WITH filtered AS (SELECT t.*, t.{key}::text AS __key, ROW_NUMBER() OVER (ORDER BY {order_by}) AS __position FROM {} t WHERE TRUE",
        quote_ident(table.table)
    ));

    match &query.owner {
        OwnerFilter::All => {}
        OwnerFilter::Owner(owner) => {
            let column = table.owner_column.ok_or_else(|| {
                DataSourceError::Query(format!("{} has no owner column", table.table))
            })?;
            builder
                .push(format!(" AND t.{}::text = ", quote_ident(column)))
                .push_bind(owner.clone());
        }
        OwnerFilter::Keys(keys) => {
            builder
                .push(format!(" AND t.{key}::text = ANY("))
                .push_bind(keys.clone())
                .push(")");
        }
    }

    if !query.date_range.is_unbounded() {
        let column = table.timestamp_column.ok_or_else(|| {
            DataSourceError::Query(format!("{} has no timestamp column", table.table))
        })?;
        let column = quote_ident(column);
        if let Some(start) = query.date_range.start {
            builder
                .push(format!(" AND t.{column}::date >= "))
                .push_bind(start);
        }
        if let Some(end) = query.date_range.end {
            builder
                .push(format!(" AND t.{column}::date <= "))
                .push_bind(end);
        }
    }

    builder
        .push("), bounds AS (SELECT COALESCE((SELECT __position FROM filtered WHERE __key = ")
        .push_bind(query.after.clone())
        .push("), 0) AS lower, COALESCE((SELECT __position FROM filtered WHERE __key = ")
        .push_bind(query.before.clone())
        .push("), (SELECT COUNT(*) FROM filtered) + 1) AS upper)")
        .push(", bounded AS (SELECT f.* FROM filtered f, bounds b WHERE f.__position > b.lower AND f.__position < b.upper)")
        .push(format!(
            ", page AS (SELECT * FROM bounded ORDER BY __position {page_order} LIMIT "
        ))
        .push_bind(i64::try_from(query.limit.count()).unwrap_or(i64::MAX))
        .push(") ");

    match select {
        WindowSelect::Summary => builder.push(
            "SELECT (SELECT COUNT(*) FROM filtered) AS total_count, \
             COALESCE((SELECT MAX(__position) FROM page) < (SELECT COUNT(*) FROM filtered), FALSE) AS has_next_page, \
             COALESCE((SELECT MIN(__position) FROM page) > 1, FALSE) AS has_previous_page",
        ),
        WindowSelect::Rows => builder.push(format!(
            "SELECT __key, (row_to_json(page)::jsonb - '__key' - '__position') AS node FROM page ORDER BY __position {page_order}"
        )),
    };

    Ok(builder)
}

/// Statements after this one see the snapshot taken by the first of them.
pub const SNAPSHOT_ISOLATION: &str =
    "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// Begin a read-only transaction in which every statement sees the same
/// snapshot.
pub async fn begin_snapshot(pool: &PgPool) -> sqlx::Result<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;
    sqlx::query(SNAPSHOT_ISOLATION).execute(&mut *tx).await?;
    Ok(tx)
}

pub async fn ping(conn: &mut PoolConnection<Postgres>) -> sqlx::Result<bool> {
    let row = sqlx::query("SELECT true").fetch_one(conn).await?;
    row.try_get(0)
}
