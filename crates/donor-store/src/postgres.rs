//! PostgreSQL relation store.
//!
//! Each relation is a table in the configured database. `replace` drops,
//! recreates and fills the table inside one transaction, so readers see
//! either the previous content or the new batch.
//!
//! The store drives its own single-threaded Tokio runtime and must not be
//! used from inside another async runtime.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use donor_model::{any_to_date, any_to_f64, any_to_i64, any_to_string, date_to_epoch_days};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{BoxError, Result, StoreError};
use crate::store::TableStore;

/// Bind parameters Postgres accepts in one statement.
const MAX_BIND_PARAMS: usize = 65_535;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Column type used when a batch column is written to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlType {
    BigInt,
    Double,
    Date,
    Boolean,
    Text,
}

impl SqlType {
    fn for_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => SqlType::BigInt,
            DataType::Float32 | DataType::Float64 => SqlType::Double,
            DataType::Date => SqlType::Date,
            DataType::Boolean => SqlType::Boolean,
            _ => SqlType::Text,
        }
    }

    /// Map an `information_schema.columns.data_type` value back.
    fn from_catalog(data_type: &str) -> Self {
        match data_type {
            "bigint" => SqlType::BigInt,
            "double precision" => SqlType::Double,
            "date" => SqlType::Date,
            "boolean" => SqlType::Boolean,
            _ => SqlType::Text,
        }
    }

    fn ddl(self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Date => "DATE",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Text => "TEXT",
        }
    }
}

/// One typed cell, ready to bind.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    BigInt(Option<i64>),
    Double(Option<f64>),
    Date(Option<NaiveDate>),
    Boolean(Option<bool>),
    Text(Option<String>),
}

impl Cell {
    fn from_any(sql_type: SqlType, value: AnyValue<'_>) -> Self {
        let value = match value {
            AnyValue::Null => None,
            other => Some(other),
        };
        match sql_type {
            SqlType::BigInt => Cell::BigInt(value.and_then(any_to_i64)),
            SqlType::Double => Cell::Double(value.and_then(any_to_f64)),
            SqlType::Date => Cell::Date(value.and_then(any_to_date)),
            SqlType::Boolean => Cell::Boolean(value.and_then(|v| match v {
                AnyValue::Boolean(b) => Some(b),
                _ => None,
            })),
            SqlType::Text => Cell::Text(value.map(any_to_string)),
        }
    }
}

/// Quote an identifier, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(relation: &str, columns: &[(String, SqlType)]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|(name, sql_type)| format!("{} {}", quote_ident(name), sql_type.ddl()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(relation), defs.join(", "))
}

fn insert_prefix(relation: &str, columns: &[(String, SqlType)]) -> String {
    let names: Vec<String> = columns.iter().map(|(name, _)| quote_ident(name)).collect();
    format!("INSERT INTO {} ({}) ", quote_ident(relation), names.join(", "))
}

/// Rows per INSERT so that one statement stays under the bind limit.
fn rows_per_statement(width: usize) -> usize {
    (MAX_BIND_PARAMS / width.max(1)).max(1)
}

fn table_columns(batch: &DataFrame) -> Vec<(String, SqlType)> {
    batch
        .get_columns()
        .iter()
        .map(|column| (column.name().to_string(), SqlType::for_dtype(column.dtype())))
        .collect()
}

fn batch_rows(
    batch: &DataFrame,
    columns: &[(String, SqlType)],
) -> std::result::Result<Vec<Vec<Cell>>, BoxError> {
    let source: Vec<&Column> = batch.get_columns().iter().collect();
    let mut rows = Vec::with_capacity(batch.height());
    for idx in 0..batch.height() {
        let mut row = Vec::with_capacity(columns.len());
        for (column, (_, sql_type)) in source.iter().zip(columns) {
            row.push(Cell::from_any(*sql_type, column.get(idx)?));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn frame_from_rows(
    columns: &[(String, SqlType)],
    rows: &[PgRow],
) -> std::result::Result<DataFrame, BoxError> {
    let mut out = Vec::with_capacity(columns.len());
    for (idx, (name, sql_type)) in columns.iter().enumerate() {
        let series = match sql_type {
            SqlType::BigInt => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get::<Option<i64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
            SqlType::Double => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get::<Option<f64>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
            SqlType::Boolean => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get::<Option<bool>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
            SqlType::Date => {
                let values = rows
                    .iter()
                    .map(|row| {
                        row.try_get::<Option<NaiveDate>, _>(idx)
                            .map(|date| date.map(date_to_epoch_days))
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values).cast(&DataType::Date)?
            }
            SqlType::Text => {
                let values = rows
                    .iter()
                    .map(|row| row.try_get::<Option<String>, _>(idx))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Series::new(name.as_str().into(), values)
            }
        };
        out.push(series.into_column());
    }
    Ok(DataFrame::new(out)?)
}

/// Relation store backed by a PostgreSQL database.
pub struct PostgresTableStore {
    connection: ConnectionConfig,
    pool: PgPool,
    runtime: Runtime,
}

impl fmt::Debug for PostgresTableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTableStore")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

impl PostgresTableStore {
    /// Prepare a connection pool. No connection is opened until the first
    /// operation, which is where an unreachable server is reported.
    pub fn open(connection: ConnectionConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| StoreError::connectivity(connection.redacted_url(), err))?;
        let options = PgConnectOptions::new()
            .host(&connection.host)
            .port(connection.port)
            .username(&connection.user)
            .password(&connection.password)
            .database(&connection.database);
        let pool = {
            let _guard = runtime.enter();
            PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect_lazy_with(options)
        };
        debug!(target_db = %connection.redacted_url(), "postgres store prepared");
        Ok(Self {
            connection,
            pool,
            runtime,
        })
    }

    fn connectivity(&self, source: impl Into<BoxError>) -> StoreError {
        StoreError::connectivity(self.describe(), source)
    }

    fn not_found(&self, relation: &str) -> StoreError {
        StoreError::RelationNotFound {
            relation: relation.to_string(),
            location: self.describe(),
        }
    }

    async fn table_exists(&self, relation: &str) -> std::result::Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(relation)
        .fetch_one(&self.pool)
        .await
    }

    async fn write_table(
        &self,
        relation: &str,
        columns: &[(String, SqlType)],
        rows: &[Vec<Cell>],
    ) -> std::result::Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_ident(relation));
        sqlx::query(&drop_sql).execute(&mut *tx).await?;
        let create_sql = create_table_sql(relation, columns);
        sqlx::query(&create_sql).execute(&mut *tx).await?;

        if !columns.is_empty() {
            for chunk in rows.chunks(rows_per_statement(columns.len())) {
                let mut builder: QueryBuilder<Postgres> =
                    QueryBuilder::new(insert_prefix(relation, columns));
                builder.push_values(chunk, |mut values, row| {
                    for cell in row {
                        match cell {
                            Cell::BigInt(v) => values.push_bind(*v),
                            Cell::Double(v) => values.push_bind(*v),
                            Cell::Date(v) => values.push_bind(*v),
                            Cell::Boolean(v) => values.push_bind(*v),
                            Cell::Text(v) => values.push_bind(v.clone()),
                        };
                    }
                });
                builder.build().execute(&mut *tx).await?;
            }
        }
        tx.commit().await
    }

    async fn read_table(
        &self,
        relation: &str,
    ) -> std::result::Result<(Vec<(String, SqlType)>, Vec<PgRow>), sqlx::Error> {
        let catalog: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name::text, data_type::text FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(relation)
        .fetch_all(&self.pool)
        .await?;
        let columns = catalog
            .into_iter()
            .map(|(name, data_type)| (name, SqlType::from_catalog(&data_type)))
            .collect();
        let select_sql = format!("SELECT * FROM {}", quote_ident(relation));
        let rows = sqlx::query(&select_sql).fetch_all(&self.pool).await?;
        Ok((columns, rows))
    }
}

impl TableStore for PostgresTableStore {
    fn describe(&self) -> String {
        self.connection.redacted_url()
    }

    fn replace(&self, relation: &str, batch: &DataFrame) -> Result<()> {
        debug!(relation, rows = batch.height(), "replacing relation");
        let columns = table_columns(batch);
        let rows = batch_rows(batch, &columns).map_err(|err| self.connectivity(err))?;
        self.runtime
            .block_on(self.write_table(relation, &columns, &rows))
            .map_err(|err| self.connectivity(err))?;
        info!(relation, rows = batch.height(), "relation replaced");
        Ok(())
    }

    fn read(&self, relation: &str) -> Result<DataFrame> {
        let exists = self
            .runtime
            .block_on(self.table_exists(relation))
            .map_err(|err| self.connectivity(err))?;
        if !exists {
            return Err(self.not_found(relation));
        }
        let (columns, rows) = self
            .runtime
            .block_on(self.read_table(relation))
            .map_err(|err| self.connectivity(err))?;
        let df = frame_from_rows(&columns, &rows).map_err(|err| self.connectivity(err))?;
        debug!(relation, rows = df.height(), "relation read");
        Ok(df)
    }

    fn row_count(&self, relation: &str) -> Result<usize> {
        let exists = self
            .runtime
            .block_on(self.table_exists(relation))
            .map_err(|err| self.connectivity(err))?;
        if !exists {
            return Err(self.not_found(relation));
        }
        let count_sql = format!("SELECT COUNT(*) FROM {}", quote_ident(relation));
        let count: i64 = self
            .runtime
            .block_on(sqlx::query_scalar(&count_sql).fetch_one(&self.pool))
            .map_err(|err| self.connectivity(err))?;
        usize::try_from(count).map_err(|err| self.connectivity(err))
    }
}
