use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    Column, PgPool, Row,
};

use crate::{
    errors::{DbError, RemoteError},
    models::ddl::probe_sql,
};

use super::{is_plain_table_name, RemoteExecutor, RowSet};

pub struct PostgresClient {
    pub pool: PgPool,
}

impl PostgresClient {
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn column_value(row: &PgRow, i: usize) -> Value {
    if let Ok(Some(val)) = row.try_get::<Option<String>, _>(i) {
        return Value::String(val);
    }
    match row.try_get::<Option<i32>, _>(i) {
        Ok(Some(val)) => Value::from(val),
        _ => Value::Null,
    }
}

#[async_trait]
impl RemoteExecutor for PostgresClient {
    async fn probe(&self, table: &str) -> Result<RowSet, RemoteError> {
        if !is_plain_table_name(table) {
            return Err(RemoteError::transport(format!(
                "refusing to probe invalid table name '{}'",
                table
            )));
        }

        let query = probe_sql(table);
        debug!("probe: {}", query);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let results = rows
            .iter()
            .map(|row| {
                let json_map = row
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.name().to_string(), column_value(row, i)))
                    .collect();

                Value::Object(json_map)
            })
            .collect();

        Ok(results)
    }

    /// Simple-query protocol: the script's statements share one implicit
    /// transaction, so it applies fully or not at all.
    async fn execute(&self, statement: &str) -> Result<(), RemoteError> {
        debug!("execute: {} bytes of SQL", statement.len());
        sqlx::raw_sql(statement).execute(&self.pool).await?;
        Ok(())
    }
}
