//! Record store gateway
//!
//! Executes the console's CRUD operations against PostgreSQL, using the
//! schema registry to resolve primary keys, writable columns, and the
//! cascade plan that applies on delete. The gateway owns the connection
//! pool; every operation acquires a client for its own duration, and delete
//! holds a single client for its whole transaction.

use crate::db::queries::{self, SqlBuilder};
use crate::error::AppError;
use crate::schema::{ColumnSpec, Table, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use deadpool_postgres::Pool;
use postgres_types::Type;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio_postgres::types::ToSql;
use tokio_postgres::{GenericClient, Row};
use tracing::{debug, error, info};

/// Inbound row payload: form field name to raw string value
pub type FieldMap = BTreeMap<String, String>;

/// A fetched row set plus the field callers key rows by
#[derive(Debug)]
pub struct RecordSet {
    pub primary_key_field: &'static str,
    pub rows: Vec<Map<String, Value>>,
}

/// A coerced statement parameter
#[derive(Debug, Clone, PartialEq)]
enum SqlValue {
    Text(String),
    Integer(i32),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl SqlValue {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::Text(v) => v,
            SqlValue::Integer(v) => v,
            SqlValue::Date(v) => v,
            SqlValue::Time(v) => v,
        }
    }
}

/// Coerce one raw string field into its column's declared kind
fn coerce_value(column: &ColumnSpec, raw: &str) -> Result<SqlValue, AppError> {
    let trimmed = raw.trim();
    match column.kind {
        ValueKind::Text => Ok(SqlValue::Text(raw.to_string())),
        ValueKind::Integer => trimmed.parse::<i32>().map(SqlValue::Integer).map_err(|_| {
            AppError::write(format!(
                "invalid integer for column '{}': '{}'",
                column.name, raw
            ))
        }),
        ValueKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(SqlValue::Date)
            .map_err(|_| {
                AppError::write(format!(
                    "invalid date for column '{}': '{}' (expected YYYY-MM-DD)",
                    column.name, raw
                ))
            }),
        ValueKind::Time => NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(SqlValue::Time)
            .map_err(|_| {
                AppError::write(format!(
                    "invalid time for column '{}': '{}' (expected HH:MM[:SS])",
                    column.name, raw
                ))
            }),
    }
}

/// Coerce the payload positionally against the registry's column order
fn coerce_fields(columns: &[ColumnSpec], fields: &FieldMap) -> Result<Vec<SqlValue>, AppError> {
    columns
        .iter()
        .map(|column| {
            let raw = fields.get(column.name).map(String::as_str).unwrap_or("");
            coerce_value(column, raw)
        })
        .collect()
}

/// Parse a caller-supplied row id before any statement is issued
fn parse_id(id: &str) -> Result<i32, AppError> {
    id.trim()
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("Invalid record id '{}'.", id)))
}

/// Resolve the SQL identifier for a table, rejecting unrecognized names
fn resolve(table: Table) -> Result<&'static str, AppError> {
    table
        .sql_name()
        .ok_or_else(|| AppError::UnknownTable(table.display_name().to_string()))
}

fn json_from<T: Into<Value>>(value: Result<Option<T>, tokio_postgres::Error>) -> Value {
    match value {
        Ok(Some(v)) => v.into(),
        _ => Value::Null,
    }
}

/// Convert one column of a row into JSON by its Postgres type
///
/// Types outside the cinema schema degrade to null rather than failing the
/// whole view.
fn column_value(row: &Row, idx: usize) -> Value {
    let ty = row.columns()[idx].type_();
    match ty {
        t if *t == Type::BOOL => json_from(row.try_get::<_, Option<bool>>(idx)),
        t if *t == Type::INT2 => json_from(row.try_get::<_, Option<i16>>(idx)),
        t if *t == Type::INT4 => json_from(row.try_get::<_, Option<i32>>(idx)),
        t if *t == Type::INT8 => json_from(row.try_get::<_, Option<i64>>(idx)),
        t if *t == Type::FLOAT4 => json_from(
            row.try_get::<_, Option<f32>>(idx)
                .map(|v| v.map(|f| f as f64)),
        ),
        t if *t == Type::FLOAT8 => json_from(row.try_get::<_, Option<f64>>(idx)),
        t if *t == Type::TEXT || *t == Type::VARCHAR || *t == Type::BPCHAR || *t == Type::NAME => {
            json_from(row.try_get::<_, Option<String>>(idx))
        }
        t if *t == Type::DATE => json_from(
            row.try_get::<_, Option<NaiveDate>>(idx)
                .map(|v| v.map(|d| d.format("%Y-%m-%d").to_string())),
        ),
        t if *t == Type::TIME => json_from(
            row.try_get::<_, Option<NaiveTime>>(idx)
                .map(|v| v.map(|t| t.format("%H:%M:%S").to_string())),
        ),
        t if *t == Type::TIMESTAMP => json_from(
            row.try_get::<_, Option<NaiveDateTime>>(idx)
                .map(|v| v.map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())),
        ),
        t if *t == Type::TIMESTAMPTZ => json_from(
            row.try_get::<_, Option<DateTime<Utc>>>(idx)
                .map(|v| v.map(|ts| ts.to_rfc3339())),
        ),
        t if *t == Type::JSON || *t == Type::JSONB => {
            json_from(row.try_get::<_, Option<Value>>(idx))
        }
        _ => Value::Null,
    }
}

/// Convert a whole row into a JSON object keyed by column name
fn row_to_json(row: &Row) -> Map<String, Value> {
    let mut object = Map::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_value(row, idx));
    }
    object
}

/// Gateway translating generic CRUD commands into schema-specific statements
#[derive(Clone)]
pub struct RecordGateway {
    pool: Pool,
}

impl RecordGateway {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Fetch all rows of a table in storage-native order
    pub async fn view(&self, table: Table) -> Result<RecordSet, AppError> {
        let name = resolve(table)?;
        let client = self.pool.get().await?;
        self.fetch_all(&**client, table, name).await
    }

    /// Insert one row, binding the payload positionally to the registry's
    /// writable columns
    pub async fn add(&self, table: Table, fields: &FieldMap) -> Result<(), AppError> {
        let name = resolve(table)?;
        let columns = table.writable_columns();
        let values = coerce_fields(columns, fields)?;
        let sql = SqlBuilder::insert(name, columns);
        let params: Vec<&(dyn ToSql + Sync)> = values.iter().map(SqlValue::as_sql).collect();

        debug!("Inserting into {}", table.display_name());
        let client = self.pool.get().await?;
        client
            .execute(sql.as_str(), &params)
            .await
            .map_err(AppError::write)?;

        info!("Record added to {}", table.display_name());
        Ok(())
    }

    /// Load a single row by primary key for the edit form
    pub async fn load(&self, table: Table, id: &str) -> Result<Map<String, Value>, AppError> {
        let name = resolve(table)?;
        let key = parse_id(id)?;
        let sql = SqlBuilder::select_by_pk(name, table.primary_key());

        let client = self.pool.get().await?;
        let row = client
            .query_opt(sql.as_str(), &[&key])
            .await
            .map_err(AppError::Query)?;

        match row {
            Some(row) => Ok(row_to_json(&row)),
            None => Err(AppError::NotFound(format!(
                "No {} record with {} = {}.",
                table.display_name(),
                table.primary_key(),
                key
            ))),
        }
    }

    /// Replace every writable column of the row identified by `id`
    pub async fn update(&self, table: Table, id: &str, fields: &FieldMap) -> Result<(), AppError> {
        let name = resolve(table)?;
        let key = parse_id(id)?;
        let columns = table.writable_columns();
        let values = coerce_fields(columns, fields)?;
        let sql = SqlBuilder::update_by_pk(name, table.primary_key(), columns);

        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(values.len() + 1);
        params.push(&key);
        params.extend(values.iter().map(SqlValue::as_sql));

        debug!("Updating {} row {}", table.display_name(), key);
        let client = self.pool.get().await?;
        client
            .execute(sql.as_str(), &params)
            .await
            .map_err(AppError::write)?;

        info!("Record {} updated in {}", key, table.display_name());
        Ok(())
    }

    /// Delete a row and everything that references it, atomically
    ///
    /// Runs the table's cascade plan child-before-parent inside one
    /// transaction; any step failure rolls the whole cascade back. On
    /// success the refreshed row set is returned so the caller can
    /// redisplay the table without a second round trip.
    pub async fn delete(&self, table: Table, id: &str) -> Result<RecordSet, AppError> {
        let name = resolve(table)?;
        let key = parse_id(id)?;
        let plan = queries::cascade_plan(table)
            .ok_or_else(|| AppError::UnknownTable(table.display_name().to_string()))?;

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await.map_err(AppError::Delete)?;

        for statement in plan {
            if let Err(e) = tx.execute(*statement, &[&key]).await {
                error!(
                    "Cascade step failed for {} id {}: {:?}",
                    table.display_name(),
                    key,
                    e
                );
                // Rollback before surfacing; the drop path would abort the
                // transaction anyway, but the caller contract is explicit.
                let _ = tx.rollback().await;
                return Err(AppError::Delete(e));
            }
        }

        tx.commit().await.map_err(AppError::Delete)?;
        info!(
            "Deleted {} record {} with cascade ({} steps)",
            table.display_name(),
            key,
            plan.len()
        );

        self.fetch_all(&**client, table, name).await
    }

    async fn fetch_all<C: GenericClient>(
        &self,
        client: &C,
        table: Table,
        name: &str,
    ) -> Result<RecordSet, AppError> {
        let sql = SqlBuilder::select_all(name);
        let rows = client
            .query(sql.as_str(), &[])
            .await
            .map_err(AppError::Query)?;

        debug!("Fetched {} rows from {}", rows.len(), table.display_name());
        Ok(RecordSet {
            primary_key_field: table.primary_key(),
            rows: rows.iter().map(row_to_json).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ADMIN_TABLES;
    use pretty_assertions::assert_eq;

    fn spec(name: &'static str, kind: ValueKind) -> ColumnSpec {
        ColumnSpec { name, kind }
    }

    #[test]
    fn test_coerce_text_passes_through() {
        let value = coerce_value(&spec("genre", ValueKind::Text), "Sci-Fi").unwrap();
        assert_eq!(value, SqlValue::Text("Sci-Fi".to_string()));
    }

    #[test]
    fn test_coerce_integer() {
        let value = coerce_value(&spec("duration", ValueKind::Integer), " 142 ").unwrap();
        assert_eq!(value, SqlValue::Integer(142));

        assert!(coerce_value(&spec("duration", ValueKind::Integer), "long").is_err());
        assert!(coerce_value(&spec("duration", ValueKind::Integer), "").is_err());
    }

    #[test]
    fn test_coerce_date() {
        let value = coerce_value(&spec("show_date", ValueKind::Date), "2024-07-15").unwrap();
        assert_eq!(
            value,
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap())
        );

        assert!(coerce_value(&spec("show_date", ValueKind::Date), "15/07/2024").is_err());
    }

    #[test]
    fn test_coerce_time_with_and_without_seconds() {
        let long = coerce_value(&spec("show_time", ValueKind::Time), "19:30:00").unwrap();
        let short = coerce_value(&spec("show_time", ValueKind::Time), "19:30").unwrap();
        assert_eq!(long, short);

        assert!(coerce_value(&spec("show_time", ValueKind::Time), "7pm").is_err());
    }

    #[test]
    fn test_coerce_fields_follows_registry_order() {
        let mut fields = FieldMap::new();
        fields.insert("duration".to_string(), "120".to_string());
        fields.insert("movie_name".to_string(), "Arrival".to_string());
        fields.insert("genre".to_string(), "Sci-Fi".to_string());
        fields.insert("ignored_extra".to_string(), "x".to_string());

        let values = coerce_fields(Table::Movies.writable_columns(), &fields).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Text("Arrival".to_string()),
                SqlValue::Text("Sci-Fi".to_string()),
                SqlValue::Integer(120),
            ]
        );
    }

    #[test]
    fn test_missing_text_field_becomes_empty_string() {
        let fields = FieldMap::new();
        let values = coerce_fields(Table::Theaters.writable_columns(), &fields).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Text(String::new()),
                SqlValue::Text(String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        assert!(parse_id("42; DROP TABLE movies").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_resolve_rejects_unknown_tables() {
        for table in ADMIN_TABLES {
            assert!(resolve(table).is_ok());
        }
        assert!(matches!(
            resolve(Table::Unknown),
            Err(AppError::UnknownTable(_))
        ));
    }
}
