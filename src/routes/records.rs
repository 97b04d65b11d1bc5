//! Record administration route handlers
//!
//! Maps the console's operations (list tables, view, add, edit, delete) onto
//! the record gateway. Table names are validated against the closed schema
//! registry before anything touches the database.

use crate::error::{ApiResult, AppError};
use crate::gateway::FieldMap;
use crate::models::{
    MessageResponse, RecordResponse, RecordSetResponse, SuccessResponse, TableDescriptor,
    TableListResponse,
};
use crate::schema::{Table, ADMIN_TABLES};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

/// Reject unrecognized table names before any SQL is built
fn resolve_table(name: &str) -> Result<Table, AppError> {
    match Table::parse(name) {
        Table::Unknown => Err(AppError::UnknownTable(name.to_string())),
        table => Ok(table),
    }
}

/// List the administrable tables and their primary-key fields
pub async fn list_tables() -> ApiResult<Json<SuccessResponse<TableListResponse>>> {
    let tables = ADMIN_TABLES
        .iter()
        .map(|&table| TableDescriptor {
            table,
            primary_key_field: table.primary_key(),
        })
        .collect();

    Ok(Json(SuccessResponse::with_data(
        "Tables fetched successfully.",
        TableListResponse { tables },
    )))
}

/// View all rows of a table
pub async fn view_table(
    State(state): State<SharedState>,
    Path(table): Path<String>,
) -> ApiResult<Json<SuccessResponse<RecordSetResponse>>> {
    let table = resolve_table(&table)?;
    debug!("Viewing table {}", table.display_name());

    let set = state.records.view(table).await?;

    Ok(Json(SuccessResponse::with_data(
        "Records fetched successfully.",
        RecordSetResponse::new(table, set),
    )))
}

/// Add a new record; the body is a flat field-name to value map
pub async fn add_record(
    State(state): State<SharedState>,
    Path(table): Path<String>,
    Json(fields): Json<FieldMap>,
) -> ApiResult<Json<MessageResponse>> {
    let table = resolve_table(&table)?;

    state.records.add(table, &fields).await?;

    Ok(Json(MessageResponse::new("Record added successfully.")))
}

/// Load a single record for the edit form
pub async fn load_record(
    State(state): State<SharedState>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse<RecordResponse>>> {
    let table = resolve_table(&table)?;

    let record = state.records.load(table, &id).await?;

    Ok(Json(SuccessResponse::with_data(
        "Record fetched successfully.",
        RecordResponse {
            table,
            primary_key_field: table.primary_key(),
            record,
        },
    )))
}

/// Submit an edit: full replace of the record's writable columns
pub async fn update_record(
    State(state): State<SharedState>,
    Path((table, id)): Path<(String, String)>,
    Json(fields): Json<FieldMap>,
) -> ApiResult<Json<MessageResponse>> {
    let table = resolve_table(&table)?;

    state.records.update(table, &id, &fields).await?;

    Ok(Json(MessageResponse::new("Record updated successfully.")))
}

/// Delete a record with cascade, responding with the refreshed table
pub async fn delete_record(
    State(state): State<SharedState>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse<RecordSetResponse>>> {
    let table = resolve_table(&table)?;

    let set = state.records.delete(table, &id).await?;

    Ok(Json(SuccessResponse::with_data(
        "Record deleted successfully.",
        RecordSetResponse::new(table, set),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_table_accepts_known_names() {
        assert_eq!(resolve_table("Movies").unwrap(), Table::Movies);
        assert_eq!(resolve_table("Bookings").unwrap(), Table::Bookings);
    }

    #[test]
    fn test_resolve_table_fails_closed() {
        assert!(matches!(
            resolve_table("movies; DROP TABLE bookings"),
            Err(AppError::UnknownTable(_))
        ));
        assert!(matches!(
            resolve_table("Snacks"),
            Err(AppError::UnknownTable(_))
        ));
    }
}
