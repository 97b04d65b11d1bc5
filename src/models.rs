//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains all response structures used by the API. The rendering layer is
//! an external collaborator; these types are the data mapping it consumes.

use crate::gateway::RecordSet;
use crate::schema::Table;
use serde::Serialize;
use serde_json::{Map, Value};

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Message-only response (no data)
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// One administrable table in the console's selector
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub table: Table,
    pub primary_key_field: &'static str,
}

/// Response listing the administrable tables
#[derive(Serialize)]
pub struct TableListResponse {
    pub tables: Vec<TableDescriptor>,
}

/// A full table view: rows plus the field to key them by
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSetResponse {
    pub table: Table,
    pub primary_key_field: &'static str,
    pub rows: Vec<Map<String, Value>>,
}

impl RecordSetResponse {
    pub fn new(table: Table, set: RecordSet) -> Self {
        Self {
            table,
            primary_key_field: set.primary_key_field,
            rows: set.rows,
        }
    }
}

/// A single record, as loaded for the edit form
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub table: Table,
    pub primary_key_field: &'static str,
    pub record: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_serializes_to_console_spelling() {
        let descriptor = TableDescriptor {
            table: Table::Showtimes,
            primary_key_field: Table::Showtimes.primary_key(),
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["table"], "Showtimes");
        assert_eq!(json["primaryKeyField"], "showtime_id");
    }

    #[test]
    fn test_record_set_response_flattens_into_envelope() {
        let set = RecordSet {
            primary_key_field: "movie_id",
            rows: vec![],
        };
        let body = SuccessResponse::with_data(
            "Records fetched successfully.",
            RecordSetResponse::new(Table::Movies, set),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["primaryKeyField"], "movie_id");
        assert!(json["rows"].as_array().unwrap().is_empty());
    }
}
