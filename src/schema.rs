//! Schema registry for the cinema booking tables
//!
//! A fixed, compile-time description of the administrable tables: which
//! column is the primary key and which columns are writable on insert/update.
//! Table names arriving from the outside are parsed into a closed variant so
//! that no caller-supplied identifier can ever reach a SQL statement.

use serde::Serialize;

/// Value kind a writable column coerces its string payload into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Date,
    Time,
}

/// A writable (insert/update) column of an administrable table
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ValueKind,
}

const fn col(name: &'static str, kind: ValueKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

const MOVIE_COLUMNS: &[ColumnSpec] = &[
    col("movie_name", ValueKind::Text),
    col("genre", ValueKind::Text),
    col("duration", ValueKind::Integer),
];

const THEATER_COLUMNS: &[ColumnSpec] = &[
    col("theater_name", ValueKind::Text),
    col("location", ValueKind::Text),
];

const SHOWTIME_COLUMNS: &[ColumnSpec] = &[
    col("movie_id", ValueKind::Integer),
    col("theater_id", ValueKind::Integer),
    col("show_date", ValueKind::Date),
    col("show_time", ValueKind::Time),
];

const BOOKING_COLUMNS: &[ColumnSpec] = &[
    col("user_id", ValueKind::Integer),
    col("showtime_id", ValueKind::Integer),
    col("seats_booked", ValueKind::Integer),
];

/// An administrable table, parsed from the inbound table name
///
/// `Unknown` covers every unrecognized name; operations on it are rejected
/// before any SQL string is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Table {
    Movies,
    Theaters,
    Showtimes,
    Bookings,
    Unknown,
}

/// The four known tables, in the order the console presents them
pub const ADMIN_TABLES: [Table; 4] = [
    Table::Movies,
    Table::Theaters,
    Table::Showtimes,
    Table::Bookings,
];

impl Table {
    /// Parse an inbound table name (exact match on the console's spelling)
    pub fn parse(name: &str) -> Self {
        match name {
            "Movies" => Table::Movies,
            "Theaters" => Table::Theaters,
            "Showtimes" => Table::Showtimes,
            "Bookings" => Table::Bookings,
            _ => Table::Unknown,
        }
    }

    /// The name the console displays for this table
    pub fn display_name(&self) -> &'static str {
        match self {
            Table::Movies => "Movies",
            Table::Theaters => "Theaters",
            Table::Showtimes => "Showtimes",
            Table::Bookings => "Bookings",
            Table::Unknown => "Unknown",
        }
    }

    /// The SQL identifier for this table, `None` for unrecognized tables
    ///
    /// All statement building goes through this accessor, so only the
    /// compile-time identifiers below can appear in SQL text.
    pub fn sql_name(&self) -> Option<&'static str> {
        match self {
            Table::Movies => Some("movies"),
            Table::Theaters => Some("theaters"),
            Table::Showtimes => Some("showtimes"),
            Table::Bookings => Some("bookings"),
            Table::Unknown => None,
        }
    }

    /// Primary-key field name
    ///
    /// Never fails: unrecognized tables get the permissive `"id"` fallback,
    /// which callers treat as a policy choice rather than an error.
    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Movies => "movie_id",
            Table::Theaters => "theater_id",
            Table::Showtimes => "showtime_id",
            Table::Bookings => "booking_id",
            Table::Unknown => "id",
        }
    }

    /// Ordered writable columns for insert/update statements
    ///
    /// Unrecognized tables yield no columns.
    pub fn writable_columns(&self) -> &'static [ColumnSpec] {
        match self {
            Table::Movies => MOVIE_COLUMNS,
            Table::Theaters => THEATER_COLUMNS,
            Table::Showtimes => SHOWTIME_COLUMNS,
            Table::Bookings => BOOKING_COLUMNS,
            Table::Unknown => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primary_key_for_known_tables() {
        assert_eq!(Table::parse("Movies").primary_key(), "movie_id");
        assert_eq!(Table::parse("Theaters").primary_key(), "theater_id");
        assert_eq!(Table::parse("Showtimes").primary_key(), "showtime_id");
        assert_eq!(Table::parse("Bookings").primary_key(), "booking_id");
    }

    #[test]
    fn test_primary_key_fallback_for_unknown_tables() {
        assert_eq!(Table::parse("Users").primary_key(), "id");
        assert_eq!(Table::parse("movies").primary_key(), "id"); // case-sensitive
        assert_eq!(Table::parse("").primary_key(), "id");
    }

    #[test]
    fn test_unknown_table_has_no_sql_name() {
        assert_eq!(Table::parse("Users"), Table::Unknown);
        assert_eq!(Table::Unknown.sql_name(), None);
        assert!(Table::Unknown.writable_columns().is_empty());
    }

    #[test]
    fn test_writable_column_order_matches_insert_statements() {
        let names: Vec<&str> = Table::Movies
            .writable_columns()
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["movie_name", "genre", "duration"]);

        let names: Vec<&str> = Table::Showtimes
            .writable_columns()
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["movie_id", "theater_id", "show_date", "show_time"]);
    }

    #[test]
    fn test_primary_key_is_never_writable() {
        for table in ADMIN_TABLES {
            let pk = table.primary_key();
            assert!(
                table.writable_columns().iter().all(|c| c.name != pk),
                "{} lists its primary key as writable",
                table.display_name()
            );
        }
    }

    #[test]
    fn test_sql_names_are_lowercase_identifiers() {
        for table in ADMIN_TABLES {
            let name = table.sql_name().unwrap();
            assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
