//! SQL query constants and builders
//!
//! Contains all SQL text used by the application. Every identifier that is
//! interpolated into a statement comes from the compile-time schema registry,
//! never from caller input.

use crate::schema::{ColumnSpec, Table};

/* ---------- cascade-delete statements ---------- */
//
// Cascades are explicit rather than relying on ON DELETE CASCADE, because no
// foreign-key constraints are assumed on the backing tables. Steps run in
// child-before-parent order inside one transaction.

/// Bookings reachable through a movie's showtimes
pub const DELETE_MOVIE_BOOKINGS: &str = r#"
    DELETE FROM bookings b
    USING showtimes s
    WHERE b.showtime_id = s.showtime_id
      AND s.movie_id = $1
"#;

pub const DELETE_MOVIE_SHOWTIMES: &str = "DELETE FROM showtimes WHERE movie_id = $1";

pub const DELETE_MOVIE: &str = "DELETE FROM movies WHERE movie_id = $1";

/// Bookings reachable through a theater's showtimes
pub const DELETE_THEATER_BOOKINGS: &str = r#"
    DELETE FROM bookings b
    USING showtimes s
    WHERE b.showtime_id = s.showtime_id
      AND s.theater_id = $1
"#;

pub const DELETE_THEATER_SHOWTIMES: &str = "DELETE FROM showtimes WHERE theater_id = $1";

pub const DELETE_THEATER: &str = "DELETE FROM theaters WHERE theater_id = $1";

pub const DELETE_SHOWTIME_BOOKINGS: &str = "DELETE FROM bookings WHERE showtime_id = $1";

pub const DELETE_SHOWTIME: &str = "DELETE FROM showtimes WHERE showtime_id = $1";

pub const DELETE_BOOKING: &str = "DELETE FROM bookings WHERE booking_id = $1";

/// Ordered cascade plan for deleting a row of `table`
///
/// Each statement binds the target row's primary key as `$1`. Unrecognized
/// tables have no plan.
pub fn cascade_plan(table: Table) -> Option<&'static [&'static str]> {
    match table {
        Table::Movies => Some(&[DELETE_MOVIE_BOOKINGS, DELETE_MOVIE_SHOWTIMES, DELETE_MOVIE]),
        Table::Theaters => Some(&[
            DELETE_THEATER_BOOKINGS,
            DELETE_THEATER_SHOWTIMES,
            DELETE_THEATER,
        ]),
        Table::Showtimes => Some(&[DELETE_SHOWTIME_BOOKINGS, DELETE_SHOWTIME]),
        Table::Bookings => Some(&[DELETE_BOOKING]),
        Table::Unknown => None,
    }
}

/// SQL builder for the generic CRUD statements
pub struct SqlBuilder;

impl SqlBuilder {
    /// Quote an identifier (table/column name) safely
    pub fn quote_ident(ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// SELECT * in storage-native order
    pub fn select_all(table: &str) -> String {
        format!("SELECT * FROM {}", Self::quote_ident(table))
    }

    /// Single-row fetch by primary key (binds `$1`)
    pub fn select_by_pk(table: &str, pk: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE {} = $1",
            Self::quote_ident(table),
            Self::quote_ident(pk)
        )
    }

    /// Parameterized insert over the registry's writable columns, in order
    pub fn insert(table: &str, columns: &[ColumnSpec]) -> String {
        let names: Vec<String> = columns.iter().map(|c| Self::quote_ident(c.name)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("${}", n)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::quote_ident(table),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    /// Parameterized update of every writable column, keyed by `$1 = pk`
    pub fn update_by_pk(table: &str, pk: &str, columns: &[ColumnSpec]) -> String {
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(idx, c)| format!("{} = ${}", Self::quote_ident(c.name), idx + 2))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE {} = $1",
            Self::quote_ident(table),
            assignments.join(", "),
            Self::quote_ident(pk)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cascade_plan_step_counts() {
        assert_eq!(cascade_plan(Table::Movies).unwrap().len(), 3);
        assert_eq!(cascade_plan(Table::Theaters).unwrap().len(), 3);
        assert_eq!(cascade_plan(Table::Showtimes).unwrap().len(), 2);
        assert_eq!(cascade_plan(Table::Bookings).unwrap().len(), 1);
        assert!(cascade_plan(Table::Unknown).is_none());
    }

    #[test]
    fn test_cascade_plans_run_child_before_parent() {
        // Dependency depth: bookings (2) -> showtimes (1) -> movies/theaters (0).
        // Steps must touch deeper tables first so no orphan ever survives.
        fn depth(statement: &str) -> u8 {
            if statement.contains("DELETE FROM bookings") {
                2
            } else if statement.contains("DELETE FROM showtimes") {
                1
            } else {
                0
            }
        }

        for table in [Table::Movies, Table::Theaters, Table::Showtimes, Table::Bookings] {
            let plan = cascade_plan(table).unwrap();
            for pair in plan.windows(2) {
                assert!(
                    depth(pair[0]) > depth(pair[1]),
                    "{:?}: step '{}' must run before '{}'",
                    table,
                    pair[0].trim(),
                    pair[1].trim()
                );
            }
        }
    }

    #[test]
    fn test_cascade_plan_ends_at_target_table() {
        assert!(cascade_plan(Table::Movies).unwrap().last().unwrap().contains("FROM movies"));
        assert!(cascade_plan(Table::Theaters).unwrap().last().unwrap().contains("FROM theaters"));
        assert!(cascade_plan(Table::Showtimes)
            .unwrap()
            .last()
            .unwrap()
            .contains("FROM showtimes WHERE showtime_id"));
        assert!(cascade_plan(Table::Bookings)
            .unwrap()
            .last()
            .unwrap()
            .contains("FROM bookings WHERE booking_id"));
    }

    #[test]
    fn test_every_cascade_step_binds_the_target_id() {
        for table in [Table::Movies, Table::Theaters, Table::Showtimes, Table::Bookings] {
            for statement in cascade_plan(table).unwrap() {
                assert!(statement.contains("$1"), "unbound step: {}", statement);
            }
        }
    }

    #[test]
    fn test_insert_statement_shape() {
        let sql = SqlBuilder::insert("movies", Table::Movies.writable_columns());
        assert_eq!(
            sql,
            "INSERT INTO \"movies\" (\"movie_name\", \"genre\", \"duration\") VALUES ($1, $2, $3)"
        );
    }

    #[test]
    fn test_update_statement_keys_on_pk_first() {
        let sql = SqlBuilder::update_by_pk("theaters", "theater_id", Table::Theaters.writable_columns());
        assert_eq!(
            sql,
            "UPDATE \"theaters\" SET \"theater_name\" = $2, \"location\" = $3 WHERE \"theater_id\" = $1"
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(SqlBuilder::quote_ident("mov\"ies"), "\"mov\"\"ies\"");
    }
}
