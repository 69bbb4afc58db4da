use chrono::NaiveDate;
use rusqlite::{params, Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Investor row. `id` is assigned at load time by ascending name order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investor {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub investor_type: String,
    pub country: String,
    pub date_added: NaiveDate,
}

/// Commitment row, owned by exactly one investor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: i64,
    pub investor_id: i64,
    pub asset_class: String,
    pub amount: f64,
    pub currency: String,
}

/// Handle to the SQLite file backing the API.
///
/// Holds no connection itself: every request opens its own session and the
/// connection closes when that session is dropped.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Open a read-only session for a single request
    pub fn session(&self) -> rusqlite::Result<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )
    }

    /// Open a read-write connection (loader only), creating the file if needed
    pub fn open_writer(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }
}

// ============================================================================
// Schema
// ============================================================================

const DROP_TABLES: &str = "
    DROP TABLE IF EXISTS commitments;
    DROP TABLE IF EXISTS investors;
";

const CREATE_TABLES: &str = "
    CREATE TABLE investors (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        country TEXT NOT NULL,
        date_added TEXT NOT NULL
    );

    CREATE TABLE commitments (
        id INTEGER PRIMARY KEY,
        investor_id INTEGER NOT NULL REFERENCES investors(id),
        asset_class TEXT NOT NULL,
        amount REAL NOT NULL,
        currency TEXT NOT NULL
    );

    CREATE INDEX ix_investors_name ON investors(name);
    CREATE INDEX ix_commitments_investor_id ON commitments(investor_id);
    CREATE INDEX ix_commitments_asset_class ON commitments(asset_class);
    CREATE INDEX idx_investor_asset ON commitments(investor_id, asset_class);
";

/// Drop both tables and recreate them empty, with their indexes
pub fn reset_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(DROP_TABLES)?;
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

pub fn insert_investor(conn: &Connection, investor: &Investor) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO investors (id, name, type, country, date_added)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            investor.id,
            investor.name,
            investor.investor_type,
            investor.country,
            investor.date_added,
        ],
    )?;

    Ok(())
}

pub fn insert_commitment(conn: &Connection, commitment: &Commitment) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO commitments (id, investor_id, asset_class, amount, currency)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            commitment.id,
            commitment.investor_id,
            commitment.asset_class,
            commitment.amount,
            commitment.currency,
        ],
    )?;

    Ok(())
}

pub fn count_investors(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM investors", [], |row| row.get(0))
}

pub fn count_commitments(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM commitments", [], |row| row.get(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_investor(id: i64, name: &str) -> Investor {
        Investor {
            id,
            name: name.to_string(),
            investor_type: "fund manager".to_string(),
            country: "Singapore".to_string(),
            date_added: NaiveDate::from_ymd_opt(2010, 6, 8).unwrap(),
        }
    }

    #[test]
    fn test_reset_schema_empties_tables() {
        let conn = Connection::open_in_memory().unwrap();
        reset_schema(&conn).unwrap();

        insert_investor(&conn, &sample_investor(1, "Ioo Gryffindor fund")).unwrap();
        assert_eq!(count_investors(&conn).unwrap(), 1);

        reset_schema(&conn).unwrap();
        assert_eq!(count_investors(&conn).unwrap(), 0);
        assert_eq!(count_commitments(&conn).unwrap(), 0);
    }

    #[test]
    fn test_date_added_round_trips_as_iso_text() {
        let conn = Connection::open_in_memory().unwrap();
        reset_schema(&conn).unwrap();
        insert_investor(&conn, &sample_investor(1, "Ioo Gryffindor fund")).unwrap();

        let raw: String = conn
            .query_row("SELECT date_added FROM investors WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "2010-06-08");

        let parsed: NaiveDate = conn
            .query_row("SELECT date_added FROM investors WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2010, 6, 8).unwrap());
    }

    #[test]
    fn test_commitment_requires_existing_investor() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        reset_schema(&conn).unwrap();

        let orphan = Commitment {
            id: 1,
            investor_id: 42,
            asset_class: "Infrastructure".to_string(),
            amount: 15_000_000.0,
            currency: "GBP".to_string(),
        };

        assert!(insert_commitment(&conn, &orphan).is_err());
    }

    #[test]
    fn test_session_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("investors.db"));

        let writer = db.open_writer().unwrap();
        reset_schema(&writer).unwrap();
        drop(writer);

        let session = db.session().unwrap();
        let result = session.execute(
            "INSERT INTO investors (id, name, type, country, date_added)
             VALUES (1, 'x', 'y', 'z', '2020-01-01')",
            [],
        );
        assert!(result.is_err());
    }
}
