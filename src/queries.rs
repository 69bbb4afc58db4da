// Query Layer - read-only lookups and aggregations over investors/commitments
//
// Every query that takes an investor_id probes for the investor first, so an
// unknown id (InvestorNotFound) stays distinct from an investor with no
// matching rows (empty Vec).

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::db::Commitment;
use crate::error::{QueryError, QueryResult};

/// Investor with the sum of all of its commitments
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorTotal {
    pub id: i64,
    pub name: String,
    pub investor_type: String,
    pub country: String,
    pub date_added: NaiveDate,
    pub total_commitment: f64,
}

/// Per-asset-class aggregate for one investor
#[derive(Debug, Clone, PartialEq)]
pub struct AssetClassTotal {
    pub asset_class: String,
    pub total_commitment: f64,
    pub commitment_count: i64,
}

/// Id and name only, for the directory listing on the root endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorRef {
    pub id: i64,
    pub name: String,
}

fn commitment_from_row(row: &Row<'_>) -> rusqlite::Result<Commitment> {
    Ok(Commitment {
        id: row.get(0)?,
        investor_id: row.get(1)?,
        asset_class: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
    })
}

pub fn investor_exists(conn: &Connection, investor_id: i64) -> QueryResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM investors WHERE id = ?1)",
        [investor_id],
        |row| row.get(0),
    )?;

    Ok(exists)
}

fn require_investor(conn: &Connection, investor_id: i64) -> QueryResult<()> {
    if investor_exists(conn, investor_id)? {
        Ok(())
    } else {
        Err(QueryError::InvestorNotFound(investor_id))
    }
}

/// Every investor (with or without commitments), ordered by name
pub fn list_investor_directory(conn: &Connection) -> QueryResult<Vec<InvestorRef>> {
    let mut stmt = conn.prepare("SELECT id, name FROM investors ORDER BY name, id")?;

    let investors = stmt
        .query_map([], |row| {
            Ok(InvestorRef {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(investors)
}

/// Investors joined to their commitments with summed amounts, ordered by name.
///
/// Inner join: investors without commitments are not listed.
pub fn list_investors_with_totals(conn: &Connection) -> QueryResult<Vec<InvestorTotal>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.type, i.country, i.date_added, SUM(c.amount) AS total_commitment
         FROM investors i
         JOIN commitments c ON c.investor_id = i.id
         GROUP BY i.id
         ORDER BY i.name, i.id",
    )?;

    let investors = stmt
        .query_map([], |row| {
            Ok(InvestorTotal {
                id: row.get(0)?,
                name: row.get(1)?,
                investor_type: row.get(2)?,
                country: row.get(3)?,
                date_added: row.get(4)?,
                total_commitment: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = investors.len(), "listed investors with totals");
    Ok(investors)
}

/// Commitments of one investor in storage order, optionally restricted to an
/// exact asset class. An empty asset class string means no filter.
pub fn list_commitments(
    conn: &Connection,
    investor_id: i64,
    asset_class: Option<&str>,
) -> QueryResult<Vec<Commitment>> {
    require_investor(conn, investor_id)?;

    let asset_class = asset_class.filter(|class| !class.is_empty());

    let mut stmt = conn.prepare(
        "SELECT id, investor_id, asset_class, amount, currency
         FROM commitments
         WHERE investor_id = ?1
           AND (?2 IS NULL OR asset_class = ?2)
         ORDER BY id",
    )?;

    let commitments = stmt
        .query_map(params![investor_id, asset_class], commitment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(investor_id, ?asset_class, count = commitments.len(), "listed commitments");
    Ok(commitments)
}

/// Distinct asset classes present in the data, ascending
pub fn list_asset_classes(conn: &Connection) -> QueryResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT asset_class FROM commitments ORDER BY asset_class",
    )?;

    let classes = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(classes)
}

/// Sum and count of one investor's commitments per asset class, largest
/// total first. Equal totals fall back to asset class ascending.
pub fn summarize_investor(conn: &Connection, investor_id: i64) -> QueryResult<Vec<AssetClassTotal>> {
    require_investor(conn, investor_id)?;

    let mut stmt = conn.prepare(
        "SELECT asset_class, SUM(amount) AS total_commitment, COUNT(*) AS commitment_count
         FROM commitments
         WHERE investor_id = ?1
         GROUP BY asset_class
         ORDER BY total_commitment DESC, asset_class ASC",
    )?;

    let summary = stmt
        .query_map([investor_id], |row| {
            Ok(AssetClassTotal {
                asset_class: row.get(0)?,
                total_commitment: row.get(1)?,
                commitment_count: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(investor_id, groups = summary.len(), "summarized investor");
    Ok(summary)
}

/// Commitments matching both the investor and the asset class, largest
/// amount first.
pub fn filter_commitments(
    conn: &Connection,
    investor_id: i64,
    asset_class: &str,
) -> QueryResult<Vec<Commitment>> {
    require_investor(conn, investor_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, investor_id, asset_class, amount, currency
         FROM commitments
         WHERE investor_id = ?1 AND asset_class = ?2
         ORDER BY amount DESC, id ASC",
    )?;

    let commitments = stmt
        .query_map(params![investor_id, asset_class], commitment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(investor_id, asset_class, count = commitments.len(), "filtered commitments");
    Ok(commitments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{insert_commitment, insert_investor, reset_schema, Investor};

    fn investor(id: i64, name: &str) -> Investor {
        Investor {
            id,
            name: name.to_string(),
            investor_type: "asset manager".to_string(),
            country: "United Kingdom".to_string(),
            date_added: NaiveDate::from_ymd_opt(2005, 10, 2).unwrap(),
        }
    }

    fn commitment(id: i64, investor_id: i64, asset_class: &str, amount: f64) -> Commitment {
        Commitment {
            id,
            investor_id,
            asset_class: asset_class.to_string(),
            amount,
            currency: "GBP".to_string(),
        }
    }

    /// Two investors with commitments, one without any
    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        reset_schema(&conn).unwrap();

        insert_investor(&conn, &investor(1, "Cza Weasley fund")).unwrap();
        insert_investor(&conn, &investor(2, "Ibx Skywalker ltd")).unwrap();
        insert_investor(&conn, &investor(3, "Mjd Jedi fund")).unwrap();

        let rows = [
            commitment(1, 1, "Infrastructure", 100_000_000.0),
            commitment(2, 1, "Hedge Funds", 200_000_000.0),
            commitment(3, 1, "Hedge Funds", 100_000_000.0),
            commitment(4, 1, "Private Equity", 50_000_000.0),
            commitment(5, 2, "Infrastructure", 1_500_000_000.0),
            commitment(6, 2, "Natural Resources", 25_000_000.0),
        ];
        for row in &rows {
            insert_commitment(&conn, row).unwrap();
        }

        conn
    }

    #[test]
    fn test_investors_with_totals_excludes_investors_without_commitments() {
        let conn = seeded();
        let investors = list_investors_with_totals(&conn).unwrap();

        let names: Vec<&str> = investors.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Cza Weasley fund", "Ibx Skywalker ltd"]);
        assert_eq!(investors[0].total_commitment, 450_000_000.0);
        assert_eq!(investors[1].total_commitment, 1_525_000_000.0);

        let directory = list_investor_directory(&conn).unwrap();
        assert_eq!(directory.len(), 3);
        assert_eq!(directory[2].name, "Mjd Jedi fund");
    }

    #[test]
    fn test_list_commitments_with_and_without_filter() {
        let conn = seeded();

        let all = list_commitments(&conn, 1, None).unwrap();
        let ids: Vec<i64> = all.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let hedge = list_commitments(&conn, 1, Some("Hedge Funds")).unwrap();
        assert_eq!(hedge.len(), 2);
        assert!(hedge.iter().all(|c| c.asset_class == "Hedge Funds"));

        // Exact, case-sensitive match
        assert!(list_commitments(&conn, 1, Some("hedge funds")).unwrap().is_empty());

        // Empty filter behaves as no filter
        assert_eq!(list_commitments(&conn, 1, Some("")).unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_investor_is_not_found_everywhere() {
        let conn = seeded();

        assert!(matches!(
            list_commitments(&conn, 99, None),
            Err(QueryError::InvestorNotFound(99))
        ));
        assert!(matches!(
            summarize_investor(&conn, 99),
            Err(QueryError::InvestorNotFound(99))
        ));
        assert!(matches!(
            filter_commitments(&conn, 99, "Hedge Funds"),
            Err(QueryError::InvestorNotFound(99))
        ));
    }

    #[test]
    fn test_investor_without_commitments_yields_empty_results() {
        let conn = seeded();

        assert!(list_commitments(&conn, 3, None).unwrap().is_empty());
        assert!(summarize_investor(&conn, 3).unwrap().is_empty());
        assert!(filter_commitments(&conn, 3, "Hedge Funds").unwrap().is_empty());
    }

    #[test]
    fn test_asset_classes_sorted_and_distinct() {
        let conn = seeded();
        let classes = list_asset_classes(&conn).unwrap();

        assert_eq!(
            classes,
            vec!["Hedge Funds", "Infrastructure", "Natural Resources", "Private Equity"]
        );
    }

    #[test]
    fn test_summary_orders_by_total_descending() {
        let conn = seeded();
        let summary = summarize_investor(&conn, 1).unwrap();

        assert_eq!(
            summary,
            vec![
                AssetClassTotal {
                    asset_class: "Hedge Funds".to_string(),
                    total_commitment: 300_000_000.0,
                    commitment_count: 2,
                },
                AssetClassTotal {
                    asset_class: "Infrastructure".to_string(),
                    total_commitment: 100_000_000.0,
                    commitment_count: 1,
                },
                AssetClassTotal {
                    asset_class: "Private Equity".to_string(),
                    total_commitment: 50_000_000.0,
                    commitment_count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_summary_ties_break_on_asset_class() {
        let conn = seeded();
        insert_commitment(&conn, &commitment(7, 2, "Hedge Funds", 25_000_000.0)).unwrap();

        let summary = summarize_investor(&conn, 2).unwrap();
        let classes: Vec<&str> = summary.iter().map(|s| s.asset_class.as_str()).collect();
        assert_eq!(classes, vec!["Infrastructure", "Hedge Funds", "Natural Resources"]);
    }

    #[test]
    fn test_filter_commitments_orders_by_amount_descending() {
        let conn = seeded();
        let hedge = filter_commitments(&conn, 1, "Hedge Funds").unwrap();

        let amounts: Vec<f64> = hedge.iter().map(|c| c.amount).collect();
        assert_eq!(amounts, vec![200_000_000.0, 100_000_000.0]);

        assert!(filter_commitments(&conn, 1, "Real Estate").unwrap().is_empty());
    }
}
