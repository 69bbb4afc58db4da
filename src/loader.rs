// CSV Loader - destructive full refresh of investors/commitments
//
// Each run drops and recreates both tables, assigns investor ids 1..N in
// ascending name order and commitment ids 1..M in row order, all inside one
// transaction.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::db::{self, Commitment, Database, Investor};
use crate::error::LoadError;

/// One row of the source file. Each row is one commitment and repeats the
/// investor's attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitmentRecord {
    #[serde(rename = "Investor Name")]
    pub investor_name: String,

    // Header is misspelled in the source data
    #[serde(rename = "Investory Type")]
    pub investor_type: String,

    #[serde(rename = "Investor Country")]
    pub investor_country: String,

    #[serde(rename = "Investor Date Added")]
    pub investor_date_added: String,

    #[serde(rename = "Commitment Asset Class")]
    pub asset_class: String,

    #[serde(rename = "Commitment Amount")]
    pub amount: f64,

    #[serde(rename = "Commitment Currency")]
    pub currency: String,
}

/// Rows ready to insert, with ids already assigned
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    pub investors: Vec<Investor>,
    pub commitments: Vec<Commitment>,
}

/// Row counts written by a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub investors: usize,
    pub commitments: usize,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loaded {} investors and {} commitments",
            self.investors, self.commitments
        )
    }
}

pub fn read_records(csv_path: &Path) -> Result<Vec<CommitmentRecord>, LoadError> {
    let file = std::fs::File::open(csv_path)?;
    read_records_from(file)
}

pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<CommitmentRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: CommitmentRecord = result?;
        records.push(record);
    }

    Ok(records)
}

/// Line number of the nth data row, counting the header as line 1
fn line_of(index: usize) -> u64 {
    index as u64 + 2
}

/// Deduplicate investors by name, assign ids alphabetically and resolve
/// every commitment to its investor id. When a name repeats with different
/// attributes, the first row's attributes are kept.
pub fn plan_load(records: &[CommitmentRecord]) -> Result<LoadPlan, LoadError> {
    // (type, country, date_added) per investor name; BTreeMap keeps names sorted
    let mut investors: BTreeMap<&str, (&str, &str, NaiveDate)> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let date_added = NaiveDate::parse_from_str(&record.investor_date_added, "%Y-%m-%d")
            .map_err(|source| LoadError::InvalidDate {
                line: line_of(index),
                value: record.investor_date_added.clone(),
                source,
            })?;

        let attributes = (
            record.investor_type.as_str(),
            record.investor_country.as_str(),
            date_added,
        );

        match investors.get(record.investor_name.as_str()) {
            Some(existing) if *existing != attributes => {
                warn!(
                    line = line_of(index),
                    investor = %record.investor_name,
                    "conflicting type, country or date added; keeping the first row's values"
                );
            }
            Some(_) => {}
            None => {
                investors.insert(record.investor_name.as_str(), attributes);
            }
        }
    }

    let investors: Vec<Investor> = investors
        .into_iter()
        .zip(1..)
        .map(|((name, (investor_type, country, date_added)), id)| Investor {
            id,
            name: name.to_string(),
            investor_type: investor_type.to_string(),
            country: country.to_string(),
            date_added,
        })
        .collect();

    let ids: HashMap<&str, i64> = investors
        .iter()
        .map(|investor| (investor.name.as_str(), investor.id))
        .collect();

    let commitments = records
        .iter()
        .zip(1..)
        .map(|(record, id)| {
            let investor_id = *ids
                .get(record.investor_name.as_str())
                .ok_or_else(|| LoadError::UnknownInvestor(record.investor_name.clone()))?;

            Ok(Commitment {
                id,
                investor_id,
                asset_class: record.asset_class.clone(),
                amount: record.amount,
                currency: record.currency.clone(),
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    Ok(LoadPlan {
        investors,
        commitments,
    })
}

/// Replace all stored data with the plan's rows in a single transaction
pub fn apply_plan(conn: &mut Connection, plan: &LoadPlan) -> Result<LoadReport, LoadError> {
    conn.pragma_update(None, "foreign_keys", true)?;

    let tx = conn.transaction()?;
    db::reset_schema(&tx)?;

    for investor in &plan.investors {
        db::insert_investor(&tx, investor)?;
    }
    debug!(count = plan.investors.len(), "inserted investors");

    for commitment in &plan.commitments {
        db::insert_commitment(&tx, commitment)?;
    }
    debug!(count = plan.commitments.len(), "inserted commitments");

    tx.commit()?;

    Ok(LoadReport {
        investors: plan.investors.len(),
        commitments: plan.commitments.len(),
    })
}

/// Read the CSV at `csv_path` and fully refresh the database with it
pub fn run_load(csv_path: &Path, database: &Database) -> Result<LoadReport, LoadError> {
    info!("Reading {}", csv_path.display());
    let records = read_records(csv_path)?;
    let plan = plan_load(&records)?;

    info!("Refreshing {}", database.path().display());
    let mut conn = database.open_writer()?;
    let report = apply_plan(&mut conn, &plan)?;

    info!(
        investors = report.investors,
        commitments = report.commitments,
        "Load complete"
    );
    Ok(report)
}
