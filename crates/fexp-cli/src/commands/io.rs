use std::error::Error;
use std::fs;
use std::path::Path;

use fexp_core::{UnitId, UnitRecord, UnitTable};
use fexp_infer::to_canonical_json_bytes;
use serde::{Deserialize, Serialize};

/// One CSV row: `unit,treated,outcome[,probability]`.
#[derive(Debug, Deserialize)]
struct DataRow {
    unit: u64,
    treated: u8,
    outcome: f64,
    #[serde(default)]
    probability: Option<f64>,
}

pub fn load_table(path: &Path) -> Result<UnitTable, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: DataRow = row?;
        let treated = match row.treated {
            0 => false,
            1 => true,
            other => {
                return Err(format!("unit {}: treated must be 0 or 1, got {other}", row.unit).into())
            }
        };
        records.push(UnitRecord {
            unit: UnitId::from_raw(row.unit),
            treated,
            outcome: row.outcome,
            probability: row.probability,
        });
    }
    Ok(UnitTable::from_records(records)?)
}

/// Writes canonical JSON to `out`, or prints it when no path is given.
pub fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let json = String::from_utf8(to_canonical_json_bytes(value)?)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
        }
        None => println!("{json}"),
    }
    Ok(())
}
