//! Load allocation groups from CSV
//!
//! Expected columns: `Group,Id,AllocationPercent`. Rows for one group need not
//! be contiguous; groups are returned in order of first appearance.

use csv::Reader;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::AllocationEntry;
use crate::error::Result;

/// Default path to the sample allocation file
pub const DEFAULT_ALLOCATIONS_PATH: &str = "data/allocations.csv";

/// Raw CSV row
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AllocationPercent")]
    allocation_percent: f64,
}

/// All entries that must total 100 together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationGroup {
    pub name: String,
    pub entries: Vec<AllocationEntry>,
}

fn collect_groups<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<AllocationGroup>> {
    let mut groups: Vec<AllocationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let entry = AllocationEntry::new(row.id.trim(), row.allocation_percent);

        match index.get(&row.group) {
            Some(&i) => groups[i].entries.push(entry),
            None => {
                index.insert(row.group.clone(), groups.len());
                groups.push(AllocationGroup {
                    name: row.group,
                    entries: vec![entry],
                });
            }
        }
    }

    Ok(groups)
}

/// Load all allocation groups from a CSV file
pub fn load_groups<P: AsRef<Path>>(path: P) -> Result<Vec<AllocationGroup>> {
    let path = path.as_ref();
    let groups = collect_groups(Reader::from_path(path)?)?;
    debug!("loaded {} allocation groups from {}", groups.len(), path.display());
    Ok(groups)
}

/// Load allocation groups from any reader (e.g., string buffer, upload body)
pub fn load_groups_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<AllocationGroup>> {
    collect_groups(Reader::from_reader(reader))
}
