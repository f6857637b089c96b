//! Load limit hierarchies from JSON documents

use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::LimitLevel;
use crate::error::Result;

/// Default path to the sample limit hierarchy
pub const DEFAULT_LIMITS_PATH: &str = "data/limits.json";

/// Load a JSON array of levels from a file
pub fn load_levels<P: AsRef<Path>>(path: P) -> Result<Vec<LimitLevel>> {
    let path = path.as_ref();
    let levels = load_levels_from_reader(BufReader::new(File::open(path)?))?;
    debug!("loaded {} limit levels from {}", levels.len(), path.display());
    Ok(levels)
}

/// Load levels from any reader (e.g., string buffer, request body)
pub fn load_levels_from_reader<R: Read>(reader: R) -> Result<Vec<LimitLevel>> {
    Ok(serde_json::from_reader(reader)?)
}
