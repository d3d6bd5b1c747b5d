//! Reading the list of metabolite families that never get a coupling transporter
use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use thiserror::Error;

/// Parse an exclusion list, one family token per line
///
/// Surrounding whitespace and double quotes are removed, blank lines are ignored.
///
/// # Examples
/// ```rust
/// use dualcell_core::io::exclusion::parse_exclusion_list;
/// let families = parse_exclusion_list("\"CO2\"\nPROTON\n\n  WATER \n");
/// assert_eq!(families.len(), 3);
/// assert!(families.contains("CO2"));
/// ```
pub fn parse_exclusion_list(text: &str) -> IndexSet<String> {
    text.lines()
        .map(|line| line.trim().replace('"', ""))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Read an exclusion list from a file, see [`parse_exclusion_list`]
pub fn read_exclusion_list<P: AsRef<Path>>(path: P) -> Result<IndexSet<String>, ExclusionError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ExclusionError::UnableToRead {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_exclusion_list(&text))
}

#[derive(Debug, Error)]
pub enum ExclusionError {
    #[error("Unable to read exclusion list {path}: {source}")]
    UnableToRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
