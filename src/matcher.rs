use std::collections::HashMap;
use log::debug;

use crate::geometry::GeoRecord;

/// Name -> record lookup, built fresh for every interaction.
///
/// Keys are the path-stripped record names. Records without a name are left
/// out, and a later record silently replaces an earlier one with the same key.
#[derive(Debug, Default)]
pub struct GeoLookup<'a> {
    entries: HashMap<&'a str, &'a GeoRecord>,
}

impl<'a> GeoLookup<'a> {
    pub fn build(records: &'a [GeoRecord]) -> Self {
        let mut entries = HashMap::new();
        for record in records.iter().filter(|r| !r.name().is_empty()) {
            let key = basename(record.name());
            if entries.insert(key, record).is_some() {
                debug!("Duplicate geo name {:?}, keeping the later record", key);
            }
        }
        GeoLookup { entries }
    }

    pub fn get(&self, filename: &str) -> Option<&'a GeoRecord> {
        self.entries.get(filename).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of looking up one media filename.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'a> {
    Matched { filename: String, record: &'a GeoRecord },
    Unmatched { filename: String },
}

/// Function to join media filenames against the lookup by exact name.
pub fn match_media<'a, S: AsRef<str>>(lookup: &GeoLookup<'a>, filenames: &[S]) -> Vec<MatchOutcome<'a>> {
    filenames
        .iter()
        .map(|name| {
            let filename = name.as_ref().to_string();
            match lookup.get(&filename) {
                Some(record) => MatchOutcome::Matched { filename, record },
                None => MatchOutcome::Unmatched { filename },
            }
        })
        .collect()
}

/// Last `/` separated component of `name`.
pub fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
