use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::predict::{ObjectKind, OrbitalElementSet};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog path not found: {0}")]
    NotFound(String),
    #[error("catalog read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog file {file}: {message}")]
    Invalid { file: String, message: String },
    #[error("no catalog group could be loaded")]
    NothingLoaded,
}

/// Supplier of the element sets to propagate. Ingestion lives elsewhere; this
/// only hands over what it already fetched.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Vec<OrbitalElementSet>, CatalogError>;
}

/// A labelled feed group, e.g. "Debris (Cosmos 1408)".
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogGroup {
    pub label: String,
    /// An OMM JSON file, or a directory of them.
    pub path: PathBuf,
    /// Kind for records without an `OBJECT_TYPE`.
    #[serde(default)]
    pub kind: Option<ObjectKind>,
}

/// Reads OMM JSON files exported by the ingestion job.
pub struct FileCatalogSource {
    groups: Vec<CatalogGroup>,
}

impl FileCatalogSource {
    pub fn new(groups: Vec<CatalogGroup>) -> Self {
        Self { groups }
    }

    fn load_group(&self, group: &CatalogGroup) -> Result<Vec<OrbitalElementSet>, CatalogError> {
        if !group.path.exists() {
            return Err(CatalogError::NotFound(group.path.display().to_string()));
        }

        let files = if group.path.is_dir() {
            let mut files = Vec::new();
            for entry in fs::read_dir(&group.path)? {
                let path = entry?.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                    files.push(path);
                }
            }
            files.sort();
            files
        } else {
            vec![group.path.clone()]
        };

        let mut sets = Vec::new();
        for path in files {
            match parse_file(&path) {
                Ok(parsed) => sets.extend(parsed),
                Err(e) => {
                    log::warn!("Failed to parse catalog file {}: {}", path.display(), e);
                    // Continue with other files
                }
            }
        }

        for set in &mut sets {
            set.group = Some(group.label.clone());
            if set.kind.is_none() {
                set.kind = group.kind;
            }
        }
        Ok(sets)
    }
}

impl CatalogSource for FileCatalogSource {
    fn load(&self) -> Result<Vec<OrbitalElementSet>, CatalogError> {
        let mut by_id: HashMap<u64, usize> = HashMap::new();
        let mut sets: Vec<OrbitalElementSet> = Vec::new();
        let mut loaded_groups = 0;

        for group in &self.groups {
            let group_sets = match self.load_group(group) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("Failed to load catalog group {}: {}", group.label, e);
                    continue;
                }
            };
            loaded_groups += 1;
            log::info!(
                "Loaded {} element sets from group {}",
                group_sets.len(),
                group.label
            );

            for set in group_sets {
                match by_id.get(&set.catalog_id()) {
                    Some(&index) => sets[index] = set,
                    None => {
                        by_id.insert(set.catalog_id(), sets.len());
                        sets.push(set);
                    }
                }
            }
        }

        if loaded_groups == 0 && !self.groups.is_empty() {
            return Err(CatalogError::NothingLoaded);
        }
        Ok(sets)
    }
}

/// Accepts either a JSON array of records or a single record. Records that do
/// not decode are skipped.
fn parse_file(path: &Path) -> Result<Vec<OrbitalElementSet>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| CatalogError::Invalid {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

    let records = match value {
        serde_json::Value::Array(records) => records,
        record => vec![record],
    };

    let mut sets = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<OrbitalElementSet>(record) {
            Ok(set) => sets.push(set),
            Err(e) => log::warn!(
                "Skipping record {} of {}: {}",
                index,
                path.display(),
                e
            ),
        }
    }
    Ok(sets)
}
