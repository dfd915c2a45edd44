//! Item name to gallery version index

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::icons::error::IndexError;
use crate::icons::gallery::VersionChanges;
use crate::icons::versions::TrackedVersions;

/// Normalize a namespaced item identifier ("minecraft:Iron_Helmet" -> "iron_helmet")
pub fn normalize_item_id(item_id: &str) -> String {
    item_id
        .rsplit(':')
        .next()
        .unwrap_or(item_id)
        .to_lowercase()
}

/// Normalize a gallery icon file name ("Iron_Helmet.png" -> "iron_helmet")
pub fn normalize_icon_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower.strip_suffix(".png").unwrap_or(&lower).to_string()
}

/// Mapping from normalized item name to the gallery version holding its icon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIndex {
    entries: IndexMap<String, String>,
}

impl VersionIndex {
    /// Derive the index from the gallery manifest and per-version changelogs.
    ///
    /// Changelogs are folded oldest to newest so each item ends up on the most
    /// recent version that added or modified it. Items never mentioned by a
    /// changelog fall back to the newest tracked version. The result depends
    /// only on the inputs, not on the order the changelogs were fetched in.
    pub fn build(
        manifest: &[String],
        changes: &HashMap<String, VersionChanges>,
        tracked: &TrackedVersions,
    ) -> Self {
        let mut candidates: IndexMap<String, Vec<&str>> = IndexMap::new();

        for name in manifest {
            candidates.entry(normalize_icon_name(name)).or_default();
        }

        for version in tracked.oldest_first() {
            let Some(version_changes) = changes.get(version) else {
                continue;
            };
            for name in version_changes.touched() {
                // Newest version at the front
                candidates
                    .entry(normalize_icon_name(name))
                    .or_default()
                    .insert(0, version);
            }
        }

        let entries = candidates
            .into_iter()
            .filter_map(|(name, versions)| {
                let version = versions.first().copied().or_else(|| tracked.newest())?;
                Some((name, version.to_string()))
            })
            .collect();

        Self { entries }
    }

    /// Find the version holding the icon of `item_id`
    pub fn lookup(&self, item_id: &str) -> Option<&str> {
        self.entries
            .get(&normalize_item_id(item_id))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VersionIndex {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Persisted form of the index together with the release stamp it was built for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub index: VersionIndex,
}

impl IndexRecord {
    /// Load a record from disk, returning `None` when no record exists yet
    pub fn load(path: &Path) -> Result<Option<Self>, IndexError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&content)?;
        debug!("Loaded index record from {:?}", path);
        Ok(Some(record))
    }

    /// Write the record, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec(self)?)?;
        std::fs::rename(&tmp_path, path)?;

        debug!("Saved index record with {} items to {:?}", self.index.len(), path);
        Ok(())
    }
}
