use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::GenericError;

// Roughly six months of bi-weekly runs before the oldest entries roll off.
const MAX_MEMORY_ENTRIES: usize = 500;
const MAX_ARCHIVE_ENTRIES: usize = 52;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct MemoryRecord {
    #[serde(default)]
    pub reviewed_titles: Vec<String>,
    #[serde(default)]
    pub reviewed_dois: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,
}

impl MemoryRecord {
    pub fn load(path: &Path) -> Result<Self, GenericError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let record = serde_json::from_str(&raw)
            .map_err(|e| format!("corrupt memory file {}: {}", path.display(), e))?;
        Ok(record)
    }

    pub fn save(&mut self, path: &Path) -> Result<(), GenericError> {
        keep_last(&mut self.reviewed_titles, MAX_MEMORY_ENTRIES);
        keep_last(&mut self.reviewed_dois, MAX_MEMORY_ENTRIES);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

fn keep_last(entries: &mut Vec<String>, max: usize) {
    if entries.len() > max {
        entries.drain(..entries.len() - max);
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ArchiveManifest {
    #[serde(default)]
    pub digests: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ManifestEntry {
    pub date: String,
    pub date_range: String,
    pub generated: String,
}

pub fn append_manifest(path: &Path, entry: ManifestEntry) -> Result<ArchiveManifest, GenericError> {
    let mut manifest = if path.exists() {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("corrupt archive manifest {}: {}", path.display(), e))?
    } else {
        ArchiveManifest::default()
    };

    manifest.digests.insert(0, entry);
    manifest.digests.truncate(MAX_ARCHIVE_ENTRIES);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&manifest)?)?;
    Ok(manifest)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DigestRecord {
    pub date: String,
    pub date_range: String,
    pub generated_at: String,
    pub content: String,
}

pub fn save_digest(dir: &Path, record: &DigestRecord) -> Result<(), GenericError> {
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(record)?;
    let dated_path = dir.join(format!("{}.json", record.date));
    fs::write(&dated_path, &json)?;
    println!("Saved JSON digest to {}", dated_path.display());

    fs::write(dir.join("latest.json"), &json)?;
    println!("Updated latest.json");
    Ok(())
}
