use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::RowfileError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_directory")]
    pub directory: PathBuf,
}

impl StorageConfig {
    fn default_directory() -> PathBuf {
        resolve_directory()
            .expect("failed to resolve store dir — set storage.directory or ROWFILE_STORAGE_DIRECTORY")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
        }
    }
}

fn is_dir_writable(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let probe = path.join(".rowfile_write_probe");
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

fn resolve_directory() -> Result<PathBuf, RowfileError> {
    let candidates: Vec<PathBuf> = vec![
        std::env::current_dir().unwrap_or_default(),
        PathBuf::from("/var/lib/rowfile"),
        std::env::temp_dir(),
    ];

    let mut errors: Vec<String> = Vec::new();

    for parent in &candidates {
        if parent.as_os_str().is_empty() {
            continue;
        }
        if !is_dir_writable(parent) {
            errors.push(format!("{}: not writable", parent.display()));
            continue;
        }
        let store_dir = parent.join("rowfile");
        if store_dir.is_dir() {
            if is_dir_writable(&store_dir) {
                info!("Using store dir: {}", store_dir.display());
                return Ok(store_dir);
            }
            errors.push(format!("{}: exists but not writable", store_dir.display()));
            continue;
        }
        match std::fs::create_dir_all(&store_dir) {
            Ok(_) => {
                info!("Using store dir: {}", store_dir.display());
                return Ok(store_dir);
            }
            Err(e) => {
                errors.push(format!("{}: failed to create: {e}", store_dir.display()));
            }
        }
    }

    Err(RowfileError::ConfigParsingError(format!(
        "no writable store directory found. Tried: {}",
        errors.join("; ")
    )))
}
