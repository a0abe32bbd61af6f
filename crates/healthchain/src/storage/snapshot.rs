//! Snapshot persistence: store and retrieve a whole contract state.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "state": { ... Healthchain ... }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contract::Healthchain;
use crate::error::{RegistryError, Result};
use crate::value::Accounts;

// ── File format constants ─────────────────────────────────────────────────────

pub const SNAPSHOT_VERSION: u32 = 1;

// ── On-disk structure ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    version: u32,
    state: &'a Healthchain<Accounts>,
}

#[derive(Deserialize)]
struct SnapshotFile {
    state: Healthchain<Accounts>,
}

/// Peek at the version before parsing the state.
#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

// ── Save / load ───────────────────────────────────────────────────────────────

/// Persist `chain` to `path`.
///
/// The snapshot is written to a sibling temp file and renamed into place, so
/// an interrupted save leaves the previous snapshot intact. Missing parent
/// directories are created.
pub fn save_snapshot(chain: &Healthchain<Accounts>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = SnapshotFileRef {
        version: SNAPSHOT_VERSION,
        state: chain,
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| RegistryError::SerializationError(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())?;
    std::fs::rename(&tmp, path)?;

    log::debug!("saved snapshot to {}", path.display());
    Ok(())
}

/// Load a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Healthchain<Accounts>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RegistryError::NotFound(format!(
            "snapshot not found: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)?;
    let header: SnapshotHeader = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!(
            "failed to parse snapshot {}: {e}",
            path.display()
        ))
    })?;
    if header.version != SNAPSHOT_VERSION {
        return Err(RegistryError::InvalidFileFormat(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
            header.version
        )));
    }

    let file: SnapshotFile = serde_json::from_slice(&bytes).map_err(|e| {
        RegistryError::InvalidFileFormat(format!(
            "failed to parse snapshot {}: {e}",
            path.display()
        ))
    })?;

    log::debug!("loaded snapshot from {}", path.display());
    Ok(file.state)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
