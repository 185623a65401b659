//! Roster snapshots: whole-roster JSON save/load.
//!
//! The only file I/O in the crate, and it never runs inside an action path.
//! The bot calls this from its own maintenance jobs; the engine itself is
//! storage-agnostic behind [`CharacterRepository`](crate::service::CharacterRepository).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::service::{CharacterRepository, CharacterService};
use crate::world::Character;

/// Snapshot format version, bumped on incompatible layout changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
struct RosterSnapshot {
    version: u32,
    characters: Vec<Character>,
}

/// Writes every character in the service to a JSON snapshot file.
pub fn save_roster(service: &CharacterService, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let snapshot = RosterSnapshot {
        version: SNAPSHOT_VERSION,
        characters: service.all(),
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path.as_ref(), json)?;
    info!(
        count = snapshot.characters.len(),
        path = %path.as_ref().display(),
        "saved roster snapshot"
    );
    Ok(())
}

/// Loads a snapshot file and upserts every character into the service.
/// Returns the number of characters loaded.
pub fn load_roster(
    service: &CharacterService,
    path: impl AsRef<Path>,
) -> Result<usize, SnapshotError> {
    let json = fs::read_to_string(path.as_ref())?;
    let snapshot: RosterSnapshot = serde_json::from_str(&json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::Version {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let count = snapshot.characters.len();
    for character in snapshot.characters {
        service.save(character);
    }
    info!(count, path = %path.as_ref().display(), "loaded roster snapshot");
    Ok(count)
}
