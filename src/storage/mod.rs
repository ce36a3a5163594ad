//! Board files.
//!
//! A board is described as a single JSON document:
//!
//! ```json
//! {
//!   "minutes_per_point": 60,
//!   "groups": [
//!     { "title": "Backend", "children": [{ "kind": "story", "name": "API", "points": 3 }] }
//!   ]
//! }
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{Board, BoardError};
use crate::models::Group;

/// Errors that can occur while reading or writing board files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid board in {path}: {source}")]
    InvalidBoard { path: PathBuf, source: BoardError },
}

/// On-disk shape of a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_per_point: Option<u64>,

    #[serde(default)]
    pub groups: Vec<Group>,
}

impl From<&Board> for BoardFile {
    fn from(board: &Board) -> Self {
        Self {
            minutes_per_point: board.minutes_per_point(),
            groups: board.groups().cloned().collect(),
        }
    }
}

impl TryFrom<BoardFile> for Board {
    type Error = BoardError;

    fn try_from(file: BoardFile) -> Result<Self, Self::Error> {
        Board::from_groups(file.groups, file.minutes_per_point)
    }
}

/// Read a board from a JSON file.
pub fn read_board(path: &Path) -> Result<Board, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let file: BoardFile = serde_json::from_reader(reader)?;
    debug!("Read {} groups from {:?}", file.groups.len(), path);
    Board::try_from(file).map_err(|source| StorageError::InvalidBoard {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a board as pretty-printed JSON.
pub fn write_board_to<W: Write>(board: &Board, writer: W) -> Result<(), StorageError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &BoardFile::from(board))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a board to a JSON file, replacing it.
pub fn write_board(board: &Board, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    write_board_to(board, File::create(path)?)?;
    info!("Wrote {} groups to {:?}", board.len(), path);
    Ok(())
}
