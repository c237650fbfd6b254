//! Append-only per-chunk edit logs.
//!
//! Each chunk that has been edited owns one file holding a flat sequence of
//! 3-byte records: the little-endian packed local position (`y:8 x:4 z:4`)
//! followed by the block id. There is no header. Replaying the records in
//! order over freshly generated terrain reproduces the edited chunk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use blockworld_core::{BlockKind, ChunkPos, LocalPos};
use thiserror::Error;
use tracing::{debug, warn};

/// Size of one record on disk.
pub const EDIT_RECORD_LEN: usize = 3;

/// Errors raised while reading or appending edit logs.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The save directory could not be created.
    #[error("cannot create save directory {path}: {source}")]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// An edit file could not be opened, read or written.
    #[error("edit log {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

/// One persisted block write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    /// Position inside the chunk.
    pub local: LocalPos,
    /// Block written there.
    pub kind: BlockKind,
}

impl EditRecord {
    /// Encode into the on-disk layout.
    pub fn to_bytes(self) -> [u8; EDIT_RECORD_LEN] {
        let [lo, hi] = self.local.pack().to_le_bytes();
        [lo, hi, self.kind.as_u8()]
    }

    /// Decode one record. Fails only on an unknown block id.
    pub fn from_bytes(bytes: [u8; EDIT_RECORD_LEN]) -> Result<Self, u8> {
        let local = LocalPos::unpack(u16::from_le_bytes([bytes[0], bytes[1]]));
        let kind = BlockKind::from_u8(bytes[2]).ok_or(bytes[2])?;
        Ok(Self { local, kind })
    }
}

/// Edit logs for one world seed, rooted at `<save_dir>/<seed>/`.
#[derive(Debug)]
pub struct ChunkPersistence {
    root: PathBuf,
    open: Option<(ChunkPos, File)>,
}

impl ChunkPersistence {
    /// Logs for `seed` under `save_dir`. Nothing is touched on disk until
    /// the first append.
    pub fn new(save_dir: impl AsRef<Path>, seed: u64) -> Self {
        Self {
            root: save_dir.as_ref().join(seed.to_string()),
            open: None,
        }
    }

    /// Directory holding this seed's logs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `pos`.
    pub fn path_for(&self, pos: ChunkPos) -> PathBuf {
        let (x, z) = pos.origin();
        self.root.join(format!("c.{x}.{z}.edits"))
    }

    /// Read every record for `pos` in write order. A missing file is empty.
    ///
    /// Unknown block ids and a trailing partial record are skipped with a
    /// warning.
    pub fn load(&self, pos: ChunkPos) -> Result<Vec<EditRecord>, PersistError> {
        let path = self.path_for(pos);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(PersistError::Io { path, source }),
        };

        let records = bytes.chunks_exact(EDIT_RECORD_LEN);
        if !records.remainder().is_empty() {
            warn!(
                path = %path.display(),
                trailing = records.remainder().len(),
                "Ignoring partial edit record"
            );
        }

        let mut edits = Vec::with_capacity(bytes.len() / EDIT_RECORD_LEN);
        for record in records {
            match EditRecord::from_bytes([record[0], record[1], record[2]]) {
                Ok(edit) => edits.push(edit),
                Err(id) => warn!(path = %path.display(), id, "Skipping edit with unknown block id"),
            }
        }
        debug!(chunk = %pos, count = edits.len(), "Loaded chunk edits");
        Ok(edits)
    }

    /// Append one record for `pos`, keeping the handle open while
    /// consecutive edits target the same chunk.
    pub fn append(&mut self, pos: ChunkPos, edit: EditRecord) -> Result<(), PersistError> {
        if self.open_chunk() != Some(pos) {
            self.open = None;
            self.open = Some((pos, self.open_log(pos)?));
        }

        if let Some((_, file)) = self.open.as_mut() {
            if let Err(source) = file.write_all(&edit.to_bytes()) {
                self.open = None;
                return Err(PersistError::Io {
                    path: self.path_for(pos),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Chunk whose log is currently held open, if any.
    pub fn open_chunk(&self) -> Option<ChunkPos> {
        self.open.as_ref().map(|(pos, _)| *pos)
    }

    /// Close the held handle.
    pub fn close(&mut self) {
        self.open = None;
    }

    fn open_log(&self, pos: ChunkPos) -> Result<File, PersistError> {
        fs::create_dir_all(&self.root).map_err(|source| PersistError::CreateDir {
            path: self.root.clone(),
            source,
        })?;
        let path = self.path_for(pos);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| PersistError::Io { path, source })
    }
}
