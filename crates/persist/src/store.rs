//! File-backed world saves.
//!
//! Layout inside the save root:
//! ```text
//! <world_name>/
//!   save.cbor.zst   - zstd( CBOR( SaveEnvelope { schema_version, sha256, payload } ) )
//! ```
//! `payload` is the CBOR-encoded [`WorldRecord`]; `sha256` is its hex digest.
//!
//! Writes overwrite in place. There is no locking: concurrent writers to
//! one slot race and the last one wins, and loading during a write may
//! fail or read a torn file.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tileworld_common::{ValidationError, WorldName};
use tileworld_kernel::{World, WorldSource};

use crate::record::WorldRecord;

/// Current save format version.
pub const SAVE_SCHEMA_VERSION: u32 = 1;

/// File name of the save inside each world directory.
pub const SAVE_FILE_NAME: &str = "save.cbor.zst";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("save file is not valid zstd data: {0}")]
    Decompress(String),
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("no save found for world {0}")]
    NotFound(WorldName),
    #[error("save holds an invalid world: {0}")]
    Corrupt(#[from] ValidationError),
    #[error("save belongs to world {found}, expected {expected}")]
    NameMismatch { expected: WorldName, found: String },
}

impl StoreError {
    /// Missing saves are expected on first run; callers usually generate instead.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Outer container of a save file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveEnvelope {
    schema_version: u32,
    sha256: String,
    payload: Vec<u8>,
}

/// Save slots keyed by world name under one root directory.
#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
}

impl SaveStore {
    /// Use `root` as the save root. Nothing is created until the first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the save of `name`.
    pub fn world_dir(&self, name: &WorldName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub fn save_path(&self, name: &WorldName) -> PathBuf {
        self.world_dir(name).join(SAVE_FILE_NAME)
    }

    pub fn exists(&self, name: &WorldName) -> bool {
        self.save_path(name).is_file()
    }

    /// Write `world` to its slot, creating the directory if needed.
    pub fn save(&self, world: &World) -> Result<PathBuf, StoreError> {
        let _span = tracing::info_span!("save_world", name = %world.name()).entered();
        let bytes = encode(&WorldRecord::capture(world))?;

        let dir = self.world_dir(world.name());
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(SAVE_FILE_NAME);
        std::fs::write(&path, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "world saved");
        Ok(path)
    }

    /// Read and fully validate the save of `name`.
    pub fn load(&self, name: &WorldName) -> Result<World, StoreError> {
        let _span = tracing::info_span!("load_world", %name).entered();
        let path = self.save_path(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no save file");
                return Err(StoreError::NotFound(name.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let record = decode(&bytes)?;
        if record.name != name.as_str() {
            return Err(StoreError::NameMismatch {
                expected: name.clone(),
                found: record.name,
            });
        }
        let world = record.restore()?;
        tracing::info!(
            path = %path.display(),
            map_size = world.map_size(),
            entities = world.loaded_entities(),
            "world loaded"
        );
        Ok(world)
    }

    /// Names of every world with a save file under the root, sorted.
    pub fn list(&self) -> Result<Vec<WorldName>, StoreError> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().and_then(|n| WorldName::parse(n).ok())
            else {
                continue;
            };
            if self.exists(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

impl WorldSource for SaveStore {
    fn load_world(
        &self,
        name: &WorldName,
    ) -> Result<World, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.load(name)?)
    }
}

fn encode(record: &WorldRecord) -> Result<Vec<u8>, StoreError> {
    let payload = cbor_serialize(record)?;
    let envelope = SaveEnvelope {
        schema_version: SAVE_SCHEMA_VERSION,
        sha256: sha256_hex(&payload),
        payload,
    };
    zstd_compress(&cbor_serialize(&envelope)?)
}

fn decode(bytes: &[u8]) -> Result<WorldRecord, StoreError> {
    let envelope: SaveEnvelope = cbor_deserialize(&zstd_decompress(bytes)?)?;
    if envelope.schema_version != SAVE_SCHEMA_VERSION {
        return Err(StoreError::SchemaMismatch {
            file_version: envelope.schema_version,
            expected_version: SAVE_SCHEMA_VERSION,
        });
    }
    let actual = sha256_hex(&envelope.payload);
    if actual != envelope.sha256 {
        return Err(StoreError::ChecksumMismatch {
            expected: envelope.sha256,
            actual,
        });
    }
    cbor_deserialize(&envelope.payload)
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, StoreError> {
    ciborium::from_reader(data).map_err(|e| StoreError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    zstd::Decoder::new(data)
        .and_then(|mut decoder| decoder.read_to_end(&mut buf))
        .map_err(|e| StoreError::Decompress(e.to_string()))?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
