pub mod csv_backend;

use std::{
    collections::hash_map::DefaultHasher,
    fs::{self, File},
    hash::{Hash, Hasher},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::core::utils::ensure_dir;

const TMP_SUFFIX: &str = "tmp";

/// Fingerprint of a durable file as last observed. `Missing` when the file did not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    Missing,
    Content { len: u64, digest: u64 },
}

impl Revision {
    pub fn of(bytes: Option<&[u8]>) -> Self {
        match bytes {
            None => Revision::Missing,
            Some(bytes) => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Revision::Content {
                    len: bytes.len() as u64,
                    digest: hasher.finish(),
                }
            }
        }
    }

    /// Reads the current revision of `path` from disk.
    pub fn current(path: &Path) -> io::Result<Self> {
        let bytes = read_if_exists(path)?;
        Ok(Self::of(bytes.as_deref()))
    }
}

/// Returns the file contents, or `None` if the file does not exist.
pub fn read_if_exists(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Sibling path used to stage a write, e.g. `ledger.csv` -> `ledger.csv.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Replaces `path` with `data` so readers see either the old or the new file, never a
/// truncated one.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)
}
