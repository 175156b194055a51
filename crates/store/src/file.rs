use crate::KeyValueStore;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use winavg_core::{AvgError, Result};

/// Directory-backed store: one `<key>.json` file per key.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so readers never see a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            AvgError::Store(format!("cannot create '{}': {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.path_for(key);
        replace_atomically(&target, |file| file.write_all(value.as_bytes()))?;
        tracing::debug!("stored '{key}' at {}", target.display());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Fill a sibling temp file with `fill`, fsync it and rename it over
/// `target`. The temp file is removed on every failure path.
fn replace_atomically<F>(target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let tmp = target.with_extension("json.tmp");

    let written = fs::File::create(&tmp).and_then(|mut file| {
        fill(&mut file)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(AvgError::Store(format!("cannot write '{}': {e}", tmp.display())));
    }

    fs::rename(&tmp, target).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AvgError::Store(format!("cannot replace '{}': {e}", target.display()))
    })
}

/// Map a key onto a safe file stem: `[A-Za-z0-9_-]` pass through, anything
/// else becomes `_`.
fn sanitize(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "_".to_string() } else { stem }
}
