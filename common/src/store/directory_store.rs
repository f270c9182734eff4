use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;

use super::{SharedStore, StoreError};

const VALUE_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Session store shared by separate processes: one file per key inside the
/// session directory. Values are written to a temp file and renamed into
/// place, so a reader sees either the old or the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

impl SharedStore for DirectoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.value_path(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        let suffix: u32 = rand::rng().random();
        let temp_path = self
            .root
            .join(format!(".{}.{:08x}.{}", key, suffix, TEMP_EXTENSION));
        let written = std::fs::write(&temp_path, value)
            .and_then(|()| std::fs::rename(&temp_path, &path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.value_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let ours = path
                .extension()
                .is_some_and(|ext| ext == VALUE_EXTENSION || ext == TEMP_EXTENSION);
            if ours {
                match std::fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }
}
