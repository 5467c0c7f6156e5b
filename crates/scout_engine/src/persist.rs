use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("config directory missing or not writable: {0}")]
    ConfigDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode {file}: {message}")]
    Encode { file: String, message: String },
}

/// Ensure the config directory exists; create it if missing.
pub fn ensure_config_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::ConfigDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::ConfigDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::ConfigDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_config_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Rename over the old file; readers see either version, never a mix.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }

    /// Serialize `value` as pretty RON and write it atomically.
    pub fn write_ron<T: serde::Serialize>(
        &self,
        filename: &str,
        value: &T,
    ) -> Result<PathBuf, PersistError> {
        let content = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::new()).map_err(
            |err| PersistError::Encode {
                file: filename.to_string(),
                message: err.to_string(),
            },
        )?;
        self.write(filename, &content)
    }
}
