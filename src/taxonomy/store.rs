use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::taxonomy::TaxonomyError;

/// A JSON document on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, TaxonomyError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TaxonomyError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| TaxonomyError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save<T: Serialize>(&self, value: &T) -> Result<(), TaxonomyError> {
        let write_error = |path: &Path, source: std::io::Error| TaxonomyError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| write_error(parent, source))?;
        }

        let tmp_path = self.tmp_path();
        let file = fs::File::create(&tmp_path).map_err(|source| write_error(&tmp_path, source))?;
        {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
                TaxonomyError::Serialize {
                    path: tmp_path.clone(),
                    source,
                }
            })?;
            writer
                .write_all(b"\n")
                .map_err(|source| write_error(&tmp_path, source))?;
            writer
                .flush()
                .map_err(|source| write_error(&tmp_path, source))?;
        }

        let tmp_file = fs::OpenOptions::new()
            .read(true)
            .open(&tmp_path)
            .map_err(|source| write_error(&tmp_path, source))?;
        tmp_file
            .sync_all()
            .map_err(|source| write_error(&tmp_path, source))?;

        fs::rename(&tmp_path, &self.path).map_err(|source| write_error(&self.path, source))?;

        if let Some(parent) = self.path.parent()
            && let Ok(parent_file) = fs::File::open(parent)
        {
            let _ = parent_file.sync_all();
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
