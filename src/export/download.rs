// SPDX-License-Identifier: GPL-3.0-only

//! Download delivery of exported composites

use crate::constants::{EXPORT_FILE_EXTENSION, EXPORT_FILE_PREFIX};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of an export made at `file_token` (`YYYYMMDD_HHMMSS`)
pub fn export_filename(file_token: &str) -> String {
    format!(
        "{}_{}.{}",
        EXPORT_FILE_PREFIX, file_token, EXPORT_FILE_EXTENSION
    )
}

/// Platform download mechanism
#[allow(async_fn_in_trait)]
pub trait DownloadSink {
    /// Hand `data` to the user under `filename`; returns where it went
    ///
    /// An existing file of the same name is never replaced.
    async fn deliver(&self, filename: &str, data: Vec<u8>) -> std::io::Result<PathBuf>;
}

/// `name_<n>.ext` for the `n`th collision of `filename`
fn numbered_filename(filename: &str, n: u32) -> String {
    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    match name.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    }
}

/// Write `data` into `dir` under `filename`, numbering the name on collision
fn write_new_file(dir: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let mut n = 0;
    loop {
        let candidate = if n == 0 {
            dir.join(filename)
        } else {
            dir.join(numbered_filename(filename, n))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(data)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %candidate.display(), "Export name taken");
                n += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Download sink that writes into a directory
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl DownloadSink for DirectoryDownloads {
    async fn deliver(&self, filename: &str, data: Vec<u8>) -> std::io::Result<PathBuf> {
        info!(dir = %self.dir.display(), filename, size = data.len(), "Saving export");

        let dir = self.dir.clone();
        let filename = filename.to_string();
        let filepath = tokio::task::spawn_blocking(move || write_new_file(&dir, &filename, &data))
            .await
            .map_err(io::Error::other)??;

        info!(path = %filepath.display(), "Export saved successfully");
        Ok(filepath)
    }
}
