use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const SUBTITLE_EXTENSION: &str = "srt";

/// A subtitle file the user has picked for translation. Construction goes
/// through [`select_file`] so a `SelectedFile` always carries a plausible
/// `.srt` path and its display filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub filename: String,
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("only .{SUBTITLE_EXTENSION} subtitle files are supported (got '{filename}')")]
    NotSubtitle { filename: String },
    #[error("no file found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

pub fn has_subtitle_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(SUBTITLE_EXTENSION))
}

/// Validates a path the user typed or dropped. The extension is checked
/// before touching the filesystem so the error matches what the gate would
/// reject anyway.
pub fn select_file(path: &Path) -> Result<SelectedFile, FileError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    if !has_subtitle_extension(&filename) {
        return Err(FileError::NotSubtitle { filename });
    }

    let metadata = fs::metadata(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            FileError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            FileError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.len() == 0 {
        return Err(FileError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(SelectedFile {
        path: path.to_path_buf(),
        filename,
    })
}

/// Name for the translated download, matching the server's own naming:
/// `movie.srt` translated to `fr` becomes `movie_fr.srt`.
pub fn translated_filename(original: &str, target_lang: &str) -> String {
    let stem = original
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(original);
    format!("{stem}_{target_lang}.{SUBTITLE_EXTENSION}")
}
