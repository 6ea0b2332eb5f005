//! Raw file selections
//!
//! A selection is what the upload control hands over: a name, a declared media
//! type and a declared size per file, plus where to read the bytes from. The
//! declared type comes from the file extension.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Where a selected file's bytes live
#[derive(Debug, Clone)]
pub enum FileSource {
    /// On disk; read during decoding
    Path(PathBuf),
    /// Already in memory (drag and drop, clipboard, tests)
    Memory(Arc<[u8]>),
}

/// One entry of a raw file selection
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Display name (file name only)
    pub name: String,
    /// Declared media type, e.g. "image/jpeg"
    pub media_type: String,
    /// Declared size in bytes
    pub size: u64,
    pub source: FileSource,
}

impl SelectedFile {
    /// Describe a file on disk without reading it
    pub fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Not a file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self {
            name,
            media_type: media_type_for_path(&path).to_string(),
            size: metadata.len(),
            source: FileSource::Path(path),
        })
    }

    /// Wrap an in-memory payload; the declared size is the payload length
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Does the declared type say this is an image?
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Declared media type for a path, from its extension
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        "heic" | "heif" => "image/heic",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Build a selection from picked paths, in the order given
///
/// Paths that vanished or are not regular files are skipped with a warning.
pub fn selection_from_paths<I, P>(paths: I) -> Vec<SelectedFile>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    paths
        .into_iter()
        .filter_map(|path| {
            let path = path.into();
            match SelectedFile::from_path(&path) {
                Ok(file) => Some(file),
                Err(e) => {
                    warn!("⚠️  Skipping {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

/// Build a selection from every image file under a folder
///
/// Walks recursively in file-name order. Non-image files are left out here
/// so they do not eat into the slot budget.
pub fn selection_from_folder(folder: &Path) -> Vec<SelectedFile> {
    debug!("🔍 Scanning folder: {}", folder.display());

    let paths = WalkDir::new(folder)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| media_type_for_path(path).starts_with("image/"));

    let selection = selection_from_paths(paths);
    debug!("Found {} image files in {}", selection.len(), folder.display());
    selection
}
