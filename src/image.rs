use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

const TEMP_IMAGE_DIR: &str = "temp_images";
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Ensure the temporary image directory exists and return the local path
/// for a downloaded media asset.
pub fn temp_image_path(media_id: &str) -> Result<PathBuf> {
    fs::create_dir_all(TEMP_IMAGE_DIR)?;
    Ok(PathBuf::from(TEMP_IMAGE_DIR).join(format!("img_{}_{}.jpg", media_id, chrono::Utc::now().timestamp())))
}

/// Validate a downloaded image asset before analysis.
///
/// Checks existence, the configured size cap, and the file extension. The
/// returned error string is operator-facing; the user sees the fixed
/// invalid-image message.
pub fn validate_image(path: &str, max_bytes: u64) -> Result<(), String> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return Err(format!("image file not found: {}", path)),
    };

    if !metadata.is_file() {
        return Err(format!("not a regular file: {}", path));
    }

    if metadata.len() > max_bytes {
        let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
        return Err(format!(
            "image too large ({:.1}MB, max {}MB)",
            size_mb,
            max_bytes / (1024 * 1024)
        ));
    }

    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "unsupported format '{}' (supported: {})",
            extension,
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }

    Ok(())
}

/// Scoped handle for a downloaded image asset.
///
/// The file is deleted when the guard drops, on every exit path of a
/// pipeline run including failure and cancellation.
pub struct TempImage {
    path: PathBuf,
}

impl TempImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempImage {
    fn drop(&mut self) {
        if self.path.exists() {
            match fs::remove_file(&self.path) {
                Ok(()) => log::debug!("🗑 Deleted temporary image: {}", self.path.display()),
                Err(e) => log::error!("❌ Failed to delete {}: {}", self.path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_missing_file() {
        let err = validate_image("temp_images/does_not_exist.jpg", 1024).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_validate_size_and_extension() {
        let dir = tempfile::tempdir().unwrap();

        let jpg = dir.path().join("meal.jpg");
        let mut f = fs::File::create(&jpg).unwrap();
        f.write_all(&[0u8; 128]).unwrap();
        assert!(validate_image(jpg.to_str().unwrap(), 1024).is_ok());
        assert!(validate_image(jpg.to_str().unwrap(), 64).unwrap_err().contains("too large"));

        let gif = dir.path().join("meal.gif");
        fs::File::create(&gif).unwrap();
        assert!(validate_image(gif.to_str().unwrap(), 1024)
            .unwrap_err()
            .contains("unsupported format"));
    }

    #[test]
    fn test_temp_image_deletes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img_abc.jpg");
        fs::write(&path, b"bytes").unwrap();
        assert!(path.exists());

        {
            let _guard = TempImage::new(&path);
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_image_tolerates_missing_file() {
        let guard = TempImage::new("temp_images/never_created.jpg");
        drop(guard);
    }
}
