//! Photo attachment encoding
//!
//! Turns an image file into the `data:<mime>;base64,...` reference that the
//! employee step accepts as its pass-through photo field.

use base64::{engine::general_purpose, Engine as _};
use mime_guess::mime;
use std::path::Path;
use thiserror::Error;

pub const NOT_AN_IMAGE_MESSAGE: &str = "Будь ласка завантажте коректний файл зображення";

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Будь ласка завантажте коректний файл зображення")]
    NotAnImage,
    #[error("file is {size} bytes, the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

/// Image mime type guessed from the file extension
pub fn image_mime(path: &Path) -> Result<mime::Mime, AttachmentError> {
    mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime::IMAGE)
        .ok_or(AttachmentError::NotAnImage)
}

/// Encode raw bytes as a data URL
pub fn data_url(mime: &mime::Mime, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime.essence_str(),
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Read an image file into a data URL. `max_bytes` of `None` means no limit.
pub async fn photo_data_url(path: &Path, max_bytes: Option<u64>) -> Result<String, AttachmentError> {
    let mime = image_mime(path)?;
    let size = tokio::fs::metadata(path).await?.len();
    if let Some(limit) = max_bytes {
        if size > limit {
            return Err(AttachmentError::TooLarge { size, limit });
        }
    }
    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(path = %path.display(), size, mime = %mime, "photo encoded");
    Ok(data_url(&mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("me.png")).unwrap().essence_str(), "image/png");
        assert_eq!(image_mime(Path::new("me.JPG")).unwrap().essence_str(), "image/jpeg");
        assert!(matches!(
            image_mime(Path::new("cv.pdf")),
            Err(AttachmentError::NotAnImage)
        ));
        assert!(matches!(
            image_mime(Path::new("no_extension")),
            Err(AttachmentError::NotAnImage)
        ));
    }

    #[test]
    fn test_not_an_image_message() {
        assert_eq!(AttachmentError::NotAnImage.to_string(), NOT_AN_IMAGE_MESSAGE);
    }

    #[test]
    fn test_data_url() {
        let mime: mime::Mime = "image/png".parse().unwrap();
        assert_eq!(data_url(&mime, b"png"), "data:image/png;base64,cG5n");
    }

    #[tokio::test]
    async fn test_photo_data_url_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let url = photo_data_url(&path, Some(1024)).await.unwrap();
        assert_eq!(url, "data:image/gif;base64,R0lGODlh");
    }

    #[tokio::test]
    async fn test_photo_over_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let err = photo_data_url(&path, Some(16)).await.unwrap_err();
        assert!(matches!(err, AttachmentError::TooLarge { size: 64, limit: 16 }));
        assert!(photo_data_url(&path, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = photo_data_url(&dir.path().join("gone.png"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AttachmentError::Io(_)));
    }
}
