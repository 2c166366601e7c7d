use std::path::Path;
use std::str::FromStr;
use crate::utils::ValidationError;

/// Image types accepted by the describer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 5] = [Self::Jpeg, Self::Png, Self::Gif, Self::Bmp, Self::WebP];

    /// Get file extensions associated with this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::Gif => &["gif"],
            Self::Bmp => &["bmp"],
            Self::WebP => &["webp"],
        }
    }

    /// Check if the extension matches this format
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions().contains(&ext.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = ValidationError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.matches_extension(ext))
            .ok_or_else(|| ValidationError::settings(format!("Unsupported image format: {}", ext)))
    }
}

/// Get format from file extension, case-insensitively.
pub fn format_from_extension(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| ImageFormat::from_str(ext).ok())
}

/// Whether `path` carries one of the accepted image extensions.
pub fn is_accepted_image(path: &Path) -> bool {
    format_from_extension(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(format_from_extension(Path::new("/a/B.JPG")), Some(ImageFormat::Jpeg));
        assert_eq!(format_from_extension(Path::new("scan.WebP")), Some(ImageFormat::WebP));
        assert!(is_accepted_image(Path::new("x.jpeg")));
    }

    #[test]
    fn rejects_other_files() {
        assert!(!is_accepted_image(Path::new("image_descriptions.csv")));
        assert!(!is_accepted_image(Path::new("raw.cr2")));
        assert!(!is_accepted_image(Path::new("no_extension")));
    }
}
