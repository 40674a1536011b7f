//! Configuration types for image transform operations

use crate::error::{PicforgeError, Result};
use serde::{Deserialize, Serialize};

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, opaque background applied on convert)
    Jpeg,
    /// WebP (lossless via the image crate)
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::WebP => write!(f, "webp"),
        }
    }
}

impl OutputFormat {
    /// Get the file extension for this format (without the dot)
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Get the MIME type for this format
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Check if this format carries an alpha channel
    #[must_use]
    pub fn supports_transparency(self) -> bool {
        match self {
            Self::Png | Self::WebP => true,
            Self::Jpeg => false,
        }
    }

    /// Parse a format from a file extension or format name
    ///
    /// # Errors
    /// Returns `InvalidInput` for extensions outside the supported set.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            other => Err(PicforgeError::invalid_input(format!(
                "Unsupported image format '{other}'. Supported formats: png, jpeg, webp"
            ))),
        }
    }

    /// Parse a format from a MIME type such as `image/png`
    ///
    /// # Errors
    /// Returns `InvalidInput` for MIME types outside the supported set.
    pub fn from_mime(mime: &str) -> Result<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::WebP),
            other => Err(PicforgeError::invalid_input(format!(
                "Unsupported image MIME type '{other}'"
            ))),
        }
    }

    /// Map to the corresponding `image` crate format
    #[must_use]
    pub fn as_image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Encoding quality as a fraction between 0.1 and 1.0
///
/// Encoders that work on a 0-100 scale receive the converted percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    /// Minimum accepted quality fraction
    pub const MIN: f32 = 0.1;
    /// Maximum accepted quality fraction
    pub const MAX: f32 = 1.0;

    /// Create a validated quality value
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the fraction falls outside `0.1..=1.0`.
    pub fn new(fraction: f32) -> Result<Self> {
        if !fraction.is_finite() || !(Self::MIN..=Self::MAX).contains(&fraction) {
            return Err(PicforgeError::config_value_error(
                "quality",
                fraction,
                "0.1-1.0",
            ));
        }
        Ok(Self(fraction))
    }

    /// The quality as the fraction the user supplied
    #[must_use]
    pub fn fraction(self) -> f32 {
        self.0
    }

    /// The quality on the 0-100 scale used by the image crate encoders
    #[must_use]
    pub fn as_percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.9)
    }
}

impl TryFrom<f32> for Quality {
    type Error = PicforgeError;

    fn try_from(value: f32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl std::str::FromStr for Quality {
    type Err = PicforgeError;

    fn from_str(s: &str) -> Result<Self> {
        let fraction: f32 = s
            .parse()
            .map_err(|_| PicforgeError::config_value_error("quality", s, "0.1-1.0"))?;
        Self::new(fraction)
    }
}

/// Settings for encoding an image to bytes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EncodeSettings {
    /// Target output format
    pub format: OutputFormat,

    /// Encoding quality (only used by lossy encoders)
    pub quality: Quality,
}

impl EncodeSettings {
    /// Create settings for a format at the default quality
    #[must_use]
    pub fn for_format(format: OutputFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
        }
    }

    /// Set the encoding quality
    #[must_use]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension_and_mime() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.extension(), "webp");
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(
            OutputFormat::from_extension("JPG").unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_extension("jpeg").unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_mime("image/webp").unwrap(),
            OutputFormat::WebP
        );
        assert!(OutputFormat::from_extension("tiff").is_err());
        assert!(OutputFormat::from_mime("application/pdf").is_err());
    }

    #[test]
    fn test_supports_transparency() {
        assert!(OutputFormat::Png.supports_transparency());
        assert!(OutputFormat::WebP.supports_transparency());
        assert!(!OutputFormat::Jpeg.supports_transparency());
    }

    #[test]
    fn test_quality_boundaries() {
        assert!(Quality::new(0.1).is_ok());
        assert!(Quality::new(1.0).is_ok());
        assert!(Quality::new(0.05).is_err());
        assert!(Quality::new(1.5).is_err());
        assert!(Quality::new(f32::NAN).is_err());
    }

    #[test]
    fn test_quality_percent_conversion() {
        assert_eq!(Quality::new(0.85).unwrap().as_percent(), 85);
        assert_eq!(Quality::new(1.0).unwrap().as_percent(), 100);
        assert_eq!(Quality::default().as_percent(), 90);
    }

    #[test]
    fn test_quality_parse() {
        let quality: Quality = "0.75".parse().unwrap();
        assert_eq!(quality.as_percent(), 75);
        assert!("1.2".parse::<Quality>().is_err());
        assert!("high".parse::<Quality>().is_err());
    }
}
