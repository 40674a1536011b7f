//! Stateless image transforms: resize, compress, convert
//!
//! These are the in-memory editor operations. Each one is idempotent given
//! the same input and parameters and has no network dependency.

use crate::{
    config::{EncodeSettings, OutputFormat, Quality},
    error::{PicforgeError, Result},
    services::ImageCodec,
};
use image::{DynamicImage, RgbImage};
use tracing::debug;

/// Target dimensions for a resize operation
///
/// When `height` is omitted it is derived from the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels (None = preserve aspect ratio)
    pub height: Option<u32>,
}

impl ResizeTarget {
    /// Create a width-only target that preserves the aspect ratio
    #[must_use]
    pub fn width(width: u32) -> Self {
        Self {
            width,
            height: None,
        }
    }

    /// Create an exact width and height target
    #[must_use]
    pub fn exact(width: u32, height: u32) -> Self {
        Self {
            width,
            height: Some(height),
        }
    }

    /// Resolve the concrete output dimensions for a source image
    ///
    /// # Errors
    /// Returns `InvalidInput` when either dimension resolves to zero.
    pub fn resolve(&self, source_width: u32, source_height: u32) -> Result<(u32, u32)> {
        if self.width == 0 {
            return Err(PicforgeError::invalid_input(
                "Resize width must be greater than zero",
            ));
        }

        let height = match self.height {
            Some(0) => {
                return Err(PicforgeError::invalid_input(
                    "Resize height must be greater than zero",
                ))
            },
            Some(height) => height,
            None => {
                let aspect = f64::from(source_height) / f64::from(source_width);
                let derived = (f64::from(self.width) * aspect).round() as u32;
                derived.max(1)
            },
        };

        Ok((self.width, height))
    }
}

/// Resize an image to the target dimensions
///
/// Uses the Lanczos3 filter for high-quality scaling. Resizing to the
/// current dimensions returns the image unchanged.
pub fn resize(image: &DynamicImage, target: &ResizeTarget) -> Result<DynamicImage> {
    let (width, height) = target.resolve(image.width(), image.height())?;

    if (width, height) == (image.width(), image.height()) {
        debug!(width, height, "resize target matches current dimensions");
        return Ok(image.clone());
    }

    debug!(
        from_width = image.width(),
        from_height = image.height(),
        width,
        height,
        "resizing image"
    );
    Ok(image.resize_exact(width, height, image::imageops::FilterType::Lanczos3))
}

/// Re-encode an image in its current format at the given quality
///
/// Returns the encoded bytes; the pixel content is unchanged.
pub fn compress(image: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>> {
    debug!(%format, quality = quality.fraction(), "compressing image");
    ImageCodec::encode(image, &EncodeSettings { format, quality })
}

/// Re-encode an image under a different format
///
/// When the destination format lacks an alpha channel, transparent regions
/// are composited over an opaque white background first.
pub fn convert(image: &DynamicImage, settings: &EncodeSettings) -> Result<Vec<u8>> {
    debug!(format = %settings.format, "converting image");

    if settings.format.supports_transparency() {
        ImageCodec::encode(image, settings)
    } else {
        let flattened = DynamicImage::ImageRgb8(flatten_onto_white(image));
        ImageCodec::encode(&flattened, settings)
    }
}

/// Composite an image over an opaque white background, dropping alpha
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = f32::from(pixel[3]) / 255.0;
        let blend = |channel: u8| -> u8 {
            (f32::from(channel) * alpha + 255.0 * (1.0 - alpha)).round() as u8
        };
        rgb.put_pixel(
            x,
            y,
            image::Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]),
        );
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn opaque_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([120, 50, 200, 255]),
        ))
    }

    #[test]
    fn test_resize_exact_dimensions() {
        let image = opaque_image(100, 100);
        let resized = resize(&image, &ResizeTarget::exact(50, 50)).unwrap();
        assert_eq!(resized.width(), 50);
        assert_eq!(resized.height(), 50);
    }

    #[test]
    fn test_resize_derives_height_from_aspect() {
        let image = opaque_image(200, 100);
        let resized = resize(&image, &ResizeTarget::width(50)).unwrap();
        assert_eq!(resized.width(), 50);
        assert_eq!(resized.height(), 25);
    }

    #[test]
    fn test_resize_to_own_dimensions_is_identity() {
        let image = opaque_image(64, 48);
        let resized = resize(&image, &ResizeTarget::exact(64, 48)).unwrap();
        assert_eq!(resized.dimensions(), image.dimensions());
        assert_eq!(resized.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn test_resize_rejects_zero_dimensions() {
        let image = opaque_image(10, 10);
        assert!(resize(&image, &ResizeTarget::width(0)).is_err());
        assert!(resize(&image, &ResizeTarget::exact(10, 0)).is_err());
    }

    #[test]
    fn test_resize_never_rounds_height_to_zero() {
        // Extreme aspect ratio: derived height would round to 0
        let image = opaque_image(1000, 1);
        let resized = resize(&image, &ResizeTarget::width(10)).unwrap();
        assert_eq!(resized.height(), 1);
    }

    #[test]
    fn test_compress_produces_decodable_output() {
        let image = opaque_image(16, 16);
        let bytes = compress(&image, OutputFormat::Jpeg, Quality::new(0.5).unwrap()).unwrap();

        let (decoded, format) = ImageCodec::decode(&bytes).unwrap();
        assert_eq!(format, OutputFormat::Jpeg);
        assert_eq!(decoded.dimensions(), (16, 16));
    }

    #[test]
    fn test_convert_to_same_encoding_is_decodable() {
        let image = opaque_image(8, 8);
        let bytes = convert(&image, &EncodeSettings::for_format(OutputFormat::Png)).unwrap();

        let (_, format) = ImageCodec::decode(&bytes).unwrap();
        assert_eq!(format, OutputFormat::Png);
    }

    #[test]
    fn test_convert_to_jpeg_fills_transparency_with_white() {
        let image =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 0])));
        let bytes = convert(&image, &EncodeSettings::for_format(OutputFormat::Jpeg)).unwrap();

        let (decoded, _) = ImageCodec::decode(&bytes).unwrap();
        let pixel = decoded.to_rgb8().get_pixel(0, 0).0;
        // Fully transparent red must come out white, not red
        assert!(pixel.iter().all(|&channel| channel > 240));
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        let image =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let rgb = flatten_onto_white(&image);
        let pixel = rgb.get_pixel(0, 0).0;
        // Half-transparent black over white lands mid-grey
        assert!(pixel.iter().all(|&channel| (120..=135).contains(&channel)));
    }
}
