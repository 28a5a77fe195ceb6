//! Preparation of extracted frames for embedding.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};

use crate::block::ImageBlock;
use crate::error::RenderResult;
use crate::layout::INCH;

/// Display box of the footage frame: 6in x 4in.
pub const IMAGE_BOX: (f32, f32) = (6.0 * INCH, 4.0 * INCH);

/// Frames wider than this are downscaled before embedding.
pub const DEFAULT_MAX_IMAGE_WIDTH: u32 = 1280;

/// JPEG quality of embedded frames.
pub const JPEG_QUALITY: u8 = 85;

/// Decode a frame, downscale it if needed and re-encode it as baseline RGB JPEG.
pub fn prepare_image(bytes: &[u8], max_width: u32) -> RenderResult<ImageBlock> {
    let decoded = image::load_from_memory(bytes)?;

    let img = if max_width > 0 && decoded.width() > max_width {
        decoded.resize(max_width, u32::MAX, FilterType::Triangle)
    } else {
        decoded
    };

    let (pixel_width, pixel_height) = img.dimensions();
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

    Ok(ImageBlock {
        jpeg,
        pixel_width,
        pixel_height,
        display_width: IMAGE_BOX.0,
        display_height: IMAGE_BOX.1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_small_frame_keeps_size() {
        let block = prepare_image(&png(320, 240), DEFAULT_MAX_IMAGE_WIDTH).unwrap();
        assert_eq!((block.pixel_width, block.pixel_height), (320, 240));
        assert_eq!(&block.jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!((block.display_width, block.display_height), (432.0, 288.0));
    }

    #[test]
    fn test_wide_frame_is_downscaled() {
        let block = prepare_image(&png(2000, 1000), 1000).unwrap();
        assert_eq!(block.pixel_width, 1000);
        assert_eq!(block.pixel_height, 500);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(prepare_image(b"not an image", DEFAULT_MAX_IMAGE_WIDTH).is_err());
    }
}
