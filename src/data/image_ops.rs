use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};

use super::config::{Channels, ImageDimensions};
use super::error::{LoaderError, Result};

/// Extensions the directory loader treats as frames (case-insensitive).
const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open and decode an image file.
pub fn open(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| LoaderError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

pub fn dimensions_of(img: &DynamicImage) -> ImageDimensions {
    let (width, height) = img.dimensions();
    ImageDimensions { height, width }
}

/// Resize (if needed) and flatten to channel-last `f32` pixels in `0..=255`.
pub fn to_pixels(img: &DynamicImage, dims: ImageDimensions, channels: Channels) -> Vec<f32> {
    let resized;
    let img = if img.dimensions() == (dims.width, dims.height) {
        img
    } else {
        resized = img.resize_exact(dims.width, dims.height, FilterType::Triangle);
        &resized
    };

    match channels {
        Channels::Grey => img.to_luma8().as_raw().iter().map(|&v| v as f32).collect(),
        Channels::Rgb => img.to_rgb8().as_raw().iter().map(|&v| v as f32).collect(),
    }
}

/// Turn a flat grey payload into `(h, w, c)` pixels, resizing from a square
/// source when the payload holds a different number of pixels.
pub fn grey_payload_to_pixels(
    values: Vec<u8>,
    dims: ImageDimensions,
    channels: Channels,
    row: usize,
) -> Result<Vec<f32>> {
    let count = values.len();
    let grey = if count == dims.pixel_count() {
        values
    } else {
        let side = (count as f64).sqrt() as u32;
        let pixel_count_err = || LoaderError::PixelCount {
            row,
            count,
            height: dims.height,
            width: dims.width,
        };
        if side == 0 || (side as usize) * (side as usize) != count {
            return Err(pixel_count_err());
        }
        let src = GrayImage::from_raw(side, side, values).ok_or_else(pixel_count_err)?;
        image::imageops::resize(&src, dims.width, dims.height, FilterType::Triangle).into_raw()
    };

    Ok(match channels {
        Channels::Grey => grey.into_iter().map(f32::from).collect(),
        Channels::Rgb => grey
            .into_iter()
            .flat_map(|v| [f32::from(v); 3])
            .collect(),
    })
}
