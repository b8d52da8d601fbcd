//! Image preparation: fetched bytes → pixels sized and encoded for embedding.
//!
//! PDF image XObjects carry no transparency unless a separate soft mask is
//! written, so anything with an alpha channel is composited onto white and
//! stored as JPEG. Opaque PNGs stay lossless (raw RGB, flate-compressed by
//! the writer); opaque JPEGs and unknown formats are stored as JPEG.

use crate::error::ImageError;
use crate::pipeline::fetch::Fetcher;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::debug;

const JPEG_QUALITY: u8 = 90;

/// A decoded image with transparency already flattened.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub url: String,
    pub pixels: RgbImage,
    /// Payload encoding chosen from the source format and alpha channel.
    pub target: TargetFormat,
}

/// How an image is stored inside the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Lossless,
}

/// Encoded pixel data ready for an image XObject.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// Baseline JPEG stream (`DCTDecode`).
    Jpeg(Vec<u8>),
    /// Raw 8-bit RGB samples, row-major.
    Rgb(Vec<u8>),
}

/// An image sized for its slot in the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub url: String,
    /// Pixel width, also the drawn width in points.
    pub width: u32,
    pub height: u32,
    pub payload: ImagePayload,
}

/// Fetch and decode one image.
pub fn load_image<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<LoadedImage, ImageError> {
    let response = fetcher.fetch(url).map_err(|e| ImageError::FetchFailed {
        url: url.to_string(),
        detail: e.to_string(),
    })?;
    if !response.is_success() {
        return Err(ImageError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }
    decode_image(url, &response.bytes)
}

/// Decode raw bytes, flattening any alpha channel onto white.
pub fn decode_image(url: &str, bytes: &[u8]) -> Result<LoadedImage, ImageError> {
    let source_format = image::guess_format(bytes).ok();
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::DecodeFailed {
        url: url.to_string(),
        detail: e.to_string(),
    })?;

    let (pixels, target) = if decoded.color().has_alpha() {
        (flatten_onto_white(&decoded), TargetFormat::Jpeg)
    } else {
        let target = match source_format {
            Some(ImageFormat::Png) => TargetFormat::Lossless,
            _ => TargetFormat::Jpeg,
        };
        (decoded.to_rgb8(), target)
    };
    debug!(
        "Decoded {} ({:?}, {}x{}) → {:?}",
        url,
        source_format,
        pixels.width(),
        pixels.height(),
        target
    );

    Ok(LoadedImage {
        url: url.to_string(),
        pixels,
        target,
    })
}

/// Scale down to `max_width` (aspect ratio kept) and encode the payload.
pub fn prepare_image(loaded: &LoadedImage, max_width: f32) -> Result<PreparedImage, ImageError> {
    let (w, h) = scaled_size(loaded.pixels.width(), loaded.pixels.height(), max_width);
    let pixels = if (w, h) == loaded.pixels.dimensions() {
        loaded.pixels.clone()
    } else {
        image::imageops::resize(&loaded.pixels, w, h, FilterType::Triangle)
    };

    let payload = match loaded.target {
        TargetFormat::Lossless => ImagePayload::Rgb(pixels.as_raw().clone()),
        TargetFormat::Jpeg => {
            let mut buf = Vec::new();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            DynamicImage::ImageRgb8(pixels)
                .write_with_encoder(encoder)
                .map_err(|e| ImageError::EncodeFailed {
                    url: loaded.url.clone(),
                    detail: e.to_string(),
                })?;
            ImagePayload::Jpeg(buf)
        }
    };

    Ok(PreparedImage {
        url: loaded.url.clone(),
        width: w,
        height: h,
        payload,
    })
}

/// Size after capping the width at `max_width`, keeping the aspect ratio.
pub fn scaled_size(width: u32, height: u32, max_width: f32) -> (u32, u32) {
    if width as f32 <= max_width {
        return (width, height);
    }
    let ratio = max_width / width as f32;
    let new_height = ((height as f32) * ratio) as u32;
    (max_width as u32, new_height.max(1))
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = u32::from(px[3]);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }
    out
}

#[cfg(test)]
pub(crate) fn encode_for_tests(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), format)
        .expect("in-memory encode");
    buf
}
