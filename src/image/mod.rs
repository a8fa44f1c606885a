mod grayscale;
mod normalization;

pub use grayscale::decode_grayscale;
pub use normalization::invert;

use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::dicom::validation::validate_image_params;
use crate::dicom::PhotometricInterpretation;
use crate::types::{BitDepth, Dimensions, RescaleParams, WindowLevel};

/// Errors raised while turning pixel bytes into a raster
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Insufficient pixel data: expected {expected} bytes, got {actual}")]
    InsufficientPixelData { expected: usize, actual: usize },

    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(String),

    /// A required image attribute is absent from the data set
    #[error("Missing image attribute: {0}")]
    MissingAttribute(&'static str),
}

/// Everything the decoder needs to know about the pixel layout
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub dimensions: Dimensions,
    pub bit_depth: BitDepth,
    pub samples_per_pixel: u16,
    /// 0 = unsigned, 1 = two's complement
    pub pixel_representation: u16,
    pub photometric_interpretation: PhotometricInterpretation,
    pub rescale: RescaleParams,
}

impl ImageParams {
    #[inline]
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }

    /// Bytes needed for one frame
    #[must_use]
    pub fn frame_length(&self) -> usize {
        self.dimensions.pixel_count()
            * usize::from(self.samples_per_pixel)
            * self.bit_depth.bytes_per_sample()
    }
}

/// Decoded image: RGBA8, gray replicated across the color channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Build an opaque RGBA raster from one gray byte per pixel
    #[must_use]
    pub fn from_gray(width: u32, height: u32, gray: &[u8]) -> Self {
        let pixels = gray.iter().flat_map(|&g| [g, g, g, 255]).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Gray value of the pixel at (x, y)
    #[must_use]
    pub fn gray_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels.get(index).copied()
    }

    /// Convert to an `image` crate buffer for display or PNG export
    pub fn to_dynamic_image(&self) -> Result<DynamicImage> {
        let rgba = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .context("Failed to create RGBA image buffer")?;
        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

/// Decode one frame of native pixel data
///
/// `window` overrides auto-normalization when it has a positive width.
///
/// # Errors
///
/// Fails when the pixel layout is not 8/16-bit single-sample grayscale, or
/// when `pixels` is shorter than one frame.
pub fn convert_to_image(
    pixels: &[u8],
    params: &ImageParams,
    window: Option<WindowLevel>,
) -> Result<RasterImage, DecodeError> {
    validate_image_params(params)?;
    decode_grayscale(pixels, params, window)
}
