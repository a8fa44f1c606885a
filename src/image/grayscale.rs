//! Grayscale pixel decoding
//!
//! Handles 8 and 16-bit single-sample data, signed or unsigned, with the
//! modality rescale applied before display mapping. Display mapping is a
//! window when one is given, otherwise a direct clamp (8-bit) or min/max
//! normalization over the whole frame (16-bit).
//!
//! Uses f32 for the per-pixel math, which vectorizes better than f64.

use super::normalization::{apply_window, clamp_to_u8, find_min_max, invert, normalize_to_u8};
use super::{DecodeError, ImageParams, RasterImage};
use crate::types::WindowLevel;

/// Decode one frame of grayscale pixel data into an RGBA raster
pub fn decode_grayscale(
    pixels: &[u8],
    params: &ImageParams,
    window: Option<WindowLevel>,
) -> Result<RasterImage, DecodeError> {
    let expected = params.frame_length();
    if pixels.len() < expected {
        return Err(DecodeError::InsufficientPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    let frame = &pixels[..expected];

    // First pass: stored values to rescaled (modality) values
    let rescaled = extract_rescaled_values(frame, params)?;

    let window = window.filter(WindowLevel::is_active);
    let should_invert = params.photometric_interpretation.should_invert();

    let gray: Vec<u8> = match (window, params.bit_depth.allocated) {
        (Some(window), _) => rescaled.iter().map(|&v| apply_window(v, &window)).collect(),
        (None, 8) => rescaled.iter().map(|&v| clamp_to_u8(v)).collect(),
        (None, _) => {
            let (min_val, max_val) = find_min_max(&rescaled);
            // All pixels equal: avoid dividing by zero
            let range = if max_val > min_val {
                max_val - min_val
            } else {
                1.0_f32
            };
            rescaled
                .iter()
                .map(|&v| normalize_to_u8(v, min_val, range))
                .collect()
        }
    };

    // Second pass: MONOCHROME1 stores high values as dark
    let gray: Vec<u8> = if should_invert {
        gray.into_iter().map(invert).collect()
    } else {
        gray
    };

    Ok(RasterImage::from_gray(
        u32::from(params.dimensions.cols),
        u32::from(params.dimensions.rows),
        &gray,
    ))
}

/// Read stored samples and apply slope/intercept
fn extract_rescaled_values(frame: &[u8], params: &ImageParams) -> Result<Vec<f32>, DecodeError> {
    let rescale = params.rescale;

    match params.bit_depth.allocated {
        8 => Ok(frame
            .iter()
            .map(|&b| {
                let stored = if params.is_signed() {
                    f32::from(b as i8)
                } else {
                    f32::from(b)
                };
                rescale.apply(stored)
            })
            .collect()),
        16 => Ok(frame
            .chunks_exact(2)
            .map(|chunk| {
                let raw = u16::from_le_bytes([chunk[0], chunk[1]]);
                let stored = if params.is_signed() {
                    // Two's complement unwrap
                    f32::from(raw as i16)
                } else {
                    f32::from(raw)
                };
                rescale.apply(stored)
            })
            .collect()),
        bits => Err(DecodeError::UnsupportedPixelFormat(format!(
            "{bits} bits allocated for grayscale"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::PhotometricInterpretation;
    use crate::types::{BitDepth, Dimensions, RescaleParams};
    use assert_matches::assert_matches;

    fn params(rows: u16, cols: u16, bits: u16) -> ImageParams {
        ImageParams {
            dimensions: Dimensions::new(rows, cols),
            bit_depth: BitDepth::new(bits, bits),
            samples_per_pixel: 1,
            pixel_representation: 0,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            rescale: RescaleParams::default(),
        }
    }

    fn gray_values(image: &RasterImage) -> Vec<u8> {
        image.pixels.chunks_exact(4).map(|p| p[0]).collect()
    }

    fn le16(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn short_buffer_is_insufficient() {
        assert_matches!(
            decode_grayscale(&[0; 7], &params(2, 2, 16), None),
            Err(DecodeError::InsufficientPixelData { expected: 8, actual: 7 })
        );
    }

    #[test]
    fn eight_bit_clamps_after_rescale() {
        let mut p = params(1, 4, 8);
        p.rescale = RescaleParams::new(2.0, -10.0);
        let image = decode_grayscale(&[0, 10, 100, 200], &p, None).unwrap();
        // 0*2-10 = -10 -> 0, 10 -> 10, 100 -> 190, 200 -> 390 -> 255
        assert_eq!(gray_values(&image), vec![0, 10, 190, 255]);
        assert_eq!((image.width, image.height), (4, 1));
    }

    #[test]
    fn sixteen_bit_normalizes_to_observed_range() {
        let image = decode_grayscale(&le16(&[1000, 1500, 2000]), &params(1, 3, 16), None).unwrap();
        assert_eq!(gray_values(&image), vec![0, 127, 255]);
    }

    #[test]
    fn signed_values_unwrap() {
        let mut p = params(1, 3, 16);
        p.pixel_representation = 1;
        // 0xFC18 is -1000 as two's complement
        let image = decode_grayscale(&le16(&[0xFC18, 0, 1000]), &p, None).unwrap();
        assert_eq!(gray_values(&image), vec![0, 127, 255]);
    }

    #[test]
    fn window_overrides_normalization() {
        let mut p = params(1, 4, 16);
        p.pixel_representation = 1;
        p.rescale = RescaleParams::new(1.0, -1024.0);
        let window = WindowLevel::new(40.0, 400.0);
        let raw = le16(&[0, 864, 1064, 4000]);
        let image = decode_grayscale(&raw, &p, Some(window)).unwrap();
        // -1024, -160, 40, 2976
        assert_eq!(gray_values(&image), vec![0, 0, 127, 255]);
    }

    #[test]
    fn zero_width_window_is_ignored() {
        let p = params(1, 2, 16);
        let raw = le16(&[10, 20]);
        let unset = decode_grayscale(&raw, &p, Some(WindowLevel::new(15.0, 0.0))).unwrap();
        let auto = decode_grayscale(&raw, &p, None).unwrap();
        assert_eq!(unset, auto);
        // Deterministic across runs
        assert_eq!(auto, decode_grayscale(&raw, &p, None).unwrap());
    }

    #[test]
    fn monochrome1_inverts_after_mapping() {
        let mut p = params(1, 3, 8);
        p.photometric_interpretation = PhotometricInterpretation::Monochrome1;
        let image = decode_grayscale(&[0, 100, 255], &p, None).unwrap();
        assert_eq!(gray_values(&image), vec![255, 155, 0]);
    }

    #[test]
    fn flat_image_does_not_divide_by_zero() {
        let image = decode_grayscale(&le16(&[500; 4]), &params(2, 2, 16), None).unwrap();
        assert!(gray_values(&image).iter().all(|&g| g == 0));
    }

    #[test]
    fn trailing_bytes_beyond_the_frame_are_ignored() {
        let image = decode_grayscale(&[1, 2, 3, 4, 99, 99], &params(2, 2, 8), None).unwrap();
        assert_eq!(gray_values(&image), vec![1, 2, 3, 4]);
    }
}
