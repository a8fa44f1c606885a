use crate::dicom::PhotometricInterpretation;
use crate::image::{DecodeError, ImageParams};

#[inline]
pub fn validate_photometric_samples(
    photometric_interpretation: &PhotometricInterpretation,
    samples_per_pixel: u16,
) -> Result<(), DecodeError> {
    if samples_per_pixel != 1 {
        return Err(DecodeError::UnsupportedPixelFormat(format!(
            "{samples_per_pixel} samples per pixel"
        )));
    }

    if !photometric_interpretation.is_grayscale() {
        return Err(DecodeError::UnsupportedPixelFormat(format!(
            "photometric interpretation {photometric_interpretation}"
        )));
    }

    Ok(())
}

#[inline]
pub fn validate_bits_allocated(bits_allocated: u16) -> Result<(), DecodeError> {
    if !matches!(bits_allocated, 8 | 16) {
        return Err(DecodeError::UnsupportedPixelFormat(format!(
            "{bits_allocated} bits allocated (expected 8 or 16)"
        )));
    }

    Ok(())
}

/// Reject pixel layouts the grayscale decoder cannot handle
pub fn validate_image_params(params: &ImageParams) -> Result<(), DecodeError> {
    validate_photometric_samples(&params.photometric_interpretation, params.samples_per_pixel)?;
    validate_bits_allocated(params.bit_depth.allocated)?;
    if !params.dimensions.is_valid() {
        return Err(DecodeError::MissingAttribute("Rows/Columns"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn color_images_are_rejected() {
        assert_matches!(
            validate_photometric_samples(&PhotometricInterpretation::Rgb, 3),
            Err(DecodeError::UnsupportedPixelFormat(_))
        );
        assert_matches!(
            validate_photometric_samples(&PhotometricInterpretation::Rgb, 1),
            Err(DecodeError::UnsupportedPixelFormat(_))
        );
        assert!(validate_photometric_samples(&PhotometricInterpretation::Monochrome1, 1).is_ok());
    }

    #[test]
    fn only_8_and_16_bits() {
        assert!(validate_bits_allocated(8).is_ok());
        assert!(validate_bits_allocated(16).is_ok());
        assert_matches!(
            validate_bits_allocated(32),
            Err(DecodeError::UnsupportedPixelFormat(_))
        );
        assert_matches!(
            validate_bits_allocated(12),
            Err(DecodeError::UnsupportedPixelFormat(_))
        );
    }
}
