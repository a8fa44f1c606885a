//! Metadata record and its extraction from a data set
//!
//! Extraction is total: a missing or malformed element becomes `None` so a
//! damaged file still shows whatever could be read.

use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

use super::dataset::{Dataset, Tag, Value};
use super::dictionary::{display_name, tags};
use super::photometric::PhotometricInterpretation;
use crate::image::{DecodeError, ImageParams};
use crate::types::*;

/// Image pixel module attributes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageInfo {
    pub rows: Option<u16>,
    pub columns: Option<u16>,
    pub number_of_frames: Option<u32>,
    pub samples_per_pixel: Option<u16>,
    pub bits_allocated: Option<u16>,
    pub bits_stored: Option<u16>,
    pub pixel_representation: Option<u16>,
    pub photometric_interpretation: Option<PhotometricInterpretation>,
    pub rescale_slope: Option<f64>,
    pub rescale_intercept: Option<f64>,
    pub window: Option<WindowLevel>,
    pub pixel_aspect_ratio: Option<PixelAspectRatio>,
}

/// Fixed-shape view of the interesting parts of a data set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub patient: PatientInfo,
    pub study: StudyInfo,
    pub series: SeriesInfo,
    pub instance: InstanceInfo,
    pub institution: InstitutionInfo,
    pub image: ImageInfo,
    pub sop_class: Option<SOPClass>,
}

impl Metadata {
    /// Project a data set into a metadata record
    #[must_use]
    pub fn from_dataset(ds: &Dataset) -> Self {
        let patient = PatientInfo {
            name: text(ds, tags::PATIENT_NAME),
            id: text(ds, tags::PATIENT_ID),
            birth_date: text(ds, tags::PATIENT_BIRTH_DATE),
            sex: text(ds, tags::PATIENT_SEX),
            age: text(ds, tags::PATIENT_AGE),
            address: text(ds, tags::PATIENT_ADDRESS),
            telephone_numbers: text(ds, tags::PATIENT_TELEPHONE_NUMBERS),
        };

        let study = StudyInfo {
            instance_uid: text(ds, tags::STUDY_INSTANCE_UID),
            date: text(ds, tags::STUDY_DATE),
            time: text(ds, tags::STUDY_TIME),
            description: text(ds, tags::STUDY_DESCRIPTION),
            accession_number: text(ds, tags::ACCESSION_NUMBER),
            referring_physician: text(ds, tags::REFERRING_PHYSICIAN_NAME),
        };

        let series = SeriesInfo {
            instance_uid: text(ds, tags::SERIES_INSTANCE_UID),
            number: int(ds, tags::SERIES_NUMBER),
            description: text(ds, tags::SERIES_DESCRIPTION),
            modality: text(ds, tags::MODALITY),
            date: text(ds, tags::SERIES_DATE),
            time: text(ds, tags::SERIES_TIME),
            performing_physician: text(ds, tags::PERFORMING_PHYSICIAN_NAME),
            operators: text(ds, tags::OPERATORS_NAME),
            slice_thickness: float(ds, tags::SLICE_THICKNESS),
        };

        let instance = InstanceInfo {
            sop_instance_uid: text(ds, tags::SOP_INSTANCE_UID),
            number: int(ds, tags::INSTANCE_NUMBER),
            acquisition_date: text(ds, tags::ACQUISITION_DATE),
            acquisition_time: text(ds, tags::ACQUISITION_TIME),
            content_date: text(ds, tags::CONTENT_DATE),
            content_time: text(ds, tags::CONTENT_TIME),
        };

        let institution = InstitutionInfo {
            name: text(ds, tags::INSTITUTION_NAME),
            address: text(ds, tags::INSTITUTION_ADDRESS),
            department: text(ds, tags::INSTITUTIONAL_DEPARTMENT_NAME),
        };

        Self {
            patient,
            study,
            series,
            instance,
            institution,
            image: extract_image_info(ds),
            sop_class: text(ds, tags::SOP_CLASS_UID).and_then(|uid| SOPClass::from_uid(&uid)),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> Option<Dimensions> {
        Some(Dimensions::new(self.image.rows?, self.image.columns?))
    }

    /// Window stored in the file, if it has a usable one
    #[must_use]
    pub fn default_window(&self) -> Option<WindowLevel> {
        self.image.window.filter(WindowLevel::is_active)
    }

    /// Pixel decoder input derived from the image attributes
    pub fn image_params(&self) -> Result<ImageParams, DecodeError> {
        let dimensions = self
            .dimensions()
            .ok_or(DecodeError::MissingAttribute("Rows/Columns"))?;
        let bits_allocated = self
            .image
            .bits_allocated
            .ok_or(DecodeError::MissingAttribute("BitsAllocated"))?;

        Ok(ImageParams {
            dimensions,
            bit_depth: BitDepth::new(
                bits_allocated,
                self.image.bits_stored.unwrap_or(bits_allocated),
            ),
            samples_per_pixel: self.image.samples_per_pixel.unwrap_or(1),
            pixel_representation: self.image.pixel_representation.unwrap_or(0),
            photometric_interpretation: self
                .image
                .photometric_interpretation
                .clone()
                .unwrap_or(PhotometricInterpretation::Monochrome2),
            rescale: RescaleParams::new(
                self.image.rescale_slope.unwrap_or(1.0),
                self.image.rescale_intercept.unwrap_or(0.0),
            ),
        })
    }
}

fn extract_image_info(ds: &Dataset) -> ImageInfo {
    let window = match (
        float(ds, tags::WINDOW_CENTER),
        float(ds, tags::WINDOW_WIDTH),
    ) {
        (Some(center), Some(width)) => Some(WindowLevel::new(center, width)),
        _ => None,
    };

    let pixel_aspect_ratio = text(ds, tags::PIXEL_ASPECT_RATIO).and_then(|s| {
        let (vertical, horizontal) = s.split_once('\\')?;
        let vertical = vertical.trim().parse::<f64>().ok()?;
        let horizontal = horizontal.trim().parse::<f64>().ok()?;
        Some(PixelAspectRatio::new(vertical, horizontal))
    });

    ImageInfo {
        rows: positive_u16(ds, tags::ROWS),
        columns: positive_u16(ds, tags::COLUMNS),
        number_of_frames: int(ds, tags::NUMBER_OF_FRAMES).and_then(|v| u32::try_from(v).ok()),
        samples_per_pixel: int(ds, tags::SAMPLES_PER_PIXEL).and_then(|v| u16::try_from(v).ok()),
        bits_allocated: int(ds, tags::BITS_ALLOCATED).and_then(|v| u16::try_from(v).ok()),
        bits_stored: int(ds, tags::BITS_STORED).and_then(|v| u16::try_from(v).ok()),
        pixel_representation: int(ds, tags::PIXEL_REPRESENTATION)
            .and_then(|v| u16::try_from(v).ok()),
        photometric_interpretation: text(ds, tags::PHOTOMETRIC_INTERPRETATION)
            .and_then(|s| PhotometricInterpretation::from_str(&s).ok()),
        rescale_slope: float(ds, tags::RESCALE_SLOPE),
        rescale_intercept: float(ds, tags::RESCALE_INTERCEPT),
        window,
        pixel_aspect_ratio,
    }
}

/// String value with trailing padding removed
fn text(ds: &Dataset, tag: Tag) -> Option<String> {
    match ds.value(tag)? {
        Value::Str(s) => Some(s.trim_end_matches([' ', '\0']).to_string()),
        Value::Bytes(bytes) => Some(
            String::from_utf8_lossy(bytes)
                .trim_end_matches([' ', '\0'])
                .to_string(),
        ),
        _ => None,
    }
}

fn int(ds: &Dataset, tag: Tag) -> Option<i64> {
    let value = ds.value(tag)?;
    let parsed = value.first_int();
    if parsed.is_none() && !value.is_empty() {
        warn!(%tag, name = %display_name(tag), "Ignoring non-numeric value");
    }
    parsed
}

fn float(ds: &Dataset, tag: Tag) -> Option<f64> {
    let value = ds.value(tag)?;
    let parsed = value.first_float().filter(|v| v.is_finite());
    if parsed.is_none() && !value.is_empty() {
        warn!(%tag, name = %display_name(tag), "Ignoring non-numeric value");
    }
    parsed
}

fn positive_u16(ds: &Dataset, tag: Tag) -> Option<u16> {
    int(ds, tag)
        .and_then(|v| u16::try_from(v).ok())
        .filter(|v| *v > 0)
}
