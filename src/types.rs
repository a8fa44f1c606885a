//! Domain-specific types for DICOM metadata

use dicom::core::dictionary::UidDictionary;
use dicom::encoding::TransferSyntaxIndex;
use dicom::transfer_syntax::TransferSyntaxRegistry;
use dicom_dictionary_std::sop_class::StandardSopClassDictionary;
use serde::Serialize;
use std::fmt;

pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";

/// DICOM transfer syntax (UID, name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSyntax {
    pub uid: String,
    pub name: String,
}

impl TransferSyntax {
    #[must_use]
    pub fn new(uid: String, name: String) -> Self {
        Self { uid, name }
    }

    /// Resolve the name of a transfer syntax UID from the registry
    #[must_use]
    pub fn from_uid(uid: &str) -> Self {
        let name = TransferSyntaxRegistry
            .get(uid)
            .map_or_else(|| "Unknown".to_string(), |ts| ts.name().to_string());
        Self::new(uid.to_string(), name)
    }

    #[must_use]
    pub fn explicit_vr_little_endian() -> Self {
        Self::new(
            EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
            "Explicit VR Little Endian".to_string(),
        )
    }

    #[inline]
    #[must_use]
    pub fn is_implicit_vr(&self) -> bool {
        self.uid == IMPLICIT_VR_LITTLE_ENDIAN
    }

    /// Only uncompressed little endian syntaxes can be read
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.uid == IMPLICIT_VR_LITTLE_ENDIAN || self.uid == EXPLICIT_VR_LITTLE_ENDIAN
    }
}

impl fmt::Display for TransferSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name} ({uid})", name = self.name, uid = self.uid)
    }
}

/// SOP Class (UID, name)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SOPClass {
    pub uid: String,
    pub name: String,
}

impl SOPClass {
    #[must_use]
    pub fn new(uid: String, name: String) -> Self {
        Self { uid, name }
    }

    /// Look up a SOP class UID in the standard dictionary
    #[must_use]
    pub fn from_uid(uid: &str) -> Option<Self> {
        StandardSopClassDictionary
            .by_uid(uid)
            .map(|entry| Self::new(uid.to_string(), entry.name.to_string()))
    }
}

impl fmt::Display for SOPClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{name} ({uid})", name = self.name, uid = self.uid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub rows: u16,
    pub cols: u16,
}

impl Dimensions {
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{cols}x{rows}", cols = self.cols, rows = self.rows)
    }
}

/// Rescale parameters for converting pixel values to real units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RescaleParams {
    pub slope: f64,
    pub intercept: f64,
}

impl RescaleParams {
    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline(always)]
    #[must_use]
    // Hot path: called for every pixel during conversion
    pub fn apply(&self, pixel: f32) -> f32 {
        pixel.mul_add(self.slope as f32, self.intercept as f32)
    }
}

impl Default for RescaleParams {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl fmt::Display for RescaleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slope={slope}, intercept={intercept}",
            slope = self.slope,
            intercept = self.intercept
        )
    }
}

/// VOI window (center/width) applied to rescaled values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowLevel {
    pub center: f64,
    pub width: f64,
}

impl WindowLevel {
    #[must_use]
    pub fn new(center: f64, width: f64) -> Self {
        Self { center, width }
    }

    /// A window with non-positive width means "no window"
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.width > 0.0
    }
}

impl fmt::Display for WindowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C={center} W={width}", center = self.center, width = self.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelAspectRatio {
    pub vertical: f64,
    pub horizontal: f64,
}

impl PixelAspectRatio {
    #[must_use]
    pub fn new(vertical: f64, horizontal: f64) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    #[inline]
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.vertical / self.horizontal
    }
}

impl fmt::Display for PixelAspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{vertical}:{horizontal}",
            vertical = self.vertical,
            horizontal = self.horizontal
        )
    }
}

/// Bit depth information for pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitDepth {
    pub allocated: u16,
    pub stored: u16,
}

impl BitDepth {
    #[must_use]
    pub fn new(allocated: u16, stored: u16) -> Self {
        Self { allocated, stored }
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.allocated / 8)
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{stored}/{allocated} bits",
            stored = self.stored,
            allocated = self.allocated
        )
    }
}

/// Patient information metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientInfo {
    pub name: Option<String>,
    pub id: Option<String>,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
    pub address: Option<String>,
    pub telephone_numbers: Option<String>,
}

/// Study information metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudyInfo {
    pub instance_uid: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
    pub accession_number: Option<String>,
    pub referring_physician: Option<String>,
}

/// Series information metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesInfo {
    pub instance_uid: Option<String>,
    pub number: Option<i64>,
    pub description: Option<String>,
    pub modality: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub performing_physician: Option<String>,
    pub operators: Option<String>,
    pub slice_thickness: Option<f64>,
}

/// Instance-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub sop_instance_uid: Option<String>,
    pub number: Option<i64>,
    pub acquisition_date: Option<String>,
    pub acquisition_time: Option<String>,
    pub content_date: Option<String>,
    pub content_time: Option<String>,
}

/// Institution metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstitutionInfo {
    pub name: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
}
