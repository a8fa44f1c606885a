//! DICOM file parsing and metadata extraction
//!
//! This module reads uncompressed Part 10 files into an in-memory data set,
//! locates the pixel data and projects the interesting attributes into a
//! [`Metadata`] record. [`writer`] goes the other way.

mod dataset;
pub mod dictionary;
mod error;
mod metadata;
mod parser;
mod photometric;
mod pixel_data;
mod reader;
pub mod validation;
mod vr;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public API
pub use dataset::{Dataset, Element, Tag, Value};
pub use dictionary::tags;
pub use error::{ParseError, ProcessError, WriteError};
pub use metadata::{ImageInfo, Metadata};
pub use parser::{has_dicom_signature, parse_dicom, ParsedFile};
pub use photometric::PhotometricInterpretation;
pub use pixel_data::PixelDataRef;
pub use reader::decode_value;
pub use vr::Vr;

use anyhow::Context;
use std::path::Path;

use crate::types::TransferSyntax;

/// A parsed file together with the bytes its pixel reference points into
#[derive(Debug, Clone)]
pub struct DicomFile {
    bytes: Vec<u8>,
    parsed: ParsedFile,
    pub metadata: Metadata,
}

impl DicomFile {
    /// Parse a buffer and extract its metadata
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ParseError> {
        let parsed = parse_dicom(&bytes)?;
        let metadata = Metadata::from_dataset(&parsed.dataset);
        Ok(Self {
            bytes,
            parsed,
            metadata,
        })
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.parsed.dataset
    }

    #[must_use]
    pub fn transfer_syntax(&self) -> &TransferSyntax {
        &self.parsed.transfer_syntax
    }

    #[must_use]
    pub fn pixel_data(&self) -> Option<PixelDataRef> {
        self.parsed.pixel_data
    }

    /// Native pixel bytes; `None` when absent or encapsulated
    #[must_use]
    pub fn pixel_bytes(&self) -> Option<&[u8]> {
        self.parsed
            .pixel_data
            .filter(|p| !p.encapsulated)
            .and_then(|p| p.slice(&self.bytes))
    }

    /// Native pixel data with its VR, in the form the writer takes
    #[must_use]
    pub fn pixel_payload(&self) -> Option<(Vr, &[u8])> {
        let vr = self.parsed.pixel_data?.vr;
        Some((vr, self.pixel_bytes()?))
    }
}

/// Read and parse a DICOM file from disk
pub fn open_dicom_file(file_path: &Path) -> Result<DicomFile, ProcessError> {
    let bytes = std::fs::read(file_path)
        .with_context(|| format!("Failed to read DICOM file: {}", file_path.display()))
        .map_err(ProcessError::ReadFailed)?;
    Ok(DicomFile::from_bytes(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::testing::DicomBuilder;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn open_file_from_disk() {
        let buf = DicomBuilder::new()
            .str(tags::MODALITY, Vr::CS, "MR")
            .u16(tags::ROWS, 1)
            .u16(tags::COLUMNS, 2)
            .pixel_data(Vr::OW, &[1, 0, 2, 0])
            .build();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&buf).unwrap();

        let dicom = open_dicom_file(file.path()).unwrap();
        assert_eq!(dicom.metadata.series.modality.as_deref(), Some("MR"));
        assert_eq!(dicom.pixel_bytes(), Some(&[1u8, 0, 2, 0][..]));
        assert_eq!(dicom.transfer_syntax().name, "Explicit VR Little Endian");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            open_dicom_file(&dir.path().join("absent.dcm")),
            Err(ProcessError::ReadFailed(_))
        );
    }

    #[test]
    fn non_dicom_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"just some text").unwrap();
        assert_matches!(
            open_dicom_file(file.path()),
            Err(ProcessError::ParseFailed(ParseError::InvalidFormat))
        );
    }

    #[test]
    fn encapsulated_pixels_have_no_native_bytes() {
        let buf = DicomBuilder::new()
            .encapsulated_pixel_data(&[&[], &[1, 2]])
            .build();
        let dicom = DicomFile::from_bytes(buf).unwrap();
        assert!(dicom.pixel_data().is_some());
        assert!(dicom.pixel_bytes().is_none());
    }
}
