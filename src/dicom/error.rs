use crate::dicom::{Metadata, Tag, Vr};
use crate::image::DecodeError;
use std::fmt;
use thiserror::Error;

/// Errors raised while parsing a Part 10 byte buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Buffer shorter than the preamble or missing the "DICM" signature
    #[error("Not a DICOM file: missing DICM signature after the 128-byte preamble")]
    InvalidFormat,

    /// A declared length runs past the end of the buffer
    #[error("Truncated data at offset {offset}: {needed} bytes declared, {available} available")]
    TruncatedData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unsupported transfer syntax: {name} ({uid})")]
    UnsupportedTransferSyntax { uid: String, name: String },

    /// Explicit VR element whose VR characters are not a known VR
    #[error("Invalid value representation for element {tag} at offset {offset}")]
    UnknownVr { tag: Tag, offset: usize },

    #[error("Sequences nested deeper than {max} levels at offset {offset}")]
    NestingTooDeep { offset: usize, max: usize },
}

/// Error type that preserves metadata when available
#[derive(Debug)]
pub enum ProcessError {
    /// File could not be read from disk
    ReadFailed(anyhow::Error),

    /// File is not a valid DICOM file - no metadata available
    ParseFailed(ParseError),

    /// Metadata extracted successfully, but the preview could not be decoded
    ConversionFailed {
        metadata: Box<Metadata>,
        error: DecodeError,
    },

    /// Image ready but display failed
    DisplayFailed {
        metadata: Box<Metadata>,
        error: anyhow::Error,
    },

    /// Deidentified output could not be written
    WriteFailed(anyhow::Error),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::ReadFailed(e) => write!(f, "{e:#}"),
            ProcessError::ParseFailed(e) => write!(f, "{e}"),
            ProcessError::ConversionFailed { error, .. } => {
                write!(f, "Preview unavailable: {error}")
            }
            ProcessError::DisplayFailed { error, .. } => write!(f, "{error:#}"),
            ProcessError::WriteFailed(e) => write!(f, "{e:#}"),
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<ParseError> for ProcessError {
    fn from(e: ParseError) -> Self {
        ProcessError::ParseFailed(e)
    }
}

impl ProcessError {
    /// Returns metadata if available (for verbose display before error)
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            ProcessError::ConversionFailed { metadata, .. } => Some(metadata),
            ProcessError::DisplayFailed { metadata, .. } => Some(metadata),
            _ => None,
        }
    }
}

/// Errors raised while serializing a data set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Value does not fit the 16-bit length field of its VR
    #[error("Value of {tag} ({vr}) is {length} bytes, too long for its length field")]
    ValueTooLong { tag: Tag, vr: Vr, length: usize },
}
