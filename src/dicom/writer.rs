//! Part 10 serialization
//!
//! Output is always explicit VR little endian. The meta group length is
//! recomputed and the transfer syntax element rewritten to match; sequences
//! are written with undefined lengths and explicit delimiters.

use anyhow::Context;
use std::path::Path;

use super::dataset::{Dataset, Tag, Value};
use super::dictionary::tags;
use super::error::WriteError;
use super::parser::{MAGIC, PREAMBLE_LENGTH};
use super::reader::UNDEFINED_LENGTH;
use super::vr::Vr;
use crate::types::EXPLICIT_VR_LITTLE_ENDIAN;

/// Serialize a data set and optional native pixel data to a Part 10 buffer
pub fn write_dicom(ds: &Dataset, pixel_data: Option<(Vr, &[u8])>) -> Result<Vec<u8>, WriteError> {
    let mut meta = Vec::new();
    let mut wrote_transfer_syntax = false;
    for (tag, element) in ds.iter().filter(|(tag, _)| tag.is_file_meta()) {
        match tag {
            tags::FILE_META_INFORMATION_GROUP_LENGTH => continue,
            tags::TRANSFER_SYNTAX_UID => {
                write_element(&mut meta, tag, Vr::UI, &Value::from(EXPLICIT_VR_LITTLE_ENDIAN))?;
                wrote_transfer_syntax = true;
            }
            _ => write_element(&mut meta, tag, element.vr, &element.value)?,
        }
    }
    if !wrote_transfer_syntax {
        write_element(
            &mut meta,
            tags::TRANSFER_SYNTAX_UID,
            Vr::UI,
            &Value::from(EXPLICIT_VR_LITTLE_ENDIAN),
        )?;
    }

    let mut out = vec![0u8; PREAMBLE_LENGTH];
    out.extend_from_slice(MAGIC);
    write_element(
        &mut out,
        tags::FILE_META_INFORMATION_GROUP_LENGTH,
        Vr::UL,
        &Value::Int(vec![meta.len() as i64]),
    )?;
    out.extend_from_slice(&meta);

    let mut pixel_data = pixel_data;
    for (tag, element) in ds.iter().filter(|(tag, _)| !tag.is_file_meta()) {
        if tag > tags::PIXEL_DATA {
            if let Some((vr, bytes)) = pixel_data.take() {
                write_element(&mut out, tags::PIXEL_DATA, vr, &Value::Bytes(bytes.to_vec()))?;
            }
        }
        write_element(&mut out, tag, element.vr, &element.value)?;
    }
    if let Some((vr, bytes)) = pixel_data {
        write_element(&mut out, tags::PIXEL_DATA, vr, &Value::Bytes(bytes.to_vec()))?;
    }

    Ok(out)
}

/// Serialize and write to disk
pub fn write_dicom_file(
    path: &Path,
    ds: &Dataset,
    pixel_data: Option<(Vr, &[u8])>,
) -> anyhow::Result<()> {
    let buf = write_dicom(ds, pixel_data)?;
    std::fs::write(path, buf)
        .with_context(|| format!("Failed to write DICOM file: {}", path.display()))
}

fn write_element(out: &mut Vec<u8>, tag: Tag, vr: Vr, value: &Value) -> Result<(), WriteError> {
    if let Value::Sequence(items) = value {
        write_header(out, tag, Vr::SQ, UNDEFINED_LENGTH);
        for item in items {
            write_delimiter(out, tags::ITEM, UNDEFINED_LENGTH);
            for (tag, element) in item.iter() {
                write_element(out, tag, element.vr, &element.value)?;
            }
            write_delimiter(out, tags::ITEM_DELIMITATION_ITEM, 0);
        }
        write_delimiter(out, tags::SEQUENCE_DELIMITATION_ITEM, 0);
        return Ok(());
    }

    let bytes = encode_value(vr, value);
    let fits = if vr.has_long_length() {
        u32::try_from(bytes.len()).is_ok_and(|len| len != UNDEFINED_LENGTH)
    } else {
        u16::try_from(bytes.len()).is_ok()
    };
    if !fits {
        return Err(WriteError::ValueTooLong {
            tag,
            vr,
            length: bytes.len(),
        });
    }

    write_header(out, tag, vr, bytes.len() as u32);
    out.extend_from_slice(&bytes);
    Ok(())
}

fn write_header(out: &mut Vec<u8>, tag: Tag, vr: Vr, length: u32) {
    out.extend_from_slice(&tag.group.to_le_bytes());
    out.extend_from_slice(&tag.element.to_le_bytes());
    out.extend_from_slice(vr.as_str().as_bytes());
    if vr.has_long_length() {
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&length.to_le_bytes());
    } else {
        out.extend_from_slice(&(length as u16).to_le_bytes());
    }
}

fn write_delimiter(out: &mut Vec<u8>, tag: Tag, length: u32) {
    out.extend_from_slice(&tag.group.to_le_bytes());
    out.extend_from_slice(&tag.element.to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
}

/// Encode a primitive value, padded to even length
fn encode_value(vr: Vr, value: &Value) -> Vec<u8> {
    let mut bytes = match value {
        Value::Str(s) => s.as_bytes().to_vec(),
        Value::Bytes(b) => b.clone(),
        Value::Int(values) => encode_ints(vr, values),
        Value::Float(values) => encode_floats(vr, values),
        Value::Sequence(_) => Vec::new(),
    };
    if bytes.len() % 2 == 1 {
        bytes.push(vr.padding());
    }
    bytes
}

fn encode_ints(vr: Vr, values: &[i64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for &v in values {
        match vr {
            Vr::US => out.extend_from_slice(&(v as u16).to_le_bytes()),
            Vr::SS => out.extend_from_slice(&(v as i16).to_le_bytes()),
            Vr::UL => out.extend_from_slice(&(v as u32).to_le_bytes()),
            Vr::SL => out.extend_from_slice(&(v as i32).to_le_bytes()),
            Vr::SV => out.extend_from_slice(&v.to_le_bytes()),
            Vr::UV => out.extend_from_slice(&(v as u64).to_le_bytes()),
            _ => {
                // Integers attached to a text VR (e.g. IS built in code)
                if !out.is_empty() {
                    out.push(b'\\');
                }
                out.extend_from_slice(v.to_string().as_bytes());
            }
        }
    }
    out
}

fn encode_floats(vr: Vr, values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for &v in values {
        match vr {
            Vr::FL => out.extend_from_slice(&(v as f32).to_le_bytes()),
            Vr::FD => out.extend_from_slice(&v.to_le_bytes()),
            _ => {
                if !out.is_empty() {
                    out.push(b'\\');
                }
                out.extend_from_slice(v.to_string().as_bytes());
            }
        }
    }
    out
}
