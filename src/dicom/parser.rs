//! Part 10 data set parser
//!
//! Walks the buffer element by element: the File Meta group is always
//! explicit VR little endian, the body uses whatever the meta group declares
//! (implicit or explicit VR little endian). Sequences and items of undefined
//! length are followed to their delimiters. Pixel Data is not copied, only
//! located.

use tracing::debug;

use super::dataset::{Dataset, Tag, Value};
use super::dictionary::{self, tags};
use super::error::ParseError;
use super::pixel_data::PixelDataRef;
use super::reader::{ByteReader, UNDEFINED_LENGTH};
use super::vr::Vr;
use crate::types::TransferSyntax;

pub const PREAMBLE_LENGTH: usize = 128;
pub const MAGIC: &[u8; 4] = b"DICM";
/// Deepest sequence nesting accepted before the file is rejected
pub const MAX_SEQUENCE_DEPTH: usize = 64;

/// Result of parsing a Part 10 buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    pub dataset: Dataset,
    /// Location of the top-level Pixel Data value, if present
    pub pixel_data: Option<PixelDataRef>,
    pub transfer_syntax: TransferSyntax,
}

impl ParsedFile {
    /// Borrow the pixel bytes out of the buffer this file was parsed from
    #[must_use]
    pub fn pixel_bytes<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        self.pixel_data.and_then(|p| p.slice(buf))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VrEncoding {
    Explicit,
    Implicit,
}

#[derive(Debug, Clone, Copy)]
struct Header {
    tag: Tag,
    vr: Vr,
    length: u32,
}

/// Check the preamble and "DICM" signature
#[must_use]
pub fn has_dicom_signature(buf: &[u8]) -> bool {
    buf.len() >= PREAMBLE_LENGTH + MAGIC.len()
        && &buf[PREAMBLE_LENGTH..PREAMBLE_LENGTH + MAGIC.len()] == MAGIC
}

/// Parse a complete Part 10 file held in memory
pub fn parse_dicom(buf: &[u8]) -> Result<ParsedFile, ParseError> {
    if !has_dicom_signature(buf) {
        return Err(ParseError::InvalidFormat);
    }

    let mut reader = ByteReader::at(buf, PREAMBLE_LENGTH + MAGIC.len());
    let mut dataset = Dataset::new();
    let mut pixel_data = None;

    // File Meta Information is always explicit VR little endian
    while reader.remaining() >= 4 && reader.peek_tag()?.is_file_meta() {
        read_element(&mut reader, VrEncoding::Explicit, &mut dataset, &mut pixel_data, 0)?;
    }

    let transfer_syntax = match dataset.string(tags::TRANSFER_SYNTAX_UID) {
        Some(uid) => TransferSyntax::from_uid(uid),
        None => {
            debug!("No transfer syntax declared, assuming explicit VR little endian");
            TransferSyntax::explicit_vr_little_endian()
        }
    };

    if !transfer_syntax.is_supported() {
        return Err(ParseError::UnsupportedTransferSyntax {
            uid: transfer_syntax.uid,
            name: transfer_syntax.name,
        });
    }

    let encoding = if transfer_syntax.is_implicit_vr() {
        VrEncoding::Implicit
    } else {
        VrEncoding::Explicit
    };

    while !reader.is_empty() {
        read_element(&mut reader, encoding, &mut dataset, &mut pixel_data, 0)?;
    }

    debug!(
        elements = dataset.len(),
        transfer_syntax = %transfer_syntax,
        has_pixel_data = pixel_data.is_some(),
        "Parsed DICOM data set"
    );

    Ok(ParsedFile {
        dataset,
        pixel_data,
        transfer_syntax,
    })
}

fn read_header(reader: &mut ByteReader<'_>, encoding: VrEncoding) -> Result<Header, ParseError> {
    let offset = reader.position();
    let tag = reader.read_tag()?;

    // Items and delimiters carry no VR in either encoding
    if tag.group == 0xFFFE {
        let length = reader.read_u32()?;
        return Ok(Header { tag, vr: Vr::UN, length });
    }

    match encoding {
        VrEncoding::Implicit => {
            let length = reader.read_u32()?;
            Ok(Header {
                tag,
                vr: dictionary::implicit_vr(tag),
                length,
            })
        }
        VrEncoding::Explicit => {
            let vr_bytes = reader.read_vr_bytes()?;
            let vr = Vr::from_bytes(vr_bytes).ok_or(ParseError::UnknownVr { tag, offset })?;
            let length = if vr.has_long_length() {
                reader.skip(2)?;
                reader.read_u32()?
            } else {
                u32::from(reader.read_u16()?)
            };
            Ok(Header { tag, vr, length })
        }
    }
}

fn read_element(
    reader: &mut ByteReader<'_>,
    encoding: VrEncoding,
    dataset: &mut Dataset,
    pixel_data: &mut Option<PixelDataRef>,
    depth: usize,
) -> Result<(), ParseError> {
    let header = read_header(reader, encoding)?;

    if header.tag == tags::PIXEL_DATA && depth == 0 {
        *pixel_data = Some(locate_pixel_data(reader, header)?);
        return Ok(());
    }

    let value = if header.vr == Vr::SQ {
        Value::Sequence(read_sequence(reader, encoding, header.length, depth + 1)?)
    } else if header.length == UNDEFINED_LENGTH {
        if header.vr == Vr::UN {
            // UN of undefined length is a sequence encoded as implicit VR
            Value::Sequence(read_sequence(reader, VrEncoding::Implicit, header.length, depth + 1)?)
        } else {
            let start = reader.position();
            let end = skip_fragments(reader)?;
            Value::Bytes(reader.buffer()[start..end].to_vec())
        }
    } else {
        reader.read_value(header.vr, header.length as usize)?
    };

    dataset.insert(header.tag, header.vr, value);
    Ok(())
}

fn read_sequence(
    reader: &mut ByteReader<'_>,
    encoding: VrEncoding,
    length: u32,
    depth: usize,
) -> Result<Vec<Dataset>, ParseError> {
    if depth > MAX_SEQUENCE_DEPTH {
        return Err(ParseError::NestingTooDeep {
            offset: reader.position(),
            max: MAX_SEQUENCE_DEPTH,
        });
    }
    let mut items = Vec::new();
    let end = defined_end(reader, length)?;

    loop {
        match end {
            Some(end) if reader.position() >= end => break,
            None if reader.is_empty() => {
                return Err(ParseError::TruncatedData {
                    offset: reader.position(),
                    needed: 8,
                    available: 0,
                });
            }
            _ => {}
        }

        let header = read_header(reader, encoding)?;
        match header.tag {
            tags::ITEM => items.push(read_item(reader, encoding, header.length, depth)?),
            tags::SEQUENCE_DELIMITATION_ITEM => break,
            _ => {
                // Stray element between items
                debug!(tag = %header.tag, "Skipping unexpected element in sequence");
                if header.length != UNDEFINED_LENGTH {
                    reader.skip(header.length as usize)?;
                }
            }
        }
    }

    Ok(items)
}

fn read_item(
    reader: &mut ByteReader<'_>,
    encoding: VrEncoding,
    length: u32,
    depth: usize,
) -> Result<Dataset, ParseError> {
    let mut item = Dataset::new();
    let mut nested_pixel_data = None;
    let end = defined_end(reader, length)?;

    loop {
        match end {
            Some(end) if reader.position() >= end => break,
            Some(_) => {}
            None => {
                if reader.peek_tag()? == tags::ITEM_DELIMITATION_ITEM {
                    reader.skip(8)?;
                    break;
                }
            }
        }
        read_element(reader, encoding, &mut item, &mut nested_pixel_data, depth)?;
    }

    Ok(item)
}

/// Absolute end offset of a defined-length value, checked against the buffer
fn defined_end(reader: &ByteReader<'_>, length: u32) -> Result<Option<usize>, ParseError> {
    if length == UNDEFINED_LENGTH {
        return Ok(None);
    }
    let length = length as usize;
    if length > reader.remaining() {
        return Err(ParseError::TruncatedData {
            offset: reader.position(),
            needed: length,
            available: reader.remaining(),
        });
    }
    Ok(Some(reader.position() + length))
}

/// Skip items up to and including the sequence delimiter. Returns the
/// offset of the delimiter, i.e. the end of the fragment data.
fn skip_fragments(reader: &mut ByteReader<'_>) -> Result<usize, ParseError> {
    loop {
        let position = reader.position();
        let tag = reader.read_tag()?;
        let length = reader.read_u32()?;
        match tag {
            tags::SEQUENCE_DELIMITATION_ITEM => return Ok(position),
            _ if length == UNDEFINED_LENGTH => return Err(ParseError::InvalidFormat),
            _ => reader.skip(length as usize)?,
        }
    }
}

fn locate_pixel_data(
    reader: &mut ByteReader<'_>,
    header: Header,
) -> Result<PixelDataRef, ParseError> {
    let offset = reader.position();

    if header.length == UNDEFINED_LENGTH {
        let end = skip_fragments(reader)?;
        return Ok(PixelDataRef {
            offset,
            length: end - offset,
            vr: header.vr,
            encapsulated: true,
        });
    }

    let length = header.length as usize;
    reader.skip(length)?;
    Ok(PixelDataRef {
        offset,
        length,
        vr: header.vr,
        encapsulated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::testing::DicomBuilder;
    use crate::types::IMPLICIT_VR_LITTLE_ENDIAN;
    use assert_matches::assert_matches;

    #[test]
    fn minimal_file_parses_to_empty_dataset() {
        let mut buf = vec![0u8; 128];
        buf.extend_from_slice(b"DICM");

        let parsed = parse_dicom(&buf).unwrap();
        assert!(parsed.dataset.is_empty());
        assert!(parsed.pixel_data.is_none());
        assert_eq!(parsed.transfer_syntax.uid, "1.2.840.10008.1.2.1");
    }

    #[test]
    fn rejects_missing_signature() {
        assert_matches!(parse_dicom(&[0u8; 64]), Err(ParseError::InvalidFormat));

        let mut buf = vec![0u8; 128];
        buf.extend_from_slice(b"DICN");
        assert_matches!(parse_dicom(&buf), Err(ParseError::InvalidFormat));
    }

    #[test]
    fn parses_explicit_vr_elements() {
        let buf = DicomBuilder::new()
            .str(tags::PATIENT_NAME, Vr::PN, "Doe^John")
            .str(tags::MODALITY, Vr::CS, "CT")
            .u16(tags::ROWS, 2)
            .u16(tags::COLUMNS, 3)
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        let ds = &parsed.dataset;
        assert_eq!(ds.string(tags::PATIENT_NAME), Some("Doe^John"));
        assert_eq!(ds.string(tags::MODALITY), Some("CT"));
        assert_eq!(ds.value(tags::ROWS), Some(&Value::Int(vec![2])));
        assert_eq!(ds.get(tags::COLUMNS).unwrap().vr, Vr::US);
        assert!(ds.contains(tags::TRANSFER_SYNTAX_UID));
    }

    #[test]
    fn parses_implicit_vr_body() {
        let buf = DicomBuilder::new()
            .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN)
            .str(tags::PATIENT_ID, Vr::LO, "12345")
            .u16(tags::BITS_ALLOCATED, 16)
            .str(Tag::new(0x0009, 0x1001), Vr::LO, "private")
            .pixel_data(Vr::OW, &[1, 0, 2, 0])
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        assert!(parsed.transfer_syntax.is_implicit_vr());
        assert_eq!(parsed.dataset.string(tags::PATIENT_ID), Some("12345"));
        assert_eq!(
            parsed.dataset.value(tags::BITS_ALLOCATED),
            Some(&Value::Int(vec![16]))
        );
        // Unknown tags are kept as raw bytes
        assert_eq!(
            parsed.dataset.get(Tag::new(0x0009, 0x1001)).unwrap().value,
            Value::Bytes(b"private ".to_vec())
        );
        assert_eq!(parsed.pixel_bytes(&buf), Some(&[1u8, 0, 2, 0][..]));
    }

    #[test]
    fn pixel_data_is_referenced_not_copied() {
        let pixels: Vec<u8> = (0..16).collect();
        let buf = DicomBuilder::new()
            .u16(tags::ROWS, 4)
            .pixel_data(Vr::OB, &pixels)
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        let reference = parsed.pixel_data.unwrap();
        assert_eq!(reference.length, 16);
        assert!(!reference.encapsulated);
        assert_eq!(&buf[reference.offset..reference.offset + 16], &pixels[..]);
        assert!(!parsed.dataset.contains(tags::PIXEL_DATA));
    }

    #[test]
    fn rejects_compressed_transfer_syntax() {
        let buf = DicomBuilder::new()
            .transfer_syntax("1.2.840.10008.1.2.4.50")
            .build();

        assert_matches!(
            parse_dicom(&buf),
            Err(ParseError::UnsupportedTransferSyntax { uid, .. }) if uid == "1.2.840.10008.1.2.4.50"
        );
    }

    #[test]
    fn truncated_value_is_reported() {
        let mut buf = DicomBuilder::new()
            .str(tags::PATIENT_NAME, Vr::PN, "Doe^John")
            .build();
        // Drop the last bytes of the patient name value
        buf.truncate(buf.len() - 3);

        assert_matches!(parse_dicom(&buf), Err(ParseError::TruncatedData { .. }));
    }

    #[test]
    fn oversized_pixel_length_is_truncation() {
        let mut buf = DicomBuilder::new().pixel_data(Vr::OW, &[0; 8]).build();
        buf.truncate(buf.len() - 4);
        assert_matches!(parse_dicom(&buf), Err(ParseError::TruncatedData { .. }));
    }

    #[test]
    fn defined_and_undefined_length_sequences() {
        let item = DicomBuilder::body()
            .str(tags::SOP_INSTANCE_UID, Vr::UI, "1.2.3")
            .u16(tags::ROWS, 8);

        let buf = DicomBuilder::new()
            .sequence(Tag::new(0x0008, 0x1115), &[item.clone()], false)
            .sequence(Tag::new(0x0008, 0x1140), &[item.clone(), item], true)
            .str(tags::MODALITY, Vr::CS, "MR")
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        let ds = &parsed.dataset;

        let Some(Value::Sequence(defined)) = ds.value(Tag::new(0x0008, 0x1115)) else {
            panic!("expected a sequence");
        };
        assert_eq!(defined.len(), 1);
        assert_eq!(defined[0].string(tags::SOP_INSTANCE_UID), Some("1.2.3"));

        let Some(Value::Sequence(undefined)) = ds.value(Tag::new(0x0008, 0x1140)) else {
            panic!("expected a sequence");
        };
        assert_eq!(undefined.len(), 2);
        assert_eq!(undefined[1].value(tags::ROWS), Some(&Value::Int(vec![8])));

        // Parsing resumed after the delimiter
        assert_eq!(ds.string(tags::MODALITY), Some("MR"));
    }

    #[test]
    fn encapsulated_pixel_data_skips_to_delimiter() {
        let buf = DicomBuilder::new()
            .encapsulated_pixel_data(&[&[], &[0xAA; 6]])
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        let reference = parsed.pixel_data.unwrap();
        assert!(reference.encapsulated);
        // Two item headers plus six fragment bytes
        assert_eq!(reference.length, 8 + 8 + 6);
    }

    #[test]
    fn unterminated_sequence_is_truncation() {
        let item = DicomBuilder::body().u16(tags::ROWS, 1);
        let mut buf = DicomBuilder::new()
            .sequence(Tag::new(0x0008, 0x1140), &[item], true)
            .build();
        // Remove the sequence delimiter
        buf.truncate(buf.len() - 8);

        assert_matches!(parse_dicom(&buf), Err(ParseError::TruncatedData { .. }));
    }

    #[test]
    fn parsing_is_deterministic() {
        let buf = DicomBuilder::new()
            .str(tags::PATIENT_NAME, Vr::PN, "Doe^John")
            .ds(tags::RESCALE_SLOPE, "1.5")
            .pixel_data(Vr::OW, &[0; 4])
            .build();

        assert_eq!(parse_dicom(&buf).unwrap(), parse_dicom(&buf).unwrap());
    }

    #[test]
    fn unknown_explicit_vr_is_rejected() {
        let mut buf = DicomBuilder::new().str(tags::MODALITY, Vr::CS, "CT").build();
        let len = buf.len();
        // Overwrite "CS" in the last element header
        buf[len - 2 - 2 - 2] = b'Z';
        buf[len - 2 - 2 - 1] = b'Z';

        assert_matches!(
            parse_dicom(&buf),
            Err(ParseError::UnknownVr { tag, .. }) if tag == tags::MODALITY
        );
    }

    #[test]
    fn implicit_body_types_standard_sequences() {
        let item = DicomBuilder::body()
            .str(tags::REFERENCED_SOP_INSTANCE_UID, Vr::UI, "1.2.3.4.5.6");
        let buf = DicomBuilder::new()
            .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN)
            .sequence(Tag::new(0x0008, 0x1140), &[item], false)
            .build();

        let parsed = parse_dicom(&buf).unwrap();
        let element = parsed.dataset.get(Tag::new(0x0008, 0x1140)).unwrap();
        assert_eq!(element.vr, Vr::SQ);
        let Value::Sequence(items) = &element.value else {
            panic!("expected a sequence, got {:?}", element.value);
        };
        assert_eq!(items[0].string(tags::REFERENCED_SOP_INSTANCE_UID), Some("1.2.3.4.5.6"));
    }

    #[test]
    fn nesting_up_to_the_limit_is_accepted() {
        let tag = Tag::new(0x0008, 0x1140);
        let mut item = DicomBuilder::body().u16(tags::ROWS, 1);
        for _ in 1..MAX_SEQUENCE_DEPTH {
            item = DicomBuilder::body().sequence(tag, &[item], true);
        }
        let buf = DicomBuilder::new().sequence(tag, &[item], true).build();

        assert!(parse_dicom(&buf).is_ok());
    }

    #[test]
    fn deeply_nested_sequences_are_rejected() {
        let mut buf = vec![0u8; 128];
        buf.extend_from_slice(b"DICM");
        for _ in 0..200_000 {
            // (0008,1140) SQ, undefined length
            buf.extend_from_slice(&[0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0, 0]);
            buf.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
            // Item, undefined length
            buf.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
            buf.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
        }

        assert_matches!(
            parse_dicom(&buf),
            Err(ParseError::NestingTooDeep { max: MAX_SEQUENCE_DEPTH, .. })
        );
    }
}
