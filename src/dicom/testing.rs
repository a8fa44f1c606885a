//! Synthetic Part 10 buffers for tests

use super::dataset::Tag;
use super::dictionary::tags;
use super::vr::Vr;
use crate::types::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN};

#[derive(Debug, Clone)]
enum Part {
    Element { tag: Tag, vr: Vr, value: Vec<u8> },
    Sequence { tag: Tag, items: Vec<DicomBuilder>, undefined: bool },
    Encapsulated { fragments: Vec<Vec<u8>> },
}

#[derive(Debug, Clone)]
pub struct DicomBuilder {
    transfer_syntax: String,
    with_meta: bool,
    parts: Vec<Part>,
}

impl DicomBuilder {
    /// A complete file: preamble, signature, meta group and body
    pub fn new() -> Self {
        Self {
            transfer_syntax: EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
            with_meta: true,
            parts: Vec::new(),
        }
    }

    /// Bare elements, used as sequence item content
    pub fn body() -> Self {
        Self {
            with_meta: false,
            ..Self::new()
        }
    }

    pub fn transfer_syntax(mut self, uid: &str) -> Self {
        self.transfer_syntax = uid.to_string();
        self
    }

    pub fn raw(mut self, tag: Tag, vr: Vr, value: &[u8]) -> Self {
        let mut value = value.to_vec();
        if value.len() % 2 == 1 {
            value.push(vr.padding());
        }
        self.parts.push(Part::Element { tag, vr, value });
        self
    }

    pub fn str(self, tag: Tag, vr: Vr, value: &str) -> Self {
        self.raw(tag, vr, value.as_bytes())
    }

    pub fn ds(self, tag: Tag, value: &str) -> Self {
        self.str(tag, Vr::DS, value)
    }

    pub fn u16(self, tag: Tag, value: u16) -> Self {
        self.raw(tag, Vr::US, &value.to_le_bytes())
    }

    pub fn pixel_data(self, vr: Vr, bytes: &[u8]) -> Self {
        self.raw(tags::PIXEL_DATA, vr, bytes)
    }

    pub fn encapsulated_pixel_data(mut self, fragments: &[&[u8]]) -> Self {
        self.parts.push(Part::Encapsulated {
            fragments: fragments.iter().map(|f| f.to_vec()).collect(),
        });
        self
    }

    pub fn sequence(mut self, tag: Tag, items: &[DicomBuilder], undefined: bool) -> Self {
        self.parts.push(Part::Sequence {
            tag,
            items: items.to_vec(),
            undefined,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let implicit = self.transfer_syntax == IMPLICIT_VR_LITTLE_ENDIAN;
        let body = self.encode_body(implicit);
        if !self.with_meta {
            return body;
        }

        let mut meta_elements = Vec::new();
        let mut uid = self.transfer_syntax.as_bytes().to_vec();
        if uid.len() % 2 == 1 {
            uid.push(0);
        }
        write_header(&mut meta_elements, tags::TRANSFER_SYNTAX_UID, Vr::UI, uid.len() as u32, false);
        meta_elements.extend_from_slice(&uid);

        let mut out = vec![0u8; 128];
        out.extend_from_slice(b"DICM");
        write_header(&mut out, tags::FILE_META_INFORMATION_GROUP_LENGTH, Vr::UL, 4, false);
        out.extend_from_slice(&(meta_elements.len() as u32).to_le_bytes());
        out.extend_from_slice(&meta_elements);
        out.extend_from_slice(&body);
        out
    }

    fn encode_body(&self, implicit: bool) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            match part {
                Part::Element { tag, vr, value } => {
                    write_header(&mut out, *tag, *vr, value.len() as u32, implicit);
                    out.extend_from_slice(value);
                }
                Part::Sequence { tag, items, undefined } => {
                    let encoded: Vec<Vec<u8>> =
                        items.iter().map(|item| item.encode_body(implicit)).collect();
                    if *undefined {
                        write_header(&mut out, *tag, Vr::SQ, u32::MAX, implicit);
                        for item in encoded {
                            write_delimiter(&mut out, tags::ITEM, u32::MAX);
                            out.extend_from_slice(&item);
                            write_delimiter(&mut out, tags::ITEM_DELIMITATION_ITEM, 0);
                        }
                        write_delimiter(&mut out, tags::SEQUENCE_DELIMITATION_ITEM, 0);
                    } else {
                        let length: usize = encoded.iter().map(|item| item.len() + 8).sum();
                        write_header(&mut out, *tag, Vr::SQ, length as u32, implicit);
                        for item in encoded {
                            write_delimiter(&mut out, tags::ITEM, item.len() as u32);
                            out.extend_from_slice(&item);
                        }
                    }
                }
                Part::Encapsulated { fragments } => {
                    write_header(&mut out, tags::PIXEL_DATA, Vr::OB, u32::MAX, implicit);
                    for fragment in fragments {
                        write_delimiter(&mut out, tags::ITEM, fragment.len() as u32);
                        out.extend_from_slice(fragment);
                    }
                    write_delimiter(&mut out, tags::SEQUENCE_DELIMITATION_ITEM, 0);
                }
            }
        }
        out
    }
}

fn write_header(out: &mut Vec<u8>, tag: Tag, vr: Vr, length: u32, implicit: bool) {
    out.extend_from_slice(&tag.group.to_le_bytes());
    out.extend_from_slice(&tag.element.to_le_bytes());
    if implicit {
        out.extend_from_slice(&length.to_le_bytes());
    } else if vr.has_long_length() {
        out.extend_from_slice(vr.as_str().as_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&length.to_le_bytes());
    } else {
        out.extend_from_slice(vr.as_str().as_bytes());
        out.extend_from_slice(&(length as u16).to_le_bytes());
    }
}

fn write_delimiter(out: &mut Vec<u8>, tag: Tag, length: u32) {
    out.extend_from_slice(&tag.group.to_le_bytes());
    out.extend_from_slice(&tag.element.to_le_bytes());
    out.extend_from_slice(&length.to_le_bytes());
}
