//! In-memory data set representation

use std::collections::BTreeMap;
use std::fmt;

use super::vr::Vr;

/// Data element tag (group, element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
}

impl Tag {
    #[must_use]
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Private tags live in odd groups
    #[inline]
    #[must_use]
    pub fn is_private(self) -> bool {
        self.group % 2 == 1
    }

    #[inline]
    #[must_use]
    pub fn is_file_meta(self) -> bool {
        self.group == 0x0002
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

/// Decoded value of a data element
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Character data, with NUL padding removed; multiple values stay
    /// joined by backslashes
    Str(String),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Sequence(Vec<Dataset>),
    Bytes(Vec<u8>),
}

impl Value {
    /// First string value, without surrounding padding
    #[must_use]
    pub fn first_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => s.split('\\').next().map(str::trim),
            _ => None,
        }
    }

    /// First value as an integer, parsing IS strings leniently
    #[must_use]
    pub fn first_int(&self) -> Option<i64> {
        match self {
            Value::Int(values) => values.first().copied(),
            Value::Float(values) => values.first().map(|v| *v as i64),
            Value::Str(_) => self.first_str()?.parse().ok(),
            _ => None,
        }
    }

    /// First value as a float, parsing DS strings leniently
    #[must_use]
    pub fn first_float(&self) -> Option<f64> {
        match self {
            Value::Float(values) => values.first().copied(),
            Value::Int(values) => values.first().map(|v| *v as f64),
            Value::Str(_) => self.first_str()?.parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Str(s) => s.trim().is_empty(),
            Value::Int(v) => v.is_empty(),
            Value::Float(v) => v.is_empty(),
            Value::Sequence(items) => items.is_empty(),
            Value::Bytes(b) => b.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// A single data element: its VR and value
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub vr: Vr,
    pub value: Value,
}

impl Element {
    #[must_use]
    pub fn new(vr: Vr, value: Value) -> Self {
        Self { vr, value }
    }
}

/// Ordered mapping of tags to elements; at most one element per tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    elements: BTreeMap<Tag, Element>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    #[must_use]
    pub fn value(&self, tag: Tag) -> Option<&Value> {
        self.elements.get(&tag).map(|e| &e.value)
    }

    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Insert an element, replacing any previous element with the same tag
    pub fn insert(&mut self, tag: Tag, vr: Vr, value: Value) -> Option<Element> {
        self.elements.insert(tag, Element::new(vr, value))
    }

    pub fn remove(&mut self, tag: Tag) -> Option<Element> {
        self.elements.remove(&tag)
    }

    /// Replace the value of an existing element, keeping its VR
    pub fn replace_value(&mut self, tag: Tag, value: Value) -> bool {
        match self.elements.get_mut(&tag) {
            Some(element) => {
                element.value = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Element)> {
        self.elements.iter().map(|(tag, element)| (*tag, element))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// First string value of a tag, without padding
    #[must_use]
    pub fn string(&self, tag: Tag) -> Option<&str> {
        self.value(tag).and_then(Value::first_str)
    }
}
