//! Parts of the identifier octet shared by the reader and the writer.
//!
//! The first header octet of every element packs three fields:
//!
//! ```text
//!  7 6   5   4 3 2 1 0
//! +---+-----+---------+
//! |cls| p/c |  tag nr |
//! +---+-----+---------+
//! ```
//!
//! A tag number field of all ones announces a long-form number in the
//! following octets.

use std::fmt;

/// Primitive/constructed bit of the identifier octet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TagStructure {
    Primitive = 0,
    Constructed = 1,
}

impl TagStructure {
    pub fn from_u8(n: u8) -> Option<TagStructure> {
        match n {
            0 => Some(TagStructure::Primitive),
            1 => Some(TagStructure::Constructed),
            _ => None,
        }
    }
}

impl fmt::Display for TagStructure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TagStructure::Primitive => "primitive element",
            TagStructure::Constructed => "constructed element",
        })
    }
}

/// Tag class, the two high bits of the identifier octet.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TagClass {
    Universal = 0,
    Application = 1,
    Context = 2,
    Private = 3,
}

impl TagClass {
    pub fn from_u8(n: u8) -> Option<TagClass> {
        match n {
            0 => Some(TagClass::Universal),
            1 => Some(TagClass::Application),
            2 => Some(TagClass::Context),
            3 => Some(TagClass::Private),
            _ => None,
        }
    }
}

/// Tags print in ASN.1 notation: `[APPLICATION 3]`, `[5]` for the
/// context class.
pub struct Tag(pub TagClass, pub u64);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            TagClass::Universal => write!(f, "[UNIVERSAL {}]", self.1),
            TagClass::Application => write!(f, "[APPLICATION {}]", self.1),
            TagClass::Context => write!(f, "[{}]", self.1),
            TagClass::Private => write!(f, "[PRIVATE {}]", self.1),
        }
    }
}

/// Largest tag number representable in four continuation octets.
pub const MAX_TAG_NUMBER: u64 = (1 << 28) - 1;

/// Low five bits of the identifier octet announcing a long-form tag number.
pub const LONG_FORM_TAG: u8 = 0x1f;

/// Assemble an identifier octet. `low` must fit in five bits.
pub fn identifier_octet(class: TagClass, structure: TagStructure, low: u8) -> u8 {
    (class as u8) << 6 | (structure as u8) << 5 | (low & LONG_FORM_TAG)
}
