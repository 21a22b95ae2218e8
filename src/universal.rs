//! Universal tag numbers and the semantic type derived from them.

use std::fmt;

use crate::common::{TagClass, TagStructure};

/// Universal class tag numbers (X.680).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Types {
    EndOfContent = 0,
    Boolean = 1,
    Integer = 2,
    BitString = 3,
    OctetString = 4,
    Null = 5,
    ObjectIdentifier = 6,
    ObjectDescriptor = 7,
    External = 8,
    Real = 9,
    Enumerated = 10,
    EmbeddedPDV = 11,
    Utf8String = 12,
    RelativeOid = 13,
    Sequence = 16,
    Set = 17,
    NumericString = 18,
    PrintableString = 19,
    T61String = 20,
    VideotexString = 21,
    Ia5String = 22,
    UtcTime = 23,
    GeneralizedTime = 24,
    GraphicString = 25,
    VisibleString = 26,
    GeneralString = 27,
    UniversalString = 28,
    CharacterString = 29,
    BmpString = 30,
}

/// Semantic type of an element, used by the value accessors.
///
/// For universal elements this follows from the tag number. Anything in the
/// other three classes is `ApplicationDefined` unless the element was built
/// with a tag override, in which case it keeps the type it was built as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodedType {
    EndOfContent,
    Boolean,
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Enumerated,
    Sequence,
    Set,
    ApplicationDefined,
    /// A universal tag number without an accessor in this crate.
    Other(u64),
}

impl EncodedType {
    /// Derive the conventional type of an element from its header.
    pub fn derive(class: TagClass, id: u64) -> EncodedType {
        if class != TagClass::Universal {
            return EncodedType::ApplicationDefined;
        }
        match id {
            0 => EncodedType::EndOfContent,
            1 => EncodedType::Boolean,
            2 => EncodedType::Integer,
            3 => EncodedType::BitString,
            4 => EncodedType::OctetString,
            5 => EncodedType::Null,
            6 => EncodedType::ObjectIdentifier,
            10 => EncodedType::Enumerated,
            16 => EncodedType::Sequence,
            17 => EncodedType::Set,
            n => EncodedType::Other(n),
        }
    }

    /// Universal tag number this type is written with when no override applies.
    pub fn universal_id(self) -> Option<u64> {
        let t = match self {
            EncodedType::EndOfContent => Types::EndOfContent,
            EncodedType::Boolean => Types::Boolean,
            EncodedType::Integer => Types::Integer,
            EncodedType::BitString => Types::BitString,
            EncodedType::OctetString => Types::OctetString,
            EncodedType::Null => Types::Null,
            EncodedType::ObjectIdentifier => Types::ObjectIdentifier,
            EncodedType::Enumerated => Types::Enumerated,
            EncodedType::Sequence => Types::Sequence,
            EncodedType::Set => Types::Set,
            EncodedType::Other(n) => return Some(n),
            EncodedType::ApplicationDefined => return None,
        };
        Some(t as u64)
    }

    /// Whether elements of this type carry children.
    pub fn structure(self) -> TagStructure {
        match self {
            EncodedType::Sequence | EncodedType::Set => TagStructure::Constructed,
            _ => TagStructure::Primitive,
        }
    }
}

impl fmt::Display for EncodedType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodedType::EndOfContent => write!(f, "end-of-content"),
            EncodedType::Boolean => write!(f, "boolean"),
            EncodedType::Integer => write!(f, "integer"),
            EncodedType::BitString => write!(f, "bit string"),
            EncodedType::OctetString => write!(f, "octet string"),
            EncodedType::Null => write!(f, "null"),
            EncodedType::ObjectIdentifier => write!(f, "object identifier"),
            EncodedType::Enumerated => write!(f, "enumerated"),
            EncodedType::Sequence => write!(f, "sequence"),
            EncodedType::Set => write!(f, "set"),
            EncodedType::ApplicationDefined => write!(f, "application-defined"),
            EncodedType::Other(n) => write!(f, "universal type {}", n),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn derive_universal() {
        assert_eq!(EncodedType::derive(TagClass::Universal, 2), EncodedType::Integer);
        assert_eq!(EncodedType::derive(TagClass::Universal, 17), EncodedType::Set);
        assert_eq!(
            EncodedType::derive(TagClass::Universal, Types::Utf8String as u64),
            EncodedType::Other(12)
        );
    }

    #[test]
    fn derive_non_universal_is_opaque() {
        assert_eq!(
            EncodedType::derive(TagClass::Context, 2),
            EncodedType::ApplicationDefined
        );
        assert_eq!(EncodedType::ApplicationDefined.universal_id(), None);
    }
}
