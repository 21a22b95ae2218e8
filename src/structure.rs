//! The element tree.

use crate::common::{Tag, TagClass, TagStructure, MAX_TAG_NUMBER};
use crate::error::{BerError, Result};
use crate::structures::{boolean, integer, null, octetstring, oid, Oid};
use crate::universal::EncodedType;
use crate::write;

/// Content of an element: raw value octets, or ordered children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Primitive(Vec<u8>),
    Constructed(Vec<Element>),
}

/// One TLV unit, with its subtree.
///
/// Elements produced by the reader carry the offset of their content within
/// the source buffer. Equality compares only what ends up on the wire: class,
/// tag number, structure and payload. The offset and the encoded-type
/// annotation are ignored, so a tree compares equal to its own read-back.
#[derive(Clone, Debug)]
pub struct Element {
    pub class: TagClass,
    pub id: u64,
    pub encoding: EncodedType,
    pub payload: Payload,
    pub offset: Option<usize>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Element) -> bool {
        self.class == other.class && self.id == other.id && self.payload == other.payload
    }
}

impl Eq for Element {}

impl Element {
    /// Only called with types that have a universal tag number.
    fn universal(encoding: EncodedType, payload: Payload) -> Element {
        Element {
            class: TagClass::Universal,
            id: encoding.universal_id().unwrap_or(0),
            encoding,
            payload,
            offset: None,
        }
    }

    pub fn boolean(value: bool) -> Element {
        Element::universal(
            EncodedType::Boolean,
            Payload::Primitive(boolean::encode(value)),
        )
    }

    pub fn integer(value: i64) -> Element {
        Element::universal(
            EncodedType::Integer,
            Payload::Primitive(integer::encode(value)),
        )
    }

    pub fn enumerated(value: i64) -> Element {
        Element::universal(
            EncodedType::Enumerated,
            Payload::Primitive(integer::encode(value)),
        )
    }

    pub fn octet_string<V: Into<Vec<u8>>>(value: V) -> Element {
        Element::universal(EncodedType::OctetString, Payload::Primitive(value.into()))
    }

    pub fn bit_string<V: Into<Vec<u8>>>(value: V) -> Element {
        Element::universal(EncodedType::BitString, Payload::Primitive(value.into()))
    }

    pub fn null() -> Element {
        Element::universal(EncodedType::Null, Payload::Primitive(Vec::new()))
    }

    pub fn end_of_content() -> Element {
        Element::universal(EncodedType::EndOfContent, Payload::Primitive(Vec::new()))
    }

    /// Fails if the identifier can't be encoded (see [`Oid`](../structures/oid/struct.Oid.html)).
    pub fn oid(value: &Oid) -> Result<Element> {
        Ok(Element::universal(
            EncodedType::ObjectIdentifier,
            Payload::Primitive(oid::encode(value)?),
        ))
    }

    pub fn sequence(children: Vec<Element>) -> Element {
        Element::universal(EncodedType::Sequence, Payload::Constructed(children))
    }

    pub fn set(children: Vec<Element>) -> Element {
        Element::universal(EncodedType::Set, Payload::Constructed(children))
    }

    /// Replace class and tag number, keeping the encoded type.
    pub fn with_tag(mut self, class: TagClass, id: u64) -> Element {
        self.class = class;
        self.id = id;
        self
    }

    pub fn structure(&self) -> TagStructure {
        match self.payload {
            Payload::Primitive(_) => TagStructure::Primitive,
            Payload::Constructed(_) => TagStructure::Constructed,
        }
    }

    pub fn is_constructed(&self) -> bool {
        self.structure() == TagStructure::Constructed
    }

    pub fn match_class(self, class: TagClass) -> Option<Self> {
        if self.class == class {
            Some(self)
        } else {
            None
        }
    }

    pub fn match_id(self, id: u64) -> Option<Self> {
        if self.id == id {
            Some(self)
        } else {
            None
        }
    }

    pub fn expect_constructed(self) -> Option<Vec<Element>> {
        match self.payload {
            Payload::Primitive(_) => None,
            Payload::Constructed(children) => Some(children),
        }
    }

    pub fn expect_primitive(self) -> Option<Vec<u8>> {
        match self.payload {
            Payload::Primitive(content) => Some(content),
            Payload::Constructed(_) => None,
        }
    }

    /// Children of a constructed element, empty for a primitive one.
    pub fn children(&self) -> &[Element] {
        match self.payload {
            Payload::Primitive(_) => &[],
            Payload::Constructed(ref children) => children,
        }
    }

    /// Append a child to a constructed element.
    pub fn push(&mut self, child: Element) -> Result<()> {
        match self.payload {
            Payload::Constructed(ref mut children) => {
                children.push(child);
                Ok(())
            }
            Payload::Primitive(_) => Err(BerError::mismatch(
                TagStructure::Constructed,
                TagStructure::Primitive,
            )),
        }
    }

    /// Check that every tag number in the subtree fits the long form the
    /// reader accepts.
    pub fn check_tags(&self) -> Result<()> {
        let mut pending = vec![self];
        while let Some(elem) = pending.pop() {
            if elem.id > MAX_TAG_NUMBER {
                return Err(BerError::InvalidArgument(format!(
                    "tag number of {} exceeds {}",
                    Tag(elem.class, elem.id),
                    MAX_TAG_NUMBER
                )));
            }
            pending.extend(elem.children());
        }
        Ok(())
    }

    /// Header plus content length, as written.
    pub fn calc_total_length(&self) -> usize {
        write::calc_total_length(self)
    }

    /// Content octets of a primitive element of the given type.
    pub fn content_of(&self, expected: EncodedType) -> Result<&[u8]> {
        if self.encoding != expected {
            return Err(BerError::mismatch(expected, self.encoding));
        }
        self.primitive_content()
    }

    /// Content octets of a primitive element, regardless of its type.
    pub fn primitive_content(&self) -> Result<&[u8]> {
        match self.payload {
            Payload::Primitive(ref content) => Ok(content),
            Payload::Constructed(_) => Err(BerError::mismatch(
                TagStructure::Primitive,
                TagStructure::Constructed,
            )),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        boolean::decode(self.content_of(EncodedType::Boolean)?)
    }

    pub fn as_integer(&self) -> Result<i64> {
        integer::decode(self.content_of(EncodedType::Integer)?)
    }

    pub fn as_enumerated(&self) -> Result<i64> {
        integer::decode(self.content_of(EncodedType::Enumerated)?)
    }

    pub fn as_octets(&self) -> Result<&[u8]> {
        self.content_of(EncodedType::OctetString)
    }

    /// Octet string content as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        octetstring::decode_str(self.as_octets()?)
    }

    /// Raw bit string content, unused-bits octet included.
    pub fn as_bit_string(&self) -> Result<&[u8]> {
        self.content_of(EncodedType::BitString)
    }

    pub fn as_null(&self) -> Result<()> {
        null::decode(EncodedType::Null, self.content_of(EncodedType::Null)?)
    }

    pub fn as_end_of_content(&self) -> Result<()> {
        null::decode(
            EncodedType::EndOfContent,
            self.content_of(EncodedType::EndOfContent)?,
        )
    }

    pub fn as_oid(&self) -> Result<Oid> {
        oid::decode(self.content_of(EncodedType::ObjectIdentifier)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equality_ignores_offset_and_annotation() {
        let mut read = Element::octet_string("cn").with_tag(TagClass::Context, 0);
        read.encoding = EncodedType::ApplicationDefined;
        read.offset = Some(2);
        let built = Element::octet_string("cn").with_tag(TagClass::Context, 0);
        assert_eq!(read, built);
        assert_ne!(built, Element::octet_string("cn"));
    }

    #[test]
    fn accessor_checks_type() {
        let elem = Element::integer(99);
        assert_eq!(elem.as_integer(), Ok(99));
        assert!(matches!(
            elem.as_octets(),
            Err(BerError::TypeMismatch { .. })
        ));
        assert!(matches!(
            Element::sequence(vec![]).as_integer(),
            Err(BerError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn integer_and_enumerated_are_distinct() {
        assert_eq!(Element::enumerated(2).as_enumerated(), Ok(2));
        assert!(matches!(
            Element::enumerated(2).as_integer(),
            Err(BerError::TypeMismatch { .. })
        ));
        assert!(Element::integer(2).as_enumerated().is_err());
    }

    #[test]
    fn tag_range_is_checked_through_the_subtree() {
        let ok = Element::sequence(vec![Element::null().with_tag(TagClass::Private, MAX_TAG_NUMBER)]);
        assert_eq!(ok.check_tags(), Ok(()));
        let deep = Element::sequence(vec![Element::sequence(vec![
            Element::null().with_tag(TagClass::Context, 1 << 40),
        ])]);
        assert!(matches!(deep.check_tags(), Err(BerError::InvalidArgument(_))));
    }

    #[test]
    fn constructors_carry_universal_numbers() {
        let oid = Oid::from_components([1u32, 2]);
        let built = [
            (Element::end_of_content(), 0),
            (Element::boolean(true), 1),
            (Element::integer(1), 2),
            (Element::bit_string(vec![0x00]), 3),
            (Element::octet_string("a"), 4),
            (Element::null(), 5),
            (Element::oid(&oid).unwrap(), 6),
            (Element::enumerated(1), 10),
            (Element::sequence(vec![]), 16),
            (Element::set(vec![]), 17),
        ];
        for (elem, id) in built.iter() {
            assert_eq!((elem.class, elem.id), (TagClass::Universal, *id), "{:?}", elem.encoding);
            assert_eq!(elem.encoding.universal_id(), Some(*id));
        }
    }

    #[test]
    fn tagged_element_keeps_type() {
        let elem = Element::octet_string("password").with_tag(TagClass::Context, 0);
        assert_eq!(elem.as_str(), Ok("password"));
    }

    #[test]
    fn push_requires_constructed() {
        let mut seq = Element::sequence(vec![]);
        seq.push(Element::null()).unwrap();
        assert_eq!(seq.children().len(), 1);
        assert!(Element::null().push(Element::null()).is_err());
    }

    #[test]
    fn match_and_expect() {
        let children = Element::sequence(vec![Element::integer(1)])
            .match_class(TagClass::Universal)
            .and_then(|t| t.match_id(16))
            .and_then(|t| t.expect_constructed())
            .expect("sequence");
        let content = children
            .into_iter()
            .next()
            .and_then(|t| t.expect_primitive())
            .expect("integer");
        assert_eq!(content, vec![1]);
    }
}
