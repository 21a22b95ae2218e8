use std::default;
use std::str;

use super::IntoElement;
use crate::common::TagClass;
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Octet string value.
#[derive(Clone, Debug, PartialEq)]
pub struct OctetString {
    pub id: u64,
    pub class: TagClass,
    pub inner: Vec<u8>,
}

/// Bit string value.
///
/// The content is kept exactly as given, including the leading unused-bits
/// octet if the producer wrote one; nothing distinguishes it from an octet
/// string except the tag. Use [`bit_string_parts`](fn.bit_string_parts.html)
/// to read the content the X.690 way.
#[derive(Clone, Debug, PartialEq)]
pub struct BitString {
    pub id: u64,
    pub class: TagClass,
    pub inner: Vec<u8>,
}

/// Octet string content as text.
pub fn decode_str(content: &[u8]) -> Result<&str> {
    str::from_utf8(content)
        .map_err(|_| BerError::malformed(EncodedType::OctetString, "content is not UTF-8"))
}

/// Split bit string content into the unused-bits count and the bit octets.
///
/// Returns `None` when the content doesn't follow X.690 8.6: empty, a count
/// above seven, or unused bits declared without any bit octets.
pub fn bit_string_parts(content: &[u8]) -> Option<(u8, &[u8])> {
    match content.split_first() {
        Some((&unused, bits)) if unused <= 7 && (unused == 0 || !bits.is_empty()) => {
            Some((unused, bits))
        }
        _ => None,
    }
}

fn string_element(id: u64, class: TagClass, encoding: EncodedType, inner: Vec<u8>) -> Element {
    Element {
        id,
        class,
        encoding,
        payload: Payload::Primitive(inner),
        offset: None,
    }
}

impl IntoElement for OctetString {
    fn into_element(self) -> Element {
        string_element(self.id, self.class, EncodedType::OctetString, self.inner)
    }
}

impl IntoElement for BitString {
    fn into_element(self) -> Element {
        string_element(self.id, self.class, EncodedType::BitString, self.inner)
    }
}

impl default::Default for OctetString {
    fn default() -> Self {
        OctetString {
            id: Types::OctetString as u64,
            class: TagClass::Universal,
            inner: Vec::new(),
        }
    }
}

impl default::Default for BitString {
    fn default() -> Self {
        BitString {
            id: Types::BitString as u64,
            class: TagClass::Universal,
            inner: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_content() {
        assert_eq!(decode_str(b"cn=admin"), Ok("cn=admin"));
        assert!(decode_str(&[0xc3, 0x28]).is_err());
    }

    #[test]
    fn bit_string_as_opaque_octets() {
        let elem = BitString {
            inner: vec![0xde, 0xad, 0xbe, 0xef],
            ..Default::default()
        }
        .into_element();
        assert_eq!(elem.as_bit_string(), Ok(&[0xde, 0xad, 0xbe, 0xef][..]));
    }

    #[test]
    fn bit_string_with_unused_bits_octet() {
        // 0xde can't be an unused-bits count, so this content only makes
        // sense under the opaque interpretation.
        assert_eq!(bit_string_parts(&[0xde, 0xad, 0xbe, 0xef]), None);
        assert_eq!(
            bit_string_parts(&[0x04, 0xad, 0xb0]),
            Some((4, &[0xad, 0xb0][..]))
        );
        assert_eq!(bit_string_parts(&[0x00]), Some((0, &[][..])));
        assert_eq!(bit_string_parts(&[0x03]), None);
        assert_eq!(bit_string_parts(&[]), None);
    }
}
