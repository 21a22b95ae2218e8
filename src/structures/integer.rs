use std::default;

use byteorder::{BigEndian, ByteOrder};

use super::IntoElement;
use crate::common::TagClass;
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Integer value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integer {
    pub id: u64,
    pub class: TagClass,
    pub inner: i64,
}

/// Integer with a different tag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enumerated {
    pub id: u64,
    pub class: TagClass,
    pub inner: i64,
}

/// Number of octets in the minimal two's complement form of `value`.
fn encoded_len(value: i64) -> usize {
    let mut count = 1;
    // The value fits when everything from the sign bit of the last kept
    // octet upwards is a copy of the sign.
    while count < 8 {
        let rest = value >> (8 * count - 1);
        if rest == 0 || rest == -1 {
            break;
        }
        count += 1;
    }
    count
}

/// Minimal big-endian two's complement content octets.
pub fn encode(value: i64) -> Vec<u8> {
    let count = encoded_len(value);
    let mut out = vec![0; count];
    BigEndian::write_int(&mut out, value, count);
    out
}

/// Decode content octets produced by [`encode`](fn.encode.html).
///
/// Empty content, more than eight octets, and redundant leading sign octets
/// are rejected.
pub fn decode(content: &[u8]) -> Result<i64> {
    match content.len() {
        0 => Err(BerError::malformed(EncodedType::Integer, "empty content")),
        1..=8 => {
            if content.len() > 1 {
                let redundant = (content[0] == 0x00 && content[1] & 0x80 == 0)
                    || (content[0] == 0xff && content[1] & 0x80 != 0);
                if redundant {
                    return Err(BerError::malformed(
                        EncodedType::Integer,
                        "redundant leading octet",
                    ));
                }
            }
            Ok(BigEndian::read_int(content, content.len()))
        }
        _ => Err(BerError::malformed(
            EncodedType::Integer,
            "value exceeds 64 bits",
        )),
    }
}

fn i_e_into_element(id: u64, class: TagClass, encoding: EncodedType, inner: i64) -> Element {
    Element {
        id,
        class,
        encoding,
        payload: Payload::Primitive(encode(inner)),
        offset: None,
    }
}

impl IntoElement for Integer {
    fn into_element(self) -> Element {
        i_e_into_element(self.id, self.class, EncodedType::Integer, self.inner)
    }
}

impl IntoElement for Enumerated {
    fn into_element(self) -> Element {
        i_e_into_element(self.id, self.class, EncodedType::Enumerated, self.inner)
    }
}

impl default::Default for Integer {
    fn default() -> Integer {
        Integer {
            id: Types::Integer as u64,
            class: TagClass::Universal,
            inner: 0i64,
        }
    }
}

impl default::Default for Enumerated {
    fn default() -> Enumerated {
        Enumerated {
            id: Types::Enumerated as u64,
            class: TagClass::Universal,
            inner: 0i64,
        }
    }
}
