use std::default;

use super::IntoElement;
use crate::common::TagClass;
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Boolean value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boolean {
    pub id: u64,
    pub class: TagClass,
    pub inner: bool,
}

/// True is always written as 0xFF.
pub fn encode(value: bool) -> Vec<u8> {
    vec![if value { 0xff } else { 0x00 }]
}

/// Any nonzero octet reads as true.
pub fn decode(content: &[u8]) -> Result<bool> {
    match content {
        [octet] => Ok(*octet != 0),
        _ => Err(BerError::malformed(
            EncodedType::Boolean,
            "content is not exactly one octet",
        )),
    }
}

impl IntoElement for Boolean {
    fn into_element(self) -> Element {
        Element {
            id: self.id,
            class: self.class,
            encoding: EncodedType::Boolean,
            payload: Payload::Primitive(encode(self.inner)),
            offset: None,
        }
    }
}

impl default::Default for Boolean {
    fn default() -> Self {
        Boolean {
            id: Types::Boolean as u64,
            class: TagClass::Universal,
            inner: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_true() {
        assert_eq!(encode(true), vec![0xff]);
        assert_eq!(encode(false), vec![0x00]);
    }

    #[test]
    fn lenient_decode() {
        assert_eq!(decode(&[0x01]), Ok(true));
        assert_eq!(decode(&[0x00]), Ok(false));
        assert!(decode(&[]).is_err());
        assert!(decode(&[0xff, 0xff]).is_err());
    }
}
