use std::default;

use super::IntoElement;
use crate::common::TagClass;
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Null value.
#[derive(Clone, Debug, PartialEq)]
pub struct Null {
    pub id: u64,
    pub class: TagClass,
    pub inner: (),
}

/// End-of-content marker, used as a placeholder for an absent field.
#[derive(Clone, Debug, PartialEq)]
pub struct EndOfContent {
    pub id: u64,
    pub class: TagClass,
    pub inner: (),
}

/// Both null and end-of-content must have empty content.
pub fn decode(kind: EncodedType, content: &[u8]) -> Result<()> {
    if content.is_empty() {
        Ok(())
    } else {
        Err(BerError::malformed(kind, "content is not empty"))
    }
}

fn empty_element(id: u64, class: TagClass, encoding: EncodedType) -> Element {
    Element {
        id,
        class,
        encoding,
        payload: Payload::Primitive(Vec::new()),
        offset: None,
    }
}

impl IntoElement for Null {
    fn into_element(self) -> Element {
        empty_element(self.id, self.class, EncodedType::Null)
    }
}

impl IntoElement for EndOfContent {
    fn into_element(self) -> Element {
        empty_element(self.id, self.class, EncodedType::EndOfContent)
    }
}

impl default::Default for Null {
    fn default() -> Self {
        Null {
            id: Types::Null as u64,
            class: TagClass::Universal,
            inner: (),
        }
    }
}

impl default::Default for EndOfContent {
    fn default() -> Self {
        EndOfContent {
            id: Types::EndOfContent as u64,
            class: TagClass::Universal,
            inner: (),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn null_with_content_is_malformed() {
        let mut elem = Null::default().into_element();
        assert_eq!(elem.as_null(), Ok(()));
        elem.payload = Payload::Primitive(vec![0]);
        assert!(matches!(
            elem.as_null(),
            Err(BerError::MalformedValue { .. })
        ));
    }

    #[test]
    fn end_of_content_is_not_null() {
        let eoc = EndOfContent::default().into_element();
        assert_eq!(eoc.as_end_of_content(), Ok(()));
        assert!(eoc.as_null().is_err());
    }
}
