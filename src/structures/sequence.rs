use std::default;

use super::IntoElement;
use crate::common::TagClass;
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Ordered collection of elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Sequence {
    pub id: u64,
    pub class: TagClass,
    pub inner: Vec<Element>,
}

impl IntoElement for Sequence {
    fn into_element(self) -> Element {
        Element {
            id: self.id,
            class: self.class,
            encoding: EncodedType::Sequence,
            payload: Payload::Constructed(self.inner),
            offset: None,
        }
    }
}

impl default::Default for Sequence {
    fn default() -> Self {
        Sequence {
            id: Types::Sequence as u64,
            class: TagClass::Universal,
            inner: Vec::new(),
        }
    }
}

/// Set of elements. Order is kept as given; nothing is sorted on output.
#[derive(Clone, Debug, PartialEq)]
pub struct Set {
    pub id: u64,
    pub class: TagClass,
    pub inner: Vec<Element>,
}

impl IntoElement for Set {
    fn into_element(self) -> Element {
        Element {
            id: self.id,
            class: self.class,
            encoding: EncodedType::Set,
            payload: Payload::Constructed(self.inner),
            offset: None,
        }
    }
}

impl default::Default for Set {
    fn default() -> Self {
        Set {
            id: Types::Set as u64,
            class: TagClass::Universal,
            inner: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::structures::{Boolean, Integer};

    #[test]
    fn application_tagged_sequence() {
        let op = Sequence {
            class: TagClass::Application,
            id: 0,
            inner: vec![Integer {
                inner: 3,
                ..Default::default()
            }
            .into_element()],
        }
        .into_element();
        assert!(op.is_constructed());
        assert_eq!(op.encoding, EncodedType::Sequence);
        assert_eq!(op.children()[0].as_integer(), Ok(3));
    }

    #[test]
    fn set_keeps_insertion_order() {
        let set = Set {
            inner: vec![
                Integer {
                    inner: 4,
                    ..Default::default()
                }
                .into_element(),
                Boolean {
                    inner: true,
                    ..Default::default()
                }
                .into_element(),
            ],
            ..Default::default()
        }
        .into_element();
        assert_eq!(set.id, 17);
        assert_eq!(set.children()[0].as_integer(), Ok(4));
        assert_eq!(set.children()[1].as_bool(), Ok(true));
    }
}
