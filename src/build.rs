//! Typed tree construction.
//!
//! [`Builder`](struct.Builder.html) is the strongly typed form of the build
//! directives: every method corresponds to one directive letter, appends
//! one element to the currently open scope, and returns the builder for
//! chaining. The first failure is remembered and reported by
//! [`finish()`](struct.Builder.html#method.finish); later calls are ignored.
//!
//! A bind request, `SEQUENCE { 1, [APPLICATION 0] { 3, "cn=admin", [0] "password" } }`:
//!
//! ```
//! use bertree::build::Builder;
//! use bertree::common::TagClass;
//! use bertree::write;
//!
//! let msg = Builder::new()
//!     .begin_sequence()
//!     .integer(1)
//!     .tag(TagClass::Application, 0)
//!     .begin_sequence()
//!     .integer(3)
//!     .string("cn=admin")
//!     .tag(TagClass::Context, 0)
//!     .string("password")
//!     .end()
//!     .end()
//!     .build()
//!     .unwrap();
//! let bytes = write::write_element(&msg).unwrap();
//! assert_eq!(&bytes[..7], &[0x30, 0x1c, 0x02, 0x01, 0x01, 0x60, 0x17]);
//! ```

use log::debug;

use crate::common::{TagClass, MAX_TAG_NUMBER};
use crate::error::{BerError, Result};
use crate::structure::Element;
use crate::structures::Oid;

/// Builder for an element tree; see the [module documentation](index.html).
#[derive(Debug, Default)]
pub struct Builder {
    top: Vec<Element>,
    scopes: Vec<Element>,
    pending_tag: Option<(TagClass, u64)>,
    position: usize,
    error: Option<BerError>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            ..Default::default()
        }
    }

    /// Generic integer (`i`, `d`).
    pub fn integer(self, value: i64) -> Self {
        self.step('i', |b| b.append(Element::integer(value)))
    }

    /// Enumerated integer (`E`).
    pub fn enumerated(self, value: i64) -> Self {
        self.step('E', |b| b.append(Element::enumerated(value)))
    }

    /// Boolean (`b`).
    pub fn boolean(self, value: bool) -> Self {
        self.step('b', |b| b.append(Element::boolean(value)))
    }

    /// Octet string holding text (`s`).
    pub fn string(self, value: &str) -> Self {
        self.step('s', |b| b.append(Element::octet_string(value)))
    }

    /// Octet string holding arbitrary data (`x`).
    pub fn octets(self, value: &[u8]) -> Self {
        self.step('x', |b| b.append(Element::octet_string(value)))
    }

    /// Bit string; the content is written as given (`B`).
    pub fn bit_string(self, value: &[u8]) -> Self {
        self.step('B', |b| b.append(Element::bit_string(value)))
    }

    /// Object identifier (`o`). Fails if the identifier can't be encoded.
    pub fn oid(self, value: &Oid) -> Self {
        self.step('o', |b| {
            let elem = Element::oid(value)?;
            b.append(elem)
        })
    }

    /// Null (`0`).
    pub fn null(self) -> Self {
        self.step('0', |b| b.append(Element::null()))
    }

    /// End-of-content placeholder for an absent field (`.`).
    pub fn end_of_content(self) -> Self {
        self.step('.', |b| b.append(Element::end_of_content()))
    }

    /// A prebuilt element, appended as is (`e`). Every tag number in its
    /// subtree must be within range.
    pub fn element(self, elem: Element) -> Self {
        self.step('e', |b| {
            elem.check_tags()?;
            b.append(elem)
        })
    }

    /// Override class and tag number of the next element only (`t`).
    pub fn tag(self, class: TagClass, id: u64) -> Self {
        self.step('t', |b| {
            if id > MAX_TAG_NUMBER {
                return Err(BerError::InvalidArgument(format!(
                    "tag number {} exceeds {}",
                    id, MAX_TAG_NUMBER
                )));
            }
            b.pending_tag = Some((class, id));
            Ok(())
        })
    }

    /// Open a SEQUENCE scope (`{`); a pending tag override applies to it.
    pub fn begin_sequence(self) -> Self {
        self.step('{', |b| b.open(Element::sequence(Vec::new())))
    }

    /// Open a SET scope.
    pub fn begin_set(self) -> Self {
        self.step('{', |b| b.open(Element::set(Vec::new())))
    }

    /// Close the innermost scope (`}`).
    pub fn end(self) -> Self {
        self.step('}', |b| {
            if b.pending_tag.is_some() {
                return Err(dangling_tag('}', b.position));
            }
            match b.scopes.pop() {
                Some(scope) => b.append(scope),
                None => Err(BerError::UnbalancedScope {
                    position: b.position,
                }),
            }
        })
    }

    /// Finish and return the top-level elements.
    pub fn finish(self) -> Result<Vec<Element>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.pending_tag.is_some() {
            return Err(dangling_tag('t', self.position));
        }
        if !self.scopes.is_empty() {
            return Err(BerError::UnbalancedScope {
                position: self.position,
            });
        }
        Ok(self.top)
    }

    /// Finish, requiring exactly one top-level element.
    pub fn build(self) -> Result<Element> {
        let position = self.position;
        let mut top = self.finish()?;
        match top.len() {
            1 => Ok(top.remove(0)),
            n => Err(BerError::InvalidArgument(format!(
                "expected one top-level element at position {}, built {}",
                position, n
            ))),
        }
    }

    /// Reposition the error reporting, for callers driving the builder from
    /// a directive string.
    pub(crate) fn at(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub(crate) fn failed(&self) -> bool {
        self.error.is_some()
    }

    fn step<F>(mut self, letter: char, f: F) -> Self
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        if self.error.is_none() {
            if let Err(err) = f(&mut self) {
                debug!("build directive '{}' at {} failed: {}", letter, self.position, err);
                self.error = Some(match err {
                    err @ BerError::DirectiveMismatch { .. } | err @ BerError::UnbalancedScope { .. } => err,
                    err => BerError::DirectiveMismatch {
                        letter,
                        position: self.position,
                        reason: err.to_string(),
                    },
                });
            }
        }
        self.position += 1;
        self
    }

    fn open(&mut self, scope: Element) -> Result<()> {
        let scope = self.apply_tag(scope);
        self.scopes.push(scope);
        Ok(())
    }

    fn append(&mut self, elem: Element) -> Result<()> {
        let elem = self.apply_tag(elem);
        match self.scopes.last_mut() {
            Some(scope) => scope.push(elem),
            None => {
                self.top.push(elem);
                Ok(())
            }
        }
    }

    fn apply_tag(&mut self, elem: Element) -> Element {
        match self.pending_tag.take() {
            Some((class, id)) => elem.with_tag(class, id),
            None => elem,
        }
    }
}

fn dangling_tag(letter: char, position: usize) -> BerError {
    BerError::DirectiveMismatch {
        letter,
        position,
        reason: "tag override is not followed by an element".to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::universal::EncodedType;
    use crate::write::write_element;

    #[test]
    fn single_integer() {
        let elem = Builder::new().integer(1).build().unwrap();
        assert_eq!(write_element(&elem).unwrap(), vec![0x02, 0x01, 0x01]);
    }

    #[test]
    fn tag_applies_to_next_element_only() {
        let top = Builder::new()
            .tag(TagClass::Context, 3)
            .string("a")
            .string("b")
            .finish()
            .unwrap();
        assert_eq!((top[0].class, top[0].id), (TagClass::Context, 3));
        assert_eq!(top[0].encoding, EncodedType::OctetString);
        assert_eq!((top[1].class, top[1].id), (TagClass::Universal, 4));
    }

    #[test]
    fn tag_does_not_cross_scope_end() {
        let err = Builder::new()
            .begin_sequence()
            .integer(1)
            .tag(TagClass::Context, 0)
            .end()
            .finish()
            .unwrap_err();
        assert!(matches!(
            err,
            BerError::DirectiveMismatch {
                letter: '}',
                position: 3,
                ..
            }
        ));
    }

    #[test]
    fn trailing_tag_is_an_error() {
        assert!(Builder::new().null().tag(TagClass::Context, 0).finish().is_err());
    }

    #[test]
    fn unbalanced_scopes() {
        assert_eq!(
            Builder::new().end().finish().unwrap_err(),
            BerError::UnbalancedScope { position: 0 }
        );
        assert_eq!(
            Builder::new().begin_sequence().null().finish().unwrap_err(),
            BerError::UnbalancedScope { position: 2 }
        );
    }

    #[test]
    fn first_error_wins() {
        let err = Builder::new()
            .integer(1)
            .oid(&Oid::default())
            .end()
            .finish()
            .unwrap_err();
        assert!(matches!(
            err,
            BerError::DirectiveMismatch {
                letter: 'o',
                position: 1,
                ..
            }
        ));
    }

    #[test]
    fn tag_number_range() {
        assert!(Builder::new()
            .tag(TagClass::Private, MAX_TAG_NUMBER + 1)
            .null()
            .finish()
            .is_err());
    }

    #[test]
    fn prebuilt_element_tag_range() {
        let wide = Element::null().with_tag(TagClass::Context, 1 << 40);
        assert!(matches!(
            Builder::new().element(wide.clone()).finish(),
            Err(BerError::DirectiveMismatch { letter: 'e', position: 0, .. })
        ));
        let nested = Element::sequence(vec![wide]);
        assert!(Builder::new().null().element(nested).finish().is_err());
        let fine = Element::null().with_tag(TagClass::Context, MAX_TAG_NUMBER);
        assert_eq!(Builder::new().element(fine.clone()).finish(), Ok(vec![fine]));
    }

    #[test]
    fn snmp_v3_header() {
        let elem = Builder::new()
            .begin_sequence()
            .integer(1)
            .integer(8192)
            .octets(&[0x01])
            .integer(3)
            .end()
            .build()
            .unwrap();
        assert_eq!(
            write_element(&elem).unwrap(),
            vec![
                0x30, 0x0d, 0x02, 0x01, 0x01, 0x02, 0x02, 0x20, 0x00, 0x04, 0x01, 0x01, 0x02,
                0x01, 0x03
            ]
        );
    }

    #[test]
    fn build_requires_single_root() {
        assert!(Builder::new().null().null().build().is_err());
        assert_eq!(Builder::new().null().null().finish().unwrap().len(), 2);
    }
}
