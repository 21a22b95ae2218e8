//! Typed tree extraction.
//!
//! A [`Scanner`](struct.Scanner.html) walks a sibling chain the way the
//! extract directives do. Each method consumes the current element, checks
//! that it has the expected type, and returns its decoded value. `enter()`
//! descends into the children of a constructed element and `leave()`
//! returns to the parent, continuing after it.
//!
//! A pending tag set with `tag()` replaces the type check of the next
//! element with a class and tag number check. The content is then decoded
//! as the type the method asks for, as implicit tagging requires.

use std::slice;

use log::debug;

use crate::common::{Tag, TagClass};
use crate::error::{BerError, Result};
use crate::structure::Element;
use crate::structures::{boolean, integer, null, oid, Oid};
use crate::universal::EncodedType;

#[derive(Debug)]
struct Level<'a> {
    elements: &'a [Element],
    next: usize,
}

/// Cursor over an element tree.
#[derive(Debug)]
pub struct Scanner<'a> {
    levels: Vec<Level<'a>>,
    pending_tag: Option<(TagClass, u64)>,
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Start at the first element of a sibling chain.
    pub fn new(elements: &'a [Element]) -> Scanner<'a> {
        Scanner {
            levels: vec![Level { elements, next: 0 }],
            pending_tag: None,
            position: 0,
        }
    }

    /// Start at a single element.
    pub fn from_element(elem: &'a Element) -> Scanner<'a> {
        Scanner::new(slice::from_ref(elem))
    }

    /// Integer value (`i`, `d`).
    pub fn integer(&mut self) -> Result<i64> {
        self.step('i', |s| {
            let elem = s.take(&[EncodedType::Integer])?;
            integer::decode(elem.primitive_content()?)
        })
    }

    /// Enumerated value (`E`).
    pub fn enumerated(&mut self) -> Result<i64> {
        self.step('E', |s| {
            let elem = s.take(&[EncodedType::Enumerated])?;
            integer::decode(elem.primitive_content()?)
        })
    }

    /// Boolean value (`b`).
    pub fn boolean(&mut self) -> Result<bool> {
        self.step('b', |s| {
            let elem = s.take(&[EncodedType::Boolean])?;
            boolean::decode(elem.primitive_content()?)
        })
    }

    /// Octet string content (`s`). The octets are returned as stored;
    /// `Element::as_str` is the UTF-8 view.
    pub fn string(&mut self) -> Result<&'a [u8]> {
        self.step('s', |s| s.take(&[EncodedType::OctetString])?.primitive_content())
    }

    /// Octet string content (`x`).
    pub fn octets(&mut self) -> Result<&'a [u8]> {
        self.step('x', |s| s.take(&[EncodedType::OctetString])?.primitive_content())
    }

    /// Raw bit string content (`B`).
    pub fn bit_string(&mut self) -> Result<&'a [u8]> {
        self.step('B', |s| s.take(&[EncodedType::BitString])?.primitive_content())
    }

    /// Object identifier (`o`).
    pub fn oid(&mut self) -> Result<Oid> {
        self.step('o', |s| {
            let elem = s.take(&[EncodedType::ObjectIdentifier])?;
            oid::decode(elem.primitive_content()?)
        })
    }

    /// Null (`0`).
    pub fn null(&mut self) -> Result<()> {
        self.step('0', |s| {
            let elem = s.take(&[EncodedType::Null])?;
            null::decode(EncodedType::Null, elem.primitive_content()?)
        })
    }

    /// End-of-content placeholder (`.`).
    pub fn end_of_content(&mut self) -> Result<()> {
        self.step('.', |s| {
            let elem = s.take(&[EncodedType::EndOfContent])?;
            null::decode(EncodedType::EndOfContent, elem.primitive_content()?)
        })
    }

    /// The current element, whatever its type (`e`).
    pub fn element(&mut self) -> Result<&'a Element> {
        self.step('e', |s| s.take_any())
    }

    /// Move past the current element without looking at it (`S`).
    pub fn skip(&mut self) -> Result<()> {
        self.step('S', |s| s.take_any().map(|_| ()))
    }

    /// Expect the next element to carry this class and tag number (`t`).
    pub fn tag(&mut self, class: TagClass, id: u64) -> Result<()> {
        self.step('t', |s| {
            s.pending_tag = Some((class, id));
            Ok(())
        })
    }

    /// Report class and tag number of the current element (`t` with a
    /// reading slot). The element is not consumed; the next method decodes
    /// it implicitly, whatever its tag.
    pub fn read_tag(&mut self) -> Result<(TagClass, u64)> {
        self.step('t', |s| {
            let elem = s.current()?;
            s.pending_tag = Some((elem.class, elem.id));
            Ok((elem.class, elem.id))
        })
    }

    /// Descend into the children of the current element (`{`).
    pub fn enter(&mut self) -> Result<()> {
        self.step('{', |s| {
            let elem = s.current()?;
            if !elem.is_constructed() {
                return Err(BerError::mismatch("constructed element", elem.encoding));
            }
            s.check_tag(elem, None)?;
            s.advance();
            s.levels.push(Level {
                elements: elem.children(),
                next: 0,
            });
            Ok(())
        })
    }

    /// Return to the parent scope, after the element entered last (`}`).
    ///
    /// Children left unread are ignored.
    pub fn leave(&mut self) -> Result<()> {
        self.step('}', |s| {
            if s.pending_tag.is_some() {
                return Err(dangling_tag());
            }
            if s.levels.len() < 2 {
                return Err(BerError::UnbalancedScope {
                    position: s.position,
                });
            }
            s.levels.pop();
            Ok(())
        })
    }

    /// Require the current scope to be exhausted (`$`).
    pub fn end(&mut self) -> Result<()> {
        self.step('$', |s| match s.level().elements.len() - s.level().next {
            0 => Ok(()),
            n => Err(BerError::InvalidArgument(format!(
                "{} element(s) left in scope",
                n
            ))),
        })
    }

    /// Source offset of the current element's content (`p`), without
    /// consuming it. `None` at the end of the scope, or for elements that
    /// weren't read from a buffer.
    pub fn offset(&mut self) -> Result<Option<usize>> {
        self.step('p', |s| Ok(s.peek().and_then(|elem| elem.offset)))
    }

    /// Class and tag number of the current element, if any.
    pub fn peek_tag(&self) -> Option<(TagClass, u64)> {
        self.peek().map(|elem| (elem.class, elem.id))
    }

    /// The current element, if any, without consuming it.
    pub fn peek(&self) -> Option<&'a Element> {
        let level = self.level();
        let elements: &'a [Element] = level.elements;
        elements.get(level.next)
    }

    /// Nesting depth below the starting chain.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub(crate) fn pending(&self) -> Option<(TagClass, u64)> {
        self.pending_tag
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn step<T, F>(&mut self, letter: char, f: F) -> Result<T>
    where
        F: FnOnce(&mut Scanner<'a>) -> Result<T>,
    {
        let res = f(self).map_err(|err| match err {
            err @ BerError::UnbalancedScope { .. } => err,
            err => BerError::DirectiveMismatch {
                letter,
                position: self.position,
                reason: err.to_string(),
            },
        });
        if let Err(ref err) = res {
            debug!("extract failed: {}", err);
        }
        self.position += 1;
        res
    }

    fn level(&self) -> &Level<'a> {
        // The starting level is never popped.
        &self.levels[self.levels.len() - 1]
    }

    fn current(&self) -> Result<&'a Element> {
        self.peek()
            .ok_or_else(|| BerError::InvalidArgument("no element left in scope".to_owned()))
    }

    fn advance(&mut self) {
        if let Some(level) = self.levels.last_mut() {
            level.next += 1;
        }
    }

    fn check_tag(&mut self, elem: &Element, accepts: Option<&[EncodedType]>) -> Result<()> {
        match self.pending_tag.take() {
            Some((class, id)) => {
                if elem.class != class || elem.id != id {
                    return Err(BerError::mismatch(Tag(class, id), Tag(elem.class, elem.id)));
                }
            }
            None => {
                if let Some(accepts) = accepts {
                    if !accepts.contains(&elem.encoding) {
                        return Err(BerError::mismatch(accepts[0], elem.encoding));
                    }
                }
            }
        }
        Ok(())
    }

    fn take(&mut self, accepts: &[EncodedType]) -> Result<&'a Element> {
        let elem = self.current()?;
        self.check_tag(elem, Some(accepts))?;
        self.advance();
        Ok(elem)
    }

    fn take_any(&mut self) -> Result<&'a Element> {
        let elem = self.current()?;
        self.check_tag(elem, None)?;
        self.advance();
        Ok(elem)
    }
}

fn dangling_tag() -> BerError {
    BerError::InvalidArgument("tag override is not followed by an element".to_owned())
}
