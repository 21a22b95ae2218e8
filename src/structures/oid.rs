use std::default;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::common::TagClass;
use crate::error::{BerError, Result};
use crate::structure::{Element, Payload};
use crate::universal::{EncodedType, Types};

/// Object identifier: a sequence of arbitrary-size non-negative components.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Oid(Vec<BigUint>);

impl Oid {
    pub fn new(components: Vec<BigUint>) -> Oid {
        Oid(components)
    }

    pub fn from_components<I, C>(components: I) -> Oid
    where
        I: IntoIterator<Item = C>,
        C: Into<BigUint>,
    {
        Oid(components.into_iter().map(Into::into).collect())
    }

    pub fn components(&self) -> &[BigUint] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<BigUint> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, comp) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", comp)?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = BerError;

    /// Parse dotted notation, e.g. `1.2.840.113549`.
    fn from_str(s: &str) -> Result<Oid> {
        s.split('.')
            .map(|comp| {
                if comp.is_empty() || !comp.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(BerError::InvalidArgument(format!(
                        "bad object identifier component {:?}",
                        comp
                    )));
                }
                BigUint::parse_bytes(comp.as_bytes(), 10).ok_or_else(|| {
                    BerError::InvalidArgument(format!(
                        "bad object identifier component {:?}",
                        comp
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Oid)
    }
}

/// Append one component as base-128 digits, high bit set on all but the last.
fn push_component(out: &mut Vec<u8>, comp: &BigUint) {
    let mut digits = comp.to_radix_be(0x80);
    let last = digits.len() - 1;
    for digit in digits[..last].iter_mut() {
        *digit |= 0x80;
    }
    out.append(&mut digits);
}

/// Encode the content octets of an object identifier.
///
/// At least two components are required, the first at most 2, and the
/// second below 40 unless the first is 2.
pub fn encode(oid: &Oid) -> Result<Vec<u8>> {
    let comps = oid.components();
    if comps.len() < 2 {
        return Err(BerError::InvalidArgument(format!(
            "object identifier needs at least two components, got {}",
            comps.len()
        )));
    }
    let (first, second) = (&comps[0], &comps[1]);
    let two = BigUint::from(2u8);
    if *first > two || (*first < two && *second >= BigUint::from(40u8)) {
        return Err(BerError::InvalidArgument(format!(
            "object identifier arc {}.{} out of range",
            first, second
        )));
    }
    let mut out = Vec::with_capacity(comps.len() * 2);
    push_component(&mut out, &(first * BigUint::from(40u8) + second));
    for comp in &comps[2..] {
        push_component(&mut out, comp);
    }
    Ok(out)
}

/// Decode the content octets of an object identifier.
pub fn decode(content: &[u8]) -> Result<Oid> {
    if content.is_empty() {
        return Err(BerError::malformed(
            EncodedType::ObjectIdentifier,
            "empty content",
        ));
    }
    if content[content.len() - 1] & 0x80 != 0 {
        return Err(BerError::malformed(
            EncodedType::ObjectIdentifier,
            "last component is unterminated",
        ));
    }
    let mut comps = Vec::new();
    for encoded in content.split_inclusive(|&b| b & 0x80 == 0) {
        if encoded[0] == 0x80 {
            return Err(BerError::malformed(
                EncodedType::ObjectIdentifier,
                "component has a redundant leading octet",
            ));
        }
        let digits: Vec<u8> = encoded.iter().map(|b| b & 0x7f).collect();
        let comp = BigUint::from_radix_be(&digits, 0x80).ok_or_else(|| {
            BerError::malformed(EncodedType::ObjectIdentifier, "bad component")
        })?;
        if comps.is_empty() {
            let forty = BigUint::from(40u8);
            let eighty = BigUint::from(80u8);
            if comp < forty {
                comps.push(BigUint::from(0u8));
                comps.push(comp);
            } else if comp < eighty {
                comps.push(BigUint::from(1u8));
                comps.push(comp - forty);
            } else {
                comps.push(BigUint::from(2u8));
                comps.push(comp - eighty);
            }
        } else {
            comps.push(comp);
        }
    }
    Ok(Oid(comps))
}

/// Object identifier value with a tag.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectIdentifier {
    pub id: u64,
    pub class: TagClass,
    pub inner: Oid,
}

impl ObjectIdentifier {
    /// Unlike the other structures, encoding an identifier can fail, so the
    /// conversion is fallible.
    pub fn try_into_element(self) -> Result<Element> {
        Ok(Element {
            id: self.id,
            class: self.class,
            encoding: EncodedType::ObjectIdentifier,
            payload: Payload::Primitive(encode(&self.inner)?),
            offset: None,
        })
    }
}

impl default::Default for ObjectIdentifier {
    fn default() -> Self {
        ObjectIdentifier {
            id: Types::ObjectIdentifier as u64,
            class: TagClass::Universal,
            inner: Oid::default(),
        }
    }
}

impl TryFrom<ObjectIdentifier> for Element {
    type Error = BerError;

    fn try_from(oid: ObjectIdentifier) -> Result<Element> {
        oid.try_into_element()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const RSADSI: [u8; 6] = [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d];

    #[test]
    fn encode_rsadsi() {
        let oid: Oid = "1.2.840.113549".parse().unwrap();
        assert_eq!(encode(&oid).unwrap(), RSADSI.to_vec());
    }

    #[test]
    fn decode_rsadsi() {
        let oid = decode(&RSADSI).unwrap();
        assert_eq!(oid, Oid::from_components([1u32, 2, 840, 113549]));
        assert_eq!(oid.to_string(), "1.2.840.113549");
    }

    #[test]
    fn joint_iso_arc_above_forty() {
        let oid = Oid::from_components([2u32, 999, 3]);
        let content = encode(&oid).unwrap();
        assert_eq!(content, vec![0x88, 0x37, 0x03]);
        assert_eq!(decode(&content).unwrap(), oid);
    }

    #[test]
    fn large_components() {
        let big = BigUint::from(u64::MAX) * 1000u32;
        let oid = Oid::new(vec![BigUint::from(1u8), BigUint::from(3u8), big]);
        assert_eq!(decode(&encode(&oid).unwrap()).unwrap(), oid);
    }

    #[test]
    fn invalid_arguments() {
        assert!(encode(&Oid::default()).is_err());
        assert!(encode(&Oid::from_components([1u32])).is_err());
        assert!(encode(&Oid::from_components([3u32, 1])).is_err());
        assert!(encode(&Oid::from_components([1u32, 40])).is_err());
        assert!("1..2".parse::<Oid>().is_err());
        assert!("1.x".parse::<Oid>().is_err());
    }

    #[test]
    fn malformed_content() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x2a, 0x86]).is_err());
        assert!(decode(&[0x2a, 0x80, 0x01]).is_err());
    }
}
