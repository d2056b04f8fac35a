//! Search filters: the tree model, a slice-level parser for captured
//! filter subtrees, and the tail-first encoder.

use bytes::Bytes;

use crate::ber::parser::{expect_end, parse_tlv};
use crate::ber::{decode_boolean, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::messages::AttributeValueAssertion;
use crate::octets::utf8_string;
use crate::tag::{Class, Tag};

/// A search filter tree, as in RFC 4511 section 4.5.1.7.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    EqualityMatch(AttributeValueAssertion),
    Substrings(SubstringFilter),
    GreaterOrEqual(AttributeValueAssertion),
    LessOrEqual(AttributeValueAssertion),
    Present(String),
    ApproxMatch(AttributeValueAssertion),
    ExtensibleMatch(MatchingRuleAssertion),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringFilter {
    pub attribute_desc: String,
    pub substrings: Vec<Substring>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substring {
    Initial(Bytes),
    Any(Bytes),
    Final(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchingRuleAssertion {
    pub matching_rule: Option<String>,
    pub attribute_desc: Option<String>,
    pub match_value: Bytes,
    pub dn_attributes: bool,
}

impl Filter {
    /// Convenience equality filter from text parts.
    pub fn equality(attribute: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Filter::EqualityMatch(AttributeValueAssertion::new(attribute, value))
    }

    /// Parses one complete filter TLV (header included), requiring the
    /// whole slice to be consumed.
    pub fn parse(input: &[u8]) -> Result<Self, DecodeError> {
        let (filter, rest) = parse_one(input, 0)?;
        expect_end(rest)?;
        Ok(filter)
    }

    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        match self {
            Filter::And(filters) => encode_set(enc, 0, filters),
            Filter::Or(filters) => encode_set(enc, 1, filters),
            Filter::Not(inner) => {
                let mark = enc.pos();
                inner.encode(enc)?;
                enc.finish(Identifier::constructed(Tag::context(2)), mark);
                Ok(())
            }
            Filter::EqualityMatch(ava) => encode_ava(enc, 3, ava),
            Filter::Substrings(substrings) => substrings.encode(enc),
            Filter::GreaterOrEqual(ava) => encode_ava(enc, 5, ava),
            Filter::LessOrEqual(ava) => encode_ava(enc, 6, ava),
            Filter::Present(attribute) => {
                enc.octet_string(Identifier::primitive(Tag::context(7)), attribute.as_bytes());
                Ok(())
            }
            Filter::ApproxMatch(ava) => encode_ava(enc, 8, ava),
            Filter::ExtensibleMatch(assertion) => assertion.encode(enc),
        }
    }
}

impl SubstringFilter {
    fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        let seq = enc.pos();
        for substring in self.substrings.iter().rev() {
            let (number, bytes) = match substring {
                Substring::Initial(bytes) => (0, bytes),
                Substring::Any(bytes) => (1, bytes),
                Substring::Final(bytes) => (2, bytes),
            };
            enc.octet_string(Identifier::primitive(Tag::context(number)), bytes);
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), seq);
        enc.octet_string(
            Identifier::primitive(Tag::OCTET_STRING),
            self.attribute_desc.as_bytes(),
        );
        enc.finish(Identifier::constructed(Tag::context(4)), mark);
        Ok(())
    }
}

impl MatchingRuleAssertion {
    fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if self.dn_attributes {
            enc.boolean(Identifier::primitive(Tag::context(4)), true);
        }
        enc.octet_string(Identifier::primitive(Tag::context(3)), &self.match_value);
        if let Some(attribute_desc) = &self.attribute_desc {
            enc.octet_string(Identifier::primitive(Tag::context(2)), attribute_desc.as_bytes());
        }
        if let Some(matching_rule) = &self.matching_rule {
            enc.octet_string(Identifier::primitive(Tag::context(1)), matching_rule.as_bytes());
        }
        enc.finish(Identifier::constructed(Tag::context(9)), mark);
        Ok(())
    }
}

fn encode_set(enc: &mut BerEncoder, number: u32, filters: &[Filter]) -> Result<(), EncodeError> {
    let mark = enc.pos();
    for filter in filters.iter().rev() {
        filter.encode(enc)?;
    }
    enc.finish(Identifier::constructed(Tag::context(number)), mark);
    Ok(())
}

fn encode_ava(
    enc: &mut BerEncoder,
    number: u32,
    ava: &AttributeValueAssertion,
) -> Result<(), EncodeError> {
    let mark = enc.pos();
    ava.encode_components(enc);
    enc.finish(Identifier::constructed(Tag::context(number)), mark);
    Ok(())
}

// a filter tree nested beyond this is hostile input
const MAX_FILTER_DEPTH: usize = 64;

fn parse_one(input: &[u8], depth: usize) -> Result<(Filter, &[u8]), DecodeError> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(DecodeError::LimitExceeded {
            what: "filter nesting depth",
            value: depth as u64 + 1,
            limit: MAX_FILTER_DEPTH as u64,
        });
    }

    let (tlv, rest) = parse_tlv(input)?;
    if tlv.id.tag.class != Class::Context {
        return Err(DecodeError::grammar("filter", tlv.initial_octet()));
    }

    let filter = match tlv.id.tag.value {
        0 => Filter::And(parse_set(tlv.contents, depth + 1)?),
        1 => Filter::Or(parse_set(tlv.contents, depth + 1)?),
        2 => {
            let (inner, rest) = parse_one(tlv.contents, depth + 1)?;
            expect_end(rest)?;
            Filter::Not(Box::new(inner))
        }
        3 => Filter::EqualityMatch(parse_ava(tlv.contents)?),
        4 => Filter::Substrings(parse_substrings(tlv.contents)?),
        5 => Filter::GreaterOrEqual(parse_ava(tlv.contents)?),
        6 => Filter::LessOrEqual(parse_ava(tlv.contents)?),
        7 => {
            if tlv.id.is_constructed() {
                return Err(DecodeError::grammar("filter", tlv.initial_octet()));
            }
            Filter::Present(utf8_string(tlv.contents)?)
        }
        8 => Filter::ApproxMatch(parse_ava(tlv.contents)?),
        9 => Filter::ExtensibleMatch(parse_extensible(tlv.contents)?),
        _ => return Err(DecodeError::grammar("filter", tlv.initial_octet())),
    };
    Ok((filter, rest))
}

fn parse_set(mut input: &[u8], depth: usize) -> Result<Vec<Filter>, DecodeError> {
    let mut filters = Vec::new();
    while !input.is_empty() {
        let (filter, rest) = parse_one(input, depth)?;
        filters.push(filter);
        input = rest;
    }
    Ok(filters)
}

fn parse_ava(input: &[u8]) -> Result<AttributeValueAssertion, DecodeError> {
    let (desc, rest) = expect_octet_string(input, "filter ava")?;
    let (value, rest) = expect_octet_string(rest, "filter ava")?;
    expect_end(rest)?;
    Ok(AttributeValueAssertion {
        attribute_desc: utf8_string(desc)?,
        assertion_value: Bytes::copy_from_slice(value),
    })
}

fn parse_substrings(input: &[u8]) -> Result<SubstringFilter, DecodeError> {
    let (desc, rest) = expect_octet_string(input, "substring filter")?;
    let (seq, rest) = expect_sequence(rest, "substring filter")?;
    expect_end(rest)?;

    let mut substrings = Vec::new();
    let mut input = seq;
    while !input.is_empty() {
        let (tlv, rest) = parse_tlv(input)?;
        let bytes = Bytes::copy_from_slice(tlv.contents);
        let substring = match (tlv.id.tag.class, tlv.id.tag.value) {
            (Class::Context, 0) => Substring::Initial(bytes),
            (Class::Context, 1) => Substring::Any(bytes),
            (Class::Context, 2) => Substring::Final(bytes),
            _ => return Err(DecodeError::grammar("substring filter", tlv.initial_octet())),
        };
        substrings.push(substring);
        input = rest;
    }
    if substrings.is_empty() {
        return Err(DecodeError::UnexpectedEndOfInput);
    }

    Ok(SubstringFilter {
        attribute_desc: utf8_string(desc)?,
        substrings,
    })
}

fn parse_extensible(input: &[u8]) -> Result<MatchingRuleAssertion, DecodeError> {
    let mut assertion = MatchingRuleAssertion::default();
    let mut match_value = None;
    let mut input = input;
    while !input.is_empty() {
        let (tlv, rest) = parse_tlv(input)?;
        match (tlv.id.tag.class, tlv.id.tag.value) {
            (Class::Context, 1) => assertion.matching_rule = Some(utf8_string(tlv.contents)?),
            (Class::Context, 2) => assertion.attribute_desc = Some(utf8_string(tlv.contents)?),
            (Class::Context, 3) => match_value = Some(Bytes::copy_from_slice(tlv.contents)),
            (Class::Context, 4) => assertion.dn_attributes = decode_boolean(tlv.contents)?,
            _ => return Err(DecodeError::grammar("extensible match", tlv.initial_octet())),
        }
        input = rest;
    }
    assertion.match_value = match_value.ok_or(DecodeError::UnexpectedEndOfInput)?;
    Ok(assertion)
}

fn expect_octet_string<'a>(
    input: &'a [u8],
    state: &'static str,
) -> Result<(&'a [u8], &'a [u8]), DecodeError> {
    let (tlv, rest) = parse_tlv(input)?;
    if tlv.id != Identifier::primitive(Tag::OCTET_STRING) {
        return Err(DecodeError::grammar(state, tlv.initial_octet()));
    }
    Ok((tlv.contents, rest))
}

fn expect_sequence<'a>(
    input: &'a [u8],
    state: &'static str,
) -> Result<(&'a [u8], &'a [u8]), DecodeError> {
    let (tlv, rest) = parse_tlv(input)?;
    if tlv.id != Identifier::constructed(Tag::SEQUENCE) {
        return Err(DecodeError::grammar(state, tlv.initial_octet()));
    }
    Ok((tlv.contents, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    fn round_trip(filter: &Filter) -> Vec<u8> {
        let mut enc = BerEncoder::new();
        filter.encode(&mut enc).unwrap();
        let bytes = enc.into_bytes();
        assert_eq!(&Filter::parse(&bytes).unwrap(), filter);
        bytes
    }

    #[test]
    fn present_filter() {
        let bytes = round_trip(&Filter::Present("objectClass".into()));
        assert_eq!(bytes, hex!("87 0b 6f 62 6a 65 63 74 43 6c 61 73 73"));
    }

    #[test]
    fn equality_filter() {
        let bytes = round_trip(&Filter::equality("cn", &b"admin"[..]));
        assert_eq!(bytes, hex!("a3 0b 04 02 63 6e 04 05 61 64 6d 69 6e"));
    }

    #[test]
    fn nested_boolean_filters() {
        round_trip(&Filter::And(vec![
            Filter::equality("objectClass", &b"person"[..]),
            Filter::Or(vec![
                Filter::equality("uid", &b"hnelson"[..]),
                Filter::Not(Box::new(Filter::Present("pwdPolicy".into()))),
            ]),
        ]));
    }

    #[test]
    fn substring_filter() {
        round_trip(&Filter::Substrings(SubstringFilter {
            attribute_desc: "cn".into(),
            substrings: vec![
                Substring::Initial(Bytes::from_static(b"ad")),
                Substring::Any(Bytes::from_static(b"mi")),
                Substring::Final(Bytes::from_static(b"n")),
            ],
        }));
    }

    #[test]
    fn extensible_filter() {
        round_trip(&Filter::ExtensibleMatch(MatchingRuleAssertion {
            matching_rule: Some("1.2.840.113556.1.4.803".into()),
            attribute_desc: Some("groupType".into()),
            match_value: Bytes::from_static(b"2147483648"),
            dn_attributes: true,
        }));
    }

    #[test]
    fn empty_and_is_accepted() {
        // the "absolute true" filter some servers emit
        let filter = Filter::parse(&hex!("a0 00")).unwrap();
        assert_eq!(filter, Filter::And(vec![]));
    }

    #[test]
    fn substrings_require_a_component() {
        let err = Filter::parse(&hex!("a4 06 04 02 63 6e 30 00")).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEndOfInput);
    }

    #[test]
    fn depth_limit_guards_recursion() {
        let mut filter = Filter::Present("a".into());
        for _ in 0..80 {
            filter = Filter::Not(Box::new(filter));
        }
        let mut enc = BerEncoder::new();
        filter.encode(&mut enc).unwrap();
        assert!(matches!(
            Filter::parse(&enc.into_bytes()),
            Err(DecodeError::LimitExceeded { .. })
        ));
    }
}
