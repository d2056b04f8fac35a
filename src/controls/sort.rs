//! Server-side sorting (RFC 2891).

use crate::ber::parser::{expect_end, expect_tlv, optional_tlv, parse_tlv};
use crate::ber::{decode_boolean, decode_integer, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::messages::ResultCode;
use crate::octets::utf8_string;
use crate::tag::{Class, Tag};

use super::{Control, ControlFactory, ControlValue};

/// One sort key: an attribute, an optional ordering rule, and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub attribute_type: String,
    /// `[0]` overrides the attribute's own ordering matching rule.
    pub matching_rule: Option<String>,
    /// `[1]` sorts this key descending.
    pub reverse_order: bool,
}

impl SortKey {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            matching_rule: None,
            reverse_order: false,
        }
    }
}

/// `SortKeyList ::= SEQUENCE OF SEQUENCE { attributeType, orderingRule [0]
/// OPTIONAL, reverseOrder [1] DEFAULT FALSE }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortRequest {
    pub keys: Vec<SortKey>,
}

impl SortRequest {
    pub const OID: &'static str = "1.2.840.113556.1.4.473";
}

/// `SortResult ::= SEQUENCE { sortResult ENUMERATED, attributeType [0]
/// OPTIONAL }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortResponse {
    pub result: ResultCode,
    /// The first attribute the server failed to sort by.
    pub attribute_type: Option<String>,
}

impl SortResponse {
    pub const OID: &'static str = "1.2.840.113556.1.4.474";
}

pub(super) struct SortRequestFactory;

impl ControlFactory for SortRequestFactory {
    fn oid(&self) -> &'static str {
        SortRequest::OID
    }

    fn new_control(&self) -> Control {
        Control::new(SortRequest::OID, ControlValue::SortRequest(SortRequest::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (mut list, rest) = expect_tlv(value, 0x30, "sort request")?;
        expect_end(rest)?;

        let mut keys = Vec::new();
        while !list.is_empty() {
            let (key, rest) = parse_tlv(list)?;
            if key.id != Identifier::constructed(Tag::SEQUENCE) {
                return Err(DecodeError::grammar("sort request", key.initial_octet()));
            }

            let (attribute, mut inner) =
                expect_tlv(key.contents, 0x04, "sort key")?;
            let mut sort_key = SortKey::new(utf8_string(attribute)?);
            if let Some((rule, rest)) = optional_tlv(inner, 0x80)? {
                sort_key.matching_rule = Some(utf8_string(rule)?);
                inner = rest;
            }
            if let Some((reverse, rest)) = optional_tlv(inner, 0x81)? {
                sort_key.reverse_order = decode_boolean(reverse)?;
                inner = rest;
            }
            expect_end(inner)?;

            keys.push(sort_key);
            list = rest;
        }
        if keys.is_empty() {
            return Err(DecodeError::UnexpectedEndOfInput);
        }

        control.value = ControlValue::SortRequest(SortRequest { keys });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::SortRequest(request) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "sort request control value",
            });
        };
        let mark = enc.pos();
        for key in request.keys.iter().rev() {
            let key_mark = enc.pos();
            if key.reverse_order {
                enc.boolean(Identifier::primitive(Tag::context(1)), true);
            }
            if let Some(rule) = &key.matching_rule {
                enc.octet_string(Identifier::primitive(Tag::context(0)), rule.as_bytes());
            }
            enc.octet_string(
                Identifier::primitive(Tag::OCTET_STRING),
                key.attribute_type.as_bytes(),
            );
            enc.finish(Identifier::constructed(Tag::SEQUENCE), key_mark);
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

pub(super) struct SortResponseFactory;

impl ControlFactory for SortResponseFactory {
    fn oid(&self) -> &'static str {
        SortResponse::OID
    }

    fn new_control(&self) -> Control {
        Control::new(SortResponse::OID, ControlValue::SortResponse(SortResponse::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "sort response")?;
        expect_end(rest)?;

        let (code, mut inner) = expect_tlv(seq, 0x0a, "sort response")?;
        let code = decode_integer(code)?;
        if !(0..=i64::from(u32::MAX)).contains(&code) {
            return Err(DecodeError::InvalidInteger);
        }
        let mut response = SortResponse {
            result: ResultCode(code as u32),
            attribute_type: None,
        };
        if !inner.is_empty() {
            let (tlv, rest) = parse_tlv(inner)?;
            if tlv.id.tag.class != Class::Context || tlv.id.tag.value != 0 {
                return Err(DecodeError::grammar("sort response", tlv.initial_octet()));
            }
            response.attribute_type = Some(utf8_string(tlv.contents)?);
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::SortResponse(response);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::SortResponse(response) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "sort response control value",
            });
        };
        let mark = enc.pos();
        if let Some(attribute) = &response.attribute_type {
            enc.octet_string(Identifier::primitive(Tag::context(0)), attribute.as_bytes());
        }
        enc.enumerated(i64::from(response.result.0));
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}
