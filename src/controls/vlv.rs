//! Virtual list view (draft-ietf-ldapext-ldapv3-vlv).

use bytes::Bytes;

use crate::ber::parser::{expect_end, expect_tlv, optional_tlv, parse_tlv};
use crate::ber::{decode_integer, decode_integer_u32, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::messages::ResultCode;
use crate::tag::{Class, Tag};

use super::{Control, ControlFactory, ControlValue};

/// `target CHOICE { byOffset [0] SEQUENCE { offset INTEGER, contentCount
/// INTEGER }, greaterThanOrEqual [1] AssertionValue }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlvTarget {
    ByOffset { offset: u32, content_count: u32 },
    GreaterThanOrEqual(Bytes),
}

impl Default for VlvTarget {
    fn default() -> Self {
        VlvTarget::ByOffset {
            offset: 1,
            content_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualListViewRequest {
    pub before_count: u32,
    pub after_count: u32,
    pub target: VlvTarget,
    pub context_id: Option<Bytes>,
}

impl VirtualListViewRequest {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.9";
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VirtualListViewResponse {
    pub target_position: u32,
    pub content_count: u32,
    pub result: ResultCode,
    pub context_id: Option<Bytes>,
}

impl VirtualListViewResponse {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.10";
}

pub(super) struct VirtualListViewRequestFactory;

impl ControlFactory for VirtualListViewRequestFactory {
    fn oid(&self) -> &'static str {
        VirtualListViewRequest::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            VirtualListViewRequest::OID,
            ControlValue::VirtualListViewRequest(VirtualListViewRequest::default()),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "vlv request")?;
        expect_end(rest)?;

        let (before, rest) = expect_tlv(seq, 0x02, "vlv request")?;
        let (after, rest) = expect_tlv(rest, 0x02, "vlv request")?;

        let (target_tlv, mut inner) = parse_tlv(rest)?;
        let target = match (target_tlv.id.tag.class, target_tlv.id.tag.value) {
            (Class::Context, 0) => {
                let (offset, rest) = expect_tlv(target_tlv.contents, 0x02, "vlv target")?;
                let (count, rest) = expect_tlv(rest, 0x02, "vlv target")?;
                expect_end(rest)?;
                VlvTarget::ByOffset {
                    offset: decode_integer_u32(offset)?,
                    content_count: decode_integer_u32(count)?,
                }
            }
            (Class::Context, 1) => {
                VlvTarget::GreaterThanOrEqual(Bytes::copy_from_slice(target_tlv.contents))
            }
            _ => return Err(DecodeError::grammar("vlv target", target_tlv.initial_octet())),
        };

        let mut request = VirtualListViewRequest {
            before_count: decode_integer_u32(before)?,
            after_count: decode_integer_u32(after)?,
            target,
            context_id: None,
        };
        if let Some((context, rest)) = optional_tlv(inner, 0x04)? {
            request.context_id = Some(Bytes::copy_from_slice(context));
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::VirtualListViewRequest(request);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::VirtualListViewRequest(request) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "vlv request control value",
            });
        };
        let mark = enc.pos();
        if let Some(context) = &request.context_id {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), context);
        }
        match &request.target {
            VlvTarget::ByOffset {
                offset,
                content_count,
            } => {
                let target = enc.pos();
                enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(*content_count));
                enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(*offset));
                enc.finish(Identifier::constructed(Tag::context(0)), target);
            }
            VlvTarget::GreaterThanOrEqual(value) => {
                enc.octet_string(Identifier::primitive(Tag::context(1)), value);
            }
        }
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(request.after_count));
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(request.before_count));
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

pub(super) struct VirtualListViewResponseFactory;

impl ControlFactory for VirtualListViewResponseFactory {
    fn oid(&self) -> &'static str {
        VirtualListViewResponse::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            VirtualListViewResponse::OID,
            ControlValue::VirtualListViewResponse(VirtualListViewResponse::default()),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "vlv response")?;
        expect_end(rest)?;

        let (position, rest) = expect_tlv(seq, 0x02, "vlv response")?;
        let (count, rest) = expect_tlv(rest, 0x02, "vlv response")?;
        let (code, mut inner) = expect_tlv(rest, 0x0a, "vlv response")?;
        let code = decode_integer(code)?;
        if !(0..=i64::from(u32::MAX)).contains(&code) {
            return Err(DecodeError::InvalidInteger);
        }

        let mut response = VirtualListViewResponse {
            target_position: decode_integer_u32(position)?,
            content_count: decode_integer_u32(count)?,
            result: ResultCode(code as u32),
            context_id: None,
        };
        if let Some((context, rest)) = optional_tlv(inner, 0x04)? {
            response.context_id = Some(Bytes::copy_from_slice(context));
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::VirtualListViewResponse(response);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::VirtualListViewResponse(response) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "vlv response control value",
            });
        };
        let mark = enc.pos();
        if let Some(context) = &response.context_id {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), context);
        }
        enc.enumerated(i64::from(response.result.0));
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(response.content_count));
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(response.target_position));
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_round_trip_by_offset() {
        let factory = VirtualListViewRequestFactory;
        let mut control = Control::new(
            VirtualListViewRequest::OID,
            ControlValue::VirtualListViewRequest(VirtualListViewRequest {
                before_count: 0,
                after_count: 19,
                target: VlvTarget::ByOffset {
                    offset: 1,
                    content_count: 0,
                },
                context_id: None,
            }),
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();

        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);
    }

    #[test]
    fn request_round_trip_assertion_target() {
        let factory = VirtualListViewRequestFactory;
        let mut control = Control::new(
            VirtualListViewRequest::OID,
            ControlValue::VirtualListViewRequest(VirtualListViewRequest {
                before_count: 5,
                after_count: 5,
                target: VlvTarget::GreaterThanOrEqual(Bytes::from_static(b"m")),
                context_id: Some(Bytes::from_static(b"ctx")),
            }),
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();

        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);
    }

    #[test]
    fn response_round_trip() {
        let factory = VirtualListViewResponseFactory;
        let mut control = Control::new(
            VirtualListViewResponse::OID,
            ControlValue::VirtualListViewResponse(VirtualListViewResponse {
                target_position: 1,
                content_count: 256,
                result: ResultCode::SUCCESS,
                context_id: Some(Bytes::from_static(b"ctx")),
            }),
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();

        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);
    }
}
