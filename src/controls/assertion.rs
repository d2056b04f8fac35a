//! The assertion control (RFC 4528) and the pre/post-read controls
//! (RFC 4527), which share the value shapes of filters and search entries.

use bytes::Bytes;

use crate::ber::parser::{expect_end, expect_tlv, parse_tlv};
use crate::ber::{BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::filter::Filter;
use crate::messages::{PartialAttribute, SearchResultEntry};
use crate::octets::utf8_string;
use crate::tag::Tag;

use super::{Control, ControlFactory, ControlValue};

/// The operation only proceeds when this filter evaluates to true against
/// the target entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionControl {
    pub filter: Filter,
}

impl AssertionControl {
    pub const OID: &'static str = "1.3.6.1.1.12";
}

/// Request direction of pre/post-read: the attributes to return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadEntryRequest {
    pub attributes: Vec<String>,
}

/// Response direction of pre/post-read: the entry as it was before (or
/// after) the change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadEntryResponse {
    pub entry: SearchResultEntry,
}

pub const PRE_READ_OID: &str = "1.3.6.1.1.13.1";
pub const POST_READ_OID: &str = "1.3.6.1.1.13.2";

pub(super) struct AssertionFactory;

impl ControlFactory for AssertionFactory {
    fn oid(&self) -> &'static str {
        AssertionControl::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            AssertionControl::OID,
            ControlValue::Assertion(AssertionControl {
                filter: Filter::Present("objectClass".into()),
            }),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        control.value = ControlValue::Assertion(AssertionControl {
            filter: Filter::parse(value)?,
        });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::Assertion(assertion) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "assertion control value",
            });
        };
        assertion.filter.encode(enc)
    }
}

fn decode_read_request(value: &[u8]) -> Result<ReadEntryRequest, DecodeError> {
    let (mut list, rest) = expect_tlv(value, 0x30, "read entry request")?;
    expect_end(rest)?;

    let mut attributes = Vec::new();
    while !list.is_empty() {
        let (attribute, rest) = expect_tlv(list, 0x04, "read entry request")?;
        attributes.push(utf8_string(attribute)?);
        list = rest;
    }
    Ok(ReadEntryRequest { attributes })
}

fn encode_read_request(enc: &mut BerEncoder, request: &ReadEntryRequest) {
    let mark = enc.pos();
    for attribute in request.attributes.iter().rev() {
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), attribute.as_bytes());
    }
    enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
}

fn decode_read_response(value: &[u8]) -> Result<ReadEntryResponse, DecodeError> {
    // the value is a SearchResultEntry, application tag included
    let (entry, rest) = expect_tlv(value, 0x64, "read entry response")?;
    expect_end(rest)?;

    let (dn, rest) = expect_tlv(entry, 0x04, "read entry response")?;
    let (mut list, rest) = expect_tlv(rest, 0x30, "read entry response")?;
    expect_end(rest)?;

    let mut attributes = Vec::new();
    while !list.is_empty() {
        let (attribute, rest) = expect_tlv(list, 0x30, "read entry attribute")?;
        let (id, values_rest) = expect_tlv(attribute, 0x04, "read entry attribute")?;
        let (mut values, attr_rest) = expect_tlv(values_rest, 0x31, "read entry attribute")?;
        expect_end(attr_rest)?;

        let mut partial = PartialAttribute::new(utf8_string(id)?);
        while !values.is_empty() {
            let (tlv, rest) = parse_tlv(values)?;
            if tlv.id != Identifier::primitive(Tag::OCTET_STRING) {
                return Err(DecodeError::grammar("read entry attribute", tlv.initial_octet()));
            }
            partial.values.push(Bytes::copy_from_slice(tlv.contents));
            values = rest;
        }
        attributes.push(partial);
        list = rest;
    }

    Ok(ReadEntryResponse {
        entry: SearchResultEntry {
            object_name: utf8_string(dn)?,
            attributes,
        },
    })
}

fn encode_read_response(
    enc: &mut BerEncoder,
    response: &ReadEntryResponse,
) -> Result<(), EncodeError> {
    response.entry.encode(enc)
}

macro_rules! read_entry_factories {
    ($request:ident, $response:ident, $oid:expr) => {
        pub(super) struct $request;

        impl ControlFactory for $request {
            fn oid(&self) -> &'static str {
                $oid
            }

            fn new_control(&self) -> Control {
                Control::new($oid, ControlValue::ReadEntryRequest(ReadEntryRequest::default()))
            }

            fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
                control.value = ControlValue::ReadEntryRequest(decode_read_request(value)?);
                Ok(())
            }

            fn encode_value(
                &self,
                enc: &mut BerEncoder,
                control: &Control,
            ) -> Result<(), EncodeError> {
                let ControlValue::ReadEntryRequest(request) = &control.value else {
                    return Err(EncodeError::UnsupportedVariant {
                        what: "read entry request control value",
                    });
                };
                encode_read_request(enc, request);
                Ok(())
            }
        }

        pub(super) struct $response;

        impl ControlFactory for $response {
            fn oid(&self) -> &'static str {
                $oid
            }

            fn new_control(&self) -> Control {
                Control::new($oid, ControlValue::ReadEntryResponse(ReadEntryResponse::default()))
            }

            fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
                control.value = ControlValue::ReadEntryResponse(decode_read_response(value)?);
                Ok(())
            }

            fn encode_value(
                &self,
                enc: &mut BerEncoder,
                control: &Control,
            ) -> Result<(), EncodeError> {
                let ControlValue::ReadEntryResponse(response) = &control.value else {
                    return Err(EncodeError::UnsupportedVariant {
                        what: "read entry response control value",
                    });
                };
                encode_read_response(enc, response)
            }
        }
    };
}

read_entry_factories!(PreReadRequestFactory, PreReadResponseFactory, PRE_READ_OID);
read_entry_factories!(PostReadRequestFactory, PostReadResponseFactory, POST_READ_OID);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assertion_filter_round_trip() {
        let factory = AssertionFactory;
        let mut control = Control::new(
            AssertionControl::OID,
            ControlValue::Assertion(AssertionControl {
                filter: Filter::equality("uid", &b"hnelson"[..]),
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
    fn read_entry_round_trips_both_directions() {
        let request_factory = PreReadRequestFactory;
        let mut control = Control::new(
            PRE_READ_OID,
            ControlValue::ReadEntryRequest(ReadEntryRequest {
                attributes: vec!["cn".into(), "member".into()],
            }),
        );
        let mut enc = BerEncoder::new();
        request_factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();
        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        request_factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);

        let response_factory = PostReadResponseFactory;
        let mut control = Control::new(
            POST_READ_OID,
            ControlValue::ReadEntryResponse(ReadEntryResponse {
                entry: SearchResultEntry {
                    object_name: "cn=group,dc=example,dc=com".into(),
                    attributes: vec![PartialAttribute::with_values(
                        "member",
                        [&b"cn=user1"[..], &b"cn=user2"[..]],
                    )],
                },
            }),
        );
        let mut enc = BerEncoder::new();
        response_factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();
        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        response_factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);
    }
}
