//! Extended, intermediate, abandon and unbind tables.

use bytes::Bytes;

use crate::ber::decode_integer_u32;
use crate::error::DecodeError;
use crate::messages::{
    AbandonRequest, ExtendedRequest, ExtendedResponse, IntermediateResponse, ProtocolOp,
    UnbindRequest,
};
use crate::octets::utf8_string;
use crate::oid;

use super::{MessageBuilder, State, Transition};

pub(super) const REQ_NAME: &[Transition] =
    &[Transition::primitive(0x80, request_name, State::ExtReqAfter)];

pub(super) const REQ_AFTER: &[Transition] =
    &[Transition::primitive(0x81, request_value, State::End)];

pub(super) const INTERMEDIATE_START: &[Transition] = &[
    Transition::primitive(0x80, intermediate_name, State::IntermediateAfterName),
    Transition::primitive(0x81, intermediate_value, State::End),
];

pub(super) const INTERMEDIATE_AFTER_NAME: &[Transition] =
    &[Transition::primitive(0x81, intermediate_value, State::End)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ExtendedRequest(ExtendedRequest::default()));
    Ok(())
}

pub(super) fn new_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ExtendedResponse(ExtendedResponse::default()));
    Ok(())
}

pub(super) fn new_intermediate(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::IntermediateResponse(
        IntermediateResponse::default(),
    ));
    Ok(())
}

/// The unbind request is `NULL`: any payload octets are a protocol error.
pub(super) fn unbind(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    if !contents.is_empty() {
        return Err(DecodeError::TrailingBytesInStructure {
            remaining: contents.len() as u32,
        });
    }
    builder.op = Some(ProtocolOp::UnbindRequest(UnbindRequest));
    Ok(())
}

/// The abandon request is a primitive whose payload is the message id to
/// abandon.
pub(super) fn abandon(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::AbandonRequest(AbandonRequest {
        message_id: decode_integer_u32(contents)?,
    }));
    Ok(())
}

fn request(builder: &mut MessageBuilder) -> Result<&mut ExtendedRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::ExtendedRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn intermediate(builder: &mut MessageBuilder) -> Result<&mut IntermediateResponse, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::IntermediateResponse(response) => Ok(response),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn request_name(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let name = utf8_string(contents).map_err(|_| DecodeError::InvalidOid)?;
    if !oid::is_dotted(&name) {
        return Err(DecodeError::InvalidOid);
    }
    request(builder)?.request_name = name;
    Ok(())
}

fn request_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.request_value = Some(Bytes::copy_from_slice(contents));
    Ok(())
}

fn intermediate_name(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    intermediate(builder)?.response_name = Some(utf8_string(contents)?);
    Ok(())
}

fn intermediate_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    intermediate(builder)?.response_value = Some(Bytes::copy_from_slice(contents));
    Ok(())
}
