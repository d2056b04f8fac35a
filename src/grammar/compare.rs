//! Compare tables.

use bytes::Bytes;

use crate::error::DecodeError;
use crate::messages::{CompareRequest, CompareResponse, ProtocolOp};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const ENTRY: &[Transition] =
    &[Transition::primitive(0x04, entry, State::CompareAvaSeq)];

pub(super) const AVA_SEQ: &[Transition] =
    &[Transition::constructed(0x30, State::CompareAvaDesc, State::End)];

pub(super) const AVA_DESC: &[Transition] =
    &[Transition::primitive(0x04, ava_desc, State::CompareAvaValue)];

pub(super) const AVA_VALUE: &[Transition] =
    &[Transition::primitive(0x04, ava_value, State::End)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::CompareRequest(CompareRequest::default()));
    Ok(())
}

pub(super) fn new_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::CompareResponse(CompareResponse::default()));
    Ok(())
}

fn request(builder: &mut MessageBuilder) -> Result<&mut CompareRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::CompareRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn entry(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.entry = utf8_string(contents)?;
    Ok(())
}

fn ava_desc(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.ava.attribute_desc = utf8_string(contents)?;
    Ok(())
}

fn ava_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.ava.assertion_value = Bytes::copy_from_slice(contents);
    Ok(())
}
