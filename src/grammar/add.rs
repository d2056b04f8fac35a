//! Add and delete tables.

use crate::error::DecodeError;
use crate::messages::{AddRequest, AddResponse, DelRequest, DelResponse, ProtocolOp};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const DN: &[Transition] = &[Transition::primitive(0x04, dn, State::AddAttrList)];

pub(super) const ATTR_LIST: &[Transition] =
    &[Transition::constructed(0x30, State::AttrItem, State::End)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::AddRequest(AddRequest::default()));
    Ok(())
}

pub(super) fn new_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::AddResponse(AddResponse::default()));
    Ok(())
}

pub(super) fn new_del_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::DelResponse(DelResponse::default()));
    Ok(())
}

pub(super) fn finish_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let attrs = core::mem::take(&mut builder.attrs);
    match builder.op_mut()? {
        ProtocolOp::AddRequest(request) => {
            request.attributes = attrs;
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

/// The delete request is a primitive: its payload is the DN itself.
pub(super) fn del_request(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::DelRequest(DelRequest {
        dn: utf8_string(contents)?,
        abandoned: false,
    }));
    Ok(())
}

fn dn(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let dn = utf8_string(contents)?;
    match builder.op_mut()? {
        ProtocolOp::AddRequest(request) => {
            request.entry = dn;
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}
