//! Modify and modify-DN tables.

use crate::ber::{decode_boolean, decode_integer};
use crate::error::DecodeError;
use crate::messages::{
    ModifyChange, ModifyDnRequest, ModifyDnResponse, ModifyOperation, ModifyRequest,
    ModifyResponse, ProtocolOp,
};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const OBJECT: &[Transition] =
    &[Transition::primitive(0x04, object, State::ModifyChangeList)];

pub(super) const CHANGE_LIST: &[Transition] =
    &[Transition::constructed(0x30, State::ModifyChange, State::End)];

pub(super) const CHANGE: &[Transition] = &[Transition::structure(
    0x30,
    State::ModifyOperation,
    State::ModifyChange,
    None,
    Some(finish_change),
)];

pub(super) const OPERATION: &[Transition] =
    &[Transition::primitive(0x0a, operation, State::ModifyAttrSeq)];

pub(super) const ATTR_SEQ: &[Transition] =
    &[Transition::constructed(0x30, State::AttrType, State::End)];

pub(super) const MOD_DN_ENTRY: &[Transition] =
    &[Transition::primitive(0x04, mod_dn_entry, State::ModDnNewRdn)];

pub(super) const MOD_DN_NEW_RDN: &[Transition] =
    &[Transition::primitive(0x04, mod_dn_new_rdn, State::ModDnDeleteOld)];

pub(super) const MOD_DN_DELETE_OLD: &[Transition] =
    &[Transition::primitive(0x01, mod_dn_delete_old, State::ModDnAfter)];

pub(super) const MOD_DN_AFTER: &[Transition] =
    &[Transition::primitive(0x80, mod_dn_new_superior, State::End)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ModifyRequest(ModifyRequest::default()));
    Ok(())
}

pub(super) fn new_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ModifyResponse(ModifyResponse::default()));
    Ok(())
}

pub(super) fn new_mod_dn_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ModifyDnRequest(ModifyDnRequest::default()));
    Ok(())
}

pub(super) fn new_mod_dn_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::ModifyDnResponse(ModifyDnResponse::default()));
    Ok(())
}

pub(super) fn finish_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let changes = core::mem::take(&mut builder.changes);
    match builder.op_mut()? {
        ProtocolOp::ModifyRequest(request) => {
            request.changes = changes;
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

pub(super) fn finish_change(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let operation = builder.change_op.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
    let modification = builder.attr.take().ok_or(DecodeError::UnexpectedEndOfInput)?;
    builder.changes.push(ModifyChange {
        operation,
        modification,
    });
    Ok(())
}

fn request(builder: &mut MessageBuilder) -> Result<&mut ModifyRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::ModifyRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn mod_dn(builder: &mut MessageBuilder) -> Result<&mut ModifyDnRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::ModifyDnRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn object(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.object = utf8_string(contents)?;
    Ok(())
}

fn operation(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    builder.change_op = Some(
        ModifyOperation::from_wire(decode_integer(contents)?).ok_or(DecodeError::InvalidInteger)?,
    );
    Ok(())
}

fn mod_dn_entry(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    mod_dn(builder)?.entry = utf8_string(contents)?;
    Ok(())
}

fn mod_dn_new_rdn(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    mod_dn(builder)?.new_rdn = utf8_string(contents)?;
    Ok(())
}

fn mod_dn_delete_old(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    mod_dn(builder)?.delete_old_rdn = decode_boolean(contents)?;
    Ok(())
}

fn mod_dn_new_superior(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    mod_dn(builder)?.new_superior = Some(utf8_string(contents)?);
    Ok(())
}
