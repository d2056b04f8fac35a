//! The LDAPResult suffix shared by every response operation, including the
//! response-specific trailing fields selected by op kind.

use bytes::Bytes;

use crate::ber::decode_integer;
use crate::error::DecodeError;
use crate::messages::{LdapResult, ProtocolOp, ResultCode};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const CODE: &[Transition] =
    &[Transition::primitive(0x0a, code, State::ResultMatchedDn)];

pub(super) const MATCHED_DN: &[Transition] =
    &[Transition::primitive(0x04, matched_dn, State::ResultDiagnostic)];

pub(super) const DIAGNOSTIC: &[Transition] =
    &[Transition::primitive(0x04, diagnostic, State::ResultExtras)];

pub(super) const EXTRAS: &[Transition] = &[
    Transition::structure(
        0xa3,
        State::ReferralUri,
        State::ResultExtras,
        Some(start_referral),
        None,
    ),
    Transition::primitive(0x87, server_sasl_creds, State::ResultExtras),
    Transition::primitive(0x8a, extended_name, State::ResultExtras),
    Transition::primitive(0x8b, extended_value, State::ResultExtras),
];

pub(super) const REFERRAL_URI: &[Transition] =
    &[Transition::primitive(0x04, referral_uri, State::ReferralUri)];

/// The result envelope of the current response op.
fn result_mut(builder: &mut MessageBuilder) -> Result<&mut LdapResult, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::BindResponse(op) => Ok(&mut op.result),
        ProtocolOp::SearchResultDone(op) => Ok(&mut op.result),
        ProtocolOp::ModifyResponse(op) => Ok(&mut op.result),
        ProtocolOp::AddResponse(op) => Ok(&mut op.result),
        ProtocolOp::DelResponse(op) => Ok(&mut op.result),
        ProtocolOp::ModifyDnResponse(op) => Ok(&mut op.result),
        ProtocolOp::CompareResponse(op) => Ok(&mut op.result),
        ProtocolOp::ExtendedResponse(op) => Ok(&mut op.result),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn code(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let code = decode_integer(contents)?;
    if !(0..=i64::from(u32::MAX)).contains(&code) {
        return Err(DecodeError::InvalidInteger);
    }
    result_mut(builder)?.result_code = ResultCode(code as u32);
    Ok(())
}

fn matched_dn(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    result_mut(builder)?.matched_dn = utf8_string(contents)?;
    Ok(())
}

fn diagnostic(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    result_mut(builder)?.diagnostic_message = utf8_string(contents)?;
    Ok(())
}

fn start_referral(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    result_mut(builder)?.referral.get_or_insert_with(Vec::new);
    Ok(())
}

fn referral_uri(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let uri = utf8_string(contents)?;
    result_mut(builder)?
        .referral
        .get_or_insert_with(Vec::new)
        .push(uri);
    Ok(())
}

fn server_sasl_creds(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::BindResponse(op) => {
            op.server_sasl_creds = Some(Bytes::copy_from_slice(contents));
            Ok(())
        }
        _ => Err(DecodeError::grammar("ldapResult", 0x87)),
    }
}

fn extended_name(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::ExtendedResponse(op) => {
            op.response_name = Some(utf8_string(contents)?);
            Ok(())
        }
        _ => Err(DecodeError::grammar("ldapResult", 0x8a)),
    }
}

fn extended_value(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::ExtendedResponse(op) => {
            op.response_value = Some(Bytes::copy_from_slice(contents));
            Ok(())
        }
        _ => Err(DecodeError::grammar("ldapResult", 0x8b)),
    }
}
