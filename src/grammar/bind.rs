//! Bind request and response tables.

use bytes::Bytes;

use crate::ber::decode_integer;
use crate::error::DecodeError;
use crate::messages::{BindAuthentication, BindRequest, BindResponse, ProtocolOp};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const VERSION: &[Transition] =
    &[Transition::primitive(0x02, version, State::BindName)];

pub(super) const NAME: &[Transition] = &[Transition::primitive(0x04, name, State::BindAuth)];

pub(super) const AUTH: &[Transition] = &[
    Transition::primitive(0x80, simple, State::End),
    Transition::constructed(0xa3, State::SaslMechanism, State::End),
];

pub(super) const SASL_MECHANISM: &[Transition] =
    &[Transition::primitive(0x04, sasl_mechanism, State::SaslCredentials)];

pub(super) const SASL_CREDENTIALS: &[Transition] =
    &[Transition::primitive(0x04, sasl_credentials, State::End)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::BindRequest(BindRequest::default()));
    Ok(())
}

pub(super) fn new_response(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::BindResponse(BindResponse::default()));
    Ok(())
}

fn request(builder: &mut MessageBuilder) -> Result<&mut BindRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::BindRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn version(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let version = decode_integer(contents)?;
    if !(1..=127).contains(&version) {
        return Err(DecodeError::InvalidInteger);
    }
    request(builder)?.version = version as u8;
    Ok(())
}

fn name(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.name = utf8_string(contents)?;
    Ok(())
}

fn simple(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.authentication =
        BindAuthentication::Simple(Bytes::copy_from_slice(contents));
    Ok(())
}

fn sasl_mechanism(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.authentication = BindAuthentication::Sasl {
        mechanism: utf8_string(contents)?,
        credentials: None,
    };
    Ok(())
}

fn sasl_credentials(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    match &mut request(builder)?.authentication {
        BindAuthentication::Sasl { credentials, .. } => {
            *credentials = Some(Bytes::copy_from_slice(contents));
            Ok(())
        }
        BindAuthentication::Simple(_) => Err(DecodeError::UnexpectedEndOfInput),
    }
}
