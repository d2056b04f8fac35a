//! Search request, result entry and result reference tables.

use crate::ber::{decode_boolean, decode_integer, decode_integer_u32};
use crate::error::DecodeError;
use crate::filter::Filter;
use crate::messages::{
    DerefAliases, ProtocolOp, SearchResultDone, SearchResultEntry, SearchResultReference,
    SearchRequest, SearchScope,
};
use crate::octets::utf8_string;

use super::{MessageBuilder, State, Transition};

pub(super) const BASE: &[Transition] = &[Transition::primitive(0x04, base, State::SearchScope)];

pub(super) const SCOPE: &[Transition] = &[Transition::primitive(0x0a, scope, State::SearchDeref)];

pub(super) const DEREF: &[Transition] = &[Transition::primitive(0x0a, deref, State::SearchSize)];

pub(super) const SIZE: &[Transition] = &[Transition::primitive(0x02, size, State::SearchTime)];

pub(super) const TIME: &[Transition] =
    &[Transition::primitive(0x02, time, State::SearchTypesOnly)];

pub(super) const TYPES_ONLY: &[Transition] =
    &[Transition::primitive(0x01, types_only, State::SearchFilter)];

/// Every filter choice tag captures the whole subtree for the slice-level
/// filter parser.
pub(super) const FILTER: &[Transition] = &[
    Transition::subtree(0xa0, filter, State::SearchAttrList),
    Transition::subtree(0xa1, filter, State::SearchAttrList),
    Transition::subtree(0xa2, filter, State::SearchAttrList),
    Transition::subtree(0xa3, filter, State::SearchAttrList),
    Transition::subtree(0xa4, filter, State::SearchAttrList),
    Transition::subtree(0xa5, filter, State::SearchAttrList),
    Transition::subtree(0xa6, filter, State::SearchAttrList),
    Transition::subtree(0x87, filter, State::SearchAttrList),
    Transition::subtree(0xa8, filter, State::SearchAttrList),
    Transition::subtree(0xa9, filter, State::SearchAttrList),
];

pub(super) const ATTR_LIST: &[Transition] =
    &[Transition::constructed(0x30, State::SearchAttr, State::End)];

pub(super) const ATTR: &[Transition] =
    &[Transition::primitive(0x04, attribute, State::SearchAttr)];

pub(super) const ENTRY_DN: &[Transition] =
    &[Transition::primitive(0x04, entry_dn, State::EntryAttrList)];

pub(super) const ENTRY_ATTR_LIST: &[Transition] =
    &[Transition::constructed(0x30, State::AttrItem, State::End)];

pub(super) const REF_URI_FIRST: &[Transition] =
    &[Transition::primitive(0x04, reference_uri, State::RefUri)];

pub(super) const REF_URI: &[Transition] =
    &[Transition::primitive(0x04, reference_uri, State::RefUri)];

pub(super) fn new_request(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::SearchRequest(SearchRequest::default()));
    Ok(())
}

pub(super) fn new_entry(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::SearchResultEntry(SearchResultEntry::default()));
    Ok(())
}

pub(super) fn new_done(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::SearchResultDone(SearchResultDone::default()));
    Ok(())
}

pub(super) fn new_reference(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    builder.op = Some(ProtocolOp::SearchResultReference(
        SearchResultReference::default(),
    ));
    Ok(())
}

pub(super) fn finish_entry(builder: &mut MessageBuilder) -> Result<(), DecodeError> {
    let attrs = core::mem::take(&mut builder.attrs);
    match builder.op_mut()? {
        ProtocolOp::SearchResultEntry(entry) => {
            entry.attributes = attrs;
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn request(builder: &mut MessageBuilder) -> Result<&mut SearchRequest, DecodeError> {
    match builder.op_mut()? {
        ProtocolOp::SearchRequest(request) => Ok(request),
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn base(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.base_object = utf8_string(contents)?;
    Ok(())
}

fn scope(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.scope =
        SearchScope::from_wire(decode_integer(contents)?).ok_or(DecodeError::InvalidInteger)?;
    Ok(())
}

fn deref(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.deref_aliases =
        DerefAliases::from_wire(decode_integer(contents)?).ok_or(DecodeError::InvalidInteger)?;
    Ok(())
}

fn size(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.size_limit = decode_integer_u32(contents)?;
    Ok(())
}

fn time(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.time_limit = decode_integer_u32(contents)?;
    Ok(())
}

fn types_only(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.types_only = decode_boolean(contents)?;
    Ok(())
}

fn filter(builder: &mut MessageBuilder, subtree: &[u8]) -> Result<(), DecodeError> {
    request(builder)?.filter = Filter::parse(subtree)?;
    Ok(())
}

fn attribute(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let attribute = utf8_string(contents)?;
    request(builder)?.attributes.push(attribute);
    Ok(())
}

fn entry_dn(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let dn = utf8_string(contents)?;
    match builder.op_mut()? {
        ProtocolOp::SearchResultEntry(entry) => {
            entry.object_name = dn;
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}

fn reference_uri(builder: &mut MessageBuilder, contents: &[u8]) -> Result<(), DecodeError> {
    let uri = utf8_string(contents)?;
    match builder.op_mut()? {
        ProtocolOp::SearchResultReference(reference) => {
            reference.uris.push(uri);
            Ok(())
        }
        _ => Err(DecodeError::UnexpectedEndOfInput),
    }
}
