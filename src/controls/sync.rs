//! Content synchronization (RFC 4533): the request, per-entry state and
//! done controls.

use bytes::Bytes;

use crate::ber::parser::{expect_end, expect_tlv, optional_tlv};
use crate::ber::{decode_boolean, decode_integer, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::tag::Tag;

use super::{Control, ControlFactory, ControlValue};

/// `mode ENUMERATED { refreshOnly (1), refreshAndPersist (3) }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncRequestMode {
    #[default]
    RefreshOnly = 1,
    RefreshAndPersist = 3,
}

impl SyncRequestMode {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            1 => Some(SyncRequestMode::RefreshOnly),
            3 => Some(SyncRequestMode::RefreshAndPersist),
            _ => None,
        }
    }
}

/// `syncRequestValue ::= SEQUENCE { mode ENUMERATED, cookie syncCookie
/// OPTIONAL, reloadHint BOOLEAN DEFAULT FALSE }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncRequest {
    pub mode: SyncRequestMode,
    pub cookie: Option<Bytes>,
    pub reload_hint: bool,
}

impl SyncRequest {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.1.9.1.1";
}

/// `state ENUMERATED { present (0), add (1), modify (2), delete (3) }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStateType {
    #[default]
    Present = 0,
    Add = 1,
    Modify = 2,
    Delete = 3,
}

impl SyncStateType {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(SyncStateType::Present),
            1 => Some(SyncStateType::Add),
            2 => Some(SyncStateType::Modify),
            3 => Some(SyncStateType::Delete),
            _ => None,
        }
    }
}

/// `syncStateValue ::= SEQUENCE { state ENUMERATED, entryUUID syncUUID,
/// cookie syncCookie OPTIONAL }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncState {
    pub state: SyncStateType,
    pub entry_uuid: Bytes,
    pub cookie: Option<Bytes>,
}

impl SyncState {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.1.9.1.2";
}

/// `syncDoneValue ::= SEQUENCE { cookie syncCookie OPTIONAL,
/// refreshDeletes BOOLEAN DEFAULT FALSE }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncDone {
    pub cookie: Option<Bytes>,
    pub refresh_deletes: bool,
}

impl SyncDone {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.1.9.1.3";
}

pub(super) struct SyncRequestFactory;

impl ControlFactory for SyncRequestFactory {
    fn oid(&self) -> &'static str {
        SyncRequest::OID
    }

    fn new_control(&self) -> Control {
        Control::new(SyncRequest::OID, ControlValue::SyncRequest(SyncRequest::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "sync request")?;
        expect_end(rest)?;

        let (mode, mut inner) = expect_tlv(seq, 0x0a, "sync request")?;
        let mode =
            SyncRequestMode::from_wire(decode_integer(mode)?).ok_or(DecodeError::InvalidInteger)?;

        let mut request = SyncRequest {
            mode,
            cookie: None,
            reload_hint: false,
        };
        if let Some((cookie, rest)) = optional_tlv(inner, 0x04)? {
            request.cookie = Some(Bytes::copy_from_slice(cookie));
            inner = rest;
        }
        if let Some((hint, rest)) = optional_tlv(inner, 0x01)? {
            request.reload_hint = decode_boolean(hint)?;
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::SyncRequest(request);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::SyncRequest(request) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "sync request control value",
            });
        };
        let mark = enc.pos();
        if request.reload_hint {
            enc.boolean(Identifier::primitive(Tag::BOOL), true);
        }
        if let Some(cookie) = &request.cookie {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), cookie);
        }
        enc.enumerated(request.mode as i64);
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

pub(super) struct SyncStateFactory;

impl ControlFactory for SyncStateFactory {
    fn oid(&self) -> &'static str {
        SyncState::OID
    }

    fn new_control(&self) -> Control {
        Control::new(SyncState::OID, ControlValue::SyncState(SyncState::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "sync state")?;
        expect_end(rest)?;

        let (state, rest) = expect_tlv(seq, 0x0a, "sync state")?;
        let state =
            SyncStateType::from_wire(decode_integer(state)?).ok_or(DecodeError::InvalidInteger)?;
        let (uuid, mut inner) = expect_tlv(rest, 0x04, "sync state")?;

        let mut sync_state = SyncState {
            state,
            entry_uuid: Bytes::copy_from_slice(uuid),
            cookie: None,
        };
        if let Some((cookie, rest)) = optional_tlv(inner, 0x04)? {
            sync_state.cookie = Some(Bytes::copy_from_slice(cookie));
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::SyncState(sync_state);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::SyncState(state) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "sync state control value",
            });
        };
        let mark = enc.pos();
        if let Some(cookie) = &state.cookie {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), cookie);
        }
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), &state.entry_uuid);
        enc.enumerated(state.state as i64);
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

pub(super) struct SyncDoneFactory;

impl ControlFactory for SyncDoneFactory {
    fn oid(&self) -> &'static str {
        SyncDone::OID
    }

    fn new_control(&self) -> Control {
        Control::new(SyncDone::OID, ControlValue::SyncDone(SyncDone::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "sync done")?;
        expect_end(rest)?;

        let mut done = SyncDone::default();
        let mut inner = seq;
        if let Some((cookie, rest)) = optional_tlv(inner, 0x04)? {
            done.cookie = Some(Bytes::copy_from_slice(cookie));
            inner = rest;
        }
        if let Some((refresh, rest)) = optional_tlv(inner, 0x01)? {
            done.refresh_deletes = decode_boolean(refresh)?;
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::SyncDone(done);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::SyncDone(done) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "sync done control value",
            });
        };
        let mark = enc.pos();
        if done.refresh_deletes {
            enc.boolean(Identifier::primitive(Tag::BOOL), true);
        }
        if let Some(cookie) = &done.cookie {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), cookie);
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sync_request_round_trip() {
        let factory = SyncRequestFactory;
        let mut control = Control::new(
            SyncRequest::OID,
            ControlValue::SyncRequest(SyncRequest {
                mode: SyncRequestMode::RefreshAndPersist,
                cookie: Some(Bytes::from_static(b"rid=000,csn=1")),
                reload_hint: true,
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
    fn sync_state_round_trip() {
        let factory = SyncStateFactory;
        let mut control = Control::new(
            SyncState::OID,
            ControlValue::SyncState(SyncState {
                state: SyncStateType::Delete,
                entry_uuid: Bytes::from_static(&[0x11; 16]),
                cookie: None,
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
    fn sync_done_defaults() {
        let factory = SyncDoneFactory;
        let mut control = factory.new_control();
        factory.decode_value(&mut control, &[0x30, 0x00]).unwrap();
        assert_eq!(control.value, ControlValue::SyncDone(SyncDone::default()));
    }

    #[test]
    fn bad_mode_is_rejected() {
        let factory = SyncRequestFactory;
        let mut control = factory.new_control();
        assert_eq!(
            factory.decode_value(&mut control, &[0x30, 0x03, 0x0a, 0x01, 0x02]),
            Err(DecodeError::InvalidInteger)
        );
    }
}
