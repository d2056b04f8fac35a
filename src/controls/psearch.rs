//! Persistent search and its entry-change notification companion
//! (draft-ietf-ldapext-psearch).

use crate::ber::parser::{expect_end, expect_tlv, parse_tlv};
use crate::ber::{decode_boolean, decode_integer, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::octets::utf8_string;
use crate::tag::Tag;

use super::{Control, ControlFactory, ControlValue};

/// The kind of change an entry underwent, also usable as a bitmask in
/// [`PersistentSearch::change_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add = 1,
    Delete = 2,
    Modify = 4,
    ModDn = 8,
}

impl ChangeType {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            1 => Some(ChangeType::Add),
            2 => Some(ChangeType::Delete),
            4 => Some(ChangeType::Modify),
            8 => Some(ChangeType::ModDn),
            _ => None,
        }
    }
}

/// `PersistentSearch ::= SEQUENCE { changeTypes INTEGER, changesOnly
/// BOOLEAN, returnECs BOOLEAN }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentSearch {
    /// OR-mask of [`ChangeType`] values.
    pub change_types: u32,
    pub changes_only: bool,
    pub return_ecs: bool,
}

impl Default for PersistentSearch {
    fn default() -> Self {
        Self {
            change_types: ChangeType::Add as u32
                | ChangeType::Delete as u32
                | ChangeType::Modify as u32
                | ChangeType::ModDn as u32,
            changes_only: false,
            return_ecs: false,
        }
    }
}

impl PersistentSearch {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.3";

    pub fn notifies_on(&self, change_type: ChangeType) -> bool {
        self.change_types & change_type as u32 != 0
    }
}

/// `EntryChangeNotification ::= SEQUENCE { changeType ENUMERATED,
/// previousDN LDAPDN OPTIONAL, changeNumber INTEGER OPTIONAL }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChangeNotification {
    pub change_type: ChangeType,
    /// Only present for modify-DN changes.
    pub previous_dn: Option<String>,
    pub change_number: Option<i64>,
}

impl Default for EntryChangeNotification {
    fn default() -> Self {
        Self {
            change_type: ChangeType::Add,
            previous_dn: None,
            change_number: None,
        }
    }
}

impl EntryChangeNotification {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.7";
}

pub(super) struct PersistentSearchFactory;

impl ControlFactory for PersistentSearchFactory {
    fn oid(&self) -> &'static str {
        PersistentSearch::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            PersistentSearch::OID,
            ControlValue::PersistentSearch(PersistentSearch::default()),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "persistent search")?;
        expect_end(rest)?;
        let (types, rest) = expect_tlv(seq, 0x02, "persistent search")?;
        let (changes_only, rest) = expect_tlv(rest, 0x01, "persistent search")?;
        let (return_ecs, rest) = expect_tlv(rest, 0x01, "persistent search")?;
        expect_end(rest)?;

        let types = decode_integer(types)?;
        if !(0..=15).contains(&types) {
            return Err(DecodeError::InvalidInteger);
        }

        control.value = ControlValue::PersistentSearch(PersistentSearch {
            change_types: types as u32,
            changes_only: decode_boolean(changes_only)?,
            return_ecs: decode_boolean(return_ecs)?,
        });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::PersistentSearch(psearch) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "persistent search control value",
            });
        };
        let mark = enc.pos();
        enc.boolean(Identifier::primitive(Tag::BOOL), psearch.return_ecs);
        enc.boolean(Identifier::primitive(Tag::BOOL), psearch.changes_only);
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(psearch.change_types));
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

pub(super) struct EntryChangeNotificationFactory;

impl ControlFactory for EntryChangeNotificationFactory {
    fn oid(&self) -> &'static str {
        EntryChangeNotification::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            EntryChangeNotification::OID,
            ControlValue::EntryChangeNotification(EntryChangeNotification::default()),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "entry change notification")?;
        expect_end(rest)?;

        let (change_type, mut inner) = expect_tlv(seq, 0x0a, "entry change notification")?;
        let change_type = ChangeType::from_wire(decode_integer(change_type)?)
            .ok_or(DecodeError::InvalidInteger)?;

        let mut notification = EntryChangeNotification {
            change_type,
            previous_dn: None,
            change_number: None,
        };
        if !inner.is_empty() {
            let (tlv, rest) = parse_tlv(inner)?;
            if tlv.id == Identifier::primitive(Tag::OCTET_STRING) {
                notification.previous_dn = Some(utf8_string(tlv.contents)?);
                inner = rest;
            }
        }
        if !inner.is_empty() {
            let (number, rest) = expect_tlv(inner, 0x02, "entry change notification")?;
            notification.change_number = Some(decode_integer(number)?);
            inner = rest;
        }
        expect_end(inner)?;

        control.value = ControlValue::EntryChangeNotification(notification);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::EntryChangeNotification(notification) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "entry change notification control value",
            });
        };
        let mark = enc.pos();
        if let Some(number) = notification.change_number {
            enc.integer(Identifier::primitive(Tag::INTEGER), number);
        }
        if let Some(previous_dn) = &notification.previous_dn {
            enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), previous_dn.as_bytes());
        }
        enc.enumerated(notification.change_type as i64);
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn persistent_search_round_trip() {
        let factory = PersistentSearchFactory;
        let mut control = Control::new(
            PersistentSearch::OID,
            ControlValue::PersistentSearch(PersistentSearch {
                change_types: ChangeType::Add as u32 | ChangeType::ModDn as u32,
                changes_only: true,
                return_ecs: true,
            }),
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();

        let expected = control.value.clone();
        control.value = ControlValue::Absent;
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(control.value, expected);

        let ControlValue::PersistentSearch(psearch) = &control.value else {
            unreachable!()
        };
        assert!(psearch.notifies_on(ChangeType::Add));
        assert!(!psearch.notifies_on(ChangeType::Modify));
    }

    #[test]
    fn notification_round_trip() {
        let factory = EntryChangeNotificationFactory;
        let mut control = Control::new(
            EntryChangeNotification::OID,
            ControlValue::EntryChangeNotification(EntryChangeNotification {
                change_type: ChangeType::ModDn,
                previous_dn: Some("cn=old,dc=example,dc=com".into()),
                change_number: Some(42),
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
