//! Marker controls with little or no value payload: tree delete,
//! manageDsaIT, and subentries visibility.

use crate::ber::parser::{expect_end, expect_tlv};
use crate::ber::{decode_boolean, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::tag::Tag;

use super::{Control, ControlFactory, ControlValue};

/// Deletes a whole subtree in one operation (draft-armijo-ldap-treedelete).
/// No value octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeDelete;

impl TreeDelete {
    pub const OID: &'static str = "1.2.840.113556.1.4.805";
}

/// Makes referral and other special entries answer as ordinary entries
/// (RFC 3296). No value octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManageDsaIT;

impl ManageDsaIT {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.2";
}

/// Controls subentry visibility during searches (RFC 3672). The value is a
/// single BER BOOLEAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subentries {
    pub visibility: bool,
}

impl Subentries {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.1.10.1";
}

macro_rules! valueless_factory {
    ($factory:ident, $control:ident) => {
        pub(super) struct $factory;

        impl ControlFactory for $factory {
            fn oid(&self) -> &'static str {
                $control::OID
            }

            fn new_control(&self) -> Control {
                Control::new($control::OID, ControlValue::Absent)
            }

            fn decode_value(
                &self,
                _control: &mut Control,
                value: &[u8],
            ) -> Result<(), DecodeError> {
                // tolerate a zero-length value octet string
                if value.is_empty() {
                    Ok(())
                } else {
                    Err(DecodeError::TrailingBytesInStructure {
                        remaining: value.len() as u32,
                    })
                }
            }

            fn encode_value(
                &self,
                _enc: &mut BerEncoder,
                _control: &Control,
            ) -> Result<(), EncodeError> {
                Ok(())
            }

            fn has_value(&self, _control: &Control) -> bool {
                false
            }
        }
    };
}

valueless_factory!(TreeDeleteFactory, TreeDelete);
valueless_factory!(ManageDsaITFactory, ManageDsaIT);

pub(super) struct SubentriesFactory;

impl ControlFactory for SubentriesFactory {
    fn oid(&self) -> &'static str {
        Subentries::OID
    }

    fn new_control(&self) -> Control {
        Control::new(Subentries::OID, ControlValue::Subentries(Subentries::default()))
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (visibility, rest) = expect_tlv(value, 0x01, "subentries")?;
        expect_end(rest)?;
        control.value = ControlValue::Subentries(Subentries {
            visibility: decode_boolean(visibility)?,
        });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::Subentries(subentries) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "subentries control value",
            });
        };
        enc.boolean(Identifier::primitive(Tag::BOOL), subentries.visibility);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valueless_controls() {
        let factory = TreeDeleteFactory;
        let control = factory.new_control();
        assert!(!factory.has_value(&control));
        let mut control = control;
        assert!(factory.decode_value(&mut control, &[]).is_ok());
        assert!(factory.decode_value(&mut control, &[0x01]).is_err());
    }

    #[test]
    fn subentries_round_trip() {
        let factory = SubentriesFactory;
        let mut control = Control::new(
            Subentries::OID,
            ControlValue::Subentries(Subentries { visibility: true }),
        );

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        let bytes = enc.into_bytes();
        assert_eq!(bytes, vec![0x01, 0x01, 0xff]);

        control.value = ControlValue::Absent;
        factory.decode_value(&mut control, &bytes).unwrap();
        assert_eq!(
            control.value,
            ControlValue::Subentries(Subentries { visibility: true })
        );
    }
}
