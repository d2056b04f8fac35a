//! Password policy (draft-behera-ldap-password-policy). Requests carry the
//! control with no value; responses carry an optional warning and error.

use crate::ber::parser::{expect_end, expect_tlv, parse_tlv};
use crate::ber::{decode_integer, BerEncoder, Identifier};
use crate::error::{DecodeError, EncodeError};
use crate::tag::{Class, Tag};

use super::{Control, ControlFactory, ControlValue};

/// `warning [0] CHOICE { timeBeforeExpiration [0] INTEGER,
/// graceAuthNsRemaining [1] INTEGER }`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyWarning {
    /// Seconds until the password expires.
    TimeBeforeExpiration(u32),
    /// Grace binds left after expiry.
    GraceAuthNsRemaining(u32),
}

/// `error [1] ENUMERATED`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    PasswordExpired = 0,
    AccountLocked = 1,
    ChangeAfterReset = 2,
    PasswordModNotAllowed = 3,
    MustSupplyOldPassword = 4,
    InsufficientPasswordQuality = 5,
    PasswordTooShort = 6,
    PasswordTooYoung = 7,
    PasswordInHistory = 8,
}

impl PasswordPolicyError {
    pub(crate) fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::PasswordExpired),
            1 => Some(Self::AccountLocked),
            2 => Some(Self::ChangeAfterReset),
            3 => Some(Self::PasswordModNotAllowed),
            4 => Some(Self::MustSupplyOldPassword),
            5 => Some(Self::InsufficientPasswordQuality),
            6 => Some(Self::PasswordTooShort),
            7 => Some(Self::PasswordTooYoung),
            8 => Some(Self::PasswordInHistory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasswordPolicy {
    pub warning: Option<PasswordPolicyWarning>,
    pub error: Option<PasswordPolicyError>,
}

impl PasswordPolicy {
    pub const OID: &'static str = "1.3.6.1.4.1.42.2.27.8.5.1";
}

pub(super) struct PasswordPolicyFactory;

impl ControlFactory for PasswordPolicyFactory {
    fn oid(&self) -> &'static str {
        PasswordPolicy::OID
    }

    fn new_control(&self) -> Control {
        // requests send the bare control
        Control::new(PasswordPolicy::OID, ControlValue::Absent)
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let (seq, rest) = expect_tlv(value, 0x30, "password policy")?;
        expect_end(rest)?;

        let mut policy = PasswordPolicy::default();
        let mut input = seq;
        while !input.is_empty() {
            let (tlv, rest) = parse_tlv(input)?;
            match (tlv.id.tag.class, tlv.id.tag.value, tlv.id.is_constructed()) {
                (Class::Context, 0, true) => {
                    let (choice, inner_rest) = parse_tlv(tlv.contents)?;
                    expect_end(inner_rest)?;
                    let seconds = decode_choice_integer(choice.contents)?;
                    policy.warning = Some(match (choice.id.tag.class, choice.id.tag.value) {
                        (Class::Context, 0) => PasswordPolicyWarning::TimeBeforeExpiration(seconds),
                        (Class::Context, 1) => PasswordPolicyWarning::GraceAuthNsRemaining(seconds),
                        _ => {
                            return Err(DecodeError::grammar(
                                "password policy warning",
                                choice.initial_octet(),
                            ))
                        }
                    });
                }
                (Class::Context, 1, false) => {
                    policy.error = PasswordPolicyError::from_wire(decode_integer(tlv.contents)?);
                    if policy.error.is_none() {
                        return Err(DecodeError::InvalidInteger);
                    }
                }
                _ => {
                    return Err(DecodeError::grammar("password policy", tlv.initial_octet()));
                }
            }
            input = rest;
        }

        control.value = ControlValue::PasswordPolicy(policy);
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::PasswordPolicy(policy) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "password policy control value",
            });
        };
        let mark = enc.pos();
        if let Some(error) = policy.error {
            enc.integer(Identifier::primitive(Tag::context(1)), error as i64);
        }
        if let Some(warning) = policy.warning {
            let warning_mark = enc.pos();
            match warning {
                PasswordPolicyWarning::TimeBeforeExpiration(seconds) => {
                    enc.integer(Identifier::primitive(Tag::context(0)), i64::from(seconds));
                }
                PasswordPolicyWarning::GraceAuthNsRemaining(count) => {
                    enc.integer(Identifier::primitive(Tag::context(1)), i64::from(count));
                }
            }
            enc.finish(Identifier::constructed(Tag::context(0)), warning_mark);
        }
        enc.finish(Identifier::constructed(Tag::SEQUENCE), mark);
        Ok(())
    }

    fn has_value(&self, control: &Control) -> bool {
        !matches!(control.value, ControlValue::Absent)
    }
}

fn decode_choice_integer(contents: &[u8]) -> Result<u32, DecodeError> {
    let value = decode_integer(contents)?;
    if !(0..=i64::from(i32::MAX)).contains(&value) {
        return Err(DecodeError::InvalidInteger);
    }
    Ok(value as u32)
}
