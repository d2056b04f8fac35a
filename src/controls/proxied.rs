//! Proxied authorization v2 (RFC 4370). The control value is a bare UTF-8
//! authorization identity, not a BER structure.

use crate::ber::BerEncoder;
use crate::dn::Dn;
use crate::error::{DecodeError, EncodeError};
use crate::octets::utf8_string;

use super::{Control, ControlFactory, ControlValue};

/// An authorization identity: empty (anonymous), `dn:<distinguished name>`,
/// or `u:<userid>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProxiedAuthorization {
    pub authz_id: String,
}

impl ProxiedAuthorization {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.18";

    pub fn for_dn(dn: &Dn) -> Self {
        Self {
            authz_id: format!("dn:{dn}"),
        }
    }

    pub fn for_user(userid: &str) -> Self {
        Self {
            authz_id: format!("u:{userid}"),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

pub(super) struct ProxiedAuthorizationFactory;

impl ControlFactory for ProxiedAuthorizationFactory {
    fn oid(&self) -> &'static str {
        ProxiedAuthorization::OID
    }

    fn new_control(&self) -> Control {
        Control::new(
            ProxiedAuthorization::OID,
            ControlValue::ProxiedAuthorization(ProxiedAuthorization::default()),
        )
    }

    fn decode_value(&self, control: &mut Control, value: &[u8]) -> Result<(), DecodeError> {
        let authz_id = utf8_string(value)?;

        // The dn: branch must hold a well-formed DN; u: and the anonymous
        // empty form are taken as-is.
        if let Some(dn) = authz_id.strip_prefix("dn:") {
            if Dn::parse(dn).is_err() {
                return Err(DecodeError::grammar("proxied authorization dn", 0x04));
            }
        }

        control.value = ControlValue::ProxiedAuthorization(ProxiedAuthorization { authz_id });
        Ok(())
    }

    fn encode_value(&self, enc: &mut BerEncoder, control: &Control) -> Result<(), EncodeError> {
        let ControlValue::ProxiedAuthorization(proxied) = &control.value else {
            return Err(EncodeError::UnsupportedVariant {
                what: "proxied authorization control value",
            });
        };
        enc.prepend_slice(proxied.authz_id.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(value: &[u8]) -> Result<Control, DecodeError> {
        let factory = ProxiedAuthorizationFactory;
        let mut control = factory.new_control();
        factory.decode_value(&mut control, value)?;
        Ok(control)
    }

    #[test]
    fn dn_form() {
        let control = decode(b"dn:dc=example,dc=com").unwrap();
        assert_eq!(
            control.value,
            ControlValue::ProxiedAuthorization(ProxiedAuthorization {
                authz_id: "dn:dc=example,dc=com".into(),
            })
        );
    }

    #[test]
    fn dn_form_is_validated() {
        assert!(matches!(
            decode(b"dn:dc=example,dc"),
            Err(DecodeError::GrammarMismatch { .. })
        ));
    }

    #[test]
    fn user_form_with_multibyte_utf8() {
        let control = decode(b"u:el\xc3\xa9charny").unwrap();
        let ControlValue::ProxiedAuthorization(proxied) = &control.value else {
            unreachable!()
        };
        assert_eq!(proxied.authz_id, "u:elécharny");
        assert_eq!(proxied.authz_id.chars().count(), 11);
    }

    #[test]
    fn anonymous_form_is_empty() {
        let control = decode(b"").unwrap();
        let factory = ProxiedAuthorizationFactory;
        assert!(factory.has_value(&control));

        let mut enc = BerEncoder::new();
        factory.encode_value(&mut enc, &control).unwrap();
        assert!(enc.into_bytes().is_empty());
    }
}
