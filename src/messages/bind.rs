//! Bind and unbind operations.

use bytes::Bytes;

use crate::ber::{BerEncoder, Identifier};
use crate::error::EncodeError;
use crate::tag::Tag;

use super::result::LdapResult;

/// The credentials variant of a bind request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAuthentication {
    /// `[0]` a password (possibly empty: anonymous or unauthenticated
    /// bind).
    Simple(Bytes),
    /// `[3]` a SASL mechanism name with optional initial credentials.
    Sasl {
        mechanism: String,
        credentials: Option<Bytes>,
    },
}

impl Default for BindAuthentication {
    fn default() -> Self {
        BindAuthentication::Simple(Bytes::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Protocol version; 3 everywhere since RFC 2251, 2 still seen.
    pub version: u8,
    pub name: String,
    pub authentication: BindAuthentication,
}

impl Default for BindRequest {
    fn default() -> Self {
        Self {
            version: 3,
            name: String::new(),
            authentication: BindAuthentication::default(),
        }
    }
}

impl BindRequest {
    pub fn simple(name: impl Into<String>, password: impl Into<Bytes>) -> Self {
        Self {
            version: 3,
            name: name.into(),
            authentication: BindAuthentication::Simple(password.into()),
        }
    }

    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        match &self.authentication {
            BindAuthentication::Simple(password) => {
                enc.octet_string(Identifier::primitive(Tag::context(0)), password);
            }
            BindAuthentication::Sasl {
                mechanism,
                credentials,
            } => {
                let sasl = enc.pos();
                if let Some(credentials) = credentials {
                    enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), credentials);
                }
                enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), mechanism.as_bytes());
                enc.finish(Identifier::constructed(Tag::context(3)), sasl);
            }
        }
        enc.octet_string(Identifier::primitive(Tag::OCTET_STRING), self.name.as_bytes());
        enc.integer(Identifier::primitive(Tag::INTEGER), i64::from(self.version));
        enc.finish(Identifier::constructed(Tag::application(0)), mark);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindResponse {
    pub result: LdapResult,
    /// `[7]` challenge data for multi-step SASL mechanisms.
    pub server_sasl_creds: Option<Bytes>,
}

impl BindResponse {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        let mark = enc.pos();
        if let Some(creds) = &self.server_sasl_creds {
            enc.octet_string(Identifier::primitive(Tag::context(7)), creds);
        }
        self.result.encode(enc);
        enc.finish(Identifier::constructed(Tag::application(1)), mark);
        Ok(())
    }
}

/// `[APPLICATION 2] NULL`; the peer just closes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnbindRequest;

impl UnbindRequest {
    pub(crate) fn encode(&self, enc: &mut BerEncoder) -> Result<(), EncodeError> {
        enc.null(Identifier::primitive(Tag::application(2)));
        Ok(())
    }
}
