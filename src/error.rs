//! Error types for every failure domain of the codec.

mod access;
mod decode;
mod dn;
mod encode;
mod schema;

pub use access::AccessError;
pub use decode::DecodeError;
pub use dn::DnError;
pub use encode::EncodeError;
pub use schema::SchemaError;
