//! RFC 4514 distinguished names, built on the value engine for per-AVA
//! values.

mod parser;

use core::fmt;
use core::hash::{Hash, Hasher};

use crate::error::{DnError, SchemaError};
use crate::schema::SchemaRegistries;
use crate::value::Value;

/// One attribute-type-and-value pair of an RDN.
#[derive(Debug, Clone)]
pub struct Ava {
    attribute_type: String,
    value: Value,
    normalized: String,
}

impl Ava {
    /// A human-readable AVA from text parts.
    pub fn new(attribute_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_value(attribute_type.into(), Value::from_string(value.into()))
    }

    pub(crate) fn from_value(attribute_type: String, value: Value) -> Self {
        let normalized = normalize_ava(&attribute_type, &value);
        Self {
            attribute_type,
            value,
            normalized,
        }
    }

    /// The attribute type as written.
    pub fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for Ava {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute_type, format_value(&self.value))
    }
}

/// A relative distinguished name: one or more AVAs.
#[derive(Debug, Clone)]
pub struct Rdn {
    avas: Vec<Ava>,
    normalized: String,
}

impl Rdn {
    /// A single-AVA RDN.
    pub fn new(attribute_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_avas(vec![Ava::new(attribute_type, value)])
    }

    pub(crate) fn from_avas(avas: Vec<Ava>) -> Self {
        // multi-valued RDNs compare as sets: canonical order is by
        // normalized ava
        let mut keys: Vec<&str> = avas.iter().map(Ava::normalized).collect();
        keys.sort_unstable();
        let normalized = keys.join("+");
        Self { avas, normalized }
    }

    /// Parses a single RDN (no `,` separators).
    pub fn parse(text: &str) -> Result<Self, DnError> {
        let mut rdns = parser::parse_dn(text)?;
        if rdns.len() != 1 {
            return Err(DnError::BadChar {
                character: ',',
                position: text.find(',').unwrap_or(0),
            });
        }
        Ok(rdns.remove(0))
    }

    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// The first AVA; every RDN has at least one.
    pub fn ava(&self) -> &Ava {
        &self.avas[0]
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ava) in self.avas.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            write!(f, "{ava}")?;
        }
        Ok(())
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Rdn {}

/// A distinguished name: RDNs ordered most-specific first, as written.
///
/// Equality and hashing use the normalized form, so `CN=Foo` and
/// `cn=foo` name the same entry.
#[derive(Debug, Clone, Default)]
pub struct Dn {
    rdns: Vec<Rdn>,
    normalized: String,
}

impl Dn {
    /// The empty DN (the root DSE).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses the RFC 4514 text form. The empty string is the root DSE.
    pub fn parse(text: &str) -> Result<Self, DnError> {
        Ok(Self::from_rdns(parser::parse_dn(text)?))
    }

    pub(crate) fn from_rdns(rdns: Vec<Rdn>) -> Self {
        let normalized = rdns
            .iter()
            .map(Rdn::normalized)
            .collect::<Vec<_>>()
            .join(",");
        Self { rdns, normalized }
    }

    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The number of RDNs.
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The most specific RDN.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// Everything above the most specific RDN.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            return None;
        }
        Some(Self::from_rdns(self.rdns[1..].to_vec()))
    }

    /// This DN extended downward by one RDN.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend(self.rdns.iter().cloned());
        Self::from_rdns(rdns)
    }

    /// True when `other` sits strictly below this DN. The root is an
    /// ancestor of every other DN.
    pub fn is_ancestor_of(&self, other: &Dn) -> bool {
        if other.rdns.len() <= self.rdns.len() {
            return false;
        }
        let offset = other.rdns.len() - self.rdns.len();
        other.rdns[offset..]
            .iter()
            .zip(&self.rdns)
            .all(|(a, b)| a == b)
    }

    pub fn is_descendant_of(&self, other: &Dn) -> bool {
        other.is_ancestor_of(self)
    }

    /// The canonical text form equality works on.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Schema-aware normalization: each AVA keyed by its attribute type's
    /// OID, its value put through the type's normalizer.
    pub fn normalized_with(&self, schema: &SchemaRegistries) -> Result<String, SchemaError> {
        let mut rdns = Vec::with_capacity(self.rdns.len());
        for rdn in &self.rdns {
            let mut avas = Vec::with_capacity(rdn.avas.len());
            for ava in &rdn.avas {
                let attribute_type = schema
                    .attribute_types()
                    .get(&ava.attribute_type)
                    .ok_or_else(|| SchemaError::NoSuchAttributeType {
                        id: ava.attribute_type.clone(),
                    })?;
                let mut value = ava.value.clone();
                value.bind(&attribute_type)?;
                let text = match value.normalized_str() {
                    Some(text) => escape_value(text),
                    None => format_value(&value),
                };
                avas.push(format!("{}={}", attribute_type.oid(), text));
            }
            avas.sort_unstable();
            rdns.push(avas.join("+"));
        }
        Ok(rdns.join(","))
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl core::str::FromStr for Dn {
    type Err = DnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dn::parse(s)
    }
}

/// Escapes a value for the RFC 4514 text form: specials anywhere, `#` and
/// space at the edges, NUL as `\00`.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.len().saturating_sub(1);
    for (i, c) in value.char_indices() {
        match c {
            '\\' | ',' | '+' | '"' | '<' | '>' | ';' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 || i == last => {
                out.push('\\');
                out.push(c);
            }
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

/// The text form of an AVA value: escaped text, or `#hex` for binary
/// values.
fn format_value(value: &Value) -> String {
    match value.raw_str() {
        Some(text) => escape_value(text),
        None => {
            let mut out = String::from("#");
            out.push_str(&crate::octets::to_hex(value.bytes().unwrap_or_default()));
            out
        }
    }
}

/// The normalized `type=value` form: type lowercased, the value put
/// through the caseIgnore canonicalization.
fn normalize_ava(attribute_type: &str, value: &Value) -> String {
    let value_part = match value.raw_str() {
        Some(text) => escape_value(&crate::schema::deep_trim_to_lower(text)),
        None => format_value(value),
    };
    format!("{}={}", attribute_type.to_lowercase(), value_part)
}
