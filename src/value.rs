//! Schema-aware values: a sum of a human-readable and a binary shape,
//! normalized through the attribute type they are bound to.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{DecodeError, SchemaError};
use crate::octets;
use crate::schema::AttributeType;

/// 32-bit FNV-1a, the stable hash carried in the serialized form.
fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[derive(Clone)]
enum ValueData {
    HumanReadable {
        raw: Option<String>,
        normalized: Option<String>,
        /// UTF-8 of `raw`, computed once.
        bytes: Option<Bytes>,
    },
    Binary {
        raw: Option<Bytes>,
        normalized: Option<Bytes>,
    },
}

/// An attribute value.
///
/// Construction fixes the user-provided form forever; binding an attribute
/// type computes the normalized form and validates syntax.
///
/// `==`, `Ord` and `Hash` are canonical: they work on each value's own
/// normalized form (through the comparator when both sides are bound to
/// the same type) and agree with each other, so values behave in ordered
/// and hashed collections. The schema-aware comparison that also relates
/// an unbound value to a bound one is [`Value::matches`].
#[derive(Clone)]
pub struct Value {
    data: ValueData,
    attribute_type: Option<Arc<AttributeType>>,
    hash: u32,
}

impl Value {
    /// A human-readable value; its own text is its normalized form until
    /// a type is bound.
    pub fn from_string(value: impl Into<String>) -> Self {
        let raw: String = value.into();
        let bytes = Bytes::copy_from_slice(raw.as_bytes());
        let hash = fnv1a(raw.as_bytes());
        Self {
            data: ValueData::HumanReadable {
                normalized: Some(raw.clone()),
                raw: Some(raw),
                bytes: Some(bytes),
            },
            attribute_type: None,
            hash,
        }
    }

    /// A binary value; its own octets are its normalized form until a
    /// type is bound.
    pub fn from_bytes(value: impl Into<Bytes>) -> Self {
        let raw: Bytes = value.into();
        let hash = fnv1a(&raw);
        Self {
            data: ValueData::Binary {
                normalized: Some(raw.clone()),
                raw: Some(raw),
            },
            attribute_type: None,
            hash,
        }
    }

    /// The absent human-readable value.
    pub fn null_string() -> Self {
        Self {
            data: ValueData::HumanReadable {
                raw: None,
                normalized: None,
                bytes: None,
            },
            attribute_type: None,
            hash: 0,
        }
    }

    /// The absent binary value.
    pub fn null_bytes() -> Self {
        Self {
            data: ValueData::Binary {
                raw: None,
                normalized: None,
            },
            attribute_type: None,
            hash: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        match &self.data {
            ValueData::HumanReadable { raw, .. } => raw.is_none(),
            ValueData::Binary { raw, .. } => raw.is_none(),
        }
    }

    pub fn is_human_readable(&self) -> bool {
        matches!(self.data, ValueData::HumanReadable { .. })
    }

    pub fn attribute_type(&self) -> Option<&Arc<AttributeType>> {
        self.attribute_type.as_ref()
    }

    pub fn is_schema_aware(&self) -> bool {
        self.attribute_type.is_some()
    }

    /// The user-provided text of a human-readable value.
    pub fn raw_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::HumanReadable { raw, .. } => raw.as_deref(),
            ValueData::Binary { .. } => None,
        }
    }

    /// The normalized text of a human-readable value.
    pub fn normalized_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::HumanReadable { normalized, .. } => normalized.as_deref(),
            ValueData::Binary { .. } => None,
        }
    }

    /// The value's octets: the cached UTF-8 of a human-readable value, or
    /// the raw octets of a binary one.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ValueData::HumanReadable { bytes, .. } => bytes.as_deref(),
            ValueData::Binary { raw, .. } => raw.as_deref(),
        }
    }

    /// The normalized form as octets.
    pub fn normalized_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            ValueData::HumanReadable { normalized, .. } => {
                normalized.as_deref().map(str::as_bytes)
            }
            ValueData::Binary { normalized, .. } => normalized.as_deref(),
        }
    }

    /// The octet length of the user-provided form; 0 when null.
    pub fn length(&self) -> usize {
        self.bytes().map_or(0, <[u8]>::len)
    }

    /// The cached hash, 0 for null values.
    pub fn hash_code(&self) -> u32 {
        self.hash
    }

    /// A clone with its own copy of every payload. Plain [`Clone`] shares
    /// the byte payloads.
    pub fn deep_clone(&self) -> Self {
        let data = match &self.data {
            ValueData::HumanReadable {
                raw,
                normalized,
                bytes,
            } => ValueData::HumanReadable {
                raw: raw.clone(),
                normalized: normalized.clone(),
                bytes: bytes.as_deref().map(Bytes::copy_from_slice),
            },
            ValueData::Binary { raw, normalized } => ValueData::Binary {
                raw: raw.as_deref().map(Bytes::copy_from_slice),
                normalized: normalized.as_deref().map(Bytes::copy_from_slice),
            },
        };
        Self {
            data,
            attribute_type: self.attribute_type.clone(),
            hash: self.hash,
        }
    }

    /// Binds `attribute_type`, normalizing through its equality rule and
    /// validating its syntax. Idempotent for the same type; a different
    /// type is [`SchemaError::AlreadyBound`].
    ///
    /// A failing normalizer is demoted: the normalized form falls back to
    /// the user-provided form and a warning is logged.
    pub fn bind(&mut self, attribute_type: &Arc<AttributeType>) -> Result<(), SchemaError> {
        if let Some(bound) = &self.attribute_type {
            if bound.oid() == attribute_type.oid() {
                return Ok(());
            }
            return Err(SchemaError::AlreadyBound {
                oid: bound.oid().to_owned(),
            });
        }

        let data = convert_shape(&self.data, attribute_type.is_human_readable())?;
        let data = normalize(data, attribute_type)?;

        if !attribute_type.is_relaxed() {
            if let Some(syntax) = attribute_type.syntax() {
                let valid = match &data {
                    ValueData::HumanReadable { raw: Some(raw), .. } => {
                        syntax.checker().is_valid_str(raw)
                    }
                    ValueData::Binary { raw: Some(raw), .. } => {
                        syntax.checker().is_valid_bytes(raw)
                    }
                    _ => true,
                };
                if !valid {
                    return Err(SchemaError::InvalidSyntax {
                        oid: syntax.oid().to_owned(),
                    });
                }
            }
        }

        self.hash = match &data {
            ValueData::HumanReadable {
                normalized: Some(normalized),
                ..
            } => fnv1a(normalized.as_bytes()),
            ValueData::Binary {
                normalized: Some(normalized),
                ..
            } => fnv1a(normalized),
            _ => 0,
        };
        self.data = data;
        self.attribute_type = Some(attribute_type.clone());
        Ok(())
    }

    /// Total order: nulls first, then human-readable before binary, then
    /// the shared type's comparator (or byte order) on normalized forms,
    /// with the bound type's OID as the final tiebreak. `==` is exactly
    /// `compare(..) == Ordering::Equal`.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }

        let shape = self.shape_rank().cmp(&other.shape_rank());
        if shape != Ordering::Equal {
            return shape;
        }
        if self.is_null() {
            return Ordering::Equal;
        }

        let by_value = match self.shared_comparator(other) {
            Some(comparator) => comparator.compare_bytes(
                self.normalized_bytes().unwrap_or_default(),
                other.normalized_bytes().unwrap_or_default(),
            ),
            None => self
                .normalized_bytes()
                .cmp(&other.normalized_bytes()),
        };
        by_value.then_with(|| self.type_oid().cmp(&other.type_oid()))
    }

    /// Schema-aware equality: like `==`, except that when exactly one
    /// side is bound, the unbound side is first put through the bound
    /// side's equality rule, and the bound type does not separate the
    /// pair. This is the comparison attribute set semantics use.
    ///
    /// Not a substitute for `==`: two unbound values that both match one
    /// bound value need not match each other, so this relation cannot
    /// back `Eq`, `Ord` or `Hash`.
    pub fn matches(&self, other: &Self) -> bool {
        if self.is_human_readable() != other.is_human_readable() {
            return false;
        }
        match (self.is_null(), other.is_null()) {
            (true, true) => return true,
            (true, false) | (false, true) => return false,
            (false, false) => {}
        }
        if let (Some(a), Some(b)) = (&self.attribute_type, &other.attribute_type) {
            if a.oid() != b.oid() {
                return false;
            }
        }

        let left = self.normalized_for(other);
        let right = other.normalized_for(self);
        match self.rule_comparator(other) {
            Some(comparator) => comparator.compare_bytes(&left, &right) == Ordering::Equal,
            None => left == right,
        }
    }

    /// The persistent layout:
    ///
    /// ```text
    /// [1 is_human_readable][1 has_user (4 len + payload)]
    /// [1 has_normalized (4 len + payload)][4 cached hash]
    /// ```
    /// Lengths and the hash are big-endian.
    pub fn serialize(&self) -> Vec<u8> {
        let (user, normalized): (Option<&[u8]>, Option<&[u8]>) = match &self.data {
            ValueData::HumanReadable {
                raw, normalized, ..
            } => (
                raw.as_deref().map(str::as_bytes),
                normalized.as_deref().map(str::as_bytes),
            ),
            ValueData::Binary { raw, normalized } => {
                (raw.as_deref(), normalized.as_deref())
            }
        };

        let mut out = Vec::with_capacity(
            11 + user.map_or(0, <[u8]>::len) + normalized.map_or(0, <[u8]>::len),
        );
        out.push(u8::from(self.is_human_readable()));
        for payload in [user, normalized] {
            match payload {
                Some(payload) => {
                    out.push(1);
                    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
                    out.extend_from_slice(payload);
                }
                None => out.push(0),
            }
        }
        out.extend_from_slice(&self.hash.to_be_bytes());
        out
    }

    /// Reads the [`Value::serialize`] layout. The restored value is
    /// unbound.
    pub fn deserialize(input: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor { input, pos: 0 };
        let is_human_readable = match cursor.byte()? {
            0 => false,
            1 => true,
            _ => return Err(DecodeError::InvalidBoolean),
        };
        let user = cursor.optional_payload()?;
        let normalized = cursor.optional_payload()?;
        let hash = u32::from_be_bytes(cursor.array()?);
        if cursor.pos != input.len() {
            return Err(DecodeError::TrailingBytesInStructure {
                remaining: (input.len() - cursor.pos) as u32,
            });
        }

        let data = if is_human_readable {
            let raw = user.map(octets::utf8_string).transpose()?;
            let bytes = raw.as_ref().map(|r| Bytes::copy_from_slice(r.as_bytes()));
            ValueData::HumanReadable {
                raw,
                normalized: normalized.map(octets::utf8_string).transpose()?,
                bytes,
            }
        } else {
            ValueData::Binary {
                raw: user.map(Bytes::copy_from_slice),
                normalized: normalized.map(Bytes::copy_from_slice),
            }
        };
        Ok(Self {
            data,
            attribute_type: None,
            hash,
        })
    }

    fn shape_rank(&self) -> u8 {
        u8::from(!self.is_human_readable())
    }

    fn type_oid(&self) -> Option<&str> {
        self.attribute_type.as_ref().map(|at| at.oid())
    }

    /// The comparator `compare` and `==` may use: only when both sides
    /// are bound to the same type, so both normalized forms are canonical
    /// under the same rule.
    fn shared_comparator<'a>(
        &'a self,
        other: &'a Self,
    ) -> Option<&'a Arc<dyn crate::schema::Comparator>> {
        let a = self.attribute_type.as_ref()?;
        let b = other.attribute_type.as_ref()?;
        if a.oid() != b.oid() {
            return None;
        }
        a.equality().map(|rule| rule.comparator())
    }

    /// The comparator `matches` uses: the shared type's, or the bound
    /// side's when only one side is bound.
    fn rule_comparator<'a>(
        &'a self,
        other: &'a Self,
    ) -> Option<&'a Arc<dyn crate::schema::Comparator>> {
        let typed = match (&self.attribute_type, &other.attribute_type) {
            (Some(a), Some(b)) if a.oid() == b.oid() => a,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            _ => return None,
        };
        typed.equality().map(|rule| rule.comparator())
    }
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn byte(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or(DecodeError::UnexpectedEndOfInput)?;
        self.pos += 1;
        Ok(byte)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self
            .input
            .get(self.pos..self.pos + N)
            .ok_or(DecodeError::UnexpectedEndOfInput)?;
        self.pos += N;
        Ok(slice.try_into().expect("slice length checked"))
    }

    fn optional_payload(&mut self) -> Result<Option<&'a [u8]>, DecodeError> {
        match self.byte()? {
            0 => Ok(None),
            1 => {
                let len = u32::from_be_bytes(self.array()?) as usize;
                let slice = self
                    .input
                    .get(self.pos..self.pos + len)
                    .ok_or(DecodeError::UnexpectedEndOfInput)?;
                self.pos += len;
                Ok(Some(slice))
            }
            _ => Err(DecodeError::InvalidBoolean),
        }
    }
}

fn convert_shape(data: &ValueData, human_readable: bool) -> Result<ValueData, SchemaError> {
    match (data, human_readable) {
        (ValueData::HumanReadable { .. }, true) | (ValueData::Binary { .. }, false) => {
            Ok(data.clone())
        }
        (ValueData::Binary { raw, .. }, true) => {
            let raw = match raw {
                None => None,
                Some(bytes) => Some(
                    core::str::from_utf8(bytes)
                        .map_err(|_| SchemaError::HumanReadableMismatch)?
                        .to_owned(),
                ),
            };
            let bytes = raw.as_ref().map(|r| Bytes::copy_from_slice(r.as_bytes()));
            Ok(ValueData::HumanReadable {
                normalized: raw.clone(),
                raw,
                bytes,
            })
        }
        (ValueData::HumanReadable { raw, .. }, false) => {
            let raw = raw
                .as_ref()
                .map(|r| Bytes::copy_from_slice(r.as_bytes()));
            Ok(ValueData::Binary {
                normalized: raw.clone(),
                raw,
            })
        }
    }
}

fn normalize(data: ValueData, attribute_type: &Arc<AttributeType>) -> Result<ValueData, SchemaError> {
    let Some(rule) = attribute_type.equality() else {
        if attribute_type.is_relaxed() {
            return Ok(data);
        }
        return Err(SchemaError::NoNormalizer {
            oid: attribute_type.oid().to_owned(),
        });
    };

    match data {
        ValueData::HumanReadable {
            raw: Some(raw),
            bytes,
            ..
        } => {
            let normalized = match rule.normalizer().normalize_str(&raw) {
                Ok(normalized) => normalized,
                Err(error) => {
                    log::warn!(
                        "normalizing a value of {} failed ({error}), keeping the user form",
                        attribute_type.oid()
                    );
                    raw.clone()
                }
            };
            Ok(ValueData::HumanReadable {
                raw: Some(raw),
                normalized: Some(normalized),
                bytes,
            })
        }
        ValueData::Binary { raw: Some(raw), .. } => {
            let normalized = match rule.normalizer().normalize_bytes(&raw) {
                Ok(normalized) => Bytes::from(normalized),
                Err(error) => {
                    log::warn!(
                        "normalizing a value of {} failed ({error}), keeping the user form",
                        attribute_type.oid()
                    );
                    raw.clone()
                }
            };
            Ok(ValueData::Binary {
                raw: Some(raw),
                normalized: Some(normalized),
            })
        }
        null => Ok(null),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Value {
    /// This value's normalized octets, re-normalized through `other`'s
    /// equality rule when `other` is bound and this value is not.
    fn normalized_for(&self, other: &Self) -> Vec<u8> {
        if self.attribute_type.is_none() {
            if let Some(rule) = other
                .attribute_type
                .as_ref()
                .and_then(|at| at.equality())
            {
                let normalized = match &self.data {
                    ValueData::HumanReadable { raw: Some(raw), .. } => rule
                        .normalizer()
                        .normalize_str(raw)
                        .map(String::into_bytes),
                    ValueData::Binary { raw: Some(raw), .. } => {
                        rule.normalizer().normalize_bytes(raw)
                    }
                    _ => Ok(Vec::new()),
                };
                if let Ok(normalized) = normalized {
                    return normalized;
                }
            }
        }
        self.normalized_bytes().unwrap_or_default().to_vec()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Value {
    /// The cached hash of the normalized form. `==` requires equal
    /// normalized octets (the built-in comparators separate any two
    /// distinct canonical forms), so equal values hash equally.
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Value");
        match &self.data {
            ValueData::HumanReadable { raw, normalized, .. } => {
                debug.field("raw", raw).field("normalized", normalized);
            }
            ValueData::Binary { raw, normalized } => {
                debug
                    .field("raw", &raw.as_deref().map(octets::to_hex))
                    .field("normalized", &normalized.as_deref().map(octets::to_hex));
            }
        }
        debug
            .field("attribute_type", &self.type_oid())
            .field("hash", &self.hash)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistries;
    use pretty_assertions::assert_eq;

    fn cn() -> Arc<AttributeType> {
        SchemaRegistries::core().attribute_types().get("cn").unwrap()
    }

    fn bound(text: &str) -> Value {
        let mut value = Value::from_string(text);
        value.bind(&cn()).unwrap();
        value
    }

    #[test]
    fn binding_normalizes_and_hashes() {
        let value = bound("  John   Q  PUBLIC ");
        assert_eq!(value.raw_str(), Some("  John   Q  PUBLIC "));
        assert_eq!(value.normalized_str(), Some("john q public"));
        assert_eq!(value.hash_code(), fnv1a(b"john q public"));
        assert!(value.is_schema_aware());
    }

    #[test]
    fn bind_is_idempotent_and_rebind_fails() {
        let mut value = bound("x");
        value.bind(&cn()).unwrap();
        let sn = SchemaRegistries::core().attribute_types().get("sn").unwrap();
        assert!(matches!(value.bind(&sn), Err(SchemaError::AlreadyBound { .. })));
    }

    #[test]
    fn equality_follows_the_matching_rule() {
        assert_eq!(bound("John Doe"), bound("  john  DOE "));
        assert_eq!(bound("John Doe").hash_code(), bound("  john  DOE ").hash_code());
        assert_ne!(bound("John Doe"), bound("Jane Doe"));
    }

    #[test]
    fn one_sided_matching_normalizes_the_other_side() {
        let typed = bound("John Doe");
        let untyped = Value::from_string("  JOHN   doe ");
        assert!(typed.matches(&untyped));
        assert!(untyped.matches(&typed));

        // `==`, `compare` and `Hash` stay canonical and agree with each
        // other: the unbound side keeps its own normalized form
        assert_ne!(typed, untyped);
        assert_ne!(typed.compare(&untyped), Ordering::Equal);
        assert_eq!(typed == untyped, typed.compare(&untyped) == Ordering::Equal);

        let mut set = std::collections::BTreeSet::new();
        set.insert(typed.clone());
        set.insert(untyped.clone());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn equal_values_collapse_in_collections() {
        let mut ordered = std::collections::BTreeSet::new();
        ordered.insert(bound("John Doe"));
        ordered.insert(bound("  john  DOE "));
        assert_eq!(ordered.len(), 1);

        let mut hashed = std::collections::HashSet::new();
        hashed.insert(bound("John Doe"));
        hashed.insert(bound("  john  DOE "));
        assert_eq!(hashed.len(), 1);
    }

    #[test]
    fn null_and_shape_rules() {
        assert_eq!(Value::null_string(), Value::null_string());
        assert_ne!(Value::null_string(), Value::null_bytes());
        assert_ne!(Value::null_string(), Value::from_string(""));
        assert_eq!(Value::from_string(""), Value::from_string(""));
        assert_ne!(Value::from_string("a"), Value::from_bytes(&b"a"[..]));
        assert_eq!(Value::null_string().hash_code(), 0);
        assert!(Value::null_string().compare(&Value::from_string("")) == Ordering::Less);
    }

    #[test]
    fn binary_values_bind_to_human_readable_types() {
        let mut value = Value::from_bytes(&b"Doe"[..]);
        value.bind(&cn()).unwrap();
        assert!(value.is_human_readable());
        assert_eq!(value.normalized_str(), Some("doe"));

        let mut bad = Value::from_bytes(&b"\xff\xfe"[..]);
        assert_eq!(bad.bind(&cn()), Err(SchemaError::HumanReadableMismatch));
    }

    #[test]
    fn syntax_validation_applies() {
        let schema = SchemaRegistries::core();
        let create = schema.attribute_types().get("createTimestamp").unwrap();
        let mut good = Value::from_string("20240101120000Z");
        good.bind(&create).unwrap();
        assert_eq!(good.normalized_str(), Some("20240101120000Z"));

        let mut bad = Value::from_string("not a time");
        assert!(matches!(bad.bind(&create), Err(SchemaError::InvalidSyntax { .. })));
    }

    #[test]
    fn ordering_uses_the_comparator() {
        let schema = SchemaRegistries::core();
        // no core attribute uses integerMatch; build one for the test
        let rule = schema.matching_rules().get("integerMatch").unwrap();
        let syntax = schema.syntaxes().get("1.3.6.1.4.1.1466.115.121.1.27").unwrap();
        let at = Arc::new(
            AttributeType::new("1.2.3.4.1")
                .with_names(&["testInt"])
                .with_equality(rule)
                .with_syntax(syntax),
        );
        let mut nine = Value::from_string("9");
        let mut ten = Value::from_string("10");
        nine.bind(&at).unwrap();
        ten.bind(&at).unwrap();
        assert_eq!(nine.compare(&ten), Ordering::Less);
        // unbound values compare lexicographically
        assert_eq!(
            Value::from_string("9").compare(&Value::from_string("10")),
            Ordering::Greater
        );
    }

    #[test]
    fn serialization_round_trip() {
        for value in [
            Value::from_string("hello"),
            bound("  Mixed  Case "),
            Value::from_bytes(&[0u8, 1, 2, 255][..]),
            Value::null_string(),
            Value::null_bytes(),
            Value::from_string(""),
        ] {
            let bytes = value.serialize();
            let restored = Value::deserialize(&bytes).unwrap();
            assert_eq!(restored.is_human_readable(), value.is_human_readable());
            assert_eq!(restored.raw_str(), value.raw_str());
            assert_eq!(restored.normalized_bytes(), value.normalized_bytes());
            assert_eq!(restored.hash_code(), value.hash_code());
        }
    }

    #[test]
    fn serialized_layout_is_stable() {
        let value = Value::from_string("ab");
        let bytes = value.serialize();
        let mut expected = vec![1u8, 1, 0, 0, 0, 2, b'a', b'b', 1, 0, 0, 0, 2, b'a', b'b'];
        expected.extend_from_slice(&fnv1a(b"ab").to_be_bytes());
        assert_eq!(bytes, expected);

        assert!(Value::deserialize(&bytes[..bytes.len() - 1]).is_err());
    }
}
