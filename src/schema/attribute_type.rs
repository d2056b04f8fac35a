//! Attribute types and their hierarchy.

use std::sync::Arc;

use super::{MatchingRule, Syntax};

/// Where an attribute is used, per RFC 4512 section 4.1.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUsage {
    #[default]
    UserApplications,
    DirectoryOperation,
    DistributedOperation,
    DsaOperation,
}

impl AttributeUsage {
    pub fn is_operational(self) -> bool {
        self != AttributeUsage::UserApplications
    }
}

/// An attribute type. Superiors are referenced by id (OID or name) and
/// resolved through the registry, keeping the hierarchy cycle-free.
pub struct AttributeType {
    oid: String,
    names: Vec<String>,
    superior: Option<String>,
    equality: Option<Arc<MatchingRule>>,
    ordering: Option<Arc<MatchingRule>>,
    substring: Option<Arc<MatchingRule>>,
    syntax: Option<Arc<Syntax>>,
    usage: AttributeUsage,
    single_valued: bool,
    /// A relaxed type skips syntax validation and tolerates a missing
    /// equality rule when values bind to it.
    relaxed: bool,
}

impl AttributeType {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            names: Vec::new(),
            superior: None,
            equality: None,
            ordering: None,
            substring: None,
            syntax: None,
            usage: AttributeUsage::default(),
            single_valued: false,
            relaxed: false,
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_superior(mut self, superior: impl Into<String>) -> Self {
        self.superior = Some(superior.into());
        self
    }

    #[must_use]
    pub fn with_equality(mut self, rule: Arc<MatchingRule>) -> Self {
        self.equality = Some(rule);
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, rule: Arc<MatchingRule>) -> Self {
        self.ordering = Some(rule);
        self
    }

    #[must_use]
    pub fn with_substring(mut self, rule: Arc<MatchingRule>) -> Self {
        self.substring = Some(rule);
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Arc<Syntax>) -> Self {
        self.syntax = Some(syntax);
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: AttributeUsage) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub fn single_valued(mut self) -> Self {
        self.single_valued = true;
        self
    }

    #[must_use]
    pub fn relaxed(mut self) -> Self {
        self.relaxed = true;
        self
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The primary name, falling back to the OID.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }

    pub fn superior(&self) -> Option<&str> {
        self.superior.as_deref()
    }

    pub fn equality(&self) -> Option<&Arc<MatchingRule>> {
        self.equality.as_ref()
    }

    pub fn ordering(&self) -> Option<&Arc<MatchingRule>> {
        self.ordering.as_ref()
    }

    pub fn substring(&self) -> Option<&Arc<MatchingRule>> {
        self.substring.as_ref()
    }

    pub fn syntax(&self) -> Option<&Arc<Syntax>> {
        self.syntax.as_ref()
    }

    pub fn usage(&self) -> AttributeUsage {
        self.usage
    }

    pub fn is_single_valued(&self) -> bool {
        self.single_valued
    }

    pub fn is_relaxed(&self) -> bool {
        self.relaxed
    }

    /// The human-readable hint from the syntax; types without a syntax
    /// default to human-readable.
    pub fn is_human_readable(&self) -> bool {
        self.syntax.as_ref().map_or(true, |s| s.is_human_readable())
    }

    /// True when the type answers to `id` (OID or any name alias).
    pub fn is_named(&self, id: &str) -> bool {
        self.oid == id || self.names.iter().any(|n| n.eq_ignore_ascii_case(id))
    }
}

impl core::fmt::Debug for AttributeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AttributeType")
            .field("oid", &self.oid)
            .field("names", &self.names)
            .field("superior", &self.superior)
            .finish_non_exhaustive()
    }
}
