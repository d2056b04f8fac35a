//! Matching rules and syntaxes.

use std::sync::Arc;

use super::{Comparator, Normalizer, SyntaxChecker};

/// A syntax: the shape constraint of attribute values, with its checker.
pub struct Syntax {
    oid: String,
    description: String,
    human_readable: bool,
    checker: Arc<dyn SyntaxChecker>,
}

impl Syntax {
    pub fn new(
        oid: impl Into<String>,
        description: impl Into<String>,
        human_readable: bool,
        checker: Arc<dyn SyntaxChecker>,
    ) -> Self {
        Self {
            oid: oid.into(),
            description: description.into(),
            human_readable,
            checker,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_human_readable(&self) -> bool {
        self.human_readable
    }

    pub fn checker(&self) -> &Arc<dyn SyntaxChecker> {
        &self.checker
    }
}

impl core::fmt::Debug for Syntax {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Syntax")
            .field("oid", &self.oid)
            .field("description", &self.description)
            .field("human_readable", &self.human_readable)
            .finish_non_exhaustive()
    }
}

/// A matching rule: binds the normalizer producing canonical forms and the
/// comparator ordering them.
pub struct MatchingRule {
    oid: String,
    names: Vec<String>,
    syntax_oid: String,
    normalizer: Arc<dyn Normalizer>,
    comparator: Arc<dyn Comparator>,
}

impl MatchingRule {
    pub fn new(
        oid: impl Into<String>,
        names: &[&str],
        syntax_oid: impl Into<String>,
        normalizer: Arc<dyn Normalizer>,
        comparator: Arc<dyn Comparator>,
    ) -> Self {
        Self {
            oid: oid.into(),
            names: names.iter().map(|n| (*n).to_owned()).collect(),
            syntax_oid: syntax_oid.into(),
            normalizer,
            comparator,
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn syntax_oid(&self) -> &str {
        &self.syntax_oid
    }

    pub fn normalizer(&self) -> &Arc<dyn Normalizer> {
        &self.normalizer
    }

    pub fn comparator(&self) -> &Arc<dyn Comparator> {
        &self.comparator
    }
}

impl core::fmt::Debug for MatchingRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MatchingRule")
            .field("oid", &self.oid)
            .field("names", &self.names)
            .field("syntax_oid", &self.syntax_oid)
            .finish_non_exhaustive()
    }
}
