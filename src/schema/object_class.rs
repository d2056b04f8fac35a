//! Object classes.

/// The kind of an object class, per RFC 4512 section 2.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectClassKind {
    Abstract,
    #[default]
    Structural,
    Auxiliary,
}

#[derive(Debug)]
pub struct ObjectClass {
    oid: String,
    names: Vec<String>,
    superiors: Vec<String>,
    kind: ObjectClassKind,
    must: Vec<String>,
    may: Vec<String>,
}

impl ObjectClass {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            names: Vec::new(),
            superiors: Vec::new(),
            kind: ObjectClassKind::default(),
            must: Vec::new(),
            may: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| (*n).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_superiors(mut self, superiors: &[&str]) -> Self {
        self.superiors = superiors.iter().map(|s| (*s).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ObjectClassKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_must(mut self, must: &[&str]) -> Self {
        self.must = must.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    #[must_use]
    pub fn with_may(mut self, may: &[&str]) -> Self {
        self.may = may.iter().map(|m| (*m).to_owned()).collect();
        self
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }

    pub fn superiors(&self) -> &[String] {
        &self.superiors
    }

    pub fn kind(&self) -> ObjectClassKind {
        self.kind
    }

    pub fn must(&self) -> &[String] {
        &self.must
    }

    pub fn may(&self) -> &[String] {
        &self.may
    }
}
