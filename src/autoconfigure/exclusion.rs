use crate::module::AutoModule;

/// Explicit opt-outs of otherwise eligible modules
///
/// Strong references name modules by type (or by an identity the caller
/// vouches for) and must match a catalog entry. Loosely-bound names may point
/// at modules outside the compiled set, so an unmatched name is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRequest {
    strong: Vec<String>,
    names: Vec<String>,
}

impl ExclusionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude a module by type
    pub fn exclude<M: AutoModule>(self) -> Self {
        self.exclude_identity(M::NAME)
    }

    /// Exclude a module by identity, with the same strictness as [`Self::exclude`]
    pub fn exclude_identity(mut self, name: impl Into<String>) -> Self {
        self.strong.push(name.into());
        self
    }

    /// Exclude a module by loosely-bound name
    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn exclude_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Fold another request into this one
    pub fn merge(mut self, other: ExclusionRequest) -> Self {
        self.strong.extend(other.strong);
        self.names.extend(other.names);
        self
    }

    pub fn strong_references(&self) -> &[String] {
        &self.strong
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.strong.iter().chain(self.names.iter()).any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.strong.is_empty() && self.names.is_empty()
    }
}
