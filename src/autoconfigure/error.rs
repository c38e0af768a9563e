//! Resolution error types

use thiserror::Error;

/// Errors that abort auto module resolution
///
/// Resolution never activates a partial set of modules: any of these errors
/// leaves the caller with nothing to register.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A strongly-referenced exclusion does not name any catalog entry
    #[error("The following modules could not be excluded because they are not auto modules: {}", .names.join(", "))]
    ExcludedIdentityNotFound {
        /// Every unmatched strong reference, in request order
        names: Vec<String>,
    },

    /// The `after`/`before` constraints admit no linear order
    #[error("Cyclic ordering constraint between modules: {}", .0.join(" -> "))]
    CyclicOrderingConstraint(Vec<String>),

    /// A structured descriptor manifest could not be read
    #[error("Invalid module manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),
}

impl ConfigurationError {
    /// Create an unmatched-exclusion error
    pub fn excluded_not_found<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ExcludedIdentityNotFound {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Identities involved in the error, if any
    pub fn identities(&self) -> &[String] {
        match self {
            Self::ExcludedIdentityNotFound { names } => names,
            Self::CyclicOrderingConstraint(names) => names,
            Self::InvalidManifest(_) => &[],
        }
    }
}
