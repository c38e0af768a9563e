//! Activation conditions
//!
//! Conditions gate whether an auto module takes part in a run. They are plain
//! data, evaluated by [`Condition::matches`] against an [`EvaluationContext`].

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Read-only view of the environment a resolution runs against
///
/// Implementations answer from a snapshot taken once per application run, so
/// repeated queries must return the same answer.
pub trait EvaluationContext {
    /// Whether the named library is available to the application
    fn is_library_present(&self, name: &str) -> bool;

    /// Whether a component of the given type is already registered
    fn is_component_registered(&self, type_name: &str) -> bool;

    /// Value of a configuration property, if bound
    fn property(&self, _name: &str) -> Option<String> {
        None
    }
}

/// A predicate gating a module's activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// The named library must be available
    LibraryPresent { name: String },

    /// The named library must not be available
    LibraryAbsent { name: String },

    /// A component of this type must already be registered
    ComponentPresent { type_name: String },

    /// No component of this type may be registered yet
    ComponentAbsent { type_name: String },

    /// A property must be set, optionally to a specific value
    Property {
        name: String,
        #[serde(default)]
        having_value: Option<String>,
        #[serde(default)]
        match_if_missing: bool,
    },
}

impl Condition {
    pub fn library_present(name: impl Into<String>) -> Self {
        Self::LibraryPresent { name: name.into() }
    }

    pub fn library_absent(name: impl Into<String>) -> Self {
        Self::LibraryAbsent { name: name.into() }
    }

    pub fn component_present(type_name: impl Into<String>) -> Self {
        Self::ComponentPresent {
            type_name: type_name.into(),
        }
    }

    pub fn component_absent(type_name: impl Into<String>) -> Self {
        Self::ComponentAbsent {
            type_name: type_name.into(),
        }
    }

    /// Matches when the property is set to anything other than `false`
    pub fn property_enabled(name: impl Into<String>) -> Self {
        Self::Property {
            name: name.into(),
            having_value: None,
            match_if_missing: false,
        }
    }

    /// Matches when the property equals `value` (case-insensitive)
    pub fn property_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Property {
            name: name.into(),
            having_value: Some(value.into()),
            match_if_missing: false,
        }
    }

    /// Evaluate this condition against the environment
    pub fn matches(&self, environment: &dyn EvaluationContext) -> bool {
        match self {
            Condition::LibraryPresent { name } => environment.is_library_present(name),
            Condition::LibraryAbsent { name } => !environment.is_library_present(name),
            Condition::ComponentPresent { type_name } => {
                environment.is_component_registered(type_name)
            }
            Condition::ComponentAbsent { type_name } => {
                !environment.is_component_registered(type_name)
            }
            Condition::Property {
                name,
                having_value,
                match_if_missing,
            } => match environment.property(name) {
                None => *match_if_missing,
                Some(actual) => match having_value {
                    Some(expected) => actual.eq_ignore_ascii_case(expected),
                    None => !actual.eq_ignore_ascii_case("false"),
                },
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::LibraryPresent { name } => write!(f, "library '{}' present", name),
            Condition::LibraryAbsent { name } => write!(f, "library '{}' absent", name),
            Condition::ComponentPresent { type_name } => {
                write!(f, "component '{}' registered", type_name)
            }
            Condition::ComponentAbsent { type_name } => {
                write!(f, "component '{}' not registered", type_name)
            }
            Condition::Property {
                name,
                having_value: Some(value),
                ..
            } => write!(f, "property '{}' = '{}'", name, value),
            Condition::Property { name, .. } => write!(f, "property '{}' enabled", name),
        }
    }
}

/// Evaluate conditions in order, returning the first one that does not match
pub fn first_unmatched<'a>(
    conditions: &'a [Condition],
    environment: &dyn EvaluationContext,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| !c.matches(environment))
}

/// An [`EvaluationContext`] backed by fixed sets
///
/// # Example
///
/// ```
/// use meshestra_boot::autoconfigure::{Condition, StaticEnvironment};
///
/// let env = StaticEnvironment::new()
///     .with_library("sqlx")
///     .with_component("app::DataSource");
///
/// assert!(Condition::library_present("sqlx").matches(&env));
/// assert!(!Condition::component_absent("app::DataSource").matches(&env));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    libraries: HashSet<String>,
    components: HashSet<String>,
    properties: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_library(mut self, name: impl Into<String>) -> Self {
        self.libraries.insert(name.into());
        self
    }

    pub fn with_component(mut self, type_name: impl Into<String>) -> Self {
        self.components.insert(type_name.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }
}

impl EvaluationContext for StaticEnvironment {
    fn is_library_present(&self, name: &str) -> bool {
        self.libraries.contains(name)
    }

    fn is_component_registered(&self, type_name: &str) -> bool {
        self.components.contains(type_name)
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }
}
