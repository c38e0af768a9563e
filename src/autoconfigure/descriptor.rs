use super::condition::Condition;
use serde::{Deserialize, Serialize};

/// Everything the resolver needs to know about one auto module
///
/// Descriptors are immutable once loaded. `after` and `before` name other
/// modules by identity; `order` breaks ties between modules that are otherwise
/// free to move (lower runs first).
///
/// # Example
///
/// ```
/// use meshestra_boot::autoconfigure::{Condition, ModuleDescriptor};
///
/// let descriptor = ModuleDescriptor::new("app::JdbcTemplateModule")
///     .after("app::DataSourceModule")
///     .order(10)
///     .when(Condition::component_absent("app::JdbcTemplate"));
///
/// assert_eq!(descriptor.name(), "app::JdbcTemplateModule");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    name: String,
    #[serde(default)]
    after: Vec<String>,
    #[serde(default)]
    before: Vec<String>,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    conditions: Vec<Condition>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            after: Vec::new(),
            before: Vec::new(),
            order: 0,
            conditions: Vec::new(),
        }
    }

    /// Require `name` to be activated before this module
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after.push(name.into());
        self
    }

    /// Require this module to be activated before `name`
    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before.push(name.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Add a condition; all conditions must hold for the module to activate
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn after_names(&self) -> &[String] {
        &self.after
    }

    pub fn before_names(&self) -> &[String] {
        &self.before
    }

    pub fn ordering(&self) -> i32 {
        self.order
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}
