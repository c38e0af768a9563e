//! Auto Module Activation
//!
//! Decides which optional setup modules ("auto modules") take part in an
//! application run, and in which order they are handed to the container.
//!
//! # Resolution Steps
//!
//! ```text
//! 1. Validate strong exclusions against the catalog
//!    ↓
//! 2. Drop excluded modules
//!    ↓
//! 3. Evaluate conditions (first failure drops the module)
//!    ↓
//! 4. Deduplicate by identity (first occurrence wins)
//!    ↓
//! 5. Order by after/before constraints, then order, then catalog position
//! ```
//!
//! # Example
//!
//! ```rust
//! use meshestra_boot::autoconfigure::{
//!     ActivationResolver, Condition, ExclusionRequest, ModuleCatalog, ModuleDescriptor,
//!     StaticEnvironment,
//! };
//!
//! let catalog: ModuleCatalog = vec![
//!     ModuleDescriptor::new("app::JdbcModule").after("app::DataSourceModule"),
//!     ModuleDescriptor::new("app::DataSourceModule").when(Condition::library_present("sqlx")),
//!     ModuleDescriptor::new("app::CacheModule").when(Condition::library_present("moka")),
//! ]
//! .into_iter()
//! .collect();
//!
//! let env = StaticEnvironment::new().with_library("sqlx");
//! let result = ActivationResolver::new()
//!     .resolve(&catalog, &ExclusionRequest::new(), &env)
//!     .unwrap();
//!
//! assert_eq!(result.modules(), ["app::DataSourceModule", "app::JdbcModule"]);
//! assert_eq!(result.report().unmatched[0].module, "app::CacheModule");
//! ```

mod catalog;
mod condition;
mod descriptor;
mod error;
mod exclusion;
mod resolver;
mod selector;

pub use catalog::ModuleCatalog;
pub use condition::{Condition, EvaluationContext, StaticEnvironment, first_unmatched};
pub use descriptor::ModuleDescriptor;
pub use error::ConfigurationError;
pub use exclusion::ExclusionRequest;
pub use resolver::{ActivationReport, ActivationResolver, ActivationResult, ConditionOutcome};
pub use selector::AutoConfigurationSelector;
