//! # Meshestra Boot
//!
//! Conditional auto-module activation and startup lifecycle broadcasting for
//! Meshestra applications.
//!
//! ## Features
//!
//! - **Auto Modules**: Optional setup modules selected by conditions on the
//!   environment, with typed and name-based exclusions
//! - **Deterministic Ordering**: `after`/`before` constraints with numeric
//!   order tiebreaks and stable catalog order
//! - **Discovery**: Line-oriented factories files aggregated across sources
//! - **Run Listeners**: Ordered observers notified through fixed run phases,
//!   with fail-fast startup and isolated failure handling
//!
//! ## Quick Start
//!
//! ```rust
//! use meshestra_boot::prelude::*;
//!
//! // 1. Describe your auto modules
//! pub struct DataSourceModule;
//!
//! impl AutoModule for DataSourceModule {
//!     const NAME: &'static str = "app::DataSourceModule";
//!
//!     fn descriptor() -> ModuleDescriptor {
//!         ModuleDescriptor::new(Self::NAME)
//!             .when(Condition::library_present("sqlx"))
//!             .when(Condition::component_absent("app::DataSource"))
//!     }
//! }
//!
//! // 2. List them for discovery
//! let mut loader = FactoriesLoader::new();
//! loader
//!     .parse_source("app", "meshestra.boot.AutoModule=app::DataSourceModule")
//!     .unwrap();
//!
//! let mut modules = FactoryRegistry::<ModuleDescriptor>::new();
//! modules.register_module::<DataSourceModule>();
//!
//! // 3. Select for this run
//! let environment = StaticEnvironment::new().with_library("sqlx");
//! let selected = AutoConfigurationSelector::new(loader, modules)
//!     .select(&ExclusionRequest::new(), &ConfigService::default(), &environment)
//!     .unwrap();
//!
//! assert_eq!(selected.modules(), ["app::DataSourceModule"]);
//!
//! // 4. Broadcast the run
//! let listeners: Vec<BoxedRunListener> = vec![Box::new(LoggingRunListener::new())];
//! let mut broadcaster = StartupBroadcaster::new(listeners);
//! broadcaster.starting().unwrap();
//! ```

pub mod autoconfigure;
pub mod config;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod module;

// Re-export core types
pub use autoconfigure::{
    ActivationResolver, ActivationResult, AutoConfigurationSelector, Condition,
    ConfigurationError, EvaluationContext, ExclusionRequest, ModuleCatalog, ModuleDescriptor,
};
pub use error::{BootError, Result};
pub use lifecycle::{ListenerError, RunListener, StartupBroadcaster, StartupPhase};
pub use module::AutoModule;

/// Prelude module for convenient imports
///
/// ```
/// use meshestra_boot::prelude::*;
/// ```
pub mod prelude {
    pub use crate::autoconfigure::{
        ActivationReport, ActivationResolver, ActivationResult, AutoConfigurationSelector,
        Condition, ConfigurationError, EvaluationContext, ExclusionRequest, ModuleCatalog,
        ModuleDescriptor, StaticEnvironment,
    };
    pub use crate::config::ConfigService;
    pub use crate::discovery::{
        AUTO_MODULE_KEY, DiscoveryError, FactoriesFile, FactoriesLoader, FactoryRegistry,
        RUN_LISTENER_KEY,
    };
    pub use crate::error::{BootError, Result};
    pub use crate::lifecycle::{
        BoxedRunListener, ListenerError, LoggingRunListener, RunListener, StartupBroadcaster,
        StartupPhase,
    };
    pub use crate::module::AutoModule;
}
