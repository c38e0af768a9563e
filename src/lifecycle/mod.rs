//! Startup Lifecycle Module
//!
//! This module broadcasts the phases of an application run to run listeners
//! discovered for that run.
//!
//! # Run Phases
//!
//! ```text
//! 1. starting
//!    ↓
//! 2. environment_prepared(environment)
//!    ↓
//! 3. context_prepared(context)
//!    ↓
//! 4. context_loaded(context)           ← auto modules are registered here
//!    ↓
//! 5. started(context)
//!    ↓
//! 6. running(context)                  ← success
//!
//! failed(context?, cause?)             ← from any phase before running
//! ```
//!
//! Errors in phases 1-6 stop the broadcast at the failing listener and are
//! returned to the caller, which is expected to follow up with `failed`.
//! Errors raised while handling `failed` are logged instead, unless the run
//! failed without a cause.
//!
//! # Example
//!
//! ```rust
//! use meshestra_boot::lifecycle::{
//!     BoxedRunListener, LoggingRunListener, RunListener, StartupBroadcaster,
//! };
//!
//! struct Warmup;
//!
//! impl RunListener<(), String> for Warmup {
//!     fn started(&mut self, context: &String) -> anyhow::Result<()> {
//!         anyhow::ensure!(!context.is_empty(), "context not ready");
//!         Ok(())
//!     }
//! }
//!
//! let listeners: Vec<BoxedRunListener<(), String>> =
//!     vec![Box::new(LoggingRunListener::new()), Box::new(Warmup)];
//! let mut broadcaster = StartupBroadcaster::new(listeners);
//! let context = "app".to_string();
//!
//! broadcaster.starting().unwrap();
//! broadcaster.environment_prepared(&()).unwrap();
//! broadcaster.context_prepared(&context).unwrap();
//! broadcaster.context_loaded(&context).unwrap();
//! broadcaster.started(&context).unwrap();
//! broadcaster.running(&context).unwrap();
//! ```

mod broadcaster;
mod error;
mod logging;
mod phase;
mod traits;

pub use broadcaster::{BoxedRunListener, StartupBroadcaster};
pub use error::{ListenerError, Result};
pub use logging::LoggingRunListener;
pub use phase::StartupPhase;
pub use traits::RunListener;
