//! Startup Broadcaster
//!
//! Notifies run listeners of each phase of an application run.

use super::{ListenerError, Result, RunListener, StartupPhase};
use crate::discovery::{DiscoveryError, FactoriesLoader, FactoryRegistry, RUN_LISTENER_KEY};
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

/// Boxed listener as stored by the broadcaster
pub type BoxedRunListener<E = (), C = ()> = Box<dyn RunListener<E, C>>;

/// Broadcasts run phases to an ordered list of listeners
///
/// The StartupBroadcaster is responsible for:
/// - Calling every listener, in registration order, for each phase
/// - Stopping at the first listener error during startup phases
/// - Giving every listener a chance to react when the run fails
///
/// Phases are expected in order, each at most once; the broadcaster records
/// the last phase it sent but does not police the sequence.
///
/// # Example
///
/// ```rust,ignore
/// use meshestra_boot::lifecycle::StartupBroadcaster;
///
/// let mut broadcaster = StartupBroadcaster::new(listeners);
///
/// let run = || -> anyhow::Result<()> {
///     broadcaster.starting()?;
///     broadcaster.environment_prepared(&environment)?;
///     // ... prepare and load the context ...
///     broadcaster.running(&context)?;
///     Ok(())
/// };
///
/// if let Err(cause) = run() {
///     broadcaster.failed(None, Some(&cause))?;
/// }
/// ```
pub struct StartupBroadcaster<E: ?Sized = (), C: ?Sized = ()> {
    listeners: Vec<Box<dyn RunListener<E, C>>>,
    run_id: Uuid,
    phase: Option<StartupPhase>,
    started_at: Option<DateTime<Utc>>,
    suppressed: Vec<ListenerError>,
}

impl<E: ?Sized, C: ?Sized> StartupBroadcaster<E, C> {
    /// Create a broadcaster for one run; listener order is kept as given
    pub fn new(listeners: Vec<Box<dyn RunListener<E, C>>>) -> Self {
        Self {
            listeners,
            run_id: Uuid::new_v4(),
            phase: None,
            started_at: None,
            suppressed: Vec::new(),
        }
    }

    /// Create a broadcaster from the listeners listed under
    /// [`RUN_LISTENER_KEY`], in discovery order
    pub fn from_discovery(
        loader: &FactoriesLoader,
        registry: &FactoryRegistry<Box<dyn RunListener<E, C>>>,
    ) -> std::result::Result<Self, DiscoveryError> {
        let names = loader.load_names(RUN_LISTENER_KEY);
        let listeners = registry.instantiate(RUN_LISTENER_KEY, &names)?;
        Ok(Self::new(listeners))
    }

    pub fn starting(&mut self) -> Result<()> {
        self.started_at = Some(Utc::now());
        self.broadcast(StartupPhase::Starting, |l| l.starting())
    }

    pub fn environment_prepared(&mut self, environment: &E) -> Result<()> {
        self.broadcast(StartupPhase::EnvironmentPrepared, |l| {
            l.environment_prepared(environment)
        })
    }

    pub fn context_prepared(&mut self, context: &C) -> Result<()> {
        self.broadcast(StartupPhase::ContextPrepared, |l| l.context_prepared(context))
    }

    pub fn context_loaded(&mut self, context: &C) -> Result<()> {
        self.broadcast(StartupPhase::ContextLoaded, |l| l.context_loaded(context))
    }

    pub fn started(&mut self, context: &C) -> Result<()> {
        self.broadcast(StartupPhase::Started, |l| l.started(context))?;
        if let Some(elapsed) = self.elapsed() {
            tracing::info!(
                run_id = %self.run_id,
                "Application started in {} ms",
                elapsed.num_milliseconds()
            );
        }
        Ok(())
    }

    pub fn running(&mut self, context: &C) -> Result<()> {
        self.broadcast(StartupPhase::Running, |l| l.running(context))?;
        if let Some(elapsed) = self.elapsed() {
            tracing::info!(
                run_id = %self.run_id,
                "Application running after {} ms",
                elapsed.num_milliseconds()
            );
        }
        Ok(())
    }

    /// Notify every listener that the run failed
    ///
    /// Each listener is called even if an earlier one errors. Listener errors
    /// are logged and kept in [`Self::suppressed_errors`]; the exception is a
    /// run that failed without a `cause`, where the first listener error is
    /// returned at once and later listeners are not called.
    pub fn failed(&mut self, context: Option<&C>, cause: Option<&anyhow::Error>) -> Result<()> {
        self.phase = Some(StartupPhase::Failed);

        match cause {
            Some(cause) => {
                tracing::error!(run_id = %self.run_id, "Application run failed: {:#}", cause)
            }
            None => tracing::error!(run_id = %self.run_id, "Application run failed without a cause"),
        }

        for listener in &mut self.listeners {
            tracing::debug!("Notifying {} of failure", listener.name());
            let Err(e) = listener.failed(context, cause) else {
                continue;
            };

            let error = ListenerError::new(listener.name(), StartupPhase::Failed, e);
            if cause.is_none() {
                tracing::error!("Failure handling raised the only error of the run: {}", error);
                return Err(error);
            }

            log_handler_error(&self.run_id, &error);
            self.suppressed.push(error);
        }

        Ok(())
    }

    fn broadcast<F>(&mut self, phase: StartupPhase, mut notify: F) -> Result<()>
    where
        F: FnMut(&mut Box<dyn RunListener<E, C>>) -> anyhow::Result<()>,
    {
        self.phase = Some(phase);
        tracing::info!(
            run_id = %self.run_id,
            "Broadcasting {} to {} run listeners",
            phase,
            self.listeners.len()
        );

        for listener in &mut self.listeners {
            tracing::debug!("Notifying {}: {}", listener.name(), phase);
            notify(listener).map_err(|e| {
                tracing::error!("{} failed for {}: {}", phase, listener.name(), e);
                ListenerError::new(listener.name(), phase, e)
            })?;
        }

        Ok(())
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The last phase broadcast, if any
    pub fn phase(&self) -> Option<StartupPhase> {
        self.phase
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Time since [`Self::starting`] was broadcast
    pub fn elapsed(&self) -> Option<TimeDelta> {
        self.started_at.map(|at| Utc::now() - at)
    }

    /// Listener errors swallowed while broadcasting a failure
    pub fn suppressed_errors(&self) -> &[ListenerError] {
        &self.suppressed
    }

    pub fn listener_names(&self) -> Vec<&str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ?Sized + 'static, C: ?Sized + 'static> FactoryRegistry<Box<dyn RunListener<E, C>>> {
    /// Register a listener constructor under `name`
    pub fn register_listener<L, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        L: RunListener<E, C> + 'static,
        F: Fn() -> L + Send + Sync + 'static,
    {
        self.register(name, move || Box::new(factory()) as Box<dyn RunListener<E, C>>)
    }
}

/// Full error at debug level, message only otherwise
fn log_handler_error(run_id: &Uuid, error: &ListenerError) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::error!(run_id = %run_id, "Error handling failed: {:?}", error);
    } else {
        let message = error.source.to_string();
        let message = if message.is_empty() {
            "no error message"
        } else {
            message.as_str()
        };
        tracing::warn!(run_id = %run_id, "Error handling failed ({})", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        id: &'static str,
        log: Log,
        fail_on: Option<StartupPhase>,
    }

    impl Recorder {
        fn boxed(id: &'static str, log: &Log) -> BoxedRunListener<String, String> {
            Box::new(Self {
                id,
                log: Arc::clone(log),
                fail_on: None,
            })
        }

        fn failing(
            id: &'static str,
            log: &Log,
            phase: StartupPhase,
        ) -> BoxedRunListener<String, String> {
            Box::new(Self {
                id,
                log: Arc::clone(log),
                fail_on: Some(phase),
            })
        }

        fn record(&self, phase: StartupPhase) -> anyhow::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.id, phase));
            if self.fail_on == Some(phase) {
                anyhow::bail!("{} refused {}", self.id, phase);
            }
            Ok(())
        }
    }

    impl RunListener<String, String> for Recorder {
        fn name(&self) -> &str {
            self.id
        }

        fn starting(&mut self) -> anyhow::Result<()> {
            self.record(StartupPhase::Starting)
        }

        fn environment_prepared(&mut self, _environment: &String) -> anyhow::Result<()> {
            self.record(StartupPhase::EnvironmentPrepared)
        }

        fn context_prepared(&mut self, _context: &String) -> anyhow::Result<()> {
            self.record(StartupPhase::ContextPrepared)
        }

        fn context_loaded(&mut self, _context: &String) -> anyhow::Result<()> {
            self.record(StartupPhase::ContextLoaded)
        }

        fn started(&mut self, _context: &String) -> anyhow::Result<()> {
            self.record(StartupPhase::Started)
        }

        fn running(&mut self, _context: &String) -> anyhow::Result<()> {
            self.record(StartupPhase::Running)
        }

        fn failed(
            &mut self,
            _context: Option<&String>,
            _cause: Option<&anyhow::Error>,
        ) -> anyhow::Result<()> {
            self.record(StartupPhase::Failed)
        }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_full_run_in_registration_order() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::boxed("L1", &log),
            Recorder::boxed("L2", &log),
        ]);
        let env = "env".to_string();
        let ctx = "ctx".to_string();

        broadcaster.starting().unwrap();
        broadcaster.environment_prepared(&env).unwrap();
        broadcaster.context_prepared(&ctx).unwrap();
        broadcaster.context_loaded(&ctx).unwrap();
        broadcaster.started(&ctx).unwrap();
        broadcaster.running(&ctx).unwrap();

        assert_eq!(
            entries(&log),
            vec![
                "L1:starting",
                "L2:starting",
                "L1:environment_prepared",
                "L2:environment_prepared",
                "L1:context_prepared",
                "L2:context_prepared",
                "L1:context_loaded",
                "L2:context_loaded",
                "L1:started",
                "L2:started",
                "L1:running",
                "L2:running",
            ]
        );
        assert_eq!(broadcaster.phase(), Some(StartupPhase::Running));
        assert!(broadcaster.elapsed().is_some());
    }

    #[test]
    fn test_startup_phase_fails_fast() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::boxed("L1", &log),
            Recorder::failing("L2", &log, StartupPhase::Starting),
            Recorder::boxed("L3", &log),
        ]);

        let err = broadcaster.starting().unwrap_err();

        assert_eq!(entries(&log), vec!["L1:starting", "L2:starting"]);
        assert_eq!(err.listener, "L2");
        assert_eq!(err.phase, StartupPhase::Starting);
        assert_eq!(err.source.to_string(), "L2 refused starting");
    }

    #[test]
    fn test_context_phase_fails_fast() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::failing("L1", &log, StartupPhase::ContextLoaded),
            Recorder::boxed("L2", &log),
        ]);

        let err = broadcaster.context_loaded(&"ctx".to_string()).unwrap_err();

        assert_eq!(entries(&log), vec!["L1:context_loaded"]);
        assert_eq!(err.phase, StartupPhase::ContextLoaded);
    }

    #[test]
    fn test_failed_with_cause_isolates_listener_errors() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::failing("L1", &log, StartupPhase::Failed),
            Recorder::boxed("L2", &log),
            Recorder::failing("L3", &log, StartupPhase::Failed),
        ]);
        let cause = anyhow::anyhow!("port 8080 already in use");

        broadcaster
            .failed(Some(&"ctx".to_string()), Some(&cause))
            .unwrap();

        assert_eq!(entries(&log), vec!["L1:failed", "L2:failed", "L3:failed"]);
        assert_eq!(broadcaster.phase(), Some(StartupPhase::Failed));
        let suppressed: Vec<&str> = broadcaster
            .suppressed_errors()
            .iter()
            .map(|e| e.listener.as_str())
            .collect();
        assert_eq!(suppressed, vec!["L1", "L3"]);
    }

    #[test]
    fn test_failed_without_cause_surfaces_listener_error() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::boxed("L1", &log),
            Recorder::failing("L2", &log, StartupPhase::Failed),
            Recorder::boxed("L3", &log),
        ]);

        let err = broadcaster.failed(None, None).unwrap_err();

        assert_eq!(err.listener, "L2");
        assert_eq!(err.phase, StartupPhase::Failed);
        assert_eq!(entries(&log), vec!["L1:failed", "L2:failed"]);
        assert!(broadcaster.suppressed_errors().is_empty());
    }

    #[test]
    fn test_failed_without_cause_stops_at_first_error() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::failing("L1", &log, StartupPhase::Failed),
            Recorder::failing("L2", &log, StartupPhase::Failed),
        ]);

        let err = broadcaster.failed(None, None).unwrap_err();

        assert_eq!(err.listener, "L1");
        assert_eq!(entries(&log), vec!["L1:failed"]);
        assert!(broadcaster.suppressed_errors().is_empty());
    }

    #[test]
    fn test_failed_after_startup_error() {
        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![
            Recorder::failing("L1", &log, StartupPhase::EnvironmentPrepared),
            Recorder::boxed("L2", &log),
        ]);

        broadcaster.starting().unwrap();
        let cause = anyhow::Error::from(
            broadcaster
                .environment_prepared(&"env".to_string())
                .unwrap_err(),
        );
        broadcaster.failed(None, Some(&cause)).unwrap();

        assert_eq!(
            entries(&log),
            vec![
                "L1:starting",
                "L2:starting",
                "L1:environment_prepared",
                "L1:failed",
                "L2:failed",
            ]
        );
        assert!(cause.to_string().contains("L1"));
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn output(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn failed_with_handler_error(level: tracing::Level) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let log = Log::default();
        let mut broadcaster = StartupBroadcaster::new(vec![Recorder::failing(
            "L1",
            &log,
            StartupPhase::Failed,
        )]);
        let cause = anyhow::anyhow!("boom");

        broadcaster.failed(None, Some(&cause)).unwrap();
        assert_eq!(broadcaster.suppressed_errors().len(), 1);

        capture.output()
    }

    #[test]
    fn test_handler_errors_logged_in_full_at_debug() {
        let output = failed_with_handler_error(tracing::Level::DEBUG);

        assert!(output.contains("ERROR"));
        assert!(output.contains("Error handling failed: ListenerError"));
        assert!(!output.contains("Error handling failed (L1 refused failed)"));
    }

    #[test]
    fn test_handler_errors_warned_above_debug() {
        let output = failed_with_handler_error(tracing::Level::INFO);

        assert!(output.contains("WARN"));
        assert!(output.contains("Error handling failed (L1 refused failed)"));
        assert!(!output.contains("Error handling failed: "));
    }

    #[test]
    fn test_from_discovery_keeps_discovered_order() {
        let log = Log::default();
        let mut loader = FactoriesLoader::new();
        loader
            .parse_source("core", "meshestra.boot.RunListener=app::Zeta,app::Alpha")
            .unwrap()
            .parse_source("extra", "meshestra.boot.RunListener=app::Alpha,app::Mid")
            .unwrap();

        let mut registry = FactoryRegistry::<BoxedRunListener<String, String>>::new();
        for id in ["app::Alpha", "app::Mid", "app::Zeta"] {
            let log = Arc::clone(&log);
            registry.register(id, move || Recorder::boxed(id, &log));
        }

        let mut broadcaster = StartupBroadcaster::from_discovery(&loader, &registry).unwrap();
        assert_eq!(
            broadcaster.listener_names(),
            vec!["app::Zeta", "app::Alpha", "app::Mid"]
        );

        broadcaster.starting().unwrap();
        assert_eq!(
            entries(&log),
            vec!["app::Zeta:starting", "app::Alpha:starting", "app::Mid:starting"]
        );
    }

    #[test]
    fn test_register_listener() {
        struct Quiet;
        impl RunListener<String, String> for Quiet {}

        let mut registry = FactoryRegistry::<BoxedRunListener<String, String>>::new();
        registry.register_listener("app::Quiet", || Quiet);

        let listeners = registry
            .instantiate(RUN_LISTENER_KEY, &["app::Quiet".to_string()])
            .unwrap();
        assert_eq!(listeners.len(), 1);
        assert!(listeners[0].name().ends_with("Quiet"));
    }

    #[test]
    fn test_no_listeners() {
        let mut broadcaster = StartupBroadcaster::<String, String>::new(Vec::new());

        broadcaster.starting().unwrap();
        broadcaster.failed(None, None).unwrap();
        assert_eq!(broadcaster.listener_count(), 0);
    }
}
