use super::{RunListener, StartupPhase};

/// A run listener that logs every phase it sees
#[derive(Debug, Clone, Default)]
pub struct LoggingRunListener {
    seen: Vec<StartupPhase>,
}

impl LoggingRunListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phases observed so far, in order
    pub fn seen(&self) -> &[StartupPhase] {
        &self.seen
    }

    fn log(&mut self, phase: StartupPhase) -> anyhow::Result<()> {
        tracing::info!("--> {}", phase);
        self.seen.push(phase);
        Ok(())
    }
}

impl<E: ?Sized, C: ?Sized> RunListener<E, C> for LoggingRunListener {
    fn name(&self) -> &str {
        "LoggingRunListener"
    }

    fn starting(&mut self) -> anyhow::Result<()> {
        self.log(StartupPhase::Starting)
    }

    fn environment_prepared(&mut self, _environment: &E) -> anyhow::Result<()> {
        self.log(StartupPhase::EnvironmentPrepared)
    }

    fn context_prepared(&mut self, _context: &C) -> anyhow::Result<()> {
        self.log(StartupPhase::ContextPrepared)
    }

    fn context_loaded(&mut self, _context: &C) -> anyhow::Result<()> {
        self.log(StartupPhase::ContextLoaded)
    }

    fn started(&mut self, _context: &C) -> anyhow::Result<()> {
        self.log(StartupPhase::Started)
    }

    fn running(&mut self, _context: &C) -> anyhow::Result<()> {
        self.log(StartupPhase::Running)
    }

    fn failed(&mut self, context: Option<&C>, cause: Option<&anyhow::Error>) -> anyhow::Result<()> {
        match cause {
            Some(cause) => tracing::warn!(
                "<-- {} (context: {}): {:#}",
                StartupPhase::Failed,
                context.is_some(),
                cause
            ),
            None => tracing::warn!("<-- {} (context: {})", StartupPhase::Failed, context.is_some()),
        }
        self.seen.push(StartupPhase::Failed);
        Ok(())
    }
}
