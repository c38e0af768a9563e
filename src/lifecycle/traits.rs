//! Run listener trait
//!
//! Listeners observe an application run. Every method has a no-op default, so
//! a listener only implements the phases it cares about.

/// Observer notified at the milestones of an application run
///
/// `E` is the environment handed to [`RunListener::environment_prepared`];
/// `C` is the application context handed to the later phases. Both are passed
/// through untouched.
///
/// Returning an error from any phase but [`RunListener::failed`] aborts the
/// run. Errors from `failed` are logged and only surface when the run failed
/// without a cause of its own.
///
/// # Example
///
/// ```rust
/// use meshestra_boot::lifecycle::RunListener;
///
/// struct Banner;
///
/// impl RunListener<(), String> for Banner {
///     fn context_loaded(&mut self, context: &String) -> anyhow::Result<()> {
///         println!("loaded {context}");
///         Ok(())
///     }
/// }
/// ```
pub trait RunListener<E: ?Sized = (), C: ?Sized = ()>: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The run has begun; nothing has been prepared yet
    fn starting(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn environment_prepared(&mut self, _environment: &E) -> anyhow::Result<()> {
        Ok(())
    }

    /// The context exists but no modules have been loaded into it
    fn context_prepared(&mut self, _context: &C) -> anyhow::Result<()> {
        Ok(())
    }

    fn context_loaded(&mut self, _context: &C) -> anyhow::Result<()> {
        Ok(())
    }

    /// The context is refreshed; startup runners have not been called yet
    fn started(&mut self, _context: &C) -> anyhow::Result<()> {
        Ok(())
    }

    fn running(&mut self, _context: &C) -> anyhow::Result<()> {
        Ok(())
    }

    /// The run failed
    ///
    /// `context` is `None` when the failure happened before a context
    /// existed; `cause` is `None` when the caller had no error to report.
    fn failed(
        &mut self,
        _context: Option<&C>,
        _cause: Option<&anyhow::Error>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
