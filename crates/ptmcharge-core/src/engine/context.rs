use super::cancel::CancellationToken;
use super::config::EngineConfig;
use super::error::EngineError;
use super::progress::ProgressReporter;

/// Everything an engine needs besides the dataset itself.
#[derive(Clone, Copy)]
pub struct ComputeContext<'a> {
    pub config: &'a EngineConfig,
    pub reporter: &'a ProgressReporter<'a>,
    pub cancel: &'a CancellationToken,
}

impl<'a> ComputeContext<'a> {
    pub fn new(
        config: &'a EngineConfig,
        reporter: &'a ProgressReporter<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            reporter,
            cancel,
        }
    }

    #[inline]
    pub fn checkpoint(&self) -> Result<(), EngineError> {
        self.cancel.check()
    }
}
