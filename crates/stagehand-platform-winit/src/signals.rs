use stagehand_core::{EngineError, EngineResult, ShutdownToken};

/// Ctrl-C bridge onto the engine's shutdown token.
#[derive(Clone)]
pub struct ExitSignal {
    token: ShutdownToken,
}

impl ExitSignal {
    pub fn new(token: ShutdownToken) -> Self {
        Self { token }
    }

    #[inline]
    pub fn request_exit(&self) {
        self.token.request();
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.token.is_requested()
    }

    /// Only one handler can exist per process; a second install fails.
    pub fn install_ctrlc_handler(&self) -> EngineResult<()> {
        let s = self.clone();
        ctrlc::set_handler(move || s.request_exit())
            .map_err(|e| EngineError::Other(format!("ctrl-c handler: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_reaches_the_engine_token() {
        let token = ShutdownToken::new();
        let signal = ExitSignal::new(token.clone());
        assert!(!signal.is_exit_requested());

        signal.request_exit();
        assert!(token.is_requested());
    }
}
