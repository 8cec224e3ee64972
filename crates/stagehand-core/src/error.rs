use std::fmt;

use thiserror::Error;

/// Engine-wide error.
///
/// Keep this small and stable. Gamestates may define their own error types and map them
/// into `EngineError::Other`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Graceful shutdown was requested.
    #[error("exit requested")]
    ExitRequested,

    #[error("unknown gamestate '{0}'")]
    UnknownGamestate(String),

    /// No factory is registered for the gamestate name.
    #[error("gamestate '{0}' could not be resolved: no factory registered")]
    Resolve(String),

    /// Error produced by a gamestate during a known lifecycle stage.
    #[error("gamestate '{name}' stage {stage}: {source}")]
    Gamestate {
        name: String,
        stage: GamestateStage,
        #[source]
        source: Box<EngineError>,
    },

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error (fallback).
    #[error("{0}")]
    Other(String),
}

/// Gamestate lifecycle stage used for error attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamestateStage {
    Load,
    Start,
    Stop,
    Unload,
    Pause,
    Resume,
    Reload,
    Logic,
    Draw,
    Event,
}

impl GamestateStage {
    pub fn as_str(self) -> &'static str {
        match self {
            GamestateStage::Load => "Load",
            GamestateStage::Start => "Start",
            GamestateStage::Stop => "Stop",
            GamestateStage::Unload => "Unload",
            GamestateStage::Pause => "Pause",
            GamestateStage::Resume => "Resume",
            GamestateStage::Reload => "Reload",
            GamestateStage::Logic => "Logic",
            GamestateStage::Draw => "Draw",
            GamestateStage::Event => "Event",
        }
    }
}

impl fmt::Display for GamestateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EngineError {
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    #[inline]
    pub fn with_stage(name: &str, stage: GamestateStage, err: EngineError) -> Self {
        match err {
            EngineError::ExitRequested => EngineError::ExitRequested,
            other => EngineError::Gamestate {
                name: name.to_string(),
                stage,
                source: Box::new(other),
            },
        }
    }
}

impl From<&str> for EngineError {
    #[inline]
    fn from(value: &str) -> Self {
        EngineError::Other(value.to_string())
    }
}

impl From<String> for EngineError {
    #[inline]
    fn from(value: String) -> Self {
        EngineError::Other(value)
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
