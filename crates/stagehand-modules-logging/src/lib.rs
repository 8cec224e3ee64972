use std::io::Write;

use env_logger::{Builder, WriteStyle};
use log::{LevelFilter, Log, Metadata, Record};
use stagehand_core::{ConsoleBuffer, EngineError, EngineResult};

#[derive(Debug, Clone)]
pub struct ConsoleLoggerConfig {
    pub level: LevelFilter,
    /// Extra `env_logger` directives, e.g. `timeline=trace,gamestate=debug`.
    pub filters: Option<String>,
    pub colors: bool,
    pub include_target: bool,
    /// Lines at or above this level are mirrored into the console buffer.
    pub console_level: LevelFilter,
}

impl ConsoleLoggerConfig {
    /// `STAGEHAND_LOG` takes either a level or a directive list.
    pub fn from_env() -> Self {
        let raw = std::env::var("STAGEHAND_LOG").ok();
        let (level, filters) = match raw.as_deref().map(str::trim) {
            None | Some("") => (LevelFilter::Info, None),
            Some(v) => match v.parse::<LevelFilter>() {
                Ok(level) => (level, None),
                Err(_) => (LevelFilter::Info, Some(v.to_string())),
            },
        };
        let colors = std::env::var("STAGEHAND_LOG_COLORS")
            .ok()
            .map(|v| v != "0")
            .unwrap_or(true);
        let include_target = std::env::var("STAGEHAND_LOG_MODULE")
            .ok()
            .map(|v| v != "0")
            .unwrap_or(true);

        Self {
            level,
            filters,
            colors,
            include_target,
            console_level: LevelFilter::Info,
        }
    }
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `env_logger` output to stderr, mirrored into the engine's [`ConsoleBuffer`].
pub struct ConsoleLogger {
    stderr: env_logger::Logger,
    console: Option<ConsoleBuffer>,
    console_level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(config: &ConsoleLoggerConfig, console: Option<ConsoleBuffer>) -> Self {
        let mut builder = Builder::new();
        builder.filter_level(config.level);
        if let Some(filters) = config.filters.as_deref() {
            builder.parse_filters(filters);
        }
        let write_style = if config.colors {
            WriteStyle::Auto
        } else {
            WriteStyle::Never
        };
        builder.write_style(write_style);

        let include_target = config.include_target;
        builder.format(move |buf, record| {
            let style = buf.default_level_style(record.level());
            if include_target {
                writeln!(
                    buf,
                    "[{style}{:<5}{style:#}] {:<10} {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "[{style}{:<5}{style:#}] {}",
                    record.level(),
                    record.args()
                )
            }
        });

        Self {
            stderr: builder.build(),
            console,
            console_level: config.console_level,
        }
    }

    /// Most verbose level either sink wants.
    pub fn max_level(&self) -> LevelFilter {
        let console = if self.console.is_some() {
            self.console_level
        } else {
            LevelFilter::Off
        };
        self.stderr.filter().max(console)
    }

    fn mirrors(&self, metadata: &Metadata<'_>) -> bool {
        self.console.is_some() && metadata.level() <= self.console_level
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.stderr.enabled(metadata) || self.mirrors(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.stderr.matches(record) {
            self.stderr.log(record);
        }
        if let Some(console) = self.console.as_ref() {
            if self.mirrors(record.metadata()) {
                let message = record.args().to_string();
                console.print(record.level(), record.target(), message);
            }
        }
    }

    fn flush(&self) {
        self.stderr.flush();
    }
}

/// Installs [`ConsoleLogger`] as the global logger.
pub struct ConsoleLoggerModule {
    config: ConsoleLoggerConfig,
    console: Option<ConsoleBuffer>,
    initialized: bool,
}

impl ConsoleLoggerModule {
    #[inline]
    pub fn new(config: ConsoleLoggerConfig) -> Self {
        Self {
            config,
            console: None,
            initialized: false,
        }
    }

    /// Mirror log lines into `console`, usually the one handed to `Engine::with_console`.
    pub fn with_console(mut self, console: ConsoleBuffer) -> Self {
        self.console = Some(console);
        self
    }

    pub fn id(&self) -> &'static str {
        "console-logger"
    }

    pub fn init(&mut self) -> EngineResult<()> {
        if self.initialized {
            return Ok(());
        }

        let logger = ConsoleLogger::new(&self.config, self.console.clone());
        let max = logger.max_level();

        log::set_boxed_logger(Box::new(logger))
            .map_err(|e| EngineError::Other(format!("logger init failed: {e}")))?;
        log::set_max_level(max);

        self.initialized = true;
        Ok(())
    }
}
