mod states;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use stagehand_core::{ConsoleBuffer, Engine, EngineConfig, LoadingScreen};
use stagehand_modules_logging::{ConsoleLoggerConfig, ConsoleLoggerModule};
use stagehand_platform_winit::{run_winit_app, FixedStep};

/// Reports load progress through the log.
struct LogLoadingScreen;

impl LoadingScreen for LogLoadingScreen {
    fn begin(&mut self, name: &str) {
        info!(target: "gamestate", "loading '{name}'");
    }

    fn progress(&mut self, name: &str, fraction: f32) {
        log::debug!(target: "gamestate", "loading '{name}': {:>3.0}%", fraction * 100.0);
    }
}

/// Timeline and gamestate demo: an intro that hands over to a menu.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct DemoArgs {
    /// Engine config; the bundled `stagehand.toml` is used when omitted
    config: Option<PathBuf>,

    /// Run without a window for SECONDS of simulated time
    #[arg(long, value_name = "SECONDS")]
    #[arg(num_args = 0..=1, default_missing_value = "5")]
    headless: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = DemoArgs::parse();

    let cfg = match args.config.as_deref() {
        Some(path) => Engine::load_config_toml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::from_toml_str(include_str!("../stagehand.toml"))?,
    };

    let console = ConsoleBuffer::new(cfg.runtime.console_capacity);
    ConsoleLoggerModule::new(ConsoleLoggerConfig::from_env())
        .with_console(console.clone())
        .init()?;

    let mut engine = Engine::with_console(cfg, console);
    engine.set_loading_screen(Box::new(LogLoadingScreen));
    states::register_all(&mut engine);

    let Some(secs) = args.headless else {
        return Ok(run_winit_app(engine)?);
    };

    let clock = FixedStep::from_config(&engine.config().frame);
    let ticks = secs * u64::from(engine.config().frame.tick_hz.max(1));
    let done = engine.run_headless(clock.tick_dt(), ticks)?;
    info!(target: "engine", "headless run finished after {done} tick(s)");
    for line in engine.scheduler().timelines().describe() {
        info!(target: "timeline", "{line}");
    }

    engine.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<DemoArgs, clap::Error> {
        let argv = std::iter::once("stagehand-demo").chain(argv.iter().copied());
        DemoArgs::try_parse_from(argv)
    }

    #[test]
    fn windowed_by_default() {
        let args = parse(&[]).unwrap();
        assert!(args.config.is_none());
        assert_eq!(args.headless, None);
    }

    #[test]
    fn headless_takes_optional_seconds() {
        assert_eq!(parse(&["--headless"]).unwrap().headless, Some(5));
        assert_eq!(parse(&["--headless=2"]).unwrap().headless, Some(2));

        let args = parse(&["game.toml", "--headless", "9"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("game.toml")));
        assert_eq!(args.headless, Some(9));
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(parse(&["--headless=oops"]).is_err());
        assert!(parse(&["--headlessXYZ"]).is_err());
        assert!(parse(&["--bogus-flag"]).is_err());
        assert!(parse(&["a.toml", "b.toml"]).is_err());
    }
}
