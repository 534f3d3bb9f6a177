//! Logger setup. The library itself only emits records through the `log`
//! facade; applications and tests call [`init_logging`] once.
use crate::config::BalancerConfig;
use crate::error::ChemResult;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Installs a terminal logger and, if `log_file` is given, a file logger.
/// Returns `false` when a global logger was already installed.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> ChemResult<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}

/// [`init_logging`] with the level and file taken from the configuration.
pub fn init_from_config(config: &BalancerConfig) -> ChemResult<bool> {
    let level = config.level_filter()?;
    init_logging(level, config.log_file.as_deref().map(Path::new))
}
