//! Utilities: logging setup for the binary.
//!
//! Key items:
//!   init_logging / derive_level

/// Logging helpers on top of `log` + `env_logger`.
pub mod logging {
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    /// `-q` wins over any number of `-v`.
    pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Install the global logger. `RUST_LOG` overrides `level` when set.
    /// Calling twice is harmless; the second call reports an error and changes nothing.
    pub fn init_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        Builder::from_env(Env::default().default_filter_or(level.to_string()))
            .format_timestamp_millis()
            .try_init()
    }
}

pub use logging::{derive_level, init_logging};
