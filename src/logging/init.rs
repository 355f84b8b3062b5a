use std::sync::Once;

use log::LevelFilter;

use crate::config::ViewerConfig;

/// How the viewer's logger is set up.
///
/// `filter` takes `env_logger` directives, e.g. "grim_raster=debug,warn".
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directives from the config file; override RUST_LOG when set
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Level for this crate when no directives are given at all.
    /// Everything else (windowing, image decoding) stays at warn.
    pub default_level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
            default_level: LevelFilter::Info,
        }
    }
}

impl LoggingConfig {
    pub fn for_viewer(config: &ViewerConfig) -> Self {
        Self {
            filter: config.log_filter.clone(),
            ..Default::default()
        }
    }

    /// Directives actually applied: config filter, then `rust_log`, then the
    /// crate default.
    pub fn directives(&self, rust_log: Option<String>) -> String {
        self.filter
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| format!("grim_raster={},warn", self.default_level))
    }
}

static INIT: Once = Once::new();

/// Install the global logger. Only the first call does anything.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directives = config.directives(std::env::var("RUST_LOG").ok());
        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&directives)
            .write_style(config.write_style)
            .format_timestamp_millis();

        // the test harness may have installed a logger already
        if builder.try_init().is_ok() {
            log::debug!("logging initialized ({})", directives);
        }
    });
}
