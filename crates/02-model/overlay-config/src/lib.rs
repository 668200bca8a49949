//! Widget configuration injected by the host page.
//!
//! The host integration attaches `data-*` attributes to the widget's script
//! tag. [`Config::from_attributes`] turns those string pairs into an immutable
//! [`Config`]; bad values fall back to defaults with a warning rather than
//! failing the widget.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Default seconds between probes.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u32 = 300;
/// Shortest cadence the widget accepts.
pub const MIN_POLL_INTERVAL_SECONDS: u32 = 30;
/// Banner copy used when the host supplies none.
pub const DEFAULT_BANNER_TEXT: &str = "Amber Alert actief! (Klik om te openen)";

/// Problems found while parsing a single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid number for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),
}

/// Console verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Maximum `log` level that should reach the console.
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Silent => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(ConfigError::UnknownLogLevel(other.to_owned())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Silent => "silent",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Immutable per-page-load configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Master switch; a disabled widget touches nothing.
    pub enabled: bool,
    /// Probe the test poster host instead of the live one.
    pub test_mode: bool,
    /// Hide the "TEST" badge while in test mode.
    pub hide_test_badge: bool,
    /// Minimum seconds between probes.
    pub poll_interval_seconds: u32,
    /// Omit the footer credit under the poster.
    pub suppress_footer: bool,
    /// Re-collapse the popup on the next page load.
    pub auto_close_on_load: bool,
    /// Render the poster without a link.
    pub suppress_link: bool,
    /// Only run for visitors that look Dutch.
    pub netherlands_only: bool,
    /// Copy shown in the slim banner.
    pub banner_text: String,
    /// Console verbosity.
    pub log_level: LogLevel,
    /// Serve posters from this base instead of the Dutch hosts. May be
    /// relative to the host page.
    pub poster_base: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            test_mode: false,
            hide_test_badge: false,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            suppress_footer: false,
            auto_close_on_load: false,
            suppress_link: false,
            netherlands_only: false,
            banner_text: DEFAULT_BANNER_TEXT.to_owned(),
            log_level: LogLevel::default(),
            poster_base: None,
        }
    }
}

impl Config {
    /// Builds a configuration from attribute pairs.
    ///
    /// Keys match case-insensitively, with or without a `data-` prefix.
    /// Unknown keys are ignored; invalid values keep the default.
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Config::default();
        for (key, value) in attributes {
            let key = key.as_ref().trim().to_ascii_lowercase();
            let key = key.strip_prefix("data-").unwrap_or(&key);
            if let Err(err) = config.apply(key, value.as_ref()) {
                log::warn!("AmberLoader: ignoring attribute: {err}");
            }
        }
        config
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "enabled" => self.enabled = parse_flag(value),
            "testmode" => self.test_mode = parse_flag(value),
            "hidetest" => self.hide_test_badge = parse_flag(value),
            "nofooter" => self.suppress_footer = parse_flag(value),
            "autoclose" => self.auto_close_on_load = parse_flag(value),
            "nohref" => self.suppress_link = parse_flag(value),
            "nlonly" => self.netherlands_only = parse_flag(value),
            "polldelay" => self.poll_interval_seconds = parse_interval(value)?,
            "loglevel" => self.log_level = value.parse()?,
            "bannertext" => {
                let text = value.trim();
                if !text.is_empty() {
                    self.banner_text = text.to_owned();
                }
            }
            "posterbase" => {
                let base = value.trim();
                self.poster_base = (!base.is_empty()).then(|| base.to_owned());
            }
            _ => {}
        }
        Ok(())
    }

    /// Whether the visual test badge should be rendered.
    pub fn show_test_badge(&self) -> bool {
        self.test_mode && !self.hide_test_badge
    }

    /// JSON rendering for diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Presence means true unless the value explicitly says otherwise.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

fn parse_interval(value: &str) -> Result<u32, ConfigError> {
    let seconds: u32 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key: "polldelay",
            value: value.to_owned(),
        })?;
    Ok(seconds.max(MIN_POLL_INTERVAL_SECONDS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_attributes_yield_defaults() {
        let config = Config::from_attributes(Vec::<(&str, &str)>::new());
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_interval_seconds, 300);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn host_injected_attributes_are_recognised() {
        let config = Config::from_attributes([
            ("data-polldelay", "120"),
            ("data-testmode", "true"),
            ("data-hidetest", "false"),
            ("data-nofooter", "true"),
            ("data-autoclose", "true"),
            ("data-nohref", "false"),
            ("data-nlonly", "true"),
            ("data-loglevel", "debug"),
            ("data-bannertext", "Let op!"),
            ("data-posterbase", " /poster/ "),
            ("src", "/amberloader.js"),
        ]);

        assert_eq!(
            config,
            Config {
                enabled: true,
                test_mode: true,
                hide_test_badge: false,
                poll_interval_seconds: 120,
                suppress_footer: true,
                auto_close_on_load: true,
                suppress_link: false,
                netherlands_only: true,
                banner_text: "Let op!".into(),
                log_level: LogLevel::Debug,
                poster_base: Some("/poster/".into()),
            }
        );
        assert!(config.show_test_badge());
    }

    #[test]
    fn bare_boolean_attributes_mean_true() {
        let config = Config::from_attributes([("testmode", ""), ("HideTest", "yes")]);
        assert!(config.test_mode);
        assert!(config.hide_test_badge);
        assert!(!config.show_test_badge());

        let config = Config::from_attributes([("enabled", "OFF")]);
        assert!(!config.enabled);
    }

    #[test]
    fn poll_interval_is_clamped_and_validated() {
        assert_eq!(
            Config::from_attributes([("polldelay", "5")]).poll_interval_seconds,
            MIN_POLL_INTERVAL_SECONDS
        );
        assert_eq!(
            Config::from_attributes([("polldelay", "-10")]).poll_interval_seconds,
            DEFAULT_POLL_INTERVAL_SECONDS
        );
        assert_eq!(
            Config::from_attributes([("polldelay", " 600 ")]).poll_interval_seconds,
            600
        );
    }

    #[test]
    fn unknown_log_level_and_blank_banner_keep_defaults() {
        let config = Config::from_attributes([("loglevel", "verbose"), ("bannertext", "   ")]);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.banner_text, DEFAULT_BANNER_TEXT);

        let config = Config::from_attributes([("posterbase", "  ")]);
        assert_eq!(config.poster_base, None);
    }

    #[test]
    fn log_levels_map_onto_filters() {
        assert_eq!(LogLevel::Silent.level_filter(), log::LevelFilter::Off);
        assert_eq!("Info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn json_rendering_uses_lowercase_levels() {
        let json = Config::default().to_json();
        assert!(json.contains("\"log_level\":\"warn\""));
        assert!(json.contains("\"poll_interval_seconds\":300"));
    }
}
