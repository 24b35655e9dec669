//! Session configuration.
//!
//! Two host-wide switches decide how eagerly rules are applied:
//!
//! - `NATVIEW_DISPLAY_STRINGS`: `always` (default), `visualized` or `never`
//! - `NATVIEW_EXPANSION`: `on-demand` (default) or `immediate`
//!
//! ```rust
//! use natview_core::config::{DisplayStringMode, ExpansionMode, SessionConfig};
//!
//! let config = SessionConfig {
//!     display_strings: DisplayStringMode::Always,
//!     expansion: "immediate".parse().unwrap(),
//! };
//! assert_eq!(config.expansion, ExpansionMode::Immediate);
//! ```

use std::env;
use std::str::FromStr;

/// When display-string rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStringMode
{
    /// Format every value that has a matching rule.
    #[default]
    Always,
    /// Format only values already flagged as visualized.
    VisualizedOnly,
    /// Never format; always show native text.
    Never,
}

impl FromStr for DisplayStringMode
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "always" | "on" => Ok(Self::Always),
            "visualized" | "visualized-only" => Ok(Self::VisualizedOnly),
            "never" | "off" => Ok(Self::Never),
            _ => Err(format!(
                "Unknown display string mode: {s}. Use 'always', 'visualized', or 'never'"
            )),
        }
    }
}

/// How expansion treats values that are not flagged visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionMode
{
    /// Offer a "[Visualizer View]" child next to the native children.
    #[default]
    OnDemand,
    /// Expand straight through the visualizer.
    Immediate,
}

impl FromStr for ExpansionMode
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "on-demand" | "ondemand" | "lazy" => Ok(Self::OnDemand),
            "immediate" | "eager" => Ok(Self::Immediate),
            _ => Err(format!("Unknown expansion mode: {s}. Use 'on-demand' or 'immediate'")),
        }
    }
}

/// Per-session switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig
{
    pub display_strings: DisplayStringMode,
    pub expansion: ExpansionMode,
}

impl SessionConfig
{
    /// Read the configuration from the environment.
    ///
    /// Missing or unrecognized values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self
    {
        let display_strings = env::var("NATVIEW_DISPLAY_STRINGS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let expansion = env::var("NATVIEW_EXPANSION")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self {
            display_strings,
            expansion,
        }
    }
}
