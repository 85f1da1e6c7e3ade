#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and echo trace parsing for the presence detector.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; an empty file yields the stock wiring.
//! - The echo trace CSV loader enforces its header and feeds the simulator
//!   with recorded raw echo lengths.
use serde::Deserialize;

/// BCM pin assignments.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Pins {
    pub trigger: u8,
    pub echo: u8,
    pub alert: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            trigger: 5,
            echo: 18,
            alert: 17,
        }
    }
}

/// Divisor used when averaging the sub-samples of one cycle.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Averaging {
    /// Always divide by the sub-sample count (matches deployed field calibration)
    #[default]
    Fixed,
    /// Divide by the number of sub-samples that returned an echo
    Valid,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Sampler {
    pub averaging: Averaging,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Object distance per cycle in centimeters; 0.0 means no echo.
    pub distances_cm: Vec<f32>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            distances_cm: vec![20.0],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub sampler: Sampler,
    pub logging: Logging,
    /// Scene replayed by the simulated sensor backend
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Header of the echo trace CSV.
pub const ECHO_TRACE_HEADER: &str = "echo_us";

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct EchoTraceRow {
    pub echo_us: u32,
}

/// Load a recorded echo trace.
///
/// Expected layout:
/// echo_us
/// 294
/// 0
/// 301
pub fn load_echo_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<u32>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open echo trace CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != [ECHO_TRACE_HEADER] {
        eyre::bail!(
            "echo trace CSV must have header '{ECHO_TRACE_HEADER}', got: {}",
            actual.join(",")
        );
    }

    let mut echoes = Vec::new();
    for (idx, rec) in rdr.deserialize::<EchoTraceRow>().enumerate() {
        match rec {
            Ok(row) => echoes.push(row.echo_us),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }
    if echoes.is_empty() {
        eyre::bail!("echo trace CSV {:?} has no rows", path);
    }
    Ok(echoes)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let Pins {
            trigger,
            echo,
            alert,
        } = self.pins;
        if trigger == echo || trigger == alert || echo == alert {
            eyre::bail!(
                "pins must be distinct (trigger={trigger}, echo={echo}, alert={alert})"
            );
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !is_level_filter(level)
        {
            eyre::bail!(
                "logging.level must be a level (error|warn|info|debug|trace|off) or target=level list, got '{level}'"
            );
        }
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rotation}'");
        }

        // Simulation
        if self.simulation.distances_cm.is_empty() {
            eyre::bail!("simulation.distances_cm must not be empty");
        }
        if let Some(bad) = self
            .simulation
            .distances_cm
            .iter()
            .find(|d| !d.is_finite() || d.is_sign_negative())
        {
            eyre::bail!("simulation.distances_cm must be finite and >= 0, got {bad}");
        }

        Ok(())
    }
}

const LEVELS: [&str; 6] = ["error", "warn", "info", "debug", "trace", "off"];

/// Accepts `info` or a comma list such as `warn,sonar_core=debug`.
fn is_level_filter(s: &str) -> bool {
    let is_level = |l: &str| LEVELS.contains(&l.trim().to_ascii_lowercase().as_str());
    let is_target = |t: &str| {
        !t.is_empty()
            && t.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '-')
    };
    !s.trim().is_empty()
        && s.split(',').all(|d| match d.trim().split_once('=') {
            Some((target, level)) => is_target(target.trim()) && is_level(level),
            None => is_level(d),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_stock_wiring() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.pins, Pins::default());
        assert_eq!(cfg.sampler.averaging, Averaging::Fixed);
        assert_eq!(cfg.simulation.distances_cm, vec![20.0]);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_pins_keep_defaults() {
        let cfg = load_toml("[pins]\nalert = 27\n").unwrap();
        assert_eq!(cfg.pins.trigger, 5);
        assert_eq!(cfg.pins.echo, 18);
        assert_eq!(cfg.pins.alert, 27);
    }

    #[test]
    fn level_filters() {
        assert!(is_level_filter("info"));
        assert!(is_level_filter("WARN"));
        assert!(is_level_filter("warn,sonar_core=debug"));
        assert!(!is_level_filter(""));
        assert!(!is_level_filter("verbose"));
        assert!(!is_level_filter("info,[="));
        assert!(!is_level_filter("=debug"));
    }
}
