//! Human-readable error descriptions, exit codes and structured JSON errors.

use crate::monitor::CheckError;
use sonar_core::BuildError;
use sonar_hardware::error::HwError;

/// Context prefix attached to every config load/validate failure.
pub const CONFIG_CONTEXT: &str = "invalid configuration";

/// Broad class of a failure; drives the exit code and the JSON `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Config,
    Hardware,
    NoEcho,
    Other,
}

impl ErrorClass {
    pub fn name(self) -> &'static str {
        match self {
            ErrorClass::Config => "Config",
            ErrorClass::Hardware => "Hardware",
            ErrorClass::NoEcho => "NoEcho",
            ErrorClass::Other => "Error",
        }
    }
}

pub fn classify(err: &eyre::Report) -> ErrorClass {
    if err.downcast_ref::<CheckError>().is_some() {
        return ErrorClass::NoEcho;
    }
    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::EmptyTrace => ErrorClass::Config,
            _ => ErrorClass::Hardware,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() || err.downcast_ref::<toml::de::Error>().is_some()
    {
        return ErrorClass::Config;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains(CONFIG_CONTEXT) || lower.contains("echo trace csv") {
        return ErrorClass::Config;
    }
    ErrorClass::Other
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(CheckError::NoEcho { samples }) = err.downcast_ref::<CheckError>() {
        return format!(
            "What happened: No echo came back from any of the {samples} pings.\nLikely causes: Nothing within ~5 m of the sensor, sensor unpowered, or trigger/echo pins swapped.\nHow to fix: Hold an object 20-50 cm in front of the sensor, check 5V/GND, and verify [pins] trigger/echo in the config."
        );
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::EmptyTrace => "What happened: The sensor simulation has nothing to replay.\nLikely causes: An empty echo trace or an empty [simulation] distances_cm list.\nHow to fix: Provide at least one row or distance.".to_string(),
            HwError::Gpio(_) | HwError::EchoTimeout => format!(
                "What happened: Sensor hardware failed ({hw}).\nLikely causes: Wrong pin numbers, pins already claimed by another process, no permission to access /dev/gpiomem, or the sensor is unpowered.\nHow to fix: Fix [pins] in the config, check 5V/GND wiring, and run as a user in the gpio group."
            ),
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: The detector could not be assembled ({be}).\nLikely causes: Invalid sampler or loop settings.\nHow to fix: Check the [sampler] section of the config."
        );
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    let root = err.root_cause().to_string();

    if lower.contains("echo trace csv") || root.to_ascii_lowercase().contains("echo trace csv") {
        if root.contains("must have header") {
            return "Invalid headers in echo trace CSV. Expected 'echo_us'.".to_string();
        }
        return format!(
            "What happened: The echo trace could not be loaded ({root}).\nHow to fix: Provide a CSV with an 'echo_us' header and one non-negative integer per row."
        );
    }

    if lower.contains(CONFIG_CONTEXT) {
        let target = msg
            .strip_prefix(CONFIG_CONTEXT)
            .and_then(|rest| rest.strip_prefix(" in "))
            .unwrap_or("the config file");
        return format!(
            "What happened: The configuration is invalid ({root}).\nLikely causes: A typo in the TOML, duplicate pin numbers, an out-of-range value, or a log file path that cannot be created.\nHow to fix: Edit {target}, then rerun."
        );
    }

    let cause = err
        .source()
        .map(|src| format!(" Cause: {src}"))
        .unwrap_or_default();
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Error: {msg}"
    )
}

/// Stable exit codes. 2 is left to clap for usage errors.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match classify(err) {
        ErrorClass::Config => 3,
        ErrorClass::Hardware => 4,
        ErrorClass::NoEcho => 5,
        ErrorClass::Other => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": classify(err).name(), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn no_echo_maps_to_its_own_code() {
        let err: eyre::Report = Err::<(), _>(CheckError::NoEcho { samples: 5 })
            .wrap_err("self-check failed")
            .unwrap_err();
        assert_eq!(classify(&err), ErrorClass::NoEcho);
        assert_eq!(exit_code_for_error(&err), 5);
        assert!(humanize(&err).contains("5 pings"));
    }

    #[test]
    fn gpio_failure_is_hardware_class() {
        let err: eyre::Report = Err::<(), _>(HwError::Gpio("claim pin 18: busy".into()))
            .wrap_err("open sensor pins")
            .unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).contains("Sensor hardware failed (gpio error: claim pin 18: busy)"));
    }

    #[test]
    fn config_context_is_recognised() {
        let err = eyre::eyre!("pins must be distinct (trigger=5, echo=5, alert=17)")
            .wrap_err(format!("{CONFIG_CONTEXT} in etc/sonar.toml"));
        assert_eq!(exit_code_for_error(&err), 3);
        let text = humanize(&err);
        assert!(text.contains("pins must be distinct"));
        assert!(text.contains("Edit etc/sonar.toml"));
    }

    #[test]
    fn log_file_failure_is_config_class() {
        let err = eyre::eyre!("failed to create log directory")
            .wrap_err(format!("{CONFIG_CONTEXT}: cannot open log file /nope/sonar.log"));
        assert_eq!(exit_code_for_error(&err), 3);
        let text = humanize(&err);
        assert!(text.contains("failed to create log directory"));
        assert!(text.contains("Edit the config file"));
    }

    #[test]
    fn json_error_has_reason_and_message() {
        let err = eyre::eyre!("boom");
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Error");
        assert!(v["message"].as_str().unwrap().contains("boom"));
    }
}
