//! Classifies `Box<dyn Error>` from trait boundaries for the sampler.
//!
//! A timed-out echo is an expected non-detection; anything else is a line
//! fault worth a warning. Neither aborts a measurement cycle.

/// What went wrong on a sensor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwFault {
    /// No echo within the window; same meaning as a 0 reading.
    Timeout,
    /// GPIO or driver failure.
    Fault(String),
}

/// Map a trait-boundary error to an `HwFault`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn classify_hw_error(e: &(dyn std::error::Error + 'static)) -> HwFault {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<sonar_hardware::error::HwError>() {
            return match hw {
                sonar_hardware::error::HwError::EchoTimeout => HwFault::Timeout,
                other => HwFault::Fault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        HwFault::Timeout
    } else {
        HwFault::Fault(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_heuristic_detects_timeouts() {
        let e: Box<dyn std::error::Error + Send + Sync> = "pulse Timeout".into();
        assert_eq!(classify_hw_error(e.as_ref()), HwFault::Timeout);
        let e: Box<dyn std::error::Error + Send + Sync> = "pin busy".into();
        assert_eq!(classify_hw_error(e.as_ref()), HwFault::Fault("pin busy".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_downcast() {
        use sonar_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::EchoTimeout);
        assert_eq!(classify_hw_error(e.as_ref()), HwFault::Timeout);
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::Gpio("pin 18".into()));
        assert_eq!(
            classify_hw_error(e.as_ref()),
            HwFault::Fault("gpio error: pin 18".into())
        );
    }
}
