//! Two-threshold presence state machine.
//!
//! ```text
//!   Clear --(0 < d < near)--> Detected --(d > far)--> Clear
//! ```
//! Readings inside `[near, far]` hold whatever state is current, so an
//! object hovering at one threshold cannot make the alert chatter.

use crate::config::Thresholds;
use crate::units::Distance;

/// Presence flag carried from one cycle to the next. Starts clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceState {
    detected: bool,
}

impl PresenceState {
    pub fn new(detected: bool) -> Self {
        Self { detected }
    }

    #[inline]
    pub fn is_detected(&self) -> bool {
        self.detected
    }
}

/// Outcome of one detector update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    NoChange,
    EnterDetected,
    EnterClear,
}

impl Transition {
    /// Alert level to drive, if this transition changes it.
    #[inline]
    pub fn alert_level(self) -> Option<bool> {
        match self {
            Transition::NoChange => None,
            Transition::EnterDetected => Some(true),
            Transition::EnterClear => Some(false),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Transition::NoChange => "NoChange",
            Transition::EnterDetected => "EnterDetected",
            Transition::EnterClear => "EnterClear",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceDetector {
    thresholds: Thresholds,
}

impl PresenceDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Apply one reading. `state` only changes when a transition is returned.
    pub fn update(&self, distance: Distance, state: &mut PresenceState) -> Transition {
        let cm = distance.cm();
        if !state.detected && distance.has_echo() && cm < self.thresholds.near_cm() {
            state.detected = true;
            Transition::EnterDetected
        } else if state.detected && cm > self.thresholds.far_cm() {
            state.detected = false;
            Transition::EnterClear
        } else {
            Transition::NoChange
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(cm: f32) -> Distance {
        Distance::from_cm(cm)
    }

    #[rstest]
    #[case(false, 5.0, Transition::EnterDetected, true)]
    #[case(false, 0.5, Transition::EnterDetected, true)]
    #[case(false, 6.0, Transition::NoChange, false)]
    #[case(false, 7.0, Transition::NoChange, false)]
    #[case(false, 0.0, Transition::NoChange, false)]
    #[case(false, 50.0, Transition::NoChange, false)]
    #[case(true, 9.0, Transition::EnterClear, false)]
    #[case(true, 8.0, Transition::NoChange, true)]
    #[case(true, 7.0, Transition::NoChange, true)]
    #[case(true, 2.0, Transition::NoChange, true)]
    #[case(true, 0.0, Transition::NoChange, true)]
    fn transition_table(
        #[case] detected: bool,
        #[case] cm: f32,
        #[case] expected: Transition,
        #[case] after: bool,
    ) {
        let det = PresenceDetector::default();
        let mut state = PresenceState::new(detected);
        assert_eq!(det.update(d(cm), &mut state), expected);
        assert_eq!(state.is_detected(), after);
    }

    #[test]
    fn alert_levels_follow_transitions() {
        assert_eq!(Transition::EnterDetected.alert_level(), Some(true));
        assert_eq!(Transition::EnterClear.alert_level(), Some(false));
        assert_eq!(Transition::NoChange.alert_level(), None);
    }
}
