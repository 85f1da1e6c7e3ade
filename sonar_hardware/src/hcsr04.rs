//! HC-SR04 style ultrasonic sensor and alert output on Raspberry Pi GPIO.
use rppal::gpio::{Gpio, InputPin, OutputPin};
use sonar_traits::{DigitalOut, PulseIn};
use std::time::Duration;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::{duration_to_us, measure_high_pulse};

pub struct HardwareTrigger {
    pin: OutputPin,
}

pub struct HardwareEcho {
    pin: InputPin,
}

pub struct HardwareAlert {
    pin: OutputPin,
}

/// Claim the three BCM pins; trigger and alert start low.
pub fn open(
    trigger_pin: u8,
    echo_pin: u8,
    alert_pin: u8,
) -> Result<(HardwareTrigger, HardwareEcho, HardwareAlert)> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
    let claim = |pin: u8| {
        gpio.get(pin)
            .map_err(|e| HwError::Gpio(format!("claim pin {pin}: {e}")))
    };
    let trigger = claim(trigger_pin)?.into_output_low();
    let echo = claim(echo_pin)?.into_input();
    let alert = claim(alert_pin)?.into_output_low();
    Ok((
        HardwareTrigger { pin: trigger },
        HardwareEcho { pin: echo },
        HardwareAlert { pin: alert },
    ))
}

impl DigitalOut for HardwareTrigger {
    fn set_high(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_high();
        Ok(())
    }
    fn set_low(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_low();
        Ok(())
    }
}

impl DigitalOut for HardwareAlert {
    fn set_high(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_high();
        Ok(())
    }
    fn set_low(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_low();
        Ok(())
    }
}

impl PulseIn for HardwareEcho {
    fn pulse_in(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        match measure_high_pulse(|| self.pin.is_high(), timeout) {
            Ok(width) => {
                let us = duration_to_us(width);
                trace!(echo_us = us, "echo pulse");
                Ok(us)
            }
            Err(HwError::EchoTimeout) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
