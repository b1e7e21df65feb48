use core::fmt;

use embedded_hal::digital::OutputPin;

/// The lock output could not be driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorError;

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock actuator did not respond")
    }
}

impl core::error::Error for ActuatorError {}

/// Write-only sink for the physical lock.
pub trait Actuator {
    /// Release the lock.
    fn engage(&mut self) -> Result<(), ActuatorError>;

    /// Return to the locked state.
    fn disengage(&mut self) -> Result<(), ActuatorError>;
}

/// Solenoid bolt driven from a GPIO; high means unlocked.
#[derive(Debug)]
pub struct SolenoidActuator<P> {
    pin: P,
    engaged: bool,
}

impl<P: OutputPin> SolenoidActuator<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            engaged: false,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Actuator for SolenoidActuator<P> {
    fn engage(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_high().map_err(|error| {
            log::error!("solenoid pin failed to go high: {error:?}");
            ActuatorError
        })?;
        self.engaged = true;
        Ok(())
    }

    fn disengage(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_low().map_err(|error| {
            log::error!("solenoid pin failed to go low: {error:?}");
            ActuatorError
        })?;
        self.engaged = false;
        Ok(())
    }
}
