use core::convert::Infallible;

use crate::OutputPin;

/// Chip-enable line of the sensor.
///
/// `embedded-hal` has no notion of changing a pin's direction at runtime, so the
/// driver talks to the enable line through this trait. Implement it directly for
/// HALs whose pins can be switched between output and floating input, or wrap a
/// plain [`OutputPin`] in [`OutputEnable`].
pub trait EnableLine {
    type Error;

    /// Configure the line as an output and drive it high.
    fn assert_enable(&mut self) -> Result<(), Self::Error>;

    /// Stop driving the line.
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Placeholder for boards where the enable pin is tied high.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEnable;

impl EnableLine for NoEnable {
    type Error = Infallible;

    fn assert_enable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Enable line backed by a push-pull [`OutputPin`].
///
/// `release` drives the pin low. It does not float the line, so the
/// floating-input teardown is not reproduced; the sensor is held in hardware
/// standby instead. Implement [`EnableLine`] directly on a pin that can switch
/// to an input when the line must be floated.
pub struct OutputEnable<P> {
    pin: P,
}

impl<P: OutputPin> OutputEnable<P> {
    pub fn new(pin: P) -> Self {
        OutputEnable { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> EnableLine for OutputEnable<P> {
    type Error = P::Error;

    #[inline]
    fn assert_enable(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }

    #[inline]
    fn release(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }
}
