//! Power-on and power-off pulse sequences.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::line::{LineName, Lines};

/// How long reset is held high during power-on before it is released.
pub const POWER_ON_RESET_PULSE_MS: u32 = 20;
/// How long reset is held high before the supply is cut during power-off.
pub const POWER_OFF_RESET_HOLD_MS: u32 = 10;

/// Delays used by the two sequences, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Reset pulse width while powering on.
    pub power_on_reset_pulse_ms: u32,
    /// Reset hold time before cutting power.
    pub power_off_reset_hold_ms: u32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            power_on_reset_pulse_ms: POWER_ON_RESET_PULSE_MS,
            power_off_reset_hold_ms: POWER_OFF_RESET_HOLD_MS,
        }
    }
}

/// Drives the power and reset lines of one radio.
///
/// Both sequences block the caller for their whole duration, so they must not
/// run where sleeping or busy-waiting is forbidden. Neither is guarded against
/// being repeated: calling `power_on` on a powered chip replays the pulse.
pub struct PowerSequencer<L, D> {
    lines: Lines<L>,
    delay: D,
    timings: Timings,
}

impl<L, D> PowerSequencer<L, D>
where
    L: OutputPin,
    D: DelayNs,
{
    /// Creates a sequencer with the default timings.
    pub fn new(lines: Lines<L>, delay: D) -> Self {
        Self::with_timings(lines, delay, Timings::default())
    }

    /// Creates a sequencer with custom timings.
    pub fn with_timings(lines: Lines<L>, delay: D, timings: Timings) -> Self {
        Self {
            lines,
            delay,
            timings,
        }
    }

    /// Powers the chip up and pulses reset.
    ///
    /// reset low, power high, reset high, wait, reset low.
    pub fn power_on(&mut self) {
        log::debug!("bt power on");
        self.drive(LineName::Reset, PinState::Low);
        self.drive(LineName::Power, PinState::High);
        self.drive(LineName::Reset, PinState::High);
        self.delay.delay_ms(self.timings.power_on_reset_pulse_ms);
        self.drive(LineName::Reset, PinState::Low);
    }

    /// Holds the chip in reset and cuts its supply.
    ///
    /// reset high, wait, power low, reset low.
    pub fn power_off(&mut self) {
        log::debug!("bt power off");
        self.drive(LineName::Reset, PinState::High);
        self.delay.delay_ms(self.timings.power_off_reset_hold_ms);
        self.drive(LineName::Power, PinState::Low);
        self.drive(LineName::Reset, PinState::Low);
    }

    /// The timings in use.
    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Gives back the lines and the delay source.
    pub fn release(self) -> (Lines<L>, D) {
        (self.lines, self.delay)
    }

    // A failed write is logged and the sequence carries on.
    fn drive(&mut self, name: LineName, state: PinState) {
        log::trace!("{name} -> {state:?}");
        if let Err(err) = self.lines.get_mut(name).set_state(state) {
            log::warn!("Error driving the {name} line {state:?}: {err:?}");
        }
    }
}
