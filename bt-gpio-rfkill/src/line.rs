//! Named output lines and their acquisition.

use core::fmt::{self, Debug, Display};

use embedded_hal::digital::{OutputPin, PinState};
use heapless::String;

/// Connection id of the line that switches the chip's supply.
pub const POWER_CON_ID: &str = "bluetooth-power";
/// Connection id of the chip's reset line.
pub const RESET_CON_ID: &str = "bluetooth-reset";
/// Connection id of the host-to-chip wakeup line.
pub const WAKEUP_CON_ID: &str = "bluetooth-wakeup";

// In the device tree, `bluetooth-power` is the `bluetooth-power-gpios` property.
const PROPERTY_SUFFIX: &str = "-gpios";

/// State every line is driven to when it is requested.
pub const INITIAL_STATE: PinState = PinState::High;

/// One of the three lines the driver owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineName {
    /// Supply switch.
    Power,
    /// Chip reset.
    Reset,
    /// Host wakeup.
    Wakeup,
}

impl LineName {
    /// All lines, in the order they are requested.
    pub const ALL: [LineName; 3] = [LineName::Power, LineName::Reset, LineName::Wakeup];

    /// The name the line is looked up by.
    pub const fn con_id(self) -> &'static str {
        match self {
            LineName::Power => POWER_CON_ID,
            LineName::Reset => RESET_CON_ID,
            LineName::Wakeup => WAKEUP_CON_ID,
        }
    }

    /// Maps a connection id back to the line it names.
    pub fn from_con_id(con_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.con_id() == con_id)
    }

    /// The device-tree property holding the line, e.g. `bluetooth-reset-gpios`.
    pub fn property(self) -> String<32> {
        let mut property = String::new();
        // Longest result is 22 bytes.
        let _ = property.push_str(self.con_id());
        let _ = property.push_str(PROPERTY_SUFFIX);
        property
    }

    const fn label(self) -> &'static str {
        match self {
            LineName::Power => "Power GPIO  ",
            LineName::Reset => "Reset GPIO  ",
            LineName::Wakeup => "Wake up GPIO",
        }
    }
}

impl Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineName::Power => "power",
            LineName::Reset => "reset",
            LineName::Wakeup => "wakeup",
        })
    }
}

/// Resolves named lines to output pins.
///
/// A returned line stays owned by the caller until it is dropped, which gives
/// it back to the provider. There is no separate release call.
pub trait LineProvider {
    /// An acquired output line.
    type Line: OutputPin;
    /// Why a line could not be acquired.
    type Error: Debug;

    /// Requests the line `con_id` as an output driven to `initial`.
    fn request(&mut self, con_id: &str, initial: PinState) -> Result<Self::Line, Self::Error>;
}

impl<T: LineProvider + ?Sized> LineProvider for &mut T {
    type Line = T::Line;
    type Error = T::Error;

    fn request(&mut self, con_id: &str, initial: PinState) -> Result<Self::Line, Self::Error> {
        T::request(self, con_id, initial)
    }
}

/// The three lines of one radio.
pub struct Lines<L> {
    /// Supply switch.
    pub power: L,
    /// Chip reset.
    pub reset: L,
    /// Host wakeup. Owned, but not driven by either sequence.
    pub wakeup: L,
}

impl<L> Lines<L> {
    /// Returns the line called `name`.
    pub fn get_mut(&mut self, name: LineName) -> &mut L {
        match name {
            LineName::Power => &mut self.power,
            LineName::Reset => &mut self.reset,
            LineName::Wakeup => &mut self.wakeup,
        }
    }
}

/// One or more lines could not be acquired.
///
/// Holds the provider's error for every line that failed. The lines that were
/// acquired have already been released by the time this error is seen.
pub struct LineAcquisitionError<E> {
    power: Option<E>,
    reset: Option<E>,
    wakeup: Option<E>,
}

impl<E> LineAcquisitionError<E> {
    /// The provider error for `name`, if that line failed.
    pub fn error(&self, name: LineName) -> Option<&E> {
        match name {
            LineName::Power => self.power.as_ref(),
            LineName::Reset => self.reset.as_ref(),
            LineName::Wakeup => self.wakeup.as_ref(),
        }
    }

    /// Whether `name` failed.
    pub fn is_failed(&self, name: LineName) -> bool {
        self.error(name).is_some()
    }

    /// The lines that failed, in request order.
    pub fn failed(&self) -> impl Iterator<Item = LineName> + '_ {
        LineName::ALL
            .into_iter()
            .filter(move |name| self.is_failed(*name))
    }
}

impl<E: Debug> Debug for LineAcquisitionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineAcquisitionError")
            .field("power", &self.power)
            .field("reset", &self.reset)
            .field("wakeup", &self.wakeup)
            .finish()
    }
}

impl<E> Display for LineAcquisitionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("An error occured while trying to find the right GPIO.")?;
        for name in LineName::ALL {
            write!(
                f,
                "\n  {} [{}] - Problem when parsing ? {}",
                name.label(),
                name.property(),
                self.is_failed(name)
            )?;
        }
        Ok(())
    }
}

/// Requests the power, reset and wakeup lines, all driven high.
///
/// Every line is requested even after one fails, so the error names all the
/// missing lines at once. On failure the lines that were obtained are dropped,
/// and so released, before this returns.
pub fn acquire_lines<P>(
    provider: &mut P,
) -> Result<Lines<P::Line>, LineAcquisitionError<P::Error>>
where
    P: LineProvider + ?Sized,
{
    let power = request(provider, LineName::Power);
    let reset = request(provider, LineName::Reset);
    let wakeup = request(provider, LineName::Wakeup);

    match (power, reset, wakeup) {
        (Ok(power), Ok(reset), Ok(wakeup)) => Ok(Lines {
            power,
            reset,
            wakeup,
        }),
        (power, reset, wakeup) => Err(LineAcquisitionError {
            power: power.err(),
            reset: reset.err(),
            wakeup: wakeup.err(),
        }),
    }
}

fn request<P>(provider: &mut P, name: LineName) -> Result<P::Line, P::Error>
where
    P: LineProvider + ?Sized,
{
    log::trace!("requesting {} as {:?}", name.con_id(), INITIAL_STATE);
    provider
        .request(name.con_id(), INITIAL_STATE)
        .inspect_err(|err| log::debug!("{} unavailable: {err:?}", name.con_id()))
}
