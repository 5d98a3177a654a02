//! The Bluetooth power driver: attach, block requests, detach.

use core::convert::Infallible;
use core::fmt::{self, Debug, Display};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::line::{acquire_lines, LineAcquisitionError, LineProvider};
use crate::of::{self, OfDeviceId, OF_MATCH_TABLE};
use crate::platform::{Driver, PlatformDevice};
use crate::rfkill::{BlockState, RadioType, RegistryError, Rfkill, RfkillOps, RfkillRegistry};
use crate::sequencer::{PowerSequencer, Timings};

/// Driver name.
pub const DRIVER_NAME: &str = "myy-bt-gpio";
/// Name of the rfkill switch the driver creates.
pub const RFKILL_NAME: &str = "bt-gpio";

const ENODEV: i32 = 19;
const ENOSYS: i32 = 38;

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Name of the rfkill switch.
    pub rfkill_name: &'static str,
    /// Sequence delays.
    pub timings: Timings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rfkill_name: RFKILL_NAME,
            timings: Timings::default(),
        }
    }
}

/// Turns rfkill block requests into power sequences.
pub struct BtPowerOps<L, D> {
    sequencer: PowerSequencer<L, D>,
}

impl<L, D> BtPowerOps<L, D> {
    /// The sequencer driving the lines.
    pub fn sequencer(&mut self) -> &mut PowerSequencer<L, D> {
        &mut self.sequencer
    }
}

impl<L, D> RfkillOps for BtPowerOps<L, D>
where
    L: OutputPin,
    D: DelayNs,
{
    type Error = Infallible;

    fn set_block(&mut self, blocked: bool) -> Result<(), Infallible> {
        log::info!("Simple BT RFKILL : blocked = {blocked}");
        if blocked {
            self.sequencer.power_off();
            log::info!("Simple BT : radio powered off, RFKILL blocked");
        } else {
            self.sequencer.power_on();
            log::info!("Simple BT : radio powered on, RFKILL unblocked");
        }
        Ok(())
    }
}

/// Why attaching to a device failed.
pub enum ProbeError<LE, RE> {
    /// The device is not in [`OF_MATCH_TABLE`].
    NoMatch,
    /// At least one line is missing.
    Lines(LineAcquisitionError<LE>),
    /// The rfkill registry refused the switch.
    Registry(RE),
}

impl<LE, RE: RegistryError> ProbeError<LE, RE> {
    /// The negative errno reported for this failure.
    pub fn errno(&self) -> i32 {
        match self {
            Self::NoMatch => -ENODEV,
            Self::Lines(_) => -ENOSYS,
            Self::Registry(err) => err.errno(),
        }
    }
}

impl<LE: Debug, RE: Debug> Debug for ProbeError<LE, RE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => write!(f, "NoMatch"),
            Self::Lines(err) => write!(f, "Lines({err:?})"),
            Self::Registry(err) => write!(f, "Registry({err:?})"),
        }
    }
}

impl<LE, RE: Debug> Display for ProbeError<LE, RE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => f.write_str("device is not compatible with this driver"),
            Self::Lines(err) => Display::fmt(err, f),
            Self::Registry(err) => write!(f, "could not register the rfkill switch: {err:?}"),
        }
    }
}

impl<LE, RE> From<LineAcquisitionError<LE>> for ProbeError<LE, RE> {
    fn from(err: LineAcquisitionError<LE>) -> Self {
        ProbeError::Lines(err)
    }
}

/// One attached radio.
///
/// Exists only once all three lines are owned and the rfkill switch is
/// registered, so block requests always find working lines.
pub struct BtGpioRfkill<L, D> {
    rfkill: Rfkill<BtPowerOps<L, D>>,
}

impl<L, D> BtGpioRfkill<L, D>
where
    L: OutputPin,
    D: DelayNs,
{
    /// Attaches to `dev`.
    ///
    /// Requests the power, reset and wakeup lines, all driven high, then
    /// registers the `bluetooth` rfkill switch. After a successful attach the
    /// lines are left high, which is neither the powered-on nor the powered-off
    /// state: the radio's state is undefined until the first block request.
    ///
    /// If the registry refuses the switch, the radio is powered off and the
    /// lines released before the error is returned.
    pub fn attach<Dev, Reg>(
        dev: &mut Dev,
        registry: &mut Reg,
        delay: D,
        config: Config,
    ) -> Result<Self, ProbeError<<Dev as LineProvider>::Error, Reg::Error>>
    where
        Dev: PlatformDevice<Line = L> + ?Sized,
        Reg: RfkillRegistry + ?Sized,
    {
        if of::match_device(OF_MATCH_TABLE, dev.compatible()).is_none() {
            log::debug!("{}: no compatible match", dev.name());
            return Err(ProbeError::NoMatch);
        }

        let lines = match acquire_lines(&mut *dev) {
            Ok(lines) => lines,
            Err(err) => {
                log::error!("{}: {err}", dev.name());
                return Err(err.into());
            }
        };
        log::debug!(
            "{}: lines acquired, radio state undefined until the first block request",
            dev.name()
        );

        let ops = BtPowerOps {
            sequencer: PowerSequencer::with_timings(lines, delay, config.timings),
        };
        match Rfkill::register(registry, config.rfkill_name, RadioType::Bluetooth, ops) {
            Ok(rfkill) => {
                log::info!(
                    "{}: rfkill switch {} ready",
                    dev.name(),
                    config.rfkill_name
                );
                Ok(Self { rfkill })
            }
            Err((mut ops, err)) => {
                log::error!(
                    "{}: could not register rfkill switch {}: {err:?}",
                    dev.name(),
                    config.rfkill_name
                );
                ops.sequencer.power_off();
                Err(ProbeError::Registry(err))
            }
        }
    }

    /// Applies a block request delivered by the registry.
    pub fn set_block(&mut self, blocked: bool) {
        match self.rfkill.set_block(blocked) {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// The last requested block state.
    pub fn block_state(&self) -> BlockState {
        self.rfkill.state()
    }

    /// The registered switch.
    pub fn rfkill(&self) -> &Rfkill<BtPowerOps<L, D>> {
        &self.rfkill
    }

    /// Logs the system shutdown. The lines are left as they are.
    pub fn shutdown(&mut self) {
        log::info!("Shutting down...");
    }

    /// Unregisters the switch, powers the radio off and releases the lines.
    pub fn detach<Reg>(self, registry: &mut Reg)
    where
        Reg: RfkillRegistry + ?Sized,
    {
        let mut ops = self.rfkill.unregister(registry);
        ops.sequencer.power_off();
        log::debug!("{DRIVER_NAME}: detached");
    }
}

impl<Dev, Reg, L, D> Driver<Dev, Reg> for BtGpioRfkill<L, D>
where
    Dev: PlatformDevice<Line = L> + ?Sized,
    Reg: RfkillRegistry + ?Sized,
    L: OutputPin,
    D: DelayNs,
{
    const NAME: &'static str = DRIVER_NAME;
    const OF_MATCH_TABLE: &'static [OfDeviceId] = OF_MATCH_TABLE;

    type Context = (D, Config);
    type Error = ProbeError<<Dev as LineProvider>::Error, Reg::Error>;

    fn probe(dev: &mut Dev, registry: &mut Reg, (delay, config): (D, Config)) -> Result<Self, Self::Error> {
        Self::attach(dev, registry, delay, config)
    }

    fn remove(self, registry: &mut Reg) {
        self.detach(registry)
    }

    fn shutdown(&mut self) {
        BtGpioRfkill::shutdown(self)
    }
}
