//! Platform devices and the driver lifecycle.

use crate::line::LineProvider;
use crate::of::OfDeviceId;
use crate::rfkill::RfkillRegistry;

/// A device the platform offers to drivers.
///
/// The device resolves its own named lines, hence the [`LineProvider`]
/// supertrait.
pub trait PlatformDevice: LineProvider {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// The node's `compatible` strings, most specific first.
    fn compatible(&self) -> &[&'static str];
}

/// A driver bound to platform devices through a match table.
pub trait Driver<Dev, Reg>: Sized
where
    Dev: PlatformDevice + ?Sized,
    Reg: RfkillRegistry + ?Sized,
{
    /// Driver name.
    const NAME: &'static str;
    /// Compatibles the driver binds to.
    const OF_MATCH_TABLE: &'static [OfDeviceId];

    /// Whatever else `probe` needs besides the device and the registry.
    type Context;
    /// Why `probe` failed.
    type Error;

    /// Binds to `dev`.
    fn probe(dev: &mut Dev, registry: &mut Reg, context: Self::Context) -> Result<Self, Self::Error>;

    /// Unbinds, releasing everything `probe` acquired.
    fn remove(self, registry: &mut Reg);

    /// Called when the system goes down while the driver is bound.
    fn shutdown(&mut self) {}
}
