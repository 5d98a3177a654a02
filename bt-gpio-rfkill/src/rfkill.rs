//! rfkill switches: block-state dispatch and the registry they are published in.

use core::convert::Infallible;
use core::fmt::{self, Debug, Display};

/// Radio classes known to rfkill, numbered as in `<linux/rfkill.h>`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioType {
    /// Every radio on the system.
    All = 0,
    /// Wireless LAN.
    Wlan = 1,
    /// Bluetooth.
    Bluetooth = 2,
    /// Ultra-wideband.
    Uwb = 3,
    /// WiMAX.
    Wimax = 4,
    /// Wireless WAN.
    Wwan = 5,
    /// GPS receiver.
    Gps = 6,
    /// FM radio.
    Fm = 7,
    /// NFC.
    Nfc = 8,
}

impl RadioType {
    /// The name rfkill reports in the switch's `type` attribute.
    pub const fn as_str(self) -> &'static str {
        match self {
            RadioType::All => "all",
            RadioType::Wlan => "wlan",
            RadioType::Bluetooth => "bluetooth",
            RadioType::Uwb => "ultrawideband",
            RadioType::Wimax => "wimax",
            RadioType::Wwan => "wwan",
            RadioType::Gps => "gps",
            RadioType::Fm => "fm",
            RadioType::Nfc => "nfc",
        }
    }
}

impl Display for RadioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a radio is allowed to transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Soft-blocked: the radio must be off.
    Blocked,
    /// The radio may be on.
    Unblocked,
}

impl BlockState {
    /// `true` for [`BlockState::Blocked`].
    pub fn is_blocked(self) -> bool {
        self == BlockState::Blocked
    }
}

impl From<bool> for BlockState {
    fn from(blocked: bool) -> Self {
        if blocked {
            BlockState::Blocked
        } else {
            BlockState::Unblocked
        }
    }
}

/// Handle the registry assigns to a registered switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfkillId(pub u32);

/// A registry failure, reported as a negative errno.
pub trait RegistryError: Debug {
    /// The errno to hand back to whoever attached the device.
    fn errno(&self) -> i32;
}

impl RegistryError for Infallible {
    fn errno(&self) -> i32 {
        match *self {}
    }
}

/// Publishes switches to user space.
///
/// The registry serialises block requests per switch; implementations deliver
/// them through [`Rfkill::set_block`], which takes `&mut self`.
pub trait RfkillRegistry {
    /// Why registration failed.
    type Error: RegistryError;

    /// Creates the user-visible switch `name` of class `radio`.
    fn register(&mut self, name: &'static str, radio: RadioType) -> Result<RfkillId, Self::Error>;

    /// Removes a switch created by [`RfkillRegistry::register`].
    fn unregister(&mut self, id: RfkillId);
}

impl<T: RfkillRegistry + ?Sized> RfkillRegistry for &mut T {
    type Error = T::Error;

    fn register(&mut self, name: &'static str, radio: RadioType) -> Result<RfkillId, Self::Error> {
        T::register(self, name, radio)
    }

    fn unregister(&mut self, id: RfkillId) {
        T::unregister(self, id)
    }
}

/// Applies block requests to the hardware.
pub trait RfkillOps {
    /// Why the hardware could not follow a request.
    type Error: Debug;

    /// Blocks (`true`) or unblocks (`false`) the radio.
    fn set_block(&mut self, blocked: bool) -> Result<(), Self::Error>;
}

/// A registered switch, bound to the [`RfkillOps`] that implement it.
pub struct Rfkill<O> {
    id: RfkillId,
    name: &'static str,
    radio: RadioType,
    state: BlockState,
    ops: O,
}

impl<O: RfkillOps> Rfkill<O> {
    /// Registers `ops` as the switch `name`.
    ///
    /// The switch starts out [`BlockState::Blocked`]. If the registry refuses,
    /// `ops` comes back with the error so the caller can still use it.
    pub fn register<R>(
        registry: &mut R,
        name: &'static str,
        radio: RadioType,
        ops: O,
    ) -> Result<Self, (O, R::Error)>
    where
        R: RfkillRegistry + ?Sized,
    {
        match registry.register(name, radio) {
            Ok(id) => {
                log::debug!("rfkill {name} ({radio}) registered as {id:?}");
                Ok(Self {
                    id,
                    name,
                    radio,
                    state: BlockState::Blocked,
                    ops,
                })
            }
            Err(err) => Err((ops, err)),
        }
    }

    /// Delivers a block request.
    ///
    /// Every request reaches the ops, including one that repeats the current
    /// state. The recorded state only changes when the ops succeed.
    pub fn set_block(&mut self, blocked: bool) -> Result<(), O::Error> {
        log::trace!("rfkill {}: set_block({blocked})", self.name);
        self.ops.set_block(blocked).inspect_err(|err| {
            log::warn!("rfkill {}: set_block({blocked}) failed: {err:?}", self.name)
        })?;
        self.state = BlockState::from(blocked);
        Ok(())
    }

    /// The last state the ops applied.
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// The registry's handle for this switch.
    pub fn id(&self) -> RfkillId {
        self.id
    }

    /// The switch name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The radio class.
    pub fn radio(&self) -> RadioType {
        self.radio
    }

    /// Removes the switch from `registry` and hands back the ops.
    pub fn unregister<R>(self, registry: &mut R) -> O
    where
        R: RfkillRegistry + ?Sized,
    {
        registry.unregister(self.id);
        log::debug!("rfkill {} unregistered", self.name);
        self.ops
    }
}
