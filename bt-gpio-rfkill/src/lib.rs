//! A `no_std` driver that power-sequences a Bluetooth radio chip through three
//! GPIO lines and exposes the radio as an rfkill switch.
//!
//! The chip itself is spoken to elsewhere (HCI over UART, handled by the
//! Bluetooth stack). This crate only makes sure the chip is woken up and put to
//! sleep correctly: it owns the `power`, `reset` and `wakeup` lines, drives the
//! power-on and power-off pulse sequences, and translates rfkill block requests
//! into those sequences.
//!
//! The environment plugs in through a few small traits:
//!
//! * [`line::LineProvider`] resolves the named lines (`bluetooth-power`, ...) to
//!   `embedded-hal` output pins.
//! * [`rfkill::RfkillRegistry`] publishes the switch to user space.
//! * [`platform::PlatformDevice`] describes the device being attached.
//!
//! # Usage
//!
//! ```no_run
//! # fn wire<Dev, Reg, D>(dev: &mut Dev, registry: &mut Reg, delay: D)
//! # where
//! #     Dev: bt_gpio_rfkill::platform::PlatformDevice,
//! #     Reg: bt_gpio_rfkill::rfkill::RfkillRegistry,
//! #     D: embedded_hal::delay::DelayNs,
//! # {
//! use bt_gpio_rfkill::driver::{BtGpioRfkill, Config};
//!
//! let mut bt = match BtGpioRfkill::attach(dev, registry, delay, Config::default()) {
//!     Ok(bt) => bt,
//!     Err(err) => {
//!         log::error!("Bluetooth probe failed: {err}");
//!         return;
//!     }
//! };
//!
//! // User space unblocked the radio.
//! bt.set_block(false);
//!
//! // Unbinding the device powers the chip off and releases the lines.
//! bt.detach(registry);
//! # }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod driver;
pub mod line;
pub mod of;
pub mod platform;
pub mod rfkill;
pub mod sequencer;

#[cfg(test)]
mod mock;
