//! Recording stand-ins for the lines, the delay source and the rfkill registry.
//!
//! Everything writes into one shared [`Events`] log, so a test can assert the
//! exact interleaving of pin writes, waits, releases and registrations.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::line::{LineName, LineProvider};
use crate::platform::PlatformDevice;
use crate::rfkill::{RadioType, RegistryError, RfkillId, RfkillRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Request(LineName, PinState),
    Set(LineName, PinState),
    DelayNs(u64),
    Release(LineName),
    Register(&'static str, RadioType),
    Unregister(RfkillId),
}

/// A wait of `ms` milliseconds, as recorded by [`MockDelay`].
pub fn delay_ms(ms: u64) -> Event {
    Event::DelayNs(ms * 1_000_000)
}

#[derive(Clone, Default)]
pub struct Events(Rc<RefCell<Vec<Event>>>);

impl Events {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Drains everything recorded so far.
    pub fn take(&self) -> Vec<Event> {
        self.0.borrow_mut().drain(..).collect()
    }
}

pub struct MockLine {
    name: LineName,
    events: Events,
}

impl ErrorType for MockLine {
    type Error = Infallible;
}

impl OutputPin for MockLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::Set(self.name, PinState::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.events.push(Event::Set(self.name, PinState::High));
        Ok(())
    }
}

impl Drop for MockLine {
    fn drop(&mut self) {
        self.events.push(Event::Release(self.name));
    }
}

pub struct MockDelay {
    events: Events,
}

impl MockDelay {
    pub fn new(events: &Events) -> Self {
        Self {
            events: events.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.events.push(Event::DelayNs(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(Event::DelayNs(u64::from(us) * 1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(delay_ms(ms.into()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unavailable(pub LineName);

/// Hands out [`MockLine`]s; lines marked with [`MockProvider::failing`] are refused.
pub struct MockProvider {
    events: Events,
    failing: Vec<LineName>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            events: Events::default(),
            failing: Vec::new(),
        }
    }

    pub fn failing(mut self, name: LineName) -> Self {
        self.failing.push(name);
        self
    }

    pub fn events(&self) -> Events {
        self.events.clone()
    }

    /// A line for a sequencer test, bypassing `request`.
    pub fn line(&self, name: LineName) -> MockLine {
        MockLine {
            name,
            events: self.events.clone(),
        }
    }
}

impl LineProvider for MockProvider {
    type Line = MockLine;
    type Error = Unavailable;

    fn request(&mut self, con_id: &str, initial: PinState) -> Result<MockLine, Unavailable> {
        let name = LineName::from_con_id(con_id).expect("driver asked for an unknown line");
        self.events.push(Event::Request(name, initial));
        if self.failing.contains(&name) {
            return Err(Unavailable(name));
        }
        Ok(self.line(name))
    }
}

/// A platform device backed by a [`MockProvider`].
pub struct MockDevice {
    pub provider: MockProvider,
    pub compatible: Vec<&'static str>,
}

impl MockDevice {
    pub fn new(provider: MockProvider) -> Self {
        Self {
            provider,
            compatible: std::vec!["rockchip,vpu_service"],
        }
    }
}

impl LineProvider for MockDevice {
    type Line = MockLine;
    type Error = Unavailable;

    fn request(&mut self, con_id: &str, initial: PinState) -> Result<MockLine, Unavailable> {
        self.provider.request(con_id, initial)
    }
}

impl PlatformDevice for MockDevice {
    fn name(&self) -> &str {
        "bluetooth"
    }

    fn compatible(&self) -> &[&'static str] {
        &self.compatible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryFull;

impl RegistryError for RegistryFull {
    fn errno(&self) -> i32 {
        -12
    }
}

pub struct MockRegistry {
    events: Events,
    refuse: bool,
    next_id: u32,
}

impl MockRegistry {
    pub fn new(events: &Events) -> Self {
        Self {
            events: events.clone(),
            refuse: false,
            next_id: 0,
        }
    }

    pub fn refusing(events: &Events) -> Self {
        Self {
            refuse: true,
            ..Self::new(events)
        }
    }
}

impl RfkillRegistry for MockRegistry {
    type Error = RegistryFull;

    fn register(&mut self, name: &'static str, radio: RadioType) -> Result<RfkillId, RegistryFull> {
        if self.refuse {
            return Err(RegistryFull);
        }
        self.events.push(Event::Register(name, radio));
        let id = RfkillId(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    fn unregister(&mut self, id: RfkillId) {
        self.events.push(Event::Unregister(id));
    }
}
