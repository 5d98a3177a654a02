#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

//! Drives a Bluetooth module's power, reset and wakeup pins from an ESP32-S3,
//! toggling the rfkill block state every few seconds so the sequences can be
//! watched on a logic analyser.

use core::convert::Infallible;

use bt_gpio_rfkill::driver::{BtGpioRfkill, Config};
use bt_gpio_rfkill::line::{LineName, LineProvider};
use bt_gpio_rfkill::platform::PlatformDevice;
use bt_gpio_rfkill::rfkill::{RadioType, RfkillId, RfkillRegistry};
use embassy_executor::Spawner;
use embassy_time::{Delay, Duration, Timer};
use embedded_hal::digital::PinState;
use esp_hal::{
    clock::CpuClock,
    gpio::{Level, Output, OutputConfig},
    timer::systimer::SystemTimer,
};
use esp_println::println;
use log::{error, info, warn};

// Block requests issued before the radio is detached again.
const TOGGLES: usize = 6;

// The module's node reuses the video codec's compatible.
const BOARD_COMPATIBLE: &[&str] = &["rockchip,vpu_service"];

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

/// Why a board line could not be handed out.
#[derive(Debug)]
enum BoardLineError {
    /// Nothing is wired under that name.
    Unknown,
    /// The line was already handed out.
    Taken(LineName),
}

/// The module's lines as wired on the board.
struct BoardLines<'a> {
    power: Option<Output<'a>>,
    reset: Option<Output<'a>>,
    wakeup: Option<Output<'a>>,
}

impl<'a> LineProvider for BoardLines<'a> {
    type Line = Output<'a>;
    type Error = BoardLineError;

    fn request(&mut self, con_id: &str, initial: PinState) -> Result<Output<'a>, BoardLineError> {
        let name = LineName::from_con_id(con_id).ok_or(BoardLineError::Unknown)?;
        let slot = match name {
            LineName::Power => &mut self.power,
            LineName::Reset => &mut self.reset,
            LineName::Wakeup => &mut self.wakeup,
        };
        let mut line = slot.take().ok_or(BoardLineError::Taken(name))?;
        line.set_level(match initial {
            PinState::High => Level::High,
            PinState::Low => Level::Low,
        });
        Ok(line)
    }
}

impl PlatformDevice for BoardLines<'_> {
    fn name(&self) -> &str {
        "bluetooth"
    }

    fn compatible(&self) -> &[&'static str] {
        BOARD_COMPATIBLE
    }
}

/// Registry that only reports the switches it is asked to create.
struct ConsoleRegistry {
    next_id: u32,
}

impl RfkillRegistry for ConsoleRegistry {
    type Error = Infallible;

    fn register(&mut self, name: &'static str, radio: RadioType) -> Result<RfkillId, Infallible> {
        let id = RfkillId(self.next_id);
        self.next_id += 1;
        info!("rfkill{}: {name} ({radio})", id.0);
        Ok(id)
    }

    fn unregister(&mut self, id: RfkillId) {
        info!("rfkill{} removed", id.0);
    }
}

/// The main entry point of the application.
#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) {
    // Init logging
    esp_println::logger::init_logger(log::LevelFilter::Trace);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    info!("Peripherals initialized");

    let mut board = BoardLines {
        power: Some(Output::new(peripherals.GPIO10, Level::Low, OutputConfig::default())),
        reset: Some(Output::new(peripherals.GPIO11, Level::Low, OutputConfig::default())),
        wakeup: Some(Output::new(peripherals.GPIO12, Level::Low, OutputConfig::default())),
    };
    let mut registry = ConsoleRegistry { next_id: 0 };

    let mut bt = match BtGpioRfkill::attach(&mut board, &mut registry, Delay, Config::default()) {
        Ok(bt) => bt,
        Err(err) => {
            error!("Bluetooth probe failed ({}): {err}", err.errno());
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut blocked = true;
    for _ in 0..TOGGLES {
        blocked = !blocked;
        bt.set_block(blocked);
        Timer::after(Duration::from_secs(2)).await;
    }

    bt.shutdown();
    bt.detach(&mut registry);
    warn!("Bluetooth detached. Entering idle loop.");

    loop {
        Timer::after(Duration::from_secs(1)).await;
    }
}
