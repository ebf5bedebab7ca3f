//! SDR_DEV Main Application
//!
//! Entry point for the STM32F401-based test-signal device.
//! USB and the audio stream run on a high-priority interrupt executor; the
//! console and status LED run in thread mode and may be preempted by it.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::info;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::Driver;
use embassy_stm32::{bind_interrupts, peripherals, usb};
use embassy_time::Timer;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::Builder;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use sdr_dev_firmware::audio::scheduler::StreamScheduler;
use sdr_dev_firmware::console::session::ConsoleSession;
use sdr_dev_firmware::dsp::generator::SignalGenerator;
use sdr_dev_firmware::prelude::*;
use sdr_dev_firmware::usb::audio::{self as uac, AudioHandler};
use sdr_dev_firmware::usb::cdc::{cdc_rx_task, cdc_tx_task, CdcConsole};
use sdr_dev_firmware::usb::{device_config, usb_task, LINK};

// Bind interrupt handlers
bind_interrupts!(struct Irqs {
    OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
});

/// Generator mode shared by the console and the audio stream
static GENERATOR_MODE: SharedMode = SharedMode::new(GeneratorMode::Off);

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

static EP_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State<'static>> = StaticCell::new();
static AUDIO_HANDLER: StaticCell<AudioHandler> = StaticCell::new();

#[interrupt]
#[allow(non_snake_case)]
unsafe fn USART6() {
    EXECUTOR_HIGH.on_interrupt();
}

/// 25 MHz HSE -> 84 MHz SYSCLK, 48 MHz USB clock
fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::{
        AHBPrescaler, APBPrescaler, Hse, HseMode, Pll, PllMul, PllPDiv, PllPreDiv, PllQDiv,
        PllSource, Sysclk,
    };

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(25_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV25,
        mul: PllMul::MUL336,
        divp: Some(PllPDiv::DIV4),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config.rcc.sys = Sysclk::PLL1_P;
    config
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("SDR_DEV firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    // Status LED (PC13 on the F401 "Black Pill", active low)
    let led = Output::new(p.PC13, Level::High, Speed::Low);

    let mut usb_config = usb::Config::default();
    // No VBUS sense pin on this board
    usb_config.vbus_detection = false;
    let driver = Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        EP_OUT_BUFFER.init([0; 256]),
        usb_config,
    );

    let mut builder = Builder::new(
        driver,
        device_config(),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );

    // Interfaces 0/1: console, 2/3: microphone
    let cdc = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), USB_CDC_PACKET_SIZE);
    let (handler, iso_endpoint) = uac::build(&mut builder);
    builder.handler(AUDIO_HANDLER.init(handler));
    let device = builder.build();
    let (sender, receiver) = cdc.split();

    info!("USB composite device built");

    let scheduler = StreamScheduler::new(SignalGenerator::new(&GENERATOR_MODE));

    interrupt::USART6.set_priority(Priority::P6);
    let high = EXECUTOR_HIGH.start(interrupt::USART6);
    high.spawn(usb_task(device)).unwrap();
    high.spawn(uac::stream_task(iso_endpoint, scheduler)).unwrap();
    high.spawn(cdc_rx_task(receiver)).unwrap();
    high.spawn(cdc_tx_task(sender)).unwrap();

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(console_task()).unwrap();
        spawner.spawn(status_led_task(led)).unwrap();
        info!("Tasks spawned");
    })
}

/// Console task - polls the command console every millisecond
#[embassy_executor::task]
async fn console_task() {
    let mut transport = CdcConsole;
    let mut session = ConsoleSession::new(&GENERATOR_MODE);
    loop {
        session.poll(&mut transport);
        Timer::after(Duration::from_millis(1)).await;
    }
}

/// Status LED task - lit while mounted and idle, dark otherwise
#[embassy_executor::task]
async fn status_led_task(mut led: Output<'static>) {
    loop {
        if LINK.indicator() {
            led.set_low();
        } else {
            led.set_high();
        }
        LINK.wait_changed().await;
    }
}
