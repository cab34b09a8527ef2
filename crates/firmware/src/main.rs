//! Launchpad Bridge is [Embassy](https://embassy.dev)-based firmware which sits between a computer and a grid-style MIDI
//! controller (a Novation Launchpad Pro). The firmware runs on the [Nucleo-F767ZI development
//! board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html), which is powered by an F7-series STM32
//! microcontroller.
//!
//! The board appears to the computer as a MIDI device on its native USB port and acts as USB host to the controller
//! on a second port. Pressing the controller's arrow buttons moves a highlighted cursor; every move repaints the grid
//! on both ports at once. The user button switches between a wrapping single-cell crosshair and a scrolling two-by-two
//! viewport.
//!
//! The green user LED (PB0) flips after every repaint; the blue one (PB7) is lit while the viewport is selected.

#![no_std]
#![no_main]

mod device;
mod host;
mod render_mode;

use crate::{
    device::{DeviceEvent, DevicePort, MAX_PACKET_SIZE, UsbDriver},
    host::{HOST_EVENTS, HostPort},
    render_mode::{RENDER_MODE_SYNC, RenderModeReceiver, display_render_mode, select_render_mode},
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{Either3, select3};
use embassy_stm32::{
    Config, bind_interrupts,
    exti::ExtiInput,
    gpio::{Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usb,
};
use embassy_usb::{Builder, UsbDevice, class::midi::{self, MidiClass}};
use launchpad_bridge_lib::{
    configuration::{Palette, RenderMode},
    render::StatusIndicator,
    surface::Surface,
};
use static_cell::StaticCell;

use defmt_rtt as _;
#[cfg(not(feature = "debug"))]
use panic_halt as _;
#[cfg(feature = "debug")]
use panic_probe as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

type BridgeSurface = Surface<DevicePort, HostPort, Heartbeat>;

/// LED which flips once per render pass, giving a visible heartbeat.
struct Heartbeat(Output<'static>);

impl StatusIndicator for Heartbeat {
    fn toggle(&mut self) {
        self.0.toggle();
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing Launchpad Bridge");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410, the 48MHz clock used for USB OTG FS is derived from main PLL VCO (PLLQ clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    let button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(select_render_mode(button, RENDER_MODE_SYNC.sender())));

    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    let render_mode = RENDER_MODE_SYNC
        .receiver()
        .expect("Render mode synchronizer should have a receiver available");
    unwrap!(spawner.spawn(display_render_mode(blue_led, render_mode)));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // Per section 6.10 of the Nucleo board manual (UM1974), CN13 (the USB port) cannot power the board, so the board
    // is self-powered and must detect VBUS to comply with the USB spec.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics;
    // 0x0001 is its test PID
    let vendor_id = 0x1209;
    let product_id = 0x0001;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("Launchpad Bridge");
    config.self_powered = true;
    config.max_power = 0;

    // Create embassy-usb DeviceBuilder using the driver and config.
    // It needs some buffers for building the descriptors.
    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    // one jack in each direction
    let class = MidiClass::new(&mut builder, 1, 1, MAX_PACKET_SIZE);
    let usb = builder.build();

    unwrap!(spawner.spawn(usb_task(usb)));

    let (sender, receiver) = class.split();
    let heartbeat = Heartbeat(Output::new(p.PB0, Level::Low, Speed::Low));
    let surface = Surface::new(
        RenderMode::default(),
        Palette::default(),
        DevicePort::new(sender),
        HostPort::new(),
        heartbeat,
    );
    let render_mode = RENDER_MODE_SYNC
        .receiver()
        .expect("Render mode synchronizer should have a receiver available");
    unwrap!(spawner.spawn(bridge_task(surface, receiver, render_mode)));
}

#[embassy_executor::task]
async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Task which owns the [`Surface`]: every input, from either port or the user button, is handled here in arrival
/// order, and every repaint is issued from here.
#[embassy_executor::task]
async fn bridge_task(
    mut surface: BridgeSurface,
    mut receiver: midi::Receiver<'static, UsbDriver>,
    mut render_mode: RenderModeReceiver<'static>,
) -> ! {
    let mut buf = [0; MAX_PACKET_SIZE as usize];
    let mut connected = false;
    loop {
        let event = select3(
            device::next_event(&mut receiver, &mut buf, connected),
            HOST_EVENTS.receive(),
            render_mode.changed(),
        )
        .await;

        match event {
            Either3::First(DeviceEvent::Connected) => {
                connected = true;
                surface.device_connected().await;
            }
            Either3::First(DeviceEvent::Received(n)) => surface.receive(&buf[..n]).await,
            Either3::First(DeviceEvent::Disconnected) => {
                info!("Device port disconnected");
                connected = false;
            }
            Either3::Second(host_event) => surface.host_event(host_event).await,
            Either3::Third(mode) => surface.set_mode(mode).await,
        }
    }
}
