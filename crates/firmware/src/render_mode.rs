//! Tasks and types related to selecting the [`RenderMode`].

use embassy_stm32::{exti::ExtiInput, gpio::Output};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    watch::{Receiver, Sender, Watch},
};
use launchpad_bridge_lib::configuration::{CycleConfig, RenderMode};

const RENDER_MODE_RECEIVER_CNT: usize = 2;
/// Syncs render mode config across tasks.
pub static RENDER_MODE_SYNC: Watch<CriticalSectionRawMutex, RenderMode, RENDER_MODE_RECEIVER_CNT> =
    Watch::new_with(RenderMode::DiscreteCell);
pub type RenderModeSender<'a> =
    Sender<'a, CriticalSectionRawMutex, RenderMode, RENDER_MODE_RECEIVER_CNT>;
pub type RenderModeReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, RenderMode, RENDER_MODE_RECEIVER_CNT>;

/// Handles button presses, cycling through the [`RenderMode`]s.
#[embassy_executor::task]
pub async fn select_render_mode(
    mut button: ExtiInput<'static>,
    render_mode: RenderModeSender<'static>,
) -> ! {
    loop {
        button.wait_for_rising_edge().await;

        let new_state = render_mode
            .try_get()
            .expect("Render mode state should never be uninitialized")
            .cycle();
        render_mode.send(new_state);
    }
}

/// Status indicator for the [`RenderMode`]: the LED is lit while the viewport is selected.
#[embassy_executor::task]
pub async fn display_render_mode(
    mut led: Output<'static>,
    mut render_mode: RenderModeReceiver<'static>,
) -> ! {
    loop {
        match render_mode.changed().await {
            RenderMode::DiscreteCell => {
                led.set_low();
            }
            RenderMode::ViewportOffset => {
                led.set_high();
            }
        }
    }
}
