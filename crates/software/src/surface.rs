//! The control surface as a whole: cursor, host-port bookkeeping, and both transports.
//!
//! A [`Surface`] is owned by a single task. Events from the host port's context reach it as [`HostEvent`]s (e.g. over
//! a channel), so every piece of shared state has exactly one writer.

use crate::{
    bridge::{DeviceIndex, HostDevice, MidiHost, MidiSink},
    configuration::{Palette, RenderMode},
    control,
    cursor::Cursor,
    packet::{self, DecodedEvent, Packet},
    render::{self, StatusIndicator},
};

/// Notifications from the USB host stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    /// A peripheral with a MIDI interface was enumerated.
    Mounted(DeviceIndex),
    /// A peripheral was removed.
    Unmounted(DeviceIndex),
    /// A packet arrived from a peripheral.
    Received(DeviceIndex, Packet),
}

/// Bridges a grid controller across the device port and the host port, repainting it whenever the cursor moves.
pub struct Surface<D, H, L> {
    cursor: Cursor,
    palette: Palette,
    /// Only the most recently connected peripheral is addressed. Without hub support there is only ever one anyway.
    active_device: Option<DeviceIndex>,
    device: D,
    host: H,
    heartbeat: L,
}

impl<D, H, L> Surface<D, H, L>
where
    D: MidiSink,
    H: MidiHost,
    L: StatusIndicator,
{
    /// Constructs a [`Surface`] with the cursor at the starting position for `mode` and no peripheral on the host port.
    pub fn new(mode: RenderMode, palette: Palette, device: D, host: H, heartbeat: L) -> Self {
        Self {
            cursor: Cursor::new(mode),
            palette,
            active_device: None,
            device,
            host,
            heartbeat,
        }
    }

    /// Current cursor position.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Peripheral currently addressed on the host port, if any.
    pub fn active_device(&self) -> Option<DeviceIndex> {
        self.active_device
    }

    /// Handles the bytes of one device port read, which may hold several packets.
    pub async fn receive(&mut self, data: &[u8]) {
        for event in packet::decode_all(data) {
            self.process(&event).await;
        }
    }

    /// Handles a notification from the host port.
    pub async fn host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Mounted(index) => {
                info!("MIDI peripheral mounted on host port at index {}", index);
                self.active_device = Some(index);
                self.render().await;
            }
            HostEvent::Unmounted(index) => {
                info!("MIDI peripheral unmounted from host port at index {}", index);
                if self.active_device == Some(index) {
                    self.active_device = None;
                }
            }
            HostEvent::Received(index, packet) => {
                self.active_device = Some(index);
                self.process(&DecodedEvent::decode(&packet)).await;
            }
        }
    }

    /// Repaints everything once the device port comes up.
    pub async fn device_connected(&mut self) {
        info!("Device port connected");
        self.render().await;
    }

    /// Switches rendering mode, moving the cursor to the new mode's starting position.
    pub async fn set_mode(&mut self, mode: RenderMode) {
        if mode == self.cursor.mode() {
            return;
        }
        info!("Switching to {}", mode);
        self.cursor = Cursor::new(mode);
        self.render().await;
    }

    /// Interprets one event, repainting straight away if the cursor moved. Returns whether it did.
    pub async fn process(&mut self, event: &DecodedEvent) -> bool {
        let dirty = control::interpret(&mut self.cursor, event);
        if dirty {
            self.render().await;
        }
        dirty
    }

    /// Paints the current cursor on the device port and, if a peripheral is mounted, the host port.
    pub async fn render(&mut self) {
        let mut host = self
            .active_device
            .map(|index| HostDevice::new(&mut self.host, index));
        render::render(
            &self.cursor,
            &self.palette,
            &mut self.device,
            host.as_mut(),
            &mut self.heartbeat,
        )
        .await;
    }
}
