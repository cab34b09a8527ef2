//! The host port: where this board acts as USB host to the grid controller.
//!
//! This crate contains no USB host stack. Enumeration and the USB host protocol belong to an external stack running
//! in its own context, and these two channels are the whole of its integration point with the bridge:
//!
//! - the host stack publishes mount, unmount and receive notifications on [`HOST_EVENTS`]
//! - the host stack drains [`HOST_OUTBOX`], writing packets to the addressed peripheral and flushing on request
//!
//! Until such a stack is linked in, nothing is ever mounted: [`HOST_EVENTS`] stays silent, the bridge never addresses
//! a peripheral, and so [`HOST_OUTBOX`] stays empty.
//!
//! The bridge task is the only consumer of [`HOST_EVENTS`], which makes it the single writer of the cursor and of the
//! active peripheral index.

use defmt::*;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use launchpad_bridge_lib::{
    bridge::{DeviceIndex, MidiHost},
    packet::Packet,
    stream::StreamEncoder,
    surface::HostEvent,
};

const HOST_EVENTS_LEN: usize = 16;
/// A render pass queues roughly 400 requests (packets plus flushes).
const HOST_OUTBOX_LEN: usize = 512;

/// Virtual cable used when writing to the peripheral.
const CABLE: u8 = 1;

/// Notifications from the host stack to the bridge.
pub static HOST_EVENTS: Channel<CriticalSectionRawMutex, HostEvent, HOST_EVENTS_LEN> =
    Channel::new();

/// Requests from the bridge to the host stack.
pub static HOST_OUTBOX: Channel<CriticalSectionRawMutex, HostRequest, HOST_OUTBOX_LEN> =
    Channel::new();

/// Something the host stack must do on behalf of the bridge.
#[derive(Clone, Copy, Format)]
pub enum HostRequest {
    /// Queue a USB-MIDI Event Packet for the peripheral.
    Write(DeviceIndex, Packet),
    /// Send everything queued for the peripheral. Host transmissions are never flushed
    /// automatically.
    Flush(DeviceIndex),
}

/// Write half of the host port.
pub struct HostPort {
    encoder: StreamEncoder,
    /// Peripheral the encoder state belongs to.
    device: Option<DeviceIndex>,
}

impl HostPort {
    pub fn new() -> Self {
        Self {
            encoder: StreamEncoder::new(CABLE),
            device: None,
        }
    }
}

impl MidiHost for HostPort {
    async fn write_stream(&mut self, device: DeviceIndex, bytes: &[u8]) -> usize {
        if self.device != Some(device) {
            // a half-sent message to another peripheral means nothing to this one
            self.encoder = StreamEncoder::new(CABLE);
            self.device = Some(device);
        }

        let mut dropped = 0;
        self.encoder.encode(bytes, |packet| {
            if HOST_OUTBOX.try_send(HostRequest::Write(device, packet)).is_err() {
                dropped += 1;
            }
        });

        if dropped > 0 {
            warn!("Host outbox full, dropped {} packets", dropped);
            0
        } else {
            bytes.len()
        }
    }

    async fn flush(&mut self, device: DeviceIndex) {
        if HOST_OUTBOX.try_send(HostRequest::Flush(device)).is_err() {
            warn!("Host outbox full, could not flush peripheral {}", device);
        }
    }
}
