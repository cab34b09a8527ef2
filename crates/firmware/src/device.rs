//! The device port: the native USB peripheral, through which this board appears to a computer as a MIDI device.

use defmt::*;
use embassy_stm32::{peripherals, usb};
use embassy_usb::{class::midi, driver::EndpointError};
use launchpad_bridge_lib::{bridge::MidiSink, packet::PACKET_LEN, stream::StreamEncoder};
use tinyvec::{ArrayVec, array_vec};

pub type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

/// Largest transfer the MIDI class endpoints are configured for.
pub const MAX_PACKET_SIZE: u16 = 64;

const TRANSFER_LEN: usize = MAX_PACKET_SIZE as usize;

/// Virtual cable the device port writes on.
const CABLE: u8 = 0;

/// What happened on the device port.
pub enum DeviceEvent {
    /// A computer configured the device.
    Connected,
    /// Bytes were read into the caller's buffer; they may hold several packets, or none.
    Received(usize),
    /// The computer went away.
    Disconnected,
}

/// Waits for the next thing to happen on the read half of the device port.
///
/// Until connected, the only thing worth waiting for is the connection itself.
pub async fn next_event(
    receiver: &mut midi::Receiver<'static, UsbDriver>,
    buf: &mut [u8],
    connected: bool,
) -> DeviceEvent {
    if !connected {
        receiver.wait_connection().await;
        return DeviceEvent::Connected;
    }
    match receiver.read_packet(buf).await {
        Ok(n) => DeviceEvent::Received(n),
        Err(EndpointError::Disabled) => DeviceEvent::Disconnected,
        Err(EndpointError::BufferOverflow) => {
            error!("Device port read overflowed the receive buffer, dropping it");
            DeviceEvent::Received(0)
        }
    }
}

/// Write half of the device port. Each transfer is sent as soon as it is full, so no explicit flush is needed.
pub struct DevicePort {
    sender: midi::Sender<'static, UsbDriver>,
    encoder: StreamEncoder,
}

impl DevicePort {
    pub fn new(sender: midi::Sender<'static, UsbDriver>) -> Self {
        Self {
            sender,
            encoder: StreamEncoder::new(CABLE),
        }
    }
}

impl MidiSink for DevicePort {
    async fn write_stream(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        // every byte becomes at most one packet, so a batch always fits in one transfer
        for batch in bytes.chunks(TRANSFER_LEN / PACKET_LEN) {
            let mut transfer: ArrayVec<[u8; TRANSFER_LEN]> = array_vec!();
            self.encoder
                .encode(batch, |packet| transfer.extend_from_slice(&packet));

            if !transfer.is_empty() {
                match self.sender.write_packet(&transfer).await {
                    Ok(()) => {}
                    Err(EndpointError::Disabled) => {
                        trace!("Device port is not connected");
                        break;
                    }
                    Err(EndpointError::BufferOverflow) => {
                        error!("Transfer of {} bytes exceeds the endpoint size", transfer.len());
                        break;
                    }
                }
            }
            written += batch.len();
        }
        written
    }
}
