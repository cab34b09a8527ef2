//! Fan-out of outbound messages to both transports.
//!
//! The packet primitive underneath each transport only carries a few payload bytes per call, so a sysex is sent as
//! a series of three-byte chunks. Each chunk is a synthetic leading byte followed by up to two bytes of the
//! original message, starting after its opening `F0h`:
//!
//! ```text
//! F0 00 20 29 02 10 0E 00 F7   original
//! F0 00 20                     first chunk, led by F0h
//!          F7 29 02            every later chunk, led by F7h
//!                   F7 10 0E
//!                            F7 00 F7
//! ```
//!
//! This is the framing the controller expects; it is not a general-purpose sysex chunking scheme.

use crate::sysex::{SYSEX_END, SYSEX_START};
use tinyvec::{ArrayVec, array_vec};

/// Identifies a MIDI peripheral attached to the host port.
pub type DeviceIndex = u8;

/// Original bytes carried per chunk.
const CHUNK_PAYLOAD: usize = 2;

/// One fragment of a sysex: a leading byte plus one or two original bytes.
pub type Chunk = ArrayVec<[u8; CHUNK_PAYLOAD + 1]>;

/// The write half of a packet-oriented MIDI transport.
#[allow(async_fn_in_trait)]
pub trait MidiSink {
    /// Writes raw MIDI bytes, returning how many were actually accepted.
    async fn write_stream(&mut self, bytes: &[u8]) -> usize;

    /// Pushes out anything the transport is holding back. Transports which flush on their own need not override this.
    async fn flush(&mut self) {}
}

/// The write half of the host port, which may address any mounted peripheral.
#[allow(async_fn_in_trait)]
pub trait MidiHost {
    /// Writes raw MIDI bytes to the given peripheral, returning how many were actually accepted.
    async fn write_stream(&mut self, device: DeviceIndex, bytes: &[u8]) -> usize;

    /// Sends everything queued for the given peripheral. Host transmissions are not flushed automatically.
    async fn flush(&mut self, device: DeviceIndex);
}

/// A [`MidiSink`] addressing one peripheral on the host port.
pub struct HostDevice<'a, H> {
    host: &'a mut H,
    device: DeviceIndex,
}

impl<'a, H: MidiHost> HostDevice<'a, H> {
    /// Targets `device` on `host`.
    pub fn new(host: &'a mut H, device: DeviceIndex) -> Self {
        Self { host, device }
    }
}

impl<H: MidiHost> MidiSink for HostDevice<'_, H> {
    async fn write_stream(&mut self, bytes: &[u8]) -> usize {
        self.host.write_stream(self.device, bytes).await
    }

    async fn flush(&mut self) {
        self.host.flush(self.device).await
    }
}

/// How a message is put on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum Framing<'a> {
    /// Short messages (and anything not starting with `F0h`) are written as they are, in a single call.
    Verbatim(&'a [u8]),
    /// Sysex messages are written chunk by chunk.
    Chunked(Chunks<'a>),
}

impl<'a> Framing<'a> {
    /// Decides how `message` must be framed.
    pub fn of(message: &'a [u8]) -> Self {
        match message {
            [SYSEX_START, rest @ ..] if message.len() > CHUNK_PAYLOAD + 1 => {
                Self::Chunked(Chunks { rest, first: true })
            }
            _ => Self::Verbatim(message),
        }
    }
}

/// Iterator over the chunks of a sysex. See the [module documentation](self).
#[derive(Clone, Debug, PartialEq)]
pub struct Chunks<'a> {
    rest: &'a [u8],
    first: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.rest.is_empty() {
            return None;
        }
        let (payload, rest) = self.rest.split_at(self.rest.len().min(CHUNK_PAYLOAD));
        self.rest = rest;

        let lead = if self.first { SYSEX_START } else { SYSEX_END };
        self.first = false;

        let mut chunk: Chunk = array_vec!([u8; CHUNK_PAYLOAD + 1] => lead);
        chunk.extend_from_slice(payload);
        Some(chunk)
    }
}

/// Sends `message` identically to the device port and, when a peripheral is mounted, the host port.
///
/// The host port is flushed after every write. Short writes are logged and otherwise ignored; the next render pass
/// repaints everything anyway.
pub async fn bridge<D: MidiSink, H: MidiSink>(
    message: &[u8],
    device: &mut D,
    mut host: Option<&mut H>,
) {
    match Framing::of(message) {
        Framing::Verbatim(bytes) => send(bytes, device, host.as_deref_mut()).await,
        Framing::Chunked(chunks) => {
            for chunk in chunks {
                send(&chunk, device, host.as_deref_mut()).await;
            }
        }
    }
}

async fn send<D: MidiSink, H: MidiSink>(bytes: &[u8], device: &mut D, host: Option<&mut H>) {
    let written = device.write_stream(bytes).await;
    if written != bytes.len() {
        warn!("Device port accepted {} of {} bytes", written, bytes.len());
    }

    if let Some(host) = host {
        let written = host.write_stream(bytes).await;
        if written != bytes.len() {
            warn!("Host port accepted {} of {} bytes", written, bytes.len());
        }
        host.flush().await;
    }
}
