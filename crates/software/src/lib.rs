//! This crate contains architecture-agnostic logic for the Launchpad Bridge, a device which sits between a computer
//! and a grid-style MIDI controller (a Novation Launchpad Pro in programmer layout). It appears to the computer as a
//! MIDI peripheral on one port while acting as USB host to the controller on another, keeps a cursor in sync with the
//! controller's arrow buttons, and repaints the grid on both ports whenever the cursor moves.
//!
//! Data flows through the modules in this order:
//!
//! 1. [`packet`] decodes 4-byte USB-MIDI Event Packets
//! 2. [`control`] turns arrow presses into [`cursor`] moves
//! 3. [`render`] works out the [`sysex`] commands that paint the cursor
//! 4. [`bridge`] fragments them and writes them to both ports
//!
//! [`surface`] ties these together, and [`stream`] packs outgoing bytes back into USB-MIDI Event Packets for
//! transports that need it.

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod fmt;

pub mod bridge;
pub mod configuration;
pub mod control;
pub mod cursor;
pub mod packet;
pub mod render;
pub mod stream;
pub mod surface;
pub mod sysex;
