//! # xsens_mt
//!
//! Pure-rust decoder and command builder for the Xsens MT binary protocol as
//! spoken by MTi/MTi-G attitude and heading reference units.
//!
//! Constructing Frames
//! ===================
//!
//! Constructing outbound configuration frames happens using the `Builder`
//! variant of the message, for example:
//! ```
//! use xsens_mt::{OutputMode, SetOutputModeBuilder};
//!
//! let frame: [u8; 7] = SetOutputModeBuilder {
//!     mode: OutputMode::ORIENTATION | OutputMode::POSITION,
//! }
//! .into_frame_bytes();
//! ```
//! See the documentation for the individual `Builder` structs for information
//! on the fields.
//!
//! Decoding
//! ========
//!
//! Decoding happens by instantiating a [`Session`] with a [`UtmProjector`]
//! implementation and feeding it transport bytes. The session assembles and
//! checksums frames, and when a frame completes it is decoded synchronously
//! into the session's [`NavigationState`](navigation::NavigationState):
//! ```
//! use xsens_mt::{Session, UtmProjector};
//!
//! struct FlatEarth;
//! impl UtmProjector for FlatEarth {
//!     fn utm_of(&self, lat_rad: f64, lon_rad: f64, _zone: u8) -> (f64, f64) {
//!         (lon_rad * 6.371e6, lat_rad * 6.371e6)
//!     }
//! }
//!
//! let mut session = Session::new(FlatEarth);
//! let my_raw_data = [0xfau8, 0xff, 0x30, 0x00, 0xd1]; // From your serial port
//! let frames = session.consume(&my_raw_data);
//! assert_eq!(frames, 1);
//! ```
//! A malformed frame is discarded and the assembler resyncs on the next
//! preamble byte; [`Session::discarded_frames`] counts the drops. For
//! per-frame diagnostics, drive an [`Assembler`] directly through
//! [`Assembler::advance`] and inspect the [`FrameEvent`]s.
//!
//! no_std Support
//! ==============
//!
//! This library supports no_std environments out of the box: the assembler's
//! payload buffer is a fixed inline array sized for the protocol's maximum
//! frame, and no decode path allocates.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", feature = "alloc"))]
extern crate alloc;
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::{
    constants::{frame_len, MAX_PAYLOAD_LEN, MT_BUS_ID, MT_PREAMBLE},
    error::{DateTimeError, ParserError},
    geodetic::{utm_zone, UtmProjector},
    mt_packets::*,
    parser::{Assembler, Frame, FrameEvent},
    session::Session,
};

pub mod constants;
mod error;
pub mod geodetic;
mod mt_packets;
pub mod navigation;
mod parser;
mod session;
