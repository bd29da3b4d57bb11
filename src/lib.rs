#![no_std]
#![deny(unsafe_code)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(not(any(feature = "std", feature = "alloc")))]
compile_error!("seedpack crate requires either std or alloc feature to be enabled");

pub use config::EncoderConfig;
pub use encoder::{Encoder, Steim1Encoder, Steim2Encoder};
pub use encoding::{DataEncoding, Layout, Steim, Steim1, Steim2};
pub use frame::{Frame, Record};
#[cfg(feature = "chrono")]
pub use sink::WallClock;
pub use sink::{RecordSink, SampleClock, SampleCounter, VecSink};

mod config;
mod encoder;
pub mod encoding;
pub mod frame;
mod sink;

const CRC32C: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI); // iSCSI CRC-32C

mod lib {
    #[cfg(all(feature = "alloc", not(feature = "std")))]
    pub use alloc::{boxed::Box, format, string::String, vec::Vec};
    #[cfg(all(feature = "alloc", not(feature = "std")))]
    pub use core::{fmt, mem};
    #[cfg(feature = "std")]
    pub use std::{boxed::Box, fmt, format, mem, string::String, vec::Vec};
}

/// A per-channel sample encoder whose scheme is chosen at runtime.
pub trait StreamEncode {
    fn encoding(&self) -> DataEncoding;

    /// Feeds one sample.
    fn send_data(&mut self, sample: i32);

    /// Packs everything pending and dispatches the open record.
    fn flush(&mut self);
}
