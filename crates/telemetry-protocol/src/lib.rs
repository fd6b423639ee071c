//! EA F1 25 UDP telemetry protocol.
//!
//! Decodes raw datagrams into typed [`Packet`] values. The crate performs no
//! I/O and no logging; capture and replay live in `f1-telemetry-capture`.
//!
//! Decoding is three steps:
//!
//! 1. [`PacketHeader::decode`] reads the fixed 29-byte header.
//! 2. [`PacketRegistry::lookup`] selects a decoder by
//!    `(packet_format, packet_version, packet_id)`.
//! 3. The decoder checks the datagram length and decodes the payload.
//!
//! ```
//! use f1_telemetry_protocol::{PacketKind, PacketRegistry, fixtures};
//!
//! let registry = PacketRegistry::f1_25();
//! let raw = fixtures::f1_25_packet(PacketKind::CarTelemetry).unwrap();
//! let packet = registry.decode(&raw).unwrap();
//! assert_eq!(packet.kind(), PacketKind::CarTelemetry);
//! ```

#![deny(static_mut_refs)]

pub mod error;
pub mod fixtures;
pub mod header;
pub mod packet;
pub mod packets;
pub mod reader;
pub mod registry;

pub use error::DecodeError;
pub use header::{HEADER_SIZE, NUM_CARS, PACKET_FORMAT_2025, PacketHeader};
pub use packet::{Packet, PacketKind};
pub use registry::{DecodeFn, PACKET_VERSION_1, PacketDecoder, PacketRegistry, RegistryKey};
