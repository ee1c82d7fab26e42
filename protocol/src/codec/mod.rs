//! # Canonical Codec
//!
//! The byte layout every node re-derives before checking a signature.
//!
//! - integers are unsigned LEB128 varints, low 7-bit group first
//! - byte strings and UTF-8 strings are a varint length followed by the bytes
//! - composite records are concatenations in a fixed, per-record order
//!
//! Encoding is infallible: anything that could be malformed has already
//! been rejected when the owning value was constructed.

pub mod packer;
pub mod varint;

pub use packer::Packer;
pub use varint::{encode_varint, read_varint, write_varint};
