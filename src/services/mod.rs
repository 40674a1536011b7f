//! Shared services for byte-level image handling

mod codec;

pub use codec::ImageCodec;
