//! wiregen-transport - Wire message model and byte codecs
//!
//! This crate provides:
//! - [`WireMessage`], [`WireField`] and [`WireValue`], the self-describing message model
//! - [`Taxonomy`] for compressing field names to ordinals
//! - [`Codec`] trait for turning messages into bytes
//! - [`JsonCodec`] implementation for JSON transport

mod codec;
mod taxonomy;
mod wire;

pub use codec::{Codec, CodecError, JsonCodec};
pub use taxonomy::Taxonomy;
pub use wire::{HEADER_ORDINAL, WireField, WireMessage, WireValue};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Codec, CodecError, JsonCodec, Taxonomy, WireField, WireMessage, WireValue};
}
