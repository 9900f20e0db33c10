//! Byte codecs for wire messages

use crate::taxonomy::Taxonomy;
use crate::wire::WireMessage;
use std::sync::Arc;
use thiserror::Error;

/// Failure turning a wire message into bytes or back
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("cannot encode wire message: {0}")]
    Encode(String),

    #[error("malformed wire payload: {0}")]
    Malformed(String),

    #[error("empty wire payload")]
    Empty,
}

impl CodecError {
    fn encode(err: serde_json::Error) -> Self {
        CodecError::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Malformed(err.to_string())
    }
}

/// Trait for turning wire messages into bytes and back
pub trait Codec: Send + Sync {
    fn encode(&self, message: &WireMessage) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, data: &[u8]) -> Result<WireMessage, CodecError>;

    /// MIME type of the encoded bytes
    fn content_type(&self) -> &'static str;
}

/// Wire messages as JSON objects.
///
/// With a taxonomy attached, known field names are compressed to ordinals on
/// encode and restored on decode.
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    indent: bool,
    taxonomy: Option<Arc<Taxonomy>>,
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output, for logs and fixtures
    pub fn pretty() -> Self {
        Self {
            indent: true,
            taxonomy: None,
        }
    }

    /// Compress field names through `taxonomy`
    pub fn with_taxonomy(mut self, taxonomy: Arc<Taxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    fn outgoing(&self, message: &WireMessage) -> Option<WireMessage> {
        self.taxonomy.as_ref().map(|t| t.compress(message))
    }

    fn incoming(&self, message: WireMessage) -> WireMessage {
        match &self.taxonomy {
            Some(taxonomy) => taxonomy.expand(&message),
            None => message,
        }
    }

    /// Encode a message directly to a JSON string
    pub fn encode_string(&self, message: &WireMessage) -> Result<String, CodecError> {
        let compressed = self.outgoing(message);
        let message = compressed.as_ref().unwrap_or(message);
        if self.indent {
            serde_json::to_string_pretty(message).map_err(CodecError::encode)
        } else {
            serde_json::to_string(message).map_err(CodecError::encode)
        }
    }

    /// Decode a JSON string to a message
    pub fn decode_str(&self, data: &str) -> Result<WireMessage, CodecError> {
        let message = serde_json::from_str(data)?;
        Ok(self.incoming(message))
    }
}

impl Codec for JsonCodec {
    fn encode(&self, message: &WireMessage) -> Result<Vec<u8>, CodecError> {
        let compressed = self.outgoing(message);
        let message = compressed.as_ref().unwrap_or(message);
        if self.indent {
            serde_json::to_vec_pretty(message).map_err(CodecError::encode)
        } else {
            serde_json::to_vec(message).map_err(CodecError::encode)
        }
    }

    fn decode(&self, data: &[u8]) -> Result<WireMessage, CodecError> {
        if data.is_empty() {
            return Err(CodecError::Empty);
        }
        let message = serde_json::from_slice(data)?;
        Ok(self.incoming(message))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
