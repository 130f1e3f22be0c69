//! Publish request body and payload encoding.
//!
//! The body mirrors the REST `topics.publish` request:
//! `{ "messages": [ { "data": <payload> }, ... ] }`. Payloads are the
//! formatted log text encoded with the URL-safe base64 alphabet, padding
//! kept.

use base64::{
    DecodeError, Engine,
    engine::general_purpose::URL_SAFE as BASE64_URL_SAFE,
};
use serde::{Deserialize, Serialize};

/// One message inside a publish request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubsubMessage {
    pub data: String,
}

/// Body of a single publish request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishBody {
    pub messages: Vec<PubsubMessage>,
}

impl PublishBody {
    /// Build a body from already encoded payloads.
    pub fn from_payloads<I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            messages: payloads
                .into_iter()
                .map(|data| PubsubMessage { data })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Encode log text for inclusion in a publish body.
pub fn encode(text: &str) -> String {
    BASE64_URL_SAFE.encode(text.as_bytes())
}

/// Reverse [`encode`]. Invalid UTF-8 is replaced rather than rejected.
pub fn decode(payload: &str) -> Result<String, DecodeError> {
    let bytes = BASE64_URL_SAFE.decode(payload)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
