//! Wire frames and the internal broadcast message.

use std::fmt;

use bytes::Bytes;

use relay_core::types::ClientId;

/// Kind of a data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// UTF-8 text frame.
    Text,
    /// Opaque binary frame.
    Binary,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// One data frame as it crosses the wire: a kind and a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame kind.
    pub kind: MessageKind,
    /// Raw payload. Valid UTF-8 when `kind` is [`MessageKind::Text`].
    pub payload: Bytes,
}

impl Frame {
    /// Create a text frame.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            payload: Bytes::from(text.into()),
        }
    }

    /// Create a binary frame.
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self {
            kind: MessageKind::Binary,
            payload: data.into(),
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A frame received from one client, queued for fan-out to the others.
///
/// The sender is bookkeeping for self-exclusion only; recipients get the
/// bare [`Frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    frame: Frame,
    sender: ClientId,
}

impl Message {
    /// Wrap a received frame with the identity of the client that sent it.
    pub fn new(frame: Frame, sender: ClientId) -> Self {
        Self { frame, sender }
    }

    /// The client this message came from.
    pub fn sender(&self) -> ClientId {
        self.sender
    }

    /// Frame kind.
    pub fn kind(&self) -> MessageKind {
        self.frame.kind
    }

    /// Raw payload.
    pub fn payload(&self) -> &Bytes {
        &self.frame.payload
    }

    /// The frame to deliver to recipients.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}
