use std::io;
use std::time::Duration;

use pipecall_frame::FrameError;
use pipecall_transport::{ChannelError, DisconnectInfo};

/// Errors surfaced by a request/response exchange.
///
/// Callers match on the variant to decide whether to re-establish
/// (`Disconnected`), wait longer (`Timeout`), or give up (`Io`,
/// `Decode`). Lower-layer errors are flattened in, not nested.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The peer closed or the channel went stale mid-exchange. The
    /// channel was discarded; retrying requires a fresh connect.
    #[error("peer disconnected during {0}")]
    Disconnected(DisconnectInfo),

    /// The endpoint never became connectable within the caller's deadline.
    #[error("timed out after {elapsed:?} waiting for endpoint")]
    Timeout {
        /// Time spent retrying before giving up.
        elapsed: Duration,
        /// The last transient open failure observed.
        #[source]
        cause: io::Error,
    },

    /// Any other transport-level failure. Fatal to this exchange.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// The response (or a request payload) was not valid JSON.
    #[error("protocol decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<ChannelError> for ClientError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Disconnected(info) => Self::Disconnected(info),
            ChannelError::Io(source) => Self::Io(source),
        }
    }
}

impl From<FrameError> for ClientError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Channel(inner) => inner.into(),
            FrameError::MessageTooLarge { .. } => {
                Self::Io(io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
            }
            FrameError::InvalidUtf8(source) => {
                Self::Io(io::Error::new(io::ErrorKind::InvalidData, source))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
