use pipecall_transport::ChannelError;

/// Errors that can occur while reading or writing whole messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The channel failed underneath the framing layer.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The message exceeds the configured size cap.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The reassembled message is not valid UTF-8.
    #[error("message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
