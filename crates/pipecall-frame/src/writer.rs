use pipecall_transport::MessageChannel;

use crate::config::MessageConfig;
use crate::error::{FrameError, Result};

/// Writes complete messages to a message-mode channel.
pub struct MessageWriter<T> {
    inner: T,
    config: MessageConfig,
}

impl<T: MessageChannel> MessageWriter<T> {
    /// Create a new message writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, MessageConfig::default())
    }

    /// Create a new message writer with explicit configuration.
    pub fn with_config(inner: T, config: MessageConfig) -> Self {
        Self { inner, config }
    }

    /// Encode `message` as UTF-8 and send it as one atomic write.
    ///
    /// Message-mode channels guarantee the peer receives this as a single
    /// discrete logical unit.
    pub fn write_message(&mut self, message: &str) -> Result<()> {
        let payload = message.as_bytes();
        if payload.len() > self.config.max_message_size {
            return Err(FrameError::MessageTooLarge {
                size: payload.len(),
                max: self.config.max_message_size,
            });
        }
        self.inner.write_message(payload)?;
        Ok(())
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner channel.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &MessageConfig {
        &self.config
    }
}
