use bytes::BytesMut;
use pipecall_transport::{ChunkStatus, MessageChannel};
use tracing::trace;

use crate::config::{MessageConfig, READ_CHUNK_SIZE};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reads complete messages from a message-mode channel.
///
/// Handles chunked delivery internally — callers always get the whole
/// message, decoded as UTF-8 in one pass at the end so multi-byte
/// characters may straddle chunk boundaries.
pub struct MessageReader<T> {
    inner: T,
    buf: BytesMut,
    config: MessageConfig,
}

impl<T: MessageChannel> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, MessageConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: MessageConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// The returned string is exactly the bytes of one peer write, with no
    /// loss or duplication regardless of how many chunks delivery took.
    pub fn read_message(&mut self) -> Result<String> {
        self.buf.clear();
        loop {
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let (read, status) = self.inner.read_chunk(&mut chunk)?;

            if self.buf.len() + read > self.config.max_message_size {
                return Err(FrameError::MessageTooLarge {
                    size: self.buf.len() + read,
                    max: self.config.max_message_size,
                });
            }
            self.buf.extend_from_slice(&chunk[..read]);

            match status {
                ChunkStatus::More => {
                    trace!(read, buffered = self.buf.len(), "partial message chunk");
                }
                ChunkStatus::Complete => break,
            }
        }

        Ok(String::from_utf8(self.buf.split().freeze().to_vec())?)
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &MessageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use pipecall_transport::{classify, ChannelError};

    use super::*;

    /// Replays a script of chunk deliveries and errors.
    struct ScriptedChannel {
        script: VecDeque<std::result::Result<(Vec<u8>, ChunkStatus), std::io::ErrorKind>>,
    }

    impl ScriptedChannel {
        fn new(
            script: Vec<std::result::Result<(Vec<u8>, ChunkStatus), std::io::ErrorKind>>,
        ) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl MessageChannel for ScriptedChannel {
        fn read_chunk(
            &mut self,
            buf: &mut [u8],
        ) -> std::result::Result<(usize, ChunkStatus), ChannelError> {
            match self.script.pop_front().expect("script exhausted") {
                Ok((bytes, status)) => {
                    assert!(bytes.len() <= buf.len(), "scripted chunk exceeds read buffer");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok((bytes.len(), status))
                }
                Err(kind) => Err(classify("read", std::io::Error::from(kind))),
            }
        }

        fn write_message(&mut self, _payload: &[u8]) -> std::result::Result<(), ChannelError> {
            unreachable!("reader tests never write")
        }
    }

    #[test]
    fn single_complete_chunk() {
        let channel = ScriptedChannel::new(vec![Ok((b"hello".to_vec(), ChunkStatus::Complete))]);
        let mut reader = MessageReader::new(channel);

        assert_eq!(reader.read_message().unwrap(), "hello");
    }

    #[test]
    fn reassembles_chunks_of_varying_size() {
        let channel = ScriptedChannel::new(vec![
            Ok((b"one-".to_vec(), ChunkStatus::More)),
            Ok((b"two and a longer middle-".to_vec(), ChunkStatus::More)),
            Ok((b"3".to_vec(), ChunkStatus::More)),
            Ok((b"end".to_vec(), ChunkStatus::Complete)),
        ]);
        let mut reader = MessageReader::new(channel);

        assert_eq!(
            reader.read_message().unwrap(),
            "one-two and a longer middle-3end"
        );
    }

    #[test]
    fn multibyte_utf8_across_chunk_boundary() {
        // "é" is 0xC3 0xA9; split it across two chunks.
        let channel = ScriptedChannel::new(vec![
            Ok((vec![b'c', b'a', b'f', 0xC3], ChunkStatus::More)),
            Ok((vec![0xA9], ChunkStatus::Complete)),
        ]);
        let mut reader = MessageReader::new(channel);

        assert_eq!(reader.read_message().unwrap(), "café");
    }

    #[test]
    fn sequential_messages_do_not_bleed() {
        let channel = ScriptedChannel::new(vec![
            Ok((b"first".to_vec(), ChunkStatus::Complete)),
            Ok((b"second".to_vec(), ChunkStatus::Complete)),
        ]);
        let mut reader = MessageReader::new(channel);

        assert_eq!(reader.read_message().unwrap(), "first");
        assert_eq!(reader.read_message().unwrap(), "second");
    }

    #[test]
    fn disconnect_mid_read_propagates() {
        let channel = ScriptedChannel::new(vec![
            Ok((b"partial".to_vec(), ChunkStatus::More)),
            Err(std::io::ErrorKind::BrokenPipe),
        ]);
        let mut reader = MessageReader::new(channel);

        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::Channel(ChannelError::Disconnected(_))
        ));
    }

    #[test]
    fn unexpected_io_error_propagates() {
        let channel = ScriptedChannel::new(vec![Err(std::io::ErrorKind::PermissionDenied)]);
        let mut reader = MessageReader::new(channel);

        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::Channel(ChannelError::Io(_))));
    }

    #[test]
    fn oversized_message_rejected() {
        let channel = ScriptedChannel::new(vec![
            Ok((vec![b'a'; 8], ChunkStatus::More)),
            Ok((vec![b'b'; 8], ChunkStatus::More)),
        ]);
        let cfg = MessageConfig {
            max_message_size: 12,
        };
        let mut reader = MessageReader::with_config(channel, cfg);

        let err = reader.read_message().unwrap_err();
        assert!(matches!(
            err,
            FrameError::MessageTooLarge { size: 16, max: 12 }
        ));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let channel =
            ScriptedChannel::new(vec![Ok((vec![0xFF, 0xFE], ChunkStatus::Complete))]);
        let mut reader = MessageReader::new(channel);

        let err = reader.read_message().unwrap_err();
        assert!(matches!(err, FrameError::InvalidUtf8(_)));
    }

    #[test]
    fn accessors_and_into_inner() {
        let channel = ScriptedChannel::new(vec![]);
        let mut reader = MessageReader::new(channel);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }
}
