/// Bytes requested from the channel per read.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Default maximum size of one reassembled message: 16 MiB.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Configuration for message reassembly and writing.
#[derive(Debug, Clone)]
pub struct MessageConfig {
    /// Maximum size of one message in bytes, enforced while accumulating
    /// reads and before writes. Caps memory growth against a misbehaving
    /// peer.
    pub max_message_size: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}
