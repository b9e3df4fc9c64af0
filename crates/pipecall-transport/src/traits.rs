use crate::error::{OpenError, Result};

/// Whether a chunk completed the current logical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// More bytes of the current message remain unread.
    More,
    /// The chunk ended exactly on a message boundary.
    Complete,
}

/// A connected, message-mode IPC channel.
///
/// One write is received by the peer as one discrete message; reads hand
/// back the current message in bounded chunks with an explicit boundary
/// marker. Channels are exclusively owned by one exchange and closed on
/// drop — never shared across threads, never reused after a disconnect.
pub trait MessageChannel {
    /// Read up to `buf.len()` bytes of the current incoming message.
    ///
    /// Returns the byte count together with whether the message is now
    /// complete. Blocks until data (or a disconnect) arrives.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(usize, ChunkStatus)>;

    /// Write one complete message as a single atomic unit.
    fn write_message(&mut self, payload: &[u8]) -> Result<()>;
}

impl<C: MessageChannel + ?Sized> MessageChannel for &mut C {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(usize, ChunkStatus)> {
        (**self).read_chunk(buf)
    }

    fn write_message(&mut self, payload: &[u8]) -> Result<()> {
        (**self).write_message(payload)
    }
}

/// Opens client channels to named server endpoints.
///
/// Implementations map their platform's open failures onto [`OpenError`]
/// so the retry loop above this layer can tell "server not ready yet"
/// apart from everything else via [`OpenError::is_transient`].
pub trait Transport {
    /// The channel type this transport produces.
    type Channel: MessageChannel;

    /// Open `endpoint` for a single request/response exchange.
    fn open(&self, endpoint: &str) -> std::result::Result<Self::Channel, OpenError>;
}
