use std::fmt;
use std::io;

/// Details about a channel that dropped mid-operation.
///
/// Carries the failing operation, the raw OS error code when one was
/// reported, and the originating I/O error.
#[derive(Debug)]
pub struct DisconnectInfo {
    /// The transport operation that observed the disconnect.
    pub operation: &'static str,
    /// Platform error code, when the OS reported one.
    pub code: Option<i32>,
    /// The underlying I/O error.
    pub source: io::Error,
}

impl fmt::Display for DisconnectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.source)
    }
}

/// Errors that can occur on an open channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The peer closed, was never connected, or the handle went stale.
    /// The channel must be discarded; only a fresh open can recover.
    #[error("peer disconnected during {0}")]
    Disconnected(DisconnectInfo),

    /// Any other I/O error on the channel.
    #[error("channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that can occur while opening a channel to an endpoint.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// No server endpoint exists under this name yet.
    #[error("endpoint {name} not found: {source}")]
    NotFound { name: String, source: io::Error },

    /// The endpoint exists but cannot accept another connection right now.
    #[error("endpoint {name} busy: {source}")]
    Busy { name: String, source: io::Error },

    /// Open failed for a reason retrying will not fix.
    #[error("failed to open {name}: {source}")]
    Io { name: String, source: io::Error },
}

impl OpenError {
    /// Whether waiting and retrying the open can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Busy { .. })
    }

    /// Extract the underlying I/O error.
    pub fn into_source(self) -> io::Error {
        match self {
            Self::NotFound { source, .. } | Self::Busy { source, .. } | Self::Io { source, .. } => {
                source
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;

/// Route a raw I/O error from `operation` into the channel taxonomy.
///
/// Broken-pipe, connection-reset, and stale-handle conditions become
/// [`ChannelError::Disconnected`]; everything else stays an I/O error that
/// the caller treats as fatal. Read, write, and connect paths all classify
/// through here so disconnection looks the same regardless of which
/// operation tripped over it.
pub fn classify(operation: &'static str, err: io::Error) -> ChannelError {
    if is_disconnect(&err) {
        ChannelError::Disconnected(DisconnectInfo {
            operation,
            code: err.raw_os_error(),
            source: err,
        })
    } else {
        ChannelError::Io(err)
    }
}

fn is_disconnect(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    ) {
        return true;
    }
    err.raw_os_error().is_some_and(is_disconnect_code)
}

#[cfg(unix)]
fn is_disconnect_code(code: i32) -> bool {
    matches!(code, libc::EPIPE | libc::ECONNRESET | libc::EBADF)
}

#[cfg(windows)]
fn is_disconnect_code(code: i32) -> bool {
    use windows_sys::Win32::Foundation::{
        ERROR_BROKEN_PIPE, ERROR_INVALID_HANDLE, ERROR_PIPE_NOT_CONNECTED,
    };

    code as u32 == ERROR_BROKEN_PIPE
        || code as u32 == ERROR_PIPE_NOT_CONNECTED
        || code as u32 == ERROR_INVALID_HANDLE
}
