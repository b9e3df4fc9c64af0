//! Client-side transport for message-mode IPC channels.
//!
//! Provides a unified interface over different local transport mechanisms:
//! - Unix domain sockets (Linux/macOS), with length-prefixed message framing
//! - Named pipes (Windows), using native message-read mode
//!
//! This is the lowest layer of pipecall. A [`Transport`] opens a
//! [`MessageChannel`] to a named server endpoint; the channel preserves
//! message boundaries (one write is received as one complete read unit)
//! and classifies disconnection uniformly across read, write, and open.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

#[cfg(windows)]
pub mod named_pipe;

pub use error::{classify, ChannelError, DisconnectInfo, OpenError, Result};
pub use traits::{ChunkStatus, MessageChannel, Transport};

#[cfg(unix)]
pub use uds::{UdsChannel, UdsTransport};

#[cfg(windows)]
pub use named_pipe::{NamedPipeChannel, NamedPipeTransport};

/// The platform's native transport.
#[cfg(unix)]
pub type NativeTransport = UdsTransport;

/// The platform's native transport.
#[cfg(windows)]
pub type NativeTransport = NamedPipeTransport;
