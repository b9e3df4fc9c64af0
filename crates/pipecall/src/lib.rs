//! Lightweight request/response over local message-mode IPC channels.
//!
//! pipecall lets a client process send a structured request (method, path,
//! optional params and body) to a local server process over a named pipe
//! or Unix domain socket, and get a JSON response back — one fresh
//! connection per exchange, closed on every exit path.
//!
//! # Crate Structure
//!
//! - [`transport`] — Message-mode channel abstraction (UDS, named pipes)
//! - [`frame`] — Complete-message reads and atomic writes
//! - [`client`] — Connect-with-retry, envelopes, and the request client
//!   (behind the `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use pipecall_transport::*;
}

/// Re-export framing types.
pub mod frame {
    pub use pipecall_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use pipecall_client::*;
}
