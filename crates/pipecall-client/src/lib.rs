//! One-shot JSON request/response client over local IPC channels.
//!
//! This is the "just works" layer. [`send_request`] connects to a named
//! server endpoint (waiting for it to come up, bounded by a timeout),
//! writes one request envelope, reads one complete JSON response, and
//! closes the channel on every exit path.
//!
//! Failures surface as the four flat [`ClientError`] kinds so callers can
//! decide between reconnecting, waiting longer, and giving up.

pub mod client;
pub mod clock;
pub mod connector;
pub mod error;
pub mod request;

pub use client::{send_request, RequestClient};
pub use clock::{Clock, SystemClock};
pub use connector::{Connector, RETRY_INTERVAL};
pub use error::{ClientError, Result};
pub use request::Request;
