//! Complete-message reads and atomic writes over message-mode channels.
//!
//! A [`MessageReader`] reassembles one logical message no matter how many
//! chunks the transport delivers it in; a [`MessageWriter`] sends one
//! message as a single discrete unit. No partial reads, no buffer
//! management in user code.

pub mod config;
pub mod error;
pub mod reader;
pub mod writer;

pub use config::{MessageConfig, DEFAULT_MAX_MESSAGE_SIZE, READ_CHUNK_SIZE};
pub use error::{FrameError, Result};
pub use reader::MessageReader;
pub use writer::MessageWriter;
