use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;

use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::error::{classify, ChannelError, OpenError, Result};
use crate::traits::{ChunkStatus, MessageChannel, Transport};

/// Bytes of length prefix carried before each message on the socket.
const LENGTH_PREFIX: usize = 4;

/// Client transport over Unix domain sockets.
///
/// The endpoint name is the filesystem path of the server's socket.
/// Stream sockets do not preserve message boundaries, so each message is
/// carried with a little-endian length prefix. The prefix never reaches
/// callers; `read_chunk` reports boundaries the same way the Windows
/// named-pipe channel does.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdsTransport;

impl UdsTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UdsTransport {
    type Channel = UdsChannel;

    fn open(&self, endpoint: &str) -> std::result::Result<UdsChannel, OpenError> {
        match UnixStream::connect(endpoint) {
            Ok(stream) => {
                debug!(endpoint, "connected to unix domain socket");
                Ok(UdsChannel {
                    stream,
                    remaining: 0,
                })
            }
            Err(source) => Err(match source.kind() {
                // Socket file not created yet: the server is still starting.
                ErrorKind::NotFound => OpenError::NotFound {
                    name: endpoint.to_string(),
                    source,
                },
                // Socket file exists but nobody is accepting: a previous
                // instance left a stale file, or the backlog is full.
                ErrorKind::ConnectionRefused => OpenError::Busy {
                    name: endpoint.to_string(),
                    source,
                },
                _ => OpenError::Io {
                    name: endpoint.to_string(),
                    source,
                },
            }),
        }
    }
}

/// An open message-mode channel over a Unix domain socket.
///
/// Closed when dropped.
#[derive(Debug)]
pub struct UdsChannel {
    stream: UnixStream,
    /// Unread bytes of the in-flight incoming message. Zero at a boundary.
    remaining: usize,
}

impl UdsChannel {
    fn read_header(&mut self) -> Result<usize> {
        let mut header = [0u8; LENGTH_PREFIX];
        self.stream
            .read_exact(&mut header)
            .map_err(|e| classify("read", e))?;
        Ok(u32::from_le_bytes(header) as usize)
    }
}

impl MessageChannel for UdsChannel {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(usize, ChunkStatus)> {
        if self.remaining == 0 {
            self.remaining = self.read_header()?;
            if self.remaining == 0 {
                return Ok((0, ChunkStatus::Complete));
            }
        }

        let want = buf.len().min(self.remaining);
        let read = loop {
            match self.stream.read(&mut buf[..want]) {
                Ok(0) => {
                    return Err(classify(
                        "read",
                        io::Error::new(
                            ErrorKind::UnexpectedEof,
                            "peer closed before the message completed",
                        ),
                    ))
                }
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(classify("read", err)),
            }
        };

        self.remaining -= read;
        let status = if self.remaining == 0 {
            ChunkStatus::Complete
        } else {
            ChunkStatus::More
        };
        Ok((read, status))
    }

    fn write_message(&mut self, payload: &[u8]) -> Result<()> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            ChannelError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                "message exceeds the length-prefix range",
            ))
        })?;

        let mut wire = BytesMut::with_capacity(LENGTH_PREFIX + payload.len());
        wire.put_u32_le(len);
        wire.put_slice(payload);

        self.stream
            .write_all(&wire)
            .map_err(|e| classify("write", e))?;
        self.stream.flush().map_err(|e| classify("write", e))
    }
}
