use std::ffi::OsStr;
use std::io::{self, ErrorKind};
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use tracing::debug;
use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_PIPE_BUSY, GENERIC_READ,
    GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::{CreateFileW, ReadFile, WriteFile, OPEN_EXISTING};
use windows_sys::Win32::System::Pipes::{SetNamedPipeHandleState, PIPE_READMODE_MESSAGE};

use crate::error::{classify, ChannelError, OpenError, Result};
use crate::traits::{ChunkStatus, MessageChannel, Transport};

/// Client transport over Windows named pipes.
///
/// The endpoint name is a full pipe path, e.g. `\\.\pipe\my-server`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedPipeTransport;

impl NamedPipeTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for NamedPipeTransport {
    type Channel = NamedPipeChannel;

    fn open(&self, endpoint: &str) -> std::result::Result<NamedPipeChannel, OpenError> {
        let wide: Vec<u16> = OsStr::new(endpoint).encode_wide().chain(Some(0)).collect();

        // SAFETY: `wide` is a NUL-terminated UTF-16 path that outlives the
        // call; no sharing, default security, open-existing only.
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                0,
                ptr::null(),
                OPEN_EXISTING,
                0,
                ptr::null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            let source = io::Error::last_os_error();
            let code = source.raw_os_error().unwrap_or_default() as u32;
            return Err(match code {
                // The server has not created the pipe yet.
                ERROR_FILE_NOT_FOUND => OpenError::NotFound {
                    name: endpoint.to_string(),
                    source,
                },
                // Every server instance is serving another client.
                ERROR_PIPE_BUSY => OpenError::Busy {
                    name: endpoint.to_string(),
                    source,
                },
                _ => OpenError::Io {
                    name: endpoint.to_string(),
                    source,
                },
            });
        }

        let channel = NamedPipeChannel { handle };

        // Message-read mode: one ReadFile consumes exactly one WriteFile
        // from the peer, with ERROR_MORE_DATA flagging an undersized
        // buffer. Collection count and timeout stay at platform defaults.
        let mode: u32 = PIPE_READMODE_MESSAGE;
        // SAFETY: `handle` is a valid pipe handle owned by `channel`.
        let ok = unsafe {
            SetNamedPipeHandleState(channel.handle, &mode, ptr::null(), ptr::null())
        };
        if ok == 0 {
            return Err(OpenError::Io {
                name: endpoint.to_string(),
                source: io::Error::last_os_error(),
            });
        }

        debug!(endpoint, "connected to named pipe");
        Ok(channel)
    }
}

/// An open message-mode channel over a Windows named pipe.
///
/// The handle is closed when dropped.
#[derive(Debug)]
pub struct NamedPipeChannel {
    handle: HANDLE,
}

// The raw handle is owned exclusively and only touched through &mut
// methods, so moving the channel to another thread is sound.
unsafe impl Send for NamedPipeChannel {}

impl MessageChannel for NamedPipeChannel {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<(usize, ChunkStatus)> {
        let mut read: u32 = 0;
        // SAFETY: `buf` is valid for writes of its full length for the
        // duration of the call; synchronous I/O, no OVERLAPPED.
        let ok = unsafe {
            ReadFile(
                self.handle,
                buf.as_mut_ptr().cast(),
                buf.len() as u32,
                &mut read,
                ptr::null_mut(),
            )
        };
        if ok != 0 {
            return Ok((read as usize, ChunkStatus::Complete));
        }

        let source = io::Error::last_os_error();
        if source.raw_os_error() == Some(ERROR_MORE_DATA as i32) {
            // The buffer filled before the message ended; the remainder is
            // still queued on the pipe.
            return Ok((read as usize, ChunkStatus::More));
        }
        Err(classify("read", source))
    }

    fn write_message(&mut self, payload: &[u8]) -> Result<()> {
        let len = u32::try_from(payload.len()).map_err(|_| {
            ChannelError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                "message exceeds the pipe write range",
            ))
        })?;

        let mut written: u32 = 0;
        // SAFETY: `payload` is valid for reads of its full length for the
        // duration of the call; synchronous I/O, no OVERLAPPED.
        let ok = unsafe {
            WriteFile(
                self.handle,
                payload.as_ptr().cast(),
                len,
                &mut written,
                ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(classify("write", io::Error::last_os_error()));
        }
        Ok(())
    }
}

impl Drop for NamedPipeChannel {
    fn drop(&mut self) {
        // SAFETY: the handle is owned by this channel and not yet closed.
        unsafe {
            CloseHandle(self.handle);
        }
    }
}
