use std::time::{Duration, Instant};

use pipecall_transport::{OpenError, Transport};
use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::error::{ClientError, Result};

/// Interval between open attempts while the endpoint is not ready.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Connects to a named endpoint, waiting for the server to come up.
///
/// A server that has not created its endpoint yet, or whose accept
/// capacity is exhausted, is an expected transient condition: the
/// connector sleeps a fixed interval and retries until the caller's
/// deadline elapses. Any other open failure aborts immediately.
pub struct Connector<T, C = SystemClock> {
    transport: T,
    clock: C,
    retry_interval: Duration,
}

/// Where one retry turn left the connection attempt.
enum DialState<Ch> {
    Connecting,
    Connected(Ch),
    TimedOut { elapsed: Duration, cause: OpenError },
    Failed(OpenError),
}

impl<T: Transport> Connector<T> {
    /// A connector over the wall clock.
    pub fn new(transport: T) -> Self {
        Self::with_clock(transport, SystemClock)
    }
}

impl<T: Transport, C: Clock> Connector<T, C> {
    /// A connector with an explicit time source.
    pub fn with_clock(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            retry_interval: RETRY_INTERVAL,
        }
    }

    /// Override the retry interval.
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Open a channel to `endpoint`, retrying while the server is not
    /// ready, for at most `timeout`.
    ///
    /// The first open attempt always happens, even with a zero timeout.
    /// Fails with [`ClientError::Timeout`] (carrying the elapsed duration
    /// and the last transient cause) or [`ClientError::Io`].
    pub fn connect(&self, endpoint: &str, timeout: Duration) -> Result<T::Channel> {
        let start = self.clock.now();
        loop {
            match self.step(endpoint, start, timeout) {
                DialState::Connecting => {}
                DialState::Connected(channel) => return Ok(channel),
                DialState::TimedOut { elapsed, cause } => {
                    error!(
                        endpoint,
                        elapsed_ms = elapsed.as_millis() as u64,
                        timeout_ms = timeout.as_millis() as u64,
                        "endpoint readiness timeout"
                    );
                    return Err(ClientError::Timeout {
                        elapsed,
                        cause: cause.into_source(),
                    });
                }
                DialState::Failed(cause) => {
                    error!(endpoint, %cause, "could not open endpoint");
                    return Err(ClientError::Io(cause.into_source()));
                }
            }
        }
    }

    /// One turn of the retry loop: a single open attempt plus the
    /// transient backoff and deadline bookkeeping.
    fn step(&self, endpoint: &str, start: Instant, timeout: Duration) -> DialState<T::Channel> {
        match self.transport.open(endpoint) {
            Ok(channel) => DialState::Connected(channel),
            Err(err) if err.is_transient() => {
                debug!(endpoint, %err, "endpoint not ready, retrying");
                self.clock.sleep(self.retry_interval);
                let elapsed = self.clock.now().duration_since(start);
                if elapsed > timeout {
                    DialState::TimedOut { elapsed, cause: err }
                } else {
                    DialState::Connecting
                }
            }
            Err(err) => DialState::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::io;

    use pipecall_transport::{ChannelError, ChunkStatus, MessageChannel};

    use super::*;

    #[derive(Debug)]
    struct FakeChannel;

    impl MessageChannel for FakeChannel {
        fn read_chunk(
            &mut self,
            _buf: &mut [u8],
        ) -> std::result::Result<(usize, ChunkStatus), ChannelError> {
            Ok((0, ChunkStatus::Complete))
        }

        fn write_message(&mut self, _payload: &[u8]) -> std::result::Result<(), ChannelError> {
            Ok(())
        }
    }

    /// Pops one scripted outcome per open attempt; once the script runs
    /// dry every further attempt reports a transient NotFound.
    struct FakeTransport {
        script: RefCell<VecDeque<std::result::Result<(), OpenError>>>,
        attempts: Cell<usize>,
    }

    impl FakeTransport {
        fn scripted(script: Vec<std::result::Result<(), OpenError>>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                attempts: Cell::new(0),
            }
        }

        fn never_ready() -> Self {
            Self::scripted(Vec::new())
        }

        fn not_found() -> OpenError {
            OpenError::NotFound {
                name: "endpoint".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
        }

        fn busy() -> OpenError {
            OpenError::Busy {
                name: "endpoint".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
        }

        fn fatal() -> OpenError {
            OpenError::Io {
                name: "endpoint".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
        }
    }

    impl Transport for FakeTransport {
        type Channel = FakeChannel;

        fn open(&self, _endpoint: &str) -> std::result::Result<FakeChannel, OpenError> {
            self.attempts.set(self.attempts.get() + 1);
            match self.script.borrow_mut().pop_front() {
                Some(Ok(())) => Ok(FakeChannel),
                Some(Err(err)) => Err(err),
                None => Err(Self::not_found()),
            }
        }
    }

    /// Advances a virtual instant on every sleep; no real blocking.
    struct FakeClock {
        now: Cell<Instant>,
        slept: RefCell<Vec<Duration>>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: Cell::new(Instant::now()),
                slept: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clock for &FakeClock {
        fn now(&self) -> Instant {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.now.set(self.now.get() + duration);
            self.slept.borrow_mut().push(duration);
        }
    }

    #[test]
    fn connects_on_first_attempt() {
        let clock = FakeClock::new();
        let transport = FakeTransport::scripted(vec![Ok(())]);
        let connector = Connector::with_clock(transport, &clock);

        connector
            .connect("endpoint", Duration::from_secs(5))
            .unwrap();

        assert_eq!(connector.transport.attempts.get(), 1);
        assert!(clock.slept.borrow().is_empty());
    }

    #[test]
    fn retries_through_transient_failures() {
        let clock = FakeClock::new();
        let transport = FakeTransport::scripted(vec![
            Err(FakeTransport::not_found()),
            Err(FakeTransport::busy()),
            Ok(()),
        ]);
        let connector = Connector::with_clock(transport, &clock);

        connector
            .connect("endpoint", Duration::from_secs(5))
            .unwrap();

        assert_eq!(connector.transport.attempts.get(), 3);
        assert_eq!(clock.slept.borrow().len(), 2);
    }

    #[test]
    fn times_out_when_endpoint_never_appears() {
        let clock = FakeClock::new();
        let transport = FakeTransport::never_ready();
        let connector = Connector::with_clock(transport, &clock);

        let timeout = Duration::from_millis(300);
        let err = connector.connect("endpoint", timeout).unwrap_err();

        match err {
            ClientError::Timeout { elapsed, .. } => {
                assert!(elapsed > timeout);
                assert!(elapsed <= timeout + RETRY_INTERVAL);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        // 300ms deadline at 100ms per turn: attempts at 0/100/200/300,
        // giving up when elapsed first exceeds the deadline.
        assert_eq!(connector.transport.attempts.get(), 4);
    }

    #[test]
    fn zero_timeout_still_attempts_once() {
        let clock = FakeClock::new();
        let transport = FakeTransport::never_ready();
        let connector = Connector::with_clock(transport, &clock);

        let err = connector.connect("endpoint", Duration::ZERO).unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert_eq!(connector.transport.attempts.get(), 1);
    }

    #[test]
    fn fatal_open_failure_aborts_without_retry() {
        let clock = FakeClock::new();
        let transport = FakeTransport::scripted(vec![Err(FakeTransport::fatal())]);
        let connector = Connector::with_clock(transport, &clock);

        let err = connector
            .connect("endpoint", Duration::from_secs(5))
            .unwrap_err();

        assert!(matches!(err, ClientError::Io(_)));
        assert_eq!(connector.transport.attempts.get(), 1);
        assert!(clock.slept.borrow().is_empty());
    }

    #[test]
    fn custom_retry_interval_is_used() {
        let clock = FakeClock::new();
        let transport = FakeTransport::never_ready();
        let connector = Connector::with_clock(transport, &clock)
            .with_retry_interval(Duration::from_millis(250));

        let err = connector
            .connect("endpoint", Duration::from_millis(400))
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(clock
            .slept
            .borrow()
            .iter()
            .all(|d| *d == Duration::from_millis(250)));
    }
}
