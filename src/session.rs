//! Session builder and runtime loop.
//!
//! The [`SessionBuilder`] collects configuration and starts a [`Session`]
//! over any pair of async byte streams connected to the modem. The session
//! owns two tasks:
//! 1. the writer task, which length-prefixes and batches outbound requests
//! 2. the read loop, which reassembles records and hands them to the
//!    [`Dispatcher`]
//!
//! When either task ends, the session closes and every request still in
//! flight is failed with [`RilError::ConnectionClosed`].
//!
//! # Example
//!
//! ```ignore
//! use ril_client::{Command, QuirkChain, Session, UnsolicitedKind};
//!
//! #[tokio::main]
//! async fn main() -> ril_client::Result<()> {
//!     let stream = tokio::net::UnixStream::connect("/dev/socket/rild").await?;
//!     let (reader, writer) = stream.into_split();
//!
//!     let session = Session::builder()
//!         .quirks(QuirkChain::samsung_cdma_lte())
//!         .start(reader, writer);
//!
//!     let mut signal = session.subscribe(UnsolicitedKind::SignalStrength);
//!     let status = session.submit(Command::GetSimStatus).await?;
//!     println!("{:?}", status);
//!
//!     while let Ok(event) = signal.recv().await {
//!         println!("{:?}", event.value);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::codec::ParcelWriter;
use crate::config::{EnvProperties, PropertySource};
use crate::decoder::DecodedResponse;
use crate::dispatch::{Dispatcher, EventBus, EventKind, EventReceiver, SessionState};
use crate::error::{Result, RilError};
use crate::pending::PendingTable;
use crate::protocol::{request_parcel, Command, FrameBuffer, RequestKind, DEFAULT_MAX_RECORD_SIZE};
use crate::quirks::{QuirkChain, QuirkContext};
use crate::writer::{spawn_writer_task, OutboundRecord, WriterConfig, WriterHandle};

const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Builder for a [`Session`].
pub struct SessionBuilder {
    writer_config: WriterConfig,
    max_record_size: u32,
    event_capacity: usize,
    quirks: QuirkChain,
    properties: Arc<dyn PropertySource>,
}

impl SessionBuilder {
    /// Baseline behaviour: no quirks, properties from the environment.
    pub fn new() -> Self {
        Self {
            writer_config: WriterConfig::default(),
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            event_capacity: crate::dispatch::DEFAULT_EVENT_CAPACITY,
            quirks: QuirkChain::new(),
            properties: Arc::new(EnvProperties::new()),
        }
    }

    /// Largest inbound record accepted; a bigger length prefix ends the session.
    ///
    /// Default: 8 KiB
    pub fn max_record_size(mut self, bytes: u32) -> Self {
        self.max_record_size = bytes;
        self
    }

    /// Requests queued for the writer before `submit` starts waiting.
    ///
    /// Default: 256
    pub fn max_pending_records(mut self, limit: usize) -> Self {
        self.writer_config.max_pending_records = limit;
        self
    }

    /// Default: 256
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.writer_config.channel_capacity = capacity;
        self
    }

    /// How long `submit` waits for the writer queue before failing.
    ///
    /// Default: 5 seconds
    pub fn backpressure_timeout(mut self, timeout: Duration) -> Self {
        self.writer_config.backpressure_timeout = timeout;
        self
    }

    /// Events buffered per subscriber before it starts lagging.
    ///
    /// Default: 64
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn quirks(mut self, quirks: QuirkChain) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn properties(mut self, properties: impl PropertySource + 'static) -> Self {
        self.properties = Arc::new(properties);
        self
    }

    /// Spawn the session tasks. Must be called within a Tokio runtime.
    pub fn start<R, W>(self, reader: R, writer: W) -> Session
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Session::start(self, reader, writer)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct Shared {
    pending: Arc<PendingTable>,
    events: Arc<EventBus>,
    state: Arc<SessionState>,
    quirks: QuirkChain,
    properties: Arc<dyn PropertySource>,
    closed: AtomicBool,
}

impl Shared {
    fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.pending.fail_all(|| RilError::ConnectionClosed);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// A running protocol session with the modem.
pub struct Session {
    shared: Arc<Shared>,
    writer: WriterHandle,
    read_task: JoinHandle<()>,
    writer_task: AbortHandle,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    fn start<R, W>(builder: SessionBuilder, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let shared = Arc::new(Shared {
            pending: Arc::new(PendingTable::new()),
            events: Arc::new(EventBus::new(builder.event_capacity)),
            state: Arc::new(SessionState::new()),
            quirks: builder.quirks,
            properties: builder.properties,
            closed: AtomicBool::new(false),
        });
        if !shared.quirks.is_empty() {
            info!("session quirks: {:?}", shared.quirks);
        }

        let (writer, writer_join) = spawn_writer_task(writer, builder.writer_config);
        let writer_task = writer_join.abort_handle();

        let dispatcher = Dispatcher::new(
            shared.pending.clone(),
            shared.events.clone(),
            shared.state.clone(),
            shared.quirks.clone(),
            shared.properties.clone(),
        );
        let loop_shared = shared.clone();
        let max_record_size = builder.max_record_size;
        let read_task = tokio::spawn(async move {
            tokio::select! {
                result = Self::read_loop(reader, dispatcher, max_record_size) => match result {
                    Ok(()) => info!("modem closed the stream"),
                    Err(e) => error!("Read loop error: {}", e),
                },
                result = writer_join => match result {
                    Ok(Ok(())) => info!("writer stopped"),
                    Ok(Err(e)) => error!("Writer error: {}", e),
                    Err(e) if e.is_cancelled() => debug!("writer cancelled"),
                    Err(e) => error!("Writer task failed: {}", e),
                },
            }
            loop_shared.teardown();
        });

        Session {
            shared,
            writer,
            read_task,
            writer_task,
        }
    }

    /// Reassemble records and dispatch them until EOF or a fatal error.
    async fn read_loop<R: AsyncRead + Unpin>(
        mut reader: R,
        dispatcher: Dispatcher,
        max_record_size: u32,
    ) -> Result<()> {
        let mut frame_buffer = FrameBuffer::with_max_record(max_record_size);
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }

            for frame in frame_buffer.push(&buf[..n])? {
                match frame {
                    Ok(frame) => dispatcher.dispatch(&frame),
                    Err(e) => warn!("dropping malformed record: {}", e),
                }
            }
        }
    }

    fn ctx(&self) -> QuirkContext<'_> {
        QuirkContext::new(self.shared.properties.as_ref())
    }

    /// Send `command` and wait for its decoded response.
    ///
    /// A [`Command::Raw`] of a kind with a typed command is converted first,
    /// so quirks see it the same way. Quirks may answer locally or change
    /// the kind and layout that goes on the wire. Fails with [`RilError::Remote`] when the modem reports
    /// an error status and with [`RilError::ConnectionClosed`] if the
    /// session ends first.
    pub async fn submit(&self, command: Command) -> Result<DecodedResponse> {
        let command = command.to_typed()?.unwrap_or(command);
        if let Some(answer) = self.shared.quirks.submit(&command, self.ctx()) {
            return answer;
        }
        if self.shared.is_closed() {
            return Err(RilError::ConnectionClosed);
        }

        let (kind, body) = match self.shared.quirks.encode(&command, self.ctx()) {
            Some(encoded) => encoded,
            None => {
                let mut w = ParcelWriter::new();
                command.encode_fields(&mut w);
                (command.kind(), w.freeze())
            }
        };

        let pending = &self.shared.pending;
        let (serial, completion) = pending.allocate(kind);
        if self.shared.is_closed() {
            pending.resolve(serial, Err(RilError::ConnectionClosed));
        } else {
            debug!("[{}] > {}", serial, kind);
            let record = OutboundRecord::new(request_parcel(serial, kind, &body));
            if let Err(e) = self.writer.send(record).await {
                warn!("[{}] {} not sent: {}", serial, kind, e);
                pending.resolve(serial, Err(e));
            }
        }

        completion.await.map_err(|_| RilError::ConnectionClosed)?
    }

    /// Receive events of `kind` published from now on.
    pub fn subscribe(&self, kind: impl Into<EventKind>) -> EventReceiver {
        self.shared.events.subscribe(kind)
    }

    /// Mark that an emergency call is being placed.
    ///
    /// The next empty call list clears the flag and publishes
    /// [`EventKind::EmergencyCallEnded`] once.
    pub fn set_emergency_dial_in_progress(&self, in_progress: bool) {
        self.shared.state.set_emergency_dial_in_progress(in_progress);
    }

    pub fn emergency_dial_in_progress(&self) -> bool {
        self.shared.state.emergency_dial_in_progress()
    }

    /// Serials and kinds of requests awaiting a response.
    pub fn pending_requests(&self) -> Vec<(u32, RequestKind)> {
        self.shared.pending.snapshot()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn is_backpressure_active(&self) -> bool {
        self.writer.is_backpressure_active()
    }

    /// Wait until the modem closes the stream or either task fails.
    pub async fn wait_for_shutdown(mut self) {
        let _ = (&mut self.read_task).await;
    }

    /// Stop both tasks and fail every pending request.
    pub fn close(&self) {
        self.read_task.abort();
        self.writer_task.abort();
        self.shared.teardown();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.read_task.abort();
        self.writer_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticProperties;
    use crate::protocol::{build_solicited, RequestRecord, LENGTH_PREFIX_SIZE};
    use bytes::Bytes;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{duplex, AsyncWriteExt, DuplexStream};

    #[test]
    fn test_builder_configuration() {
        let builder = Session::builder()
            .max_record_size(4096)
            .max_pending_records(8)
            .channel_capacity(16)
            .backpressure_timeout(Duration::from_secs(1))
            .event_capacity(4)
            .quirks(QuirkChain::samsung_cdma_lte())
            .properties(StaticProperties::new());

        assert_eq!(builder.max_record_size, 4096);
        assert_eq!(builder.writer_config.max_pending_records, 8);
        assert_eq!(builder.writer_config.channel_capacity, 16);
        assert_eq!(
            builder.writer_config.backpressure_timeout,
            Duration::from_secs(1)
        );
        assert_eq!(builder.event_capacity, 4);
        assert_eq!(builder.quirks.len(), 6);
    }

    async fn read_request(modem: &mut DuplexStream) -> RequestRecord {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        modem.read_exact(&mut prefix).await.unwrap();
        let mut parcel = vec![0u8; u32::from_be_bytes(prefix) as usize];
        modem.read_exact(&mut parcel).await.unwrap();
        RequestRecord::decode(Bytes::from(parcel)).unwrap()
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (host, mut modem) = duplex(4096);
        let (reader, writer) = tokio::io::split(host);
        let session = Session::builder().start(reader, writer);

        let modem_task = tokio::spawn(async move {
            let request = read_request(&mut modem).await;
            assert_eq!(request.kind, RequestKind::Answer);
            modem
                .write_all(&build_solicited(request.serial, 0, &[]))
                .await
                .unwrap();
            modem
        });

        let value = session.submit(Command::Answer).await.unwrap();
        assert!(value.is_void());
        assert!(session.pending_requests().is_empty());
        drop(modem_task.await.unwrap());
    }

    #[tokio::test]
    async fn test_eof_fails_pending_requests() {
        let (host, mut modem) = duplex(4096);
        let (reader, writer) = tokio::io::split(host);
        let session = Session::builder().start(reader, writer);

        let modem_task = tokio::spawn(async move {
            let _ = read_request(&mut modem).await;
            drop(modem);
        });

        let err = session.submit(Command::GetSimStatus).await.unwrap_err();
        assert!(matches!(err, RilError::ConnectionClosed));
        modem_task.await.unwrap();
        assert!(session.pending_requests().is_empty());

        // Later submissions fail fast.
        let err = session.submit(Command::Operator).await.unwrap_err();
        assert!(matches!(err, RilError::ConnectionClosed));
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_quirk_answer_sends_nothing() {
        let (host, _modem) = duplex(4096);
        let (reader, writer) = tokio::io::split(host);
        let session = Session::builder()
            .quirks(QuirkChain::samsung_cdma_lte())
            .properties(StaticProperties::new())
            .start(reader, writer);

        let err = session.submit(Command::GetHardwareConfig).await.unwrap_err();
        assert!(matches!(err, RilError::Unsupported(_)));
        assert!(session.pending_requests().is_empty());
    }

    /// Sink whose every write fails.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_write_failure_fails_pending_requests() {
        // The modem end stays open, so only the writer can end the session.
        let (reader, _modem) = duplex(4096);
        let session = Session::builder().start(reader, BrokenPipe);

        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            session.submit(Command::Operator),
        )
        .await
        .expect("submit stalled after write failure");
        assert!(matches!(outcome, Err(RilError::ConnectionClosed)));
        assert!(session.pending_requests().is_empty());
        assert!(session.is_closed());

        let err = session.submit(Command::SignalStrength).await.unwrap_err();
        assert!(matches!(err, RilError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_close_fails_outstanding() {
        let (host, _modem) = duplex(4096);
        let (reader, writer) = tokio::io::split(host);
        let session = Arc::new(Session::builder().start(reader, writer));

        let submitter = {
            let session = session.clone();
            tokio::spawn(async move { session.submit(Command::SignalStrength).await })
        };
        while session.pending_requests().is_empty() {
            tokio::task::yield_now().await;
        }

        session.close();
        assert!(session.is_closed());
        let err = submitter.await.unwrap().unwrap_err();
        assert!(matches!(err, RilError::ConnectionClosed));
    }
}
