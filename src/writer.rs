//! Outbound writer task.
//!
//! Requests are queued on an mpsc channel and written by one task, which
//! drains whatever is ready and emits it with a single vectored write.
//!
//! ```text
//! submit() ─┐
//! submit() ─┼─► mpsc::Sender<OutboundRecord> ─► writer task ─► modem
//! quirk    ─┘
//! ```
//!
//! The number of records queued but not yet written is tracked; once it
//! reaches `max_pending_records`, senders wait (up to a timeout) for the
//! writer to catch up.

use std::io::IoSlice;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::error::{Result, RilError};
use crate::protocol::{RecordHeader, LENGTH_PREFIX_SIZE};

pub const DEFAULT_MAX_PENDING_RECORDS: usize = 256;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_BACKPRESSURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Records drained from the queue per write.
const MAX_BATCH_SIZE: usize = 32;

/// A request parcel with its length prefix, ready for the wire.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    prefix: [u8; LENGTH_PREFIX_SIZE],
    parcel: Bytes,
}

impl OutboundRecord {
    pub fn new(parcel: Bytes) -> Self {
        Self {
            prefix: RecordHeader::new(parcel.len() as u32).encode(),
            parcel,
        }
    }

    /// Bytes this record occupies on the wire.
    #[inline]
    pub fn wire_len(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.parcel.len()
    }

    pub fn parcel(&self) -> &Bytes {
        &self.parcel
    }
}

#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub max_pending_records: usize,
    pub channel_capacity: usize,
    pub backpressure_timeout: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_pending_records: DEFAULT_MAX_PENDING_RECORDS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            backpressure_timeout: DEFAULT_BACKPRESSURE_TIMEOUT,
        }
    }
}

/// Counter of queued records shared between the handle and the task.
#[derive(Debug, Default)]
struct Pending {
    count: AtomicUsize,
    drained: Notify,
}

impl Pending {
    fn release(&self, n: usize) {
        self.count.fetch_sub(n, Ordering::AcqRel);
        self.drained.notify_waiters();
    }
}

/// Cloneable sending side of the writer task.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<OutboundRecord>,
    pending: Arc<Pending>,
    max_pending: usize,
    timeout: Duration,
}

impl WriterHandle {
    /// Queue a record, waiting while the pending limit is reached.
    pub async fn send(&self, record: OutboundRecord) -> Result<()> {
        self.wait_for_capacity().await?;
        self.pending.count.fetch_add(1, Ordering::AcqRel);
        self.tx.send(record).await.map_err(|_| {
            self.pending.release(1);
            RilError::ConnectionClosed
        })
    }

    async fn wait_for_capacity(&self) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            // Register before checking so a release in between is not missed.
            let drained = self.pending.drained.notified();
            if !self.is_backpressure_active() {
                return Ok(());
            }
            if self.tx.is_closed() {
                return Err(RilError::ConnectionClosed);
            }
            if tokio::time::timeout_at(deadline, drained).await.is_err() {
                return Err(RilError::BackpressureTimeout);
            }
        }
    }

    #[inline]
    pub fn is_backpressure_active(&self) -> bool {
        self.pending_count() >= self.max_pending
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.count.load(Ordering::Acquire)
    }
}

/// Spawn the writer task over `writer`.
///
/// The task ends cleanly once every [`WriterHandle`] is dropped, or with
/// the I/O error that stopped it.
pub fn spawn_writer_task<W>(writer: W, config: WriterConfig) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let pending = Arc::new(Pending::default());
    let handle = WriterHandle {
        tx,
        pending: pending.clone(),
        max_pending: config.max_pending_records.max(1),
        timeout: config.backpressure_timeout,
    };
    let task = tokio::spawn(writer_loop(rx, writer, pending));
    (handle, task)
}

async fn writer_loop<W>(
    mut rx: mpsc::Receiver<OutboundRecord>,
    mut writer: W,
    pending: Arc<Pending>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut batch = Vec::with_capacity(MAX_BATCH_SIZE);
    while let Some(first) = rx.recv().await {
        batch.push(first);
        while batch.len() < MAX_BATCH_SIZE {
            match rx.try_recv() {
                Ok(record) => batch.push(record),
                Err(_) => break,
            }
        }

        let result = write_batch(&mut writer, &batch).await;
        trace!("wrote batch of {} records", batch.len());
        pending.release(batch.len());
        batch.clear();
        result?;
    }
    Ok(())
}

/// Write every record of `batch`, continuing after partial vectored writes.
async fn write_batch<W>(writer: &mut W, batch: &[OutboundRecord]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let total: usize = batch.iter().map(OutboundRecord::wire_len).sum();
    let mut written = 0;
    while written < total {
        let slices = slices_from(batch, written);
        let n = writer.write_vectored(&slices).await?;
        if n == 0 {
            return Err(RilError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "modem stream accepted no bytes",
            )));
        }
        written += n;
    }
    writer.flush().await?;
    Ok(())
}

/// IoSlices covering `batch` with the first `skip` bytes removed.
fn slices_from(batch: &[OutboundRecord], mut skip: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(batch.len() * 2);
    for record in batch {
        for part in [&record.prefix[..], &record.parcel[..]] {
            if skip >= part.len() {
                skip -= part.len();
                continue;
            }
            slices.push(IoSlice::new(&part[skip..]));
            skip = 0;
        }
    }
    slices
}
