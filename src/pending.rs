//! In-flight request table keyed by serial.
//!
//! Every submitted request owns a serial and a one-shot completion slot.
//! The table is shared by the submitting side and the read loop, so it
//! sits behind a mutex; no lock is held across an await.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::decoder::DecodedResponse;
use crate::error::{Result, RilError};
use crate::protocol::RequestKind;

/// Receiving side of a request's completion slot.
pub type Completion = oneshot::Receiver<Result<DecodedResponse>>;

struct Entry {
    kind: RequestKind,
    slot: oneshot::Sender<Result<DecodedResponse>>,
}

struct Inner {
    next_serial: u32,
    entries: BTreeMap<u32, Entry>,
}

/// Pending-request table.
pub struct PendingTable {
    inner: Mutex<Inner>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub(crate) fn starting_at(first_serial: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_serial: first_serial,
                entries: BTreeMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a request of `kind` and return its serial and completion.
    ///
    /// Serials increase monotonically and wrap; a serial still in flight is
    /// never handed out twice.
    pub fn allocate(&self, kind: RequestKind) -> (u32, Completion) {
        let (slot, completion) = oneshot::channel();
        let mut inner = self.lock();
        let mut serial = inner.next_serial;
        while inner.entries.contains_key(&serial) {
            serial = serial.wrapping_add(1);
        }
        inner.next_serial = serial.wrapping_add(1);
        inner.entries.insert(serial, Entry { kind, slot });
        debug!("allocated serial {} for {}", serial, kind);
        (serial, completion)
    }

    /// Kind of the request waiting on `serial`, if any.
    pub fn kind_of(&self, serial: u32) -> Option<RequestKind> {
        self.lock().entries.get(&serial).map(|e| e.kind)
    }

    /// Complete `serial` with `outcome`.
    ///
    /// Returns `false` when no request is waiting on that serial, which
    /// includes a second resolve of the same serial.
    pub fn resolve(&self, serial: u32, outcome: Result<DecodedResponse>) -> bool {
        let entry = self.lock().entries.remove(&serial);
        match entry {
            Some(entry) => {
                if entry.slot.send(outcome).is_err() {
                    debug!("caller for serial {} went away", serial);
                }
                true
            }
            None => false,
        }
    }

    /// Resolve every pending request with an error built by `error`.
    pub fn fail_all(&self, error: impl Fn() -> RilError) -> usize {
        let drained = std::mem::take(&mut self.lock().entries);
        let count = drained.len();
        for (serial, entry) in drained {
            let _ = entry.slot.send(Err(error()));
            debug!("failed pending serial {} ({})", serial, entry.kind);
        }
        if count > 0 {
            warn!("failed {} pending requests", count);
        }
        count
    }

    /// Serials and kinds currently in flight, in serial order.
    pub fn snapshot(&self) -> Vec<(u32, RequestKind)> {
        self.lock()
            .entries
            .iter()
            .map(|(serial, e)| (*serial, e.kind))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}
