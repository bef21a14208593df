use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{
    ExtendedDial, OperatorNameOverride, Quirk, QuirkContext, RegistrationStateTrace,
    SignalInfoToneFilter, UnsupportedCommands, VendorUnsolicited,
};
use crate::codec::{ParcelReader, ParcelWriter};
use crate::decoder::DecodedResponse;
use crate::dispatch::Event;
use crate::error::Result;
use crate::protocol::{Command, RequestKind, UnsolicitedKind};

/// Ordered list of quirks; the first one to claim a message wins.
#[derive(Clone, Default)]
pub struct QuirkChain {
    quirks: Vec<Arc<dyn Quirk>>,
}

impl QuirkChain {
    /// A chain with no quirks: pure baseline behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every quirk needed by Samsung CDMA/LTE modems of the Galaxy S4 era.
    pub fn samsung_cdma_lte() -> Self {
        Self::new()
            .with(UnsupportedCommands)
            .with(ExtendedDial)
            .with(OperatorNameOverride)
            .with(RegistrationStateTrace)
            .with(VendorUnsolicited)
            .with(SignalInfoToneFilter)
    }

    pub fn with(mut self, quirk: impl Quirk + 'static) -> Self {
        self.push(Arc::new(quirk));
        self
    }

    pub fn push(&mut self, quirk: Arc<dyn Quirk>) {
        debug!("registered quirk {}", quirk.name());
        self.quirks.push(quirk);
    }

    pub fn len(&self) -> usize {
        self.quirks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quirks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.quirks.iter().map(|q| q.name()).collect()
    }

    pub fn submit(
        &self,
        command: &Command,
        ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        self.quirks.iter().find_map(|q| {
            let answer = q.submit(command, ctx)?;
            debug!("{} answered {} locally", q.name(), command.kind());
            Some(answer)
        })
    }

    /// Alternate kind and body for `command`, if any quirk rewrites it.
    pub fn encode(&self, command: &Command, ctx: QuirkContext<'_>) -> Option<(RequestKind, Bytes)> {
        self.quirks.iter().find_map(|q| {
            let mut w = ParcelWriter::new();
            let kind = q.encode(command, &mut w, ctx)?;
            trace!("{} encoded {} as {}", q.name(), command.kind(), kind);
            Some((kind, w.freeze()))
        })
    }

    pub fn decode_solicited(
        &self,
        kind: RequestKind,
        r: &mut ParcelReader<'_>,
        ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        let start = r.position();
        for q in &self.quirks {
            if let Some(decoded) = q.decode_solicited(kind, r, ctx) {
                trace!("{} decoded {}", q.name(), kind);
                return Some(decoded);
            }
            r.set_position(start);
        }
        None
    }

    pub fn decode_unsolicited(
        &self,
        kind: UnsolicitedKind,
        r: &mut ParcelReader<'_>,
        ctx: QuirkContext<'_>,
    ) -> Option<Result<Vec<DecodedResponse>>> {
        let start = r.position();
        for q in &self.quirks {
            if let Some(decoded) = q.decode_unsolicited(kind, r, ctx) {
                trace!("{} decoded unsolicited {}", q.name(), kind);
                return Some(decoded);
            }
            r.set_position(start);
        }
        None
    }

    /// `true` when every quirk lets `event` through.
    pub fn filter_event(&self, event: &Event) -> bool {
        self.quirks.iter().all(|q| q.filter_event(event))
    }
}

impl fmt::Debug for QuirkChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
