use tracing::warn;

use super::Quirk;
use crate::decoder::{CdmaInfoRecord, DecodedResponse};
use crate::dispatch::{Event, EventKind};
use crate::protocol::UnsolicitedKind;

/// Drops the IS-54B long-ring signal info record.
///
/// The modem sends it just before an incoming call while the voice path is
/// muted. Downstream tone players may handle the "signal off" that follows
/// before this record and then ring for the rest of the call.
pub struct SignalInfoToneFilter;

impl Quirk for SignalInfoToneFilter {
    fn name(&self) -> &'static str {
        "signal-info-tone-filter"
    }

    fn filter_event(&self, event: &Event) -> bool {
        match (&event.kind, &event.value) {
            (
                EventKind::Unsolicited(UnsolicitedKind::CdmaInfoRec),
                DecodedResponse::CdmaInfoRecord(CdmaInfoRecord::Signal(info)),
            ) if info.is_spurious_is54b_ring() => {
                warn!("dropping signal info record {:?}", info);
                false
            }
            _ => true,
        }
    }
}
