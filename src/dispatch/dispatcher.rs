use std::sync::Arc;

use tracing::{debug, info, warn};

use super::events::{Event, EventBus, EventKind};
use super::state::SessionState;
use crate::config::PropertySource;
use crate::decoder::{self, CallRecord, DecodedResponse};
use crate::error::{RadioError, Result, RilError};
use crate::pending::PendingTable;
use crate::protocol::{Frame, FrameKind, RequestKind, UnsolicitedKind};
use crate::quirks::{QuirkChain, QuirkContext};

/// Routes decoded inbound frames.
///
/// Dispatch never fails: problems with a single frame are logged and the
/// frame is dropped, so one bad message cannot stall the read loop.
pub struct Dispatcher {
    pending: Arc<PendingTable>,
    events: Arc<EventBus>,
    state: Arc<SessionState>,
    quirks: QuirkChain,
    properties: Arc<dyn PropertySource>,
}

impl Dispatcher {
    pub fn new(
        pending: Arc<PendingTable>,
        events: Arc<EventBus>,
        state: Arc<SessionState>,
        quirks: QuirkChain,
        properties: Arc<dyn PropertySource>,
    ) -> Self {
        Self {
            pending,
            events,
            state,
            quirks,
            properties,
        }
    }

    fn ctx(&self) -> QuirkContext<'_> {
        QuirkContext::new(self.properties.as_ref())
    }

    pub fn dispatch(&self, frame: &Frame) {
        match frame.kind {
            FrameKind::Solicited { serial, error } => self.dispatch_solicited(frame, serial, error),
            FrameKind::Unsolicited => self.dispatch_unsolicited(frame),
        }
    }

    fn dispatch_solicited(&self, frame: &Frame, serial: u32, error: i32) {
        let kind = match self.pending.kind_of(serial) {
            Some(kind) => kind,
            None => {
                warn!("{}, dropping response", RilError::UnknownSerial(serial));
                return;
            }
        };

        let outcome = if error != 0 {
            let error = RadioError(error);
            debug!("[{}] < {} error {}", serial, kind, error);
            Err(RilError::Remote(error))
        } else {
            self.decode_solicited(kind, frame)
        };

        if let Ok(DecodedResponse::CallList(calls)) = &outcome {
            self.apply_call_list_effects(calls);
        }
        if !self.pending.resolve(serial, outcome) {
            // Raced with teardown.
            debug!("serial {} resolved elsewhere", serial);
        }
    }

    fn decode_solicited(&self, kind: RequestKind, frame: &Frame) -> Result<DecodedResponse> {
        let mut r = frame.body();
        if r.data_avail() == 0 {
            debug!("< {} (empty)", kind);
            return Ok(DecodedResponse::VOID);
        }

        let start = r.position();
        let decoded = match self.quirks.decode_solicited(kind, &mut r, self.ctx()) {
            Some(decoded) => decoded,
            None => {
                r.set_position(start);
                decoder::decode_solicited(kind, &mut r)
            }
        };

        match decoded {
            Ok(value) => {
                if r.data_avail() > 0 {
                    debug!("{}: {} trailing bytes ignored", kind, r.data_avail());
                }
                debug!("< {} {:?}", kind, value);
                Ok(value)
            }
            Err(e) => {
                warn!("invalid {} response: {}", kind, e);
                Err(e.into_decode_fault())
            }
        }
    }

    fn apply_call_list_effects(&self, calls: &[CallRecord]) {
        for call in calls {
            let kind = if call.is_voice_privacy {
                EventKind::VoicePrivacyOn
            } else {
                EventKind::VoicePrivacyOff
            };
            self.publish(Event::new(kind, DecodedResponse::VOID));
        }

        if calls.is_empty() && self.state.take_emergency_dial() {
            info!("call list empty after emergency dial, notifying call ended");
            self.publish(Event::new(
                EventKind::EmergencyCallEnded,
                DecodedResponse::VOID,
            ));
        }
    }

    fn dispatch_unsolicited(&self, frame: &Frame) {
        let mut r = frame.body();
        let kind = match r.read_u32() {
            Ok(id) => UnsolicitedKind::from_id(id),
            Err(e) => {
                warn!("unsolicited frame without id: {}", e);
                return;
            }
        };

        let start = r.position();
        let decoded = match self.quirks.decode_unsolicited(kind, &mut r, self.ctx()) {
            Some(decoded) => decoded,
            None => {
                r.set_position(start);
                match decoder::decode_unsolicited(kind, &mut r) {
                    Some(decoded) => decoded,
                    None => {
                        warn!("unrecognized unsolicited response {}, dropping", kind);
                        return;
                    }
                }
            }
        };

        let values = match decoded {
            Ok(values) => values,
            Err(e) => {
                warn!("invalid unsolicited {}: {}", kind, e);
                return;
            }
        };
        for value in values {
            self.publish(Event::new(kind, value));
        }
    }

    fn publish(&self, event: Event) {
        if !self.quirks.filter_event(&event) {
            debug!("event {} suppressed", event.kind);
            return;
        }
        debug!("[UNSL] {} {:?}", event.kind, event.value);
        self.events.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::sync::broadcast::error::TryRecvError;

    use crate::codec::ParcelWriter;
    use crate::config::StaticProperties;
    use crate::decoder::call_list::tests::write_call;
    use crate::decoder::card_status::tests::card_payload;
    use crate::decoder::cdma_info::tests::{write_signal, SPURIOUS_RING};
    use crate::decoder::signal_strength::tests::payload as signal_payload;
    use crate::decoder::{CdmaInfoRecord, Generic, SignalInfo};
    use crate::protocol::{build_solicited, build_unsolicited, LENGTH_PREFIX_SIZE};
    use crate::quirks::OperatorNameOverride;

    struct Harness {
        pending: Arc<PendingTable>,
        events: Arc<EventBus>,
        state: Arc<SessionState>,
        dispatcher: Dispatcher,
    }

    fn harness(quirks: QuirkChain, props: StaticProperties) -> Harness {
        let pending = Arc::new(PendingTable::new());
        let events = Arc::new(EventBus::default());
        let state = Arc::new(SessionState::new());
        let dispatcher = Dispatcher::new(
            pending.clone(),
            events.clone(),
            state.clone(),
            quirks,
            Arc::new(props),
        );
        Harness {
            pending,
            events,
            state,
            dispatcher,
        }
    }

    fn frame(record: Vec<u8>) -> Frame {
        Frame::decode(Bytes::from(record).slice(LENGTH_PREFIX_SIZE..)).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_skips_decoder() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let (serial, completion) = h.pending.allocate(RequestKind::GetSimStatus);
        // Garbage payload would fail to decode.
        h.dispatcher.dispatch(&frame(build_solicited(serial, 2, &[0xff; 3])));

        let outcome = completion.await.unwrap();
        assert!(matches!(
            outcome,
            Err(RilError::Remote(RadioError::GENERIC_FAILURE))
        ));
    }

    #[tokio::test]
    async fn test_empty_payload_is_void() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let (serial, completion) = h.pending.allocate(RequestKind::GetSimStatus);
        h.dispatcher.dispatch(&frame(build_solicited(serial, 0, &[])));
        assert!(completion.await.unwrap().unwrap().is_void());
    }

    #[tokio::test]
    async fn test_card_status_resolves() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let (serial, completion) = h.pending.allocate(RequestKind::GetSimStatus);
        let payload = card_payload(1, 1);
        h.dispatcher
            .dispatch(&frame(build_solicited(serial, 0, payload.as_bytes())));

        match completion.await.unwrap().unwrap() {
            DecodedResponse::CardStatus(status) => assert_eq!(status.applications.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert!(h.pending.is_empty());
    }

    #[tokio::test]
    async fn test_truncated_payload_is_decode_fault() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let (serial, completion) = h.pending.allocate(RequestKind::SignalStrength);
        let mut w = ParcelWriter::new();
        w.write_i32(3);
        h.dispatcher
            .dispatch(&frame(build_solicited(serial, 0, w.as_bytes())));
        assert!(matches!(
            completion.await.unwrap(),
            Err(RilError::DecodeFault(_))
        ));
    }

    #[test]
    fn test_unknown_serial_dropped() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let (_serial, _completion) = h.pending.allocate(RequestKind::Operator);
        h.dispatcher.dispatch(&frame(build_solicited(9999, 0, &[])));
        assert_eq!(h.pending.len(), 1);
    }

    #[tokio::test]
    async fn test_quirk_decoder_used_for_operator() {
        let props = StaticProperties::new().with("ro.cdma.home.operator.alpha", "Home");
        let h = harness(QuirkChain::new().with(OperatorNameOverride), props);
        let (serial, completion) = h.pending.allocate(RequestKind::Operator);
        let mut w = ParcelWriter::new();
        w.write_string_array(&[Some("Roam"), Some("R"), Some("310000")]);
        h.dispatcher
            .dispatch(&frame(build_solicited(serial, 0, w.as_bytes())));

        let value = completion.await.unwrap().unwrap();
        assert_eq!(
            value,
            DecodedResponse::Generic(Generic::Strings(vec![
                Some("Home".into()),
                Some("R".into()),
                Some("310000".into()),
            ]))
        );
    }

    #[tokio::test]
    async fn test_call_list_effects() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let mut on = h.events.subscribe(EventKind::VoicePrivacyOn);
        let mut off = h.events.subscribe(EventKind::VoicePrivacyOff);
        let mut ended = h.events.subscribe(EventKind::EmergencyCallEnded);

        let (serial, completion) = h.pending.allocate(RequestKind::GetCurrentCalls);
        let mut w = ParcelWriter::new();
        w.write_i32(2);
        write_call(&mut w, 2, "100", 129, true, None);
        write_call(&mut w, 1, "200", 129, false, None);
        h.dispatcher
            .dispatch(&frame(build_solicited(serial, 0, w.as_bytes())));
        completion.await.unwrap().unwrap();

        assert!(on.try_recv().is_ok());
        assert!(off.try_recv().is_ok());
        assert!(matches!(ended.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_empty_call_list_ends_emergency_once() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let mut ended = h.events.subscribe(EventKind::EmergencyCallEnded);
        h.state.set_emergency_dial_in_progress(true);

        let mut w = ParcelWriter::new();
        w.write_i32(0);
        for _ in 0..2 {
            let (serial, completion) = h.pending.allocate(RequestKind::GetCurrentCalls);
            h.dispatcher
                .dispatch(&frame(build_solicited(serial, 0, w.as_bytes())));
            completion.await.unwrap().unwrap();
        }

        assert!(ended.try_recv().is_ok());
        assert!(matches!(ended.try_recv(), Err(TryRecvError::Empty)));
        assert!(!h.state.emergency_dial_in_progress());
    }

    #[test]
    fn test_unsolicited_signal_strength_broadcast() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let mut rx = h.events.subscribe(UnsolicitedKind::SignalStrength);
        let payload = signal_payload([10, 0, -75, -90, -80, -100, 6, 0xff, 1, 2, 3, 4, -60]);
        h.dispatcher.dispatch(&frame(build_unsolicited(
            UnsolicitedKind::SignalStrength.id(),
            &payload,
        )));

        let event = rx.try_recv().unwrap();
        match event.value {
            DecodedResponse::SignalStrength(s) => assert_eq!(s.lte_signal_strength, 99),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_unsolicited_dropped() {
        let h = harness(QuirkChain::new(), StaticProperties::new());
        let mut rx = h.events.subscribe(UnsolicitedKind::Other(4242));
        h.dispatcher.dispatch(&frame(build_unsolicited(4242, &[])));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_signal_info_suppression() {
        let h = harness(QuirkChain::samsung_cdma_lte(), StaticProperties::new());
        let mut rx = h.events.subscribe(UnsolicitedKind::CdmaInfoRec);

        let mut w = ParcelWriter::new();
        w.write_i32(1);
        write_signal(&mut w, SPURIOUS_RING);
        h.dispatcher.dispatch(&frame(build_unsolicited(
            UnsolicitedKind::CdmaInfoRec.id(),
            w.as_bytes(),
        )));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        let other = SignalInfo {
            alert_pitch: 1,
            ..SPURIOUS_RING
        };
        let mut w = ParcelWriter::new();
        w.write_i32(1);
        write_signal(&mut w, other);
        h.dispatcher.dispatch(&frame(build_unsolicited(
            UnsolicitedKind::CdmaInfoRec.id(),
            w.as_bytes(),
        )));
        let event = rx.try_recv().unwrap();
        assert_eq!(
            event.value,
            DecodedResponse::CdmaInfoRecord(CdmaInfoRecord::Signal(other))
        );
    }

    #[test]
    fn test_vendor_unsolicited_needs_quirk() {
        let baseline = harness(QuirkChain::new(), StaticProperties::new());
        let mut rx = baseline.events.subscribe(UnsolicitedKind::DeviceReady);
        baseline.dispatcher.dispatch(&frame(build_unsolicited(
            UnsolicitedKind::DeviceReady.id(),
            &[],
        )));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        let samsung = harness(QuirkChain::samsung_cdma_lte(), StaticProperties::new());
        let mut rx = samsung.events.subscribe(UnsolicitedKind::DeviceReady);
        samsung.dispatcher.dispatch(&frame(build_unsolicited(
            UnsolicitedKind::DeviceReady.id(),
            &[],
        )));
        assert!(rx.try_recv().unwrap().value.is_void());
    }
}
