use tracing::trace;

use super::{Quirk, QuirkContext};
use crate::codec::ParcelReader;
use crate::decoder::{registration, DecodedResponse};
use crate::error::Result;
use crate::protocol::RequestKind;

/// Traces every element of voice and data registration responses.
pub struct RegistrationStateTrace;

impl Quirk for RegistrationStateTrace {
    fn name(&self) -> &'static str {
        "registration-state-trace"
    }

    fn decode_solicited(
        &self,
        kind: RequestKind,
        r: &mut ParcelReader<'_>,
        _ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        match kind {
            RequestKind::VoiceRegistrationState | RequestKind::DataRegistrationState => {}
            _ => return None,
        }
        Some(registration::decode(r).map(|state| {
            trace!("{}: {} fields", kind, state.fields.len());
            for (i, field) in state.fields.iter().enumerate() {
                trace!("{}[{}]: {:?}", kind, i, field);
            }
            DecodedResponse::RegistrationState(state)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParcelWriter;
    use crate::config::StaticProperties;

    #[test]
    fn test_data_registration_decoded() {
        let mut w = ParcelWriter::new();
        w.write_string_array(&[Some("1"), None, None, Some("14")]);
        let bytes = w.freeze();
        let props = StaticProperties::new();
        let decoded = RegistrationStateTrace
            .decode_solicited(
                RequestKind::DataRegistrationState,
                &mut ParcelReader::new(&bytes),
                QuirkContext::new(&props),
            )
            .unwrap()
            .unwrap();
        match decoded {
            DecodedResponse::RegistrationState(state) => {
                assert_eq!(state.reg_state(), Some(1));
                assert_eq!(state.radio_technology(), Some(14));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
