use super::{Quirk, QuirkContext};
use crate::codec::ParcelReader;
use crate::decoder::{self, DecodedResponse};
use crate::error::Result;
use crate::protocol::UnsolicitedKind;

/// Decodes the Samsung-only unsolicited messages.
///
/// | id    | kind                     | payload |
/// |-------|--------------------------|---------|
/// | 1036  | `ImsNetworkStateChanged` | void    |
/// | 11008 | `DeviceReady`            | void    |
/// | 11010 | `Am`                     | string  |
/// | 11017 | `WbAmrState`             | ints    |
/// | 11021 | `Handover`               | void    |
pub struct VendorUnsolicited;

impl Quirk for VendorUnsolicited {
    fn name(&self) -> &'static str {
        "vendor-unsolicited"
    }

    fn decode_unsolicited(
        &self,
        kind: UnsolicitedKind,
        r: &mut ParcelReader<'_>,
        _ctx: QuirkContext<'_>,
    ) -> Option<Result<Vec<DecodedResponse>>> {
        let decoded = match kind {
            UnsolicitedKind::ImsNetworkStateChanged
            | UnsolicitedKind::DeviceReady
            | UnsolicitedKind::Handover => decoder::read_void(r),
            UnsolicitedKind::Am => decoder::read_string(r),
            UnsolicitedKind::WbAmrState => decoder::read_ints(r),
            _ => return None,
        };
        Some(decoded.map(|value| vec![value]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParcelWriter;
    use crate::config::StaticProperties;
    use crate::decoder::Generic;

    fn decode(kind: UnsolicitedKind, bytes: &[u8]) -> Option<Result<Vec<DecodedResponse>>> {
        let props = StaticProperties::new();
        VendorUnsolicited.decode_unsolicited(
            kind,
            &mut ParcelReader::new(bytes),
            QuirkContext::new(&props),
        )
    }

    #[test]
    fn test_wb_amr_state_ints() {
        let mut w = ParcelWriter::new();
        w.write_int_array(&[1]);
        let values = decode(UnsolicitedKind::WbAmrState, w.as_bytes())
            .unwrap()
            .unwrap();
        assert_eq!(values, vec![DecodedResponse::Generic(Generic::Ints(vec![1]))]);
    }

    #[test]
    fn test_am_string() {
        let mut w = ParcelWriter::new();
        w.write_string(Some("broadcast"));
        let values = decode(UnsolicitedKind::Am, w.as_bytes()).unwrap().unwrap();
        assert_eq!(
            values,
            vec![DecodedResponse::Generic(Generic::String(Some("broadcast".into())))]
        );
    }

    #[test]
    fn test_void_kinds() {
        for kind in [
            UnsolicitedKind::ImsNetworkStateChanged,
            UnsolicitedKind::DeviceReady,
            UnsolicitedKind::Handover,
        ] {
            let values = decode(kind, &[]).unwrap().unwrap();
            assert!(values[0].is_void());
        }
    }

    #[test]
    fn test_baseline_kinds_fall_through() {
        assert!(decode(UnsolicitedKind::SignalStrength, &[]).is_none());
    }
}
