use tracing::{debug, trace};

use super::{Quirk, QuirkContext};
use crate::codec::ParcelReader;
use crate::decoder::{DecodedResponse, Generic};
use crate::error::{Result, RilError};
use crate::protocol::RequestKind;

pub const HOME_OPERATOR_ALPHA_PROPERTY: &str = "ro.cdma.home.operator.alpha";

/// Replaces the long operator name with the configured home operator.
///
/// The modem reports a generic name on some networks; element 0 of the
/// `OPERATOR` response is always taken from
/// [`HOME_OPERATOR_ALPHA_PROPERTY`], read when the response arrives. An
/// unset property yields an empty name.
pub struct OperatorNameOverride;

impl Quirk for OperatorNameOverride {
    fn name(&self) -> &'static str {
        "operator-name-override"
    }

    fn decode_solicited(
        &self,
        kind: RequestKind,
        r: &mut ParcelReader<'_>,
        ctx: QuirkContext<'_>,
    ) -> Option<Result<DecodedResponse>> {
        if kind != RequestKind::Operator {
            return None;
        }
        Some(override_operator(r, ctx))
    }
}

fn override_operator(r: &mut ParcelReader<'_>, ctx: QuirkContext<'_>) -> Result<DecodedResponse> {
    let mut operators = r.read_string_array()?;
    for (i, op) in operators.iter().enumerate() {
        trace!("operator[{}]: {:?}", i, op);
    }
    let home = ctx.properties.get_or(HOME_OPERATOR_ALPHA_PROPERTY, "");
    let first = operators
        .first_mut()
        .ok_or_else(|| RilError::DecodeFault("empty operator response".to_string()))?;
    debug!("forcing operator name {:?} over {:?}", home, first);
    *first = Some(home);
    Ok(DecodedResponse::Generic(Generic::Strings(operators)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParcelWriter;
    use crate::config::StaticProperties;

    fn decode(fields: &[Option<&str>], props: &StaticProperties) -> Result<DecodedResponse> {
        let mut w = ParcelWriter::new();
        w.write_string_array(fields);
        let bytes = w.freeze();
        OperatorNameOverride
            .decode_solicited(
                RequestKind::Operator,
                &mut ParcelReader::new(&bytes),
                QuirkContext::new(props),
            )
            .unwrap()
    }

    #[test]
    fn test_first_element_replaced() {
        let props = StaticProperties::new().with(HOME_OPERATOR_ALPHA_PROPERTY, "Home Wireless");
        let decoded = decode(&[Some("Roam"), Some("R"), Some("311580")], &props).unwrap();
        assert_eq!(
            decoded,
            DecodedResponse::Generic(Generic::Strings(vec![
                Some("Home Wireless".into()),
                Some("R".into()),
                Some("311580".into()),
            ]))
        );
    }

    #[test]
    fn test_unset_property_blanks_name() {
        let decoded = decode(&[Some("Roam")], &StaticProperties::new()).unwrap();
        assert_eq!(
            decoded,
            DecodedResponse::Generic(Generic::Strings(vec![Some(String::new())]))
        );
    }

    #[test]
    fn test_empty_response_is_fault() {
        let err = decode(&[], &StaticProperties::new()).unwrap_err();
        assert!(matches!(err, RilError::DecodeFault(_)));
    }

    #[test]
    fn test_other_kinds_ignored() {
        let props = StaticProperties::new();
        let mut r = ParcelReader::new(&[]);
        assert!(OperatorNameOverride
            .decode_solicited(RequestKind::SignalStrength, &mut r, QuirkContext::new(&props))
            .is_none());
    }
}
