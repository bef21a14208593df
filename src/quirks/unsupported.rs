use tracing::info;

use super::{Quirk, QuirkContext};
use crate::decoder::radio_capability::{raf_from_string, RAF_UNKNOWN};
use crate::decoder::{DecodedResponse, RadioCapability};
use crate::error::{Result, RilError};
use crate::protocol::{Command, RequestKind};

/// `|`-separated radio access technologies reported by the static capability.
pub const RADIO_ACCESS_FAMILY_PROPERTY: &str = "ril.radio.access.family";

/// Answers commands this modem cannot serve without sending them.
///
/// `GET_HARDWARE_CONFIG` crashes the modem's socket, and the cell info and
/// activity requests are not implemented by its firmware; all of them fail
/// locally with [`RilError::Unsupported`]. `GET_RADIO_CAPABILITY` is answered
/// with a fixed capability built from [`RADIO_ACCESS_FAMILY_PROPERTY`].
pub struct UnsupportedCommands;

impl Quirk for UnsupportedCommands {
    fn name(&self) -> &'static str {
        "unsupported-commands"
    }

    fn submit(&self, command: &Command, ctx: QuirkContext<'_>) -> Option<Result<DecodedResponse>> {
        let kind = command.kind();
        match kind {
            RequestKind::GetHardwareConfig
            | RequestKind::GetCellInfoList
            | RequestKind::SetUnsolCellInfoListRate
            | RequestKind::GetActivityInfo => {
                info!("ignoring {}: not supported by this modem", kind);
                Some(Err(RilError::Unsupported(kind.to_string())))
            }
            RequestKind::GetRadioCapability => {
                let family = ctx.properties.get_or(RADIO_ACCESS_FAMILY_PROPERTY, "");
                let raf = if family.is_empty() {
                    RAF_UNKNOWN
                } else {
                    raf_from_string(&family)
                };
                Some(Ok(DecodedResponse::RadioCapability(RadioCapability::fixed(raf))))
            }
            _ => None,
        }
    }
}
