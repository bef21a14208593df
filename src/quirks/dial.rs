//! Samsung call-details dial layout.
//!
//! The modem expects three extra "call details" fields after the CLIR mode:
//!
//! ```text
//! string address, i32 clir, i32 call_type, i32 call_domain, string csv, <uus>
//! ```
//!
//! Emergency numbers must go out as the vendor `DIAL_EMERGENCY` request with
//! call domain 3 and a trailing zero in place of the UUS block.

use tracing::{debug, warn};

use super::{Quirk, QuirkContext};
use crate::codec::ParcelWriter;
use crate::protocol::{Command, DialParams, RequestKind};

/// Emergency numbers recognized without any configuration.
pub const DEFAULT_EMERGENCY_NUMBERS: [&str; 2] = ["112", "911"];

/// Comma-separated extra emergency numbers.
pub const ECC_LIST_PROPERTY: &str = "ril.ecclist";

const CALL_TYPE_VOICE: i32 = 0;
const CALL_DOMAIN_CS: i32 = 1;
const CALL_DOMAIN_EMERGENCY: i32 = 3;

pub struct ExtendedDial;

impl ExtendedDial {
    pub fn is_emergency_number(address: &str, ctx: QuirkContext<'_>) -> bool {
        let address = address.trim();
        if address.is_empty() {
            return false;
        }
        if DEFAULT_EMERGENCY_NUMBERS.contains(&address) {
            return true;
        }
        ctx.properties
            .get(ECC_LIST_PROPERTY)
            .map(|list| list.split(',').any(|n| n.trim() == address))
            .unwrap_or(false)
    }

    fn write_details(w: &mut ParcelWriter, params: &DialParams, call_domain: i32) {
        w.write_string(Some(&params.address));
        w.write_i32(params.clir);
        w.write_i32(CALL_TYPE_VOICE);
        w.write_i32(call_domain);
        w.write_string(Some(""));
    }

    fn write_emergency(w: &mut ParcelWriter, params: &DialParams) -> RequestKind {
        Self::write_details(w, params, CALL_DOMAIN_EMERGENCY);
        w.write_i32(0);
        RequestKind::DialEmergency
    }
}

impl Quirk for ExtendedDial {
    fn name(&self) -> &'static str {
        "extended-dial"
    }

    fn encode(
        &self,
        command: &Command,
        w: &mut ParcelWriter,
        ctx: QuirkContext<'_>,
    ) -> Option<RequestKind> {
        match command {
            Command::Dial(params) if Self::is_emergency_number(&params.address, ctx) => {
                debug!("rerouting dial to {} as emergency", params.address);
                Some(Self::write_emergency(w, params))
            }
            Command::Dial(params) => {
                Self::write_details(w, params, CALL_DOMAIN_CS);
                params.write_uus(w);
                Some(RequestKind::Dial)
            }
            Command::DialEmergency(params) => Some(Self::write_emergency(w, params)),
            Command::Raw {
                kind: RequestKind::Dial | RequestKind::DialEmergency,
                ..
            } => match command.to_typed() {
                Ok(Some(typed)) => self.encode(&typed, w, ctx),
                Ok(None) => None,
                Err(e) => {
                    warn!("raw dial left on the baseline layout: {}", e);
                    None
                }
            },
            _ => None,
        }
    }
}
