//! Current call list.
//!
//! ```text
//! i32 count,
//! count x {
//!     i32 state, i32 index, i32 toa, i32 is_mpty, i32 is_mt, i32 als,
//!     i32 is_voice, i32 is_voice_privacy,
//!     string number, i32 number_presentation,
//!     string name, i32 name_presentation,
//!     i32 uus_present, [i32 uus_type, i32 uus_dcs, byte[] uus_data]
//! }
//! ```
//!
//! The returned list is sorted by call index.

use tracing::trace;

use crate::codec::ParcelReader;
use crate::error::Result;
use crate::protocol::UusInfo;

/// Type-of-address value for international numbers.
pub const TOA_INTERNATIONAL: i32 = 145;

wire_enum! {
    /// Call state as reported by `+CLCC`.
    pub enum CallState {
        Active = 0,
        Holding = 1,
        Dialing = 2,
        Alerting = 3,
        Incoming = 4,
        Waiting = 5,
    }
}

wire_enum! {
    /// Number presentation as reported by `+CLIP`.
    pub enum Presentation {
        Allowed = 0,
        Restricted = 1,
        Unknown = 2,
        Payphone = 3,
    }
}

/// One entry of the call list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub state: CallState,
    /// Connection index, 1-based.
    pub index: i32,
    pub type_of_address: i32,
    pub is_multiparty: bool,
    pub is_mobile_terminated: bool,
    pub als_line: i32,
    pub is_voice: bool,
    pub is_voice_privacy: bool,
    pub number: Option<String>,
    pub number_presentation: Presentation,
    pub name: Option<String>,
    pub name_presentation: i32,
    pub user_to_user_signaling_info: Option<UusInfo>,
}

/// Prefix international numbers with `+`.
pub fn normalize_number(number: Option<String>, toa: i32) -> Option<String> {
    match number {
        Some(n) if toa == TOA_INTERNATIONAL && !n.starts_with('+') => Some(format!("+{}", n)),
        other => other,
    }
}

fn read_call(r: &mut ParcelReader<'_>) -> Result<CallRecord> {
    let state = CallState::try_from(r.read_i32()?)?;
    let index = r.read_i32()? & 0xff;
    let type_of_address = r.read_i32()?;
    let is_multiparty = r.read_bool()?;
    let is_mobile_terminated = r.read_bool()?;
    let als_line = r.read_i32()?;
    let is_voice = r.read_bool()?;
    let is_voice_privacy = r.read_bool()?;
    let number = r.read_string()?;
    let number_presentation = Presentation::try_from(r.read_i32()?)?;
    let name = r.read_string()?;
    let name_presentation = r.read_i32()?;

    let user_to_user_signaling_info = if r.read_i32()? == 1 {
        Some(UusInfo::read(r)?)
    } else {
        trace!("call {}: no UUS block", index);
        None
    };

    Ok(CallRecord {
        state,
        index,
        type_of_address,
        is_multiparty,
        is_mobile_terminated,
        als_line,
        is_voice,
        is_voice_privacy,
        number: normalize_number(number, type_of_address),
        number_presentation,
        name,
        name_presentation,
        user_to_user_signaling_info,
    })
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<Vec<CallRecord>> {
    let count = r.read_count(4)?;
    let mut calls = Vec::with_capacity(count);
    for _ in 0..count {
        let call = read_call(r)?;
        trace!("call {:?}", call);
        calls.push(call);
    }
    calls.sort_by_key(|c| c.index);
    Ok(calls)
}
