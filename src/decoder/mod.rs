//! Response decoders - one pure function per message kind.
//!
//! Each decoder reads a payload from a [`ParcelReader`] and produces a
//! [`DecodedResponse`]. Decoders never touch session state; the dispatcher
//! applies any side effects after a successful decode.
//!
//! [`decode_solicited`] and [`decode_unsolicited`] are the baseline tables
//! the dispatcher falls back to when no quirk claims a message.

use bytes::Bytes;

use crate::codec::ParcelReader;
use crate::error::Result;
use crate::protocol::{RequestKind, UnsolicitedKind};

/// Closed enum backed by an `i32` wire value; unknown values are a decode fault.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident = $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl TryFrom<i32> for $name {
            type Error = crate::error::RilError;

            fn try_from(value: i32) -> crate::error::Result<Self> {
                match value {
                    $($value => Ok($name::$variant),)+
                    other => Err(crate::error::RilError::DecodeFault(format!(
                        concat!("unrecognized ", stringify!($name), " {}"),
                        other
                    ))),
                }
            }
        }

        impl $name {
            pub fn to_wire(self) -> i32 {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }
    };
}

pub mod call_list;
pub mod card_status;
pub mod cdma_info;
pub mod fail_cause;
pub mod radio_capability;
pub mod registration;
pub mod signal_strength;

pub use call_list::{CallRecord, CallState, Presentation};
pub use card_status::{AppState, AppStatus, AppType, CardState, CardStatus, PinState, CARD_MAX_APPS};
pub use cdma_info::{CdmaInfoRecord, LineControl, NumberInfo, SignalInfo};
pub use fail_cause::FailCause;
pub use radio_capability::RadioCapability;
pub use registration::RegistrationState;
pub use signal_strength::SignalStrength;

/// Payloads without a specialized decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generic {
    Void,
    Ints(Vec<i32>),
    Strings(Vec<Option<String>>),
    String(Option<String>),
    /// Undecoded payload bytes.
    Raw(Bytes),
}

/// Every value a decoder can produce.
///
/// Failures travel beside this type as [`crate::RilError`] in a `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    CardStatus(CardStatus),
    CallList(Vec<CallRecord>),
    SignalStrength(SignalStrength),
    RegistrationState(RegistrationState),
    FailCause(FailCause),
    RadioCapability(RadioCapability),
    CdmaInfoRecord(CdmaInfoRecord),
    Generic(Generic),
}

impl DecodedResponse {
    pub const VOID: DecodedResponse = DecodedResponse::Generic(Generic::Void);

    pub fn is_void(&self) -> bool {
        matches!(self, DecodedResponse::Generic(Generic::Void))
    }
}

pub fn read_void(_r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    Ok(DecodedResponse::VOID)
}

pub fn read_ints(r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    Ok(DecodedResponse::Generic(Generic::Ints(r.read_int_array()?)))
}

pub fn read_strings(r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    Ok(DecodedResponse::Generic(Generic::Strings(r.read_string_array()?)))
}

pub fn read_string(r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    Ok(DecodedResponse::Generic(Generic::String(r.read_string()?)))
}

pub fn read_raw(r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    let rest = Bytes::copy_from_slice(r.remaining());
    r.set_position(r.position() + rest.len());
    Ok(DecodedResponse::Generic(Generic::Raw(rest)))
}

/// Baseline decoder for a solicited payload of `kind`.
pub fn decode_solicited(kind: RequestKind, r: &mut ParcelReader<'_>) -> Result<DecodedResponse> {
    match kind {
        RequestKind::GetSimStatus => card_status::decode(r).map(DecodedResponse::CardStatus),
        RequestKind::GetCurrentCalls => call_list::decode(r).map(DecodedResponse::CallList),
        RequestKind::LastCallFailCause => fail_cause::decode(r).map(DecodedResponse::FailCause),
        RequestKind::SignalStrength => {
            signal_strength::decode(r).map(DecodedResponse::SignalStrength)
        }
        RequestKind::VoiceRegistrationState | RequestKind::DataRegistrationState => {
            registration::decode(r).map(DecodedResponse::RegistrationState)
        }
        RequestKind::Operator => read_strings(r),
        RequestKind::GetRadioCapability => {
            radio_capability::decode(r).map(DecodedResponse::RadioCapability)
        }
        RequestKind::Dial
        | RequestKind::DialEmergency
        | RequestKind::Hangup
        | RequestKind::RadioPower
        | RequestKind::Answer
        | RequestKind::SetUnsolCellInfoListRate => read_void(r),
        RequestKind::GetCellInfoList
        | RequestKind::GetHardwareConfig
        | RequestKind::GetActivityInfo
        | RequestKind::Other(_) => read_raw(r),
    }
}

/// Baseline decoder for an unsolicited payload of `kind`.
///
/// Returns `None` for kinds the baseline does not recognize. One frame may
/// carry several values (CDMA info records are broadcast one by one).
pub fn decode_unsolicited(
    kind: UnsolicitedKind,
    r: &mut ParcelReader<'_>,
) -> Option<Result<Vec<DecodedResponse>>> {
    let single = |res: Result<DecodedResponse>| Some(res.map(|v| vec![v]));
    match kind {
        UnsolicitedKind::RadioStateChanged => single(read_ints(r)),
        UnsolicitedKind::CallStateChanged => single(read_void(r)),
        UnsolicitedKind::NitzTimeReceived => single(read_string(r)),
        UnsolicitedKind::SignalStrength => {
            single(signal_strength::decode(r).map(DecodedResponse::SignalStrength))
        }
        UnsolicitedKind::CdmaInfoRec => Some(cdma_info::decode(r).map(|records| {
            records
                .into_iter()
                .map(DecodedResponse::CdmaInfoRecord)
                .collect()
        })),
        _ => None,
    }
}
