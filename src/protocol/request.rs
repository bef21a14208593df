//! Outbound requests: typed commands and their baseline field layouts.

use bytes::Bytes;

use super::kinds::RequestKind;
use super::wire_format::build_record;
use crate::codec::{ParcelReader, ParcelWriter};
use crate::error::{Result, RilError};

/// User-to-user signalling block attached to a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UusInfo {
    pub uus_type: i32,
    pub dcs: i32,
    pub data: Option<Vec<u8>>,
}

impl UusInfo {
    pub(crate) fn write(&self, w: &mut ParcelWriter) {
        w.write_i32(self.uus_type);
        w.write_i32(self.dcs);
        w.write_byte_array(self.data.as_deref());
    }

    pub(crate) fn read(r: &mut ParcelReader<'_>) -> Result<Self> {
        Ok(Self {
            uus_type: r.read_i32()?,
            dcs: r.read_i32()?,
            data: r.read_byte_array()?,
        })
    }
}

/// Parameters of a voice dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialParams {
    pub address: String,
    /// CLIR mode: 0 = subscription default, 1 = invocation, 2 = suppression.
    pub clir: i32,
    pub uus: Option<UusInfo>,
}

impl DialParams {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            clir: 0,
            uus: None,
        }
    }

    /// Write the optional UUS block behind its presence flag.
    pub(crate) fn write_uus(&self, w: &mut ParcelWriter) {
        match &self.uus {
            None => w.write_i32(0),
            Some(uus) => {
                w.write_i32(1);
                uus.write(w);
            }
        }
    }
}

/// A single untyped parcel field for [`Command::Raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Int(i32),
    Str(Option<String>),
    Bytes(Option<Vec<u8>>),
}

/// A request as issued by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetSimStatus,
    GetCurrentCalls,
    Dial(DialParams),
    DialEmergency(DialParams),
    Hangup { index: i32 },
    LastCallFailCause,
    SignalStrength,
    VoiceRegistrationState,
    DataRegistrationState,
    Operator,
    RadioPower { on: bool },
    Answer,
    GetCellInfoList,
    SetCellInfoListRate { rate_ms: i32 },
    GetHardwareConfig,
    GetRadioCapability,
    GetActivityInfo,
    /// Any request kind with caller-supplied fields.
    Raw { kind: RequestKind, fields: Vec<Field> },
}

impl Command {
    pub fn kind(&self) -> RequestKind {
        match self {
            Command::GetSimStatus => RequestKind::GetSimStatus,
            Command::GetCurrentCalls => RequestKind::GetCurrentCalls,
            Command::Dial(_) => RequestKind::Dial,
            Command::DialEmergency(_) => RequestKind::DialEmergency,
            Command::Hangup { .. } => RequestKind::Hangup,
            Command::LastCallFailCause => RequestKind::LastCallFailCause,
            Command::SignalStrength => RequestKind::SignalStrength,
            Command::VoiceRegistrationState => RequestKind::VoiceRegistrationState,
            Command::DataRegistrationState => RequestKind::DataRegistrationState,
            Command::Operator => RequestKind::Operator,
            Command::RadioPower { .. } => RequestKind::RadioPower,
            Command::Answer => RequestKind::Answer,
            Command::GetCellInfoList => RequestKind::GetCellInfoList,
            Command::SetCellInfoListRate { .. } => RequestKind::SetUnsolCellInfoListRate,
            Command::GetHardwareConfig => RequestKind::GetHardwareConfig,
            Command::GetRadioCapability => RequestKind::GetRadioCapability,
            Command::GetActivityInfo => RequestKind::GetActivityInfo,
            Command::Raw { kind, .. } => *kind,
        }
    }

    /// Write the baseline field layout for this command.
    pub fn encode_fields(&self, w: &mut ParcelWriter) {
        match self {
            Command::Dial(p) | Command::DialEmergency(p) => {
                w.write_string(Some(&p.address));
                w.write_i32(p.clir);
                p.write_uus(w);
            }
            Command::Hangup { index } => w.write_int_array(&[*index]),
            Command::RadioPower { on } => w.write_int_array(&[*on as i32]),
            Command::SetCellInfoListRate { rate_ms } => w.write_int_array(&[*rate_ms]),
            Command::Raw { fields, .. } => {
                for field in fields {
                    match field {
                        Field::Int(v) => w.write_i32(*v),
                        Field::Str(s) => w.write_string(s.as_deref()),
                        Field::Bytes(b) => w.write_byte_array(b.as_deref()),
                    }
                }
            }
            _ => {}
        }
    }

    /// Typed form of a [`Command::Raw`] whose kind has one.
    ///
    /// Quirks key on typed commands, so a raw `DIAL` or `GET_HARDWARE_CONFIG`
    /// must not bypass them. Returns `Ok(None)` for typed commands and for
    /// vendor kinds. Fails when the raw fields do not follow the kind's
    /// baseline layout.
    pub fn to_typed(&self) -> Result<Option<Command>> {
        let kind = match self {
            Command::Raw { kind, .. } if !matches!(kind, RequestKind::Other(_)) => *kind,
            _ => return Ok(None),
        };
        let mut w = ParcelWriter::new();
        self.encode_fields(&mut w);
        let body = w.freeze();
        let mut r = ParcelReader::new(&body);
        let typed = Command::decode(kind, &mut r)?;
        if r.data_avail() > 0 {
            return Err(RilError::Protocol(format!(
                "raw {} carries {} bytes past its layout",
                kind,
                r.data_avail()
            )));
        }
        Ok(Some(typed))
    }

    /// Inverse of [`Command::encode_fields`] for every typed command.
    ///
    /// Kinds without a typed command decode to [`Command::Raw`] with no
    /// fields; their layout is not known here.
    pub fn decode(kind: RequestKind, r: &mut ParcelReader<'_>) -> Result<Self> {
        Ok(match kind {
            RequestKind::GetSimStatus => Command::GetSimStatus,
            RequestKind::GetCurrentCalls => Command::GetCurrentCalls,
            RequestKind::Dial | RequestKind::DialEmergency => {
                let address = r.read_string()?.unwrap_or_default();
                let clir = r.read_i32()?;
                let uus = match r.read_i32()? {
                    0 => None,
                    _ => Some(UusInfo::read(r)?),
                };
                let params = DialParams { address, clir, uus };
                if kind == RequestKind::Dial {
                    Command::Dial(params)
                } else {
                    Command::DialEmergency(params)
                }
            }
            RequestKind::Hangup => Command::Hangup {
                index: single_int(kind, r)?,
            },
            RequestKind::LastCallFailCause => Command::LastCallFailCause,
            RequestKind::SignalStrength => Command::SignalStrength,
            RequestKind::VoiceRegistrationState => Command::VoiceRegistrationState,
            RequestKind::DataRegistrationState => Command::DataRegistrationState,
            RequestKind::Operator => Command::Operator,
            RequestKind::RadioPower => Command::RadioPower {
                on: single_int(kind, r)? != 0,
            },
            RequestKind::Answer => Command::Answer,
            RequestKind::GetCellInfoList => Command::GetCellInfoList,
            RequestKind::SetUnsolCellInfoListRate => Command::SetCellInfoListRate {
                rate_ms: single_int(kind, r)?,
            },
            RequestKind::GetHardwareConfig => Command::GetHardwareConfig,
            RequestKind::GetRadioCapability => Command::GetRadioCapability,
            RequestKind::GetActivityInfo => Command::GetActivityInfo,
            RequestKind::Other(_) => Command::Raw {
                kind,
                fields: Vec::new(),
            },
        })
    }
}

fn single_int(kind: RequestKind, r: &mut ParcelReader<'_>) -> Result<i32> {
    match r.read_int_array()?.as_slice() {
        [v] => Ok(*v),
        other => Err(RilError::Protocol(format!(
            "expected one int for {}, got {}",
            kind,
            other.len()
        ))),
    }
}

/// Request parcel `i32 request_id, i32 serial, fields...` without a length prefix.
pub fn request_parcel(serial: u32, kind: RequestKind, body: &[u8]) -> Bytes {
    let mut w = ParcelWriter::with_capacity(8 + body.len());
    w.write_u32(kind.id());
    w.write_u32(serial);
    w.write_raw(body);
    w.freeze()
}

/// Build a length-prefixed request record from an encoded field body.
pub fn encode_request(serial: u32, kind: RequestKind, body: &[u8]) -> Vec<u8> {
    build_record(&request_parcel(serial, kind, body))
}

/// An outbound request parcel as seen by the modem.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub kind: RequestKind,
    pub serial: u32,
    /// Field body after the two header ints.
    pub body: Bytes,
}

impl RequestRecord {
    /// Split a request parcel (without length prefix) into header and body.
    pub fn decode(parcel: Bytes) -> Result<Self> {
        let mut r = ParcelReader::new(&parcel);
        let kind = RequestKind::from_id(r.read_u32()?);
        let serial = r.read_u32()?;
        let offset = r.position();
        Ok(Self {
            kind,
            serial,
            body: parcel.slice(offset..),
        })
    }

    /// Decode the body with the baseline layout for [`RequestRecord::kind`].
    pub fn command(&self) -> Result<Command> {
        Command::decode(self.kind, &mut ParcelReader::new(&self.body))
    }

    pub fn reader(&self) -> ParcelReader<'_> {
        ParcelReader::new(&self.body)
    }
}
