//! CDMA information records (IS-2000 5.3.7).
//!
//! ```text
//! i32 count, count x { i32 record_id, fields... }
//! ```

use tracing::trace;

use crate::codec::ParcelReader;
use crate::error::{Result, RilError};

const DISPLAY: i32 = 0;
const CALLED_PARTY_NUMBER: i32 = 1;
const CALLING_PARTY_NUMBER: i32 = 2;
const CONNECTED_NUMBER: i32 = 3;
const SIGNAL_INFO: i32 = 4;
const REDIRECTING_NUMBER: i32 = 5;
const LINE_CONTROL: i32 = 6;
const EXTENDED_DISPLAY: i32 = 7;
const T53_CLIR: i32 = 8;
const T53_RELEASE: i32 = 9;
const T53_AUDIO_CONTROL: i32 = 10;

/// Signal types.
pub const SIGNAL_TYPE_TONE: i32 = 0;
pub const SIGNAL_TYPE_ISDN_ALERTING: i32 = 1;
pub const SIGNAL_TYPE_IS54B: i32 = 2;

/// Alert pitches.
pub const ALERT_PITCH_MED: i32 = 0;
pub const ALERT_PITCH_HIGH: i32 = 1;
pub const ALERT_PITCH_LOW: i32 = 2;

/// IS-54B alerting signals.
pub const IS54B_NO_TONE: i32 = 0;
pub const IS54B_L: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberInfo {
    pub number: Option<String>,
    pub number_type: i32,
    pub number_plan: i32,
    pub pi: i32,
    pub si: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalInfo {
    pub is_present: bool,
    pub signal_type: i32,
    pub alert_pitch: i32,
    pub signal: i32,
}

impl SignalInfo {
    /// The IS-54B long ring at medium pitch some modems emit after a call
    /// ends. Treated as a ring it plays an endless tone.
    pub fn is_spurious_is54b_ring(&self) -> bool {
        self.is_present
            && self.signal_type == SIGNAL_TYPE_IS54B
            && self.alert_pitch == ALERT_PITCH_MED
            && self.signal == IS54B_L
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineControl {
    pub polarity_included: i32,
    pub toggle_mode: i32,
    pub reverse_polarity: i32,
    pub power_denial: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdmaInfoRecord {
    Display(Option<String>),
    ExtendedDisplay(Option<String>),
    CalledPartyNumber(NumberInfo),
    CallingPartyNumber(NumberInfo),
    ConnectedNumber(NumberInfo),
    Signal(SignalInfo),
    RedirectingNumber { number: NumberInfo, reason: i32 },
    LineControl(LineControl),
    T53Clir { cause: i32 },
    T53AudioControl { uplink: i32, downlink: i32 },
}

fn read_number(r: &mut ParcelReader<'_>) -> Result<NumberInfo> {
    Ok(NumberInfo {
        number: r.read_string()?,
        number_type: r.read_i32()?,
        number_plan: r.read_i32()?,
        pi: r.read_i32()?,
        si: r.read_i32()?,
    })
}

fn read_record(r: &mut ParcelReader<'_>) -> Result<CdmaInfoRecord> {
    let record = match r.read_i32()? {
        DISPLAY => CdmaInfoRecord::Display(r.read_string()?),
        EXTENDED_DISPLAY => CdmaInfoRecord::ExtendedDisplay(r.read_string()?),
        CALLED_PARTY_NUMBER => CdmaInfoRecord::CalledPartyNumber(read_number(r)?),
        CALLING_PARTY_NUMBER => CdmaInfoRecord::CallingPartyNumber(read_number(r)?),
        CONNECTED_NUMBER => CdmaInfoRecord::ConnectedNumber(read_number(r)?),
        SIGNAL_INFO => CdmaInfoRecord::Signal(SignalInfo {
            is_present: r.read_bool()?,
            signal_type: r.read_i32()?,
            alert_pitch: r.read_i32()?,
            signal: r.read_i32()?,
        }),
        REDIRECTING_NUMBER => CdmaInfoRecord::RedirectingNumber {
            number: read_number(r)?,
            reason: r.read_i32()?,
        },
        LINE_CONTROL => CdmaInfoRecord::LineControl(LineControl {
            polarity_included: r.read_i32()?,
            toggle_mode: r.read_i32()?,
            reverse_polarity: r.read_i32()?,
            power_denial: r.read_i32()?,
        }),
        T53_CLIR => CdmaInfoRecord::T53Clir {
            cause: r.read_i32()?,
        },
        T53_AUDIO_CONTROL => CdmaInfoRecord::T53AudioControl {
            uplink: r.read_i32()?,
            downlink: r.read_i32()?,
        },
        T53_RELEASE => {
            return Err(RilError::DecodeFault(
                "T53 release info record is not supported".to_string(),
            ))
        }
        other => {
            return Err(RilError::DecodeFault(format!(
                "unrecognized CDMA info record {}",
                other
            )))
        }
    };
    Ok(record)
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<Vec<CdmaInfoRecord>> {
    let count = r.read_count(4)?;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let record = read_record(r)?;
        trace!("cdma info record {:?}", record);
        records.push(record);
    }
    Ok(records)
}
