//! SIM card status.
//!
//! ```text
//! i32 card_state, i32 universal_pin_state,
//! i32 gsm_umts_index, i32 cdma_index, i32 ims_index,
//! i32 num_applications,
//! num_applications x {
//!     i32 app_type, i32 app_state, i32 perso_substate,
//!     string aid, string app_label,
//!     i32 pin1_replaced, i32 pin1, i32 pin2,
//!     i32 pin1_retries, i32 puk1_retries, i32 pin2_retries,
//!     i32 puk2_retries, i32 perso_unblock_retries
//! }
//! ```
//!
//! The application count is clamped to [`CARD_MAX_APPS`]; records past the
//! limit are never read. An unrecognized card state or universal PIN state
//! fails the decode. Unrecognized per-application values are logged and
//! read as unknown.

use tracing::warn;

use crate::codec::ParcelReader;
use crate::error::{Result, RilError};

/// Maximum number of applications on a card.
pub const CARD_MAX_APPS: usize = 8;

/// Highest defined personalisation substate.
const PERSO_SUBSTATE_MAX: i32 = 24;
const PERSO_SUBSTATE_UNKNOWN: i32 = 0;

wire_enum! {
    pub enum CardState {
        Absent = 0,
        Present = 1,
        Error = 2,
        Restricted = 3,
    }
}

wire_enum! {
    pub enum PinState {
        Unknown = 0,
        EnabledNotVerified = 1,
        EnabledVerified = 2,
        Disabled = 3,
        EnabledBlocked = 4,
        EnabledPermBlocked = 5,
    }
}

wire_enum! {
    pub enum AppType {
        Unknown = 0,
        Sim = 1,
        Usim = 2,
        Ruim = 3,
        Csim = 4,
        Isim = 5,
    }
}

wire_enum! {
    pub enum AppState {
        Unknown = 0,
        Detected = 1,
        Pin = 2,
        Puk = 3,
        SubscriptionPerso = 4,
        Ready = 5,
    }
}

/// One card application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStatus {
    pub app_type: AppType,
    pub app_state: AppState,
    /// Personalisation substate (0 = unknown, 2 = ready).
    pub perso_substate: i32,
    pub aid: Option<String>,
    pub app_label: Option<String>,
    pub pin1_replaced: bool,
    pub pin1: PinState,
    pub pin2: PinState,
}

/// Decoded card status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStatus {
    pub card_state: CardState,
    pub universal_pin_state: PinState,
    /// Application index per subscription: GSM/UMTS, CDMA, IMS. -1 = none.
    pub subscription_app_index: [i32; 3],
    pub applications: Vec<AppStatus>,
}

impl CardStatus {
    pub fn gsm_umts_app_index(&self) -> i32 {
        self.subscription_app_index[0]
    }

    pub fn cdma_app_index(&self) -> i32 {
        self.subscription_app_index[1]
    }

    pub fn ims_app_index(&self) -> i32 {
        self.subscription_app_index[2]
    }
}

fn or_unknown<T>(value: i32, unknown: T) -> T
where
    T: TryFrom<i32, Error = RilError>,
{
    T::try_from(value).unwrap_or_else(|e| {
        warn!("{}, reading as unknown", e);
        unknown
    })
}

fn read_app(r: &mut ParcelReader<'_>) -> Result<AppStatus> {
    let app_type = or_unknown(r.read_i32()?, AppType::Unknown);
    let app_state = or_unknown(r.read_i32()?, AppState::Unknown);
    let mut perso_substate = r.read_i32()?;
    if !(0..=PERSO_SUBSTATE_MAX).contains(&perso_substate) {
        warn!("unrecognized perso substate {}, reading as unknown", perso_substate);
        perso_substate = PERSO_SUBSTATE_UNKNOWN;
    }
    let aid = r.read_string()?;
    let app_label = r.read_string()?;
    let pin1_replaced = r.read_bool()?;
    let pin1 = or_unknown(r.read_i32()?, PinState::Unknown);
    let pin2 = or_unknown(r.read_i32()?, PinState::Unknown);
    // Retry counters are not part of the model.
    for _ in 0..5 {
        r.read_i32()?;
    }
    Ok(AppStatus {
        app_type,
        app_state,
        perso_substate,
        aid,
        app_label,
        pin1_replaced,
        pin1,
        pin2,
    })
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<CardStatus> {
    let card_state = CardState::try_from(r.read_i32()?)?;
    let universal_pin_state = PinState::try_from(r.read_i32()?)?;
    let subscription_app_index = [r.read_i32()?, r.read_i32()?, r.read_i32()?];

    let reported = r.read_i32()?;
    if reported < 0 {
        return Err(RilError::DecodeFault(format!(
            "negative application count {}",
            reported
        )));
    }
    let count = (reported as usize).min(CARD_MAX_APPS);

    let mut applications = Vec::with_capacity(count);
    for _ in 0..count {
        applications.push(read_app(r)?);
    }

    Ok(CardStatus {
        card_state,
        universal_pin_state,
        subscription_app_index,
        applications,
    })
}
