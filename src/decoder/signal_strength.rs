//! Signal strength.
//!
//! Thirteen consecutive `i32`s: GSM strength and bit error rate, CDMA dBm
//! and Ec/Io, EVDO dBm, Ec/Io and SNR, LTE strength, RSRP, RSRQ, RSSNR and
//! CQI, and TD-SCDMA RSCP.

use tracing::debug;

use crate::codec::ParcelReader;
use crate::error::Result;

/// Sentinel for a metric the modem did not report.
pub const INVALID: i32 = i32::MAX;

/// LTE strength value meaning "unknown".
pub const LTE_STRENGTH_UNKNOWN: i32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStrength {
    pub gsm_signal_strength: i32,
    pub gsm_bit_error_rate: i32,
    pub cdma_dbm: i32,
    pub cdma_ecio: i32,
    pub evdo_dbm: i32,
    pub evdo_ecio: i32,
    pub evdo_snr: i32,
    pub lte_signal_strength: i32,
    pub lte_rsrp: i32,
    pub lte_rsrq: i32,
    pub lte_rssnr: i32,
    pub lte_cqi: i32,
    pub td_scdma_rscp: i32,
    /// Always `true` for this decoder.
    pub is_gsm: bool,
}

impl SignalStrength {
    pub fn lte_is_unknown(&self) -> bool {
        self.lte_signal_strength == LTE_STRENGTH_UNKNOWN
    }
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<SignalStrength> {
    let gsm_signal_strength = r.read_i32()? & 0xff;
    let gsm_bit_error_rate = r.read_i32()?;
    let cdma_dbm = r.read_i32()?;
    let cdma_ecio = r.read_i32()?;
    let evdo_dbm = r.read_i32()?;
    let evdo_ecio = r.read_i32()?;
    let evdo_snr = r.read_i32()?;
    let mut lte_signal_strength = r.read_i32()?;
    let mut lte_rsrp = r.read_i32()?;
    let mut lte_rsrq = r.read_i32()?;
    let mut lte_rssnr = r.read_i32()?;
    let mut lte_cqi = r.read_i32()?;
    let td_scdma_rscp = r.read_i32()?;

    if (lte_signal_strength & 0xff) == 0xff || lte_signal_strength == LTE_STRENGTH_UNKNOWN {
        lte_signal_strength = LTE_STRENGTH_UNKNOWN;
        lte_rsrp = INVALID;
        lte_rsrq = INVALID;
        lte_rssnr = INVALID;
        lte_cqi = INVALID;
    } else {
        lte_signal_strength &= 0xff;
    }

    let strength = SignalStrength {
        gsm_signal_strength,
        gsm_bit_error_rate,
        cdma_dbm,
        cdma_ecio,
        evdo_dbm,
        evdo_ecio,
        evdo_snr,
        lte_signal_strength,
        lte_rsrp,
        lte_rsrq,
        lte_rssnr,
        lte_cqi,
        td_scdma_rscp,
        is_gsm: true,
    };
    debug!("signal strength {:?}", strength);
    Ok(strength)
}
