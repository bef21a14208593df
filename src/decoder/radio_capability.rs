//! Radio capability.
//!
//! `i32 version, i32 session, i32 phase, i32 raf, string uuid, i32 status`.

use tracing::warn;

use crate::codec::ParcelReader;
use crate::error::Result;

/// Radio access family bits.
pub const RAF_UNKNOWN: i32 = 1 << 0;
pub const RAF_GPRS: i32 = 1 << 1;
pub const RAF_EDGE: i32 = 1 << 2;
pub const RAF_IS95A: i32 = 1 << 3;
pub const RAF_IS95B: i32 = 1 << 4;
pub const RAF_1XRTT: i32 = 1 << 5;
pub const RAF_EVDO_0: i32 = 1 << 6;
pub const RAF_EVDO_A: i32 = 1 << 7;
pub const RAF_HSDPA: i32 = 1 << 8;
pub const RAF_HSUPA: i32 = 1 << 9;
pub const RAF_HSPA: i32 = 1 << 10;
pub const RAF_EVDO_B: i32 = 1 << 11;
pub const RAF_EHRPD: i32 = 1 << 12;
pub const RAF_LTE: i32 = 1 << 13;
pub const RAF_HSPAP: i32 = 1 << 14;
pub const RAF_GSM: i32 = 1 << 15;
pub const RAF_TD_SCDMA: i32 = 1 << 16;
pub const RAF_UMTS: i32 = 1 << 17;

pub const RADIO_CAPABILITY_VERSION: i32 = 1;
/// Status reported by a capability built locally.
pub const STATUS_SUCCESS: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioCapability {
    pub session: i32,
    pub phase: i32,
    pub raf: i32,
    pub logical_modem_uuid: String,
    pub status: i32,
}

impl RadioCapability {
    /// Capability answered without asking the modem.
    pub fn fixed(raf: i32) -> Self {
        Self {
            session: 0,
            phase: 0,
            raf,
            logical_modem_uuid: String::new(),
            status: STATUS_SUCCESS,
        }
    }
}

fn raf_bit(name: &str) -> Option<i32> {
    let bit = match name {
        "GPRS" => RAF_GPRS,
        "EDGE" => RAF_EDGE,
        "IS95A" => RAF_IS95A,
        "IS95B" => RAF_IS95B,
        "1XRTT" => RAF_1XRTT,
        "EVDO_0" => RAF_EVDO_0,
        "EVDO_A" => RAF_EVDO_A,
        "HSDPA" => RAF_HSDPA,
        "HSUPA" => RAF_HSUPA,
        "HSPA" => RAF_HSPA,
        "EVDO_B" => RAF_EVDO_B,
        "EHRPD" => RAF_EHRPD,
        "LTE" => RAF_LTE,
        "HSPAP" => RAF_HSPAP,
        "GSM" => RAF_GSM,
        "TD_SCDMA" => RAF_TD_SCDMA,
        "UMTS" => RAF_UMTS,
        _ => return None,
    };
    Some(bit)
}

/// Parse a `|`-separated list of technology names into a RAF bitmask.
///
/// Unknown names are skipped. An empty result is `RAF_UNKNOWN`.
pub fn raf_from_string(family: &str) -> i32 {
    let raf = family
        .split('|')
        .map(|name| name.trim().to_ascii_uppercase())
        .filter(|name| !name.is_empty())
        .fold(0, |acc, name| match raf_bit(&name) {
            Some(bit) => acc | bit,
            None => {
                warn!("unknown radio access family {:?}", name);
                acc
            }
        });
    if raf == 0 {
        RAF_UNKNOWN
    } else {
        raf
    }
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<RadioCapability> {
    let _version = r.read_i32()?;
    Ok(RadioCapability {
        session: r.read_i32()?,
        phase: r.read_i32()?,
        raf: r.read_i32()?,
        logical_modem_uuid: r.read_string()?.unwrap_or_default(),
        status: r.read_i32()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParcelWriter;

    #[test]
    fn test_decode() {
        let mut w = ParcelWriter::new();
        w.write_i32(RADIO_CAPABILITY_VERSION);
        w.write_i32(7);
        w.write_i32(2);
        w.write_i32(RAF_LTE | RAF_1XRTT);
        w.write_string(Some("modem0"));
        w.write_i32(STATUS_SUCCESS);
        let bytes = w.freeze();
        let cap = decode(&mut ParcelReader::new(&bytes)).unwrap();
        assert_eq!(cap.session, 7);
        assert_eq!(cap.phase, 2);
        assert_eq!(cap.raf, RAF_LTE | RAF_1XRTT);
        assert_eq!(cap.logical_modem_uuid, "modem0");
        assert_eq!(cap.status, 1);
    }

    #[test]
    fn test_raf_from_string() {
        assert_eq!(raf_from_string("LTE|1XRTT"), RAF_LTE | RAF_1XRTT);
        assert_eq!(raf_from_string("lte | ehrpd"), RAF_LTE | RAF_EHRPD);
        assert_eq!(raf_from_string(""), RAF_UNKNOWN);
        assert_eq!(raf_from_string("WIMAX"), RAF_UNKNOWN);
    }

    #[test]
    fn test_fixed_capability() {
        let cap = RadioCapability::fixed(RAF_UNKNOWN);
        assert_eq!(cap.session, 0);
        assert_eq!(cap.phase, 0);
        assert_eq!(cap.logical_modem_uuid, "");
        assert_eq!(cap.status, STATUS_SUCCESS);
    }
}
