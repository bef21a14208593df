//! Voice/data registration state, a string array.

use crate::codec::ParcelReader;
use crate::error::Result;

/// Radio technologies reported on a CDMA network: IS95A, IS95B, 1xRTT,
/// EVDO 0/A/B and eHRPD.
const CDMA_TECHNOLOGIES: [i32; 7] = [4, 5, 6, 7, 8, 12, 13];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationState {
    pub fields: Vec<Option<String>>,
}

impl RegistrationState {
    fn int_field(&self, index: usize) -> Option<i32> {
        self.fields
            .get(index)?
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Registration state, element 0.
    pub fn reg_state(&self) -> Option<i32> {
        self.int_field(0)
    }

    /// Radio technology, element 3.
    pub fn radio_technology(&self) -> Option<i32> {
        self.int_field(3)
    }

    pub fn is_cdma(&self) -> bool {
        self.radio_technology()
            .map(|rat| CDMA_TECHNOLOGIES.contains(&rat))
            .unwrap_or(false)
    }
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<RegistrationState> {
    Ok(RegistrationState {
        fields: r.read_string_array()?,
    })
}
