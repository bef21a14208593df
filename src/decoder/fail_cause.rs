//! Last call failure cause.
//!
//! An int array whose first element is the cause code, optionally followed
//! by a vendor cause string. The string is present only if bytes remain.

use crate::codec::ParcelReader;
use crate::error::{Result, RilError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailCause {
    pub cause_code: i32,
    pub vendor_cause: Option<String>,
}

pub fn decode(r: &mut ParcelReader<'_>) -> Result<FailCause> {
    let codes = r.read_int_array()?;
    let cause_code = *codes
        .first()
        .ok_or_else(|| RilError::DecodeFault("empty fail cause array".to_string()))?;
    let vendor_cause = if r.data_avail() > 0 {
        r.read_string()?
    } else {
        None
    };
    Ok(FailCause {
        cause_code,
        vendor_cause,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ParcelWriter;

    #[test]
    fn test_cause_without_vendor_string() {
        let mut w = ParcelWriter::new();
        w.write_int_array(&[16]);
        let bytes = w.freeze();
        let cause = decode(&mut ParcelReader::new(&bytes)).unwrap();
        assert_eq!(cause.cause_code, 16);
        assert_eq!(cause.vendor_cause, None);
    }

    #[test]
    fn test_cause_with_vendor_string() {
        let mut w = ParcelWriter::new();
        w.write_int_array(&[31, 5]);
        w.write_string(Some("NETWORK_REJECT"));
        let bytes = w.freeze();
        let cause = decode(&mut ParcelReader::new(&bytes)).unwrap();
        assert_eq!(cause.cause_code, 31);
        assert_eq!(cause.vendor_cause.as_deref(), Some("NETWORK_REJECT"));
    }

    #[test]
    fn test_empty_array_is_fault() {
        let mut w = ParcelWriter::new();
        w.write_int_array(&[]);
        let bytes = w.freeze();
        let err = decode(&mut ParcelReader::new(&bytes)).unwrap_err();
        assert!(matches!(err, RilError::DecodeFault(_)));
    }
}
