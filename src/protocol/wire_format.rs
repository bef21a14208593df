//! Record framing on the byte stream.
//!
//! Every record is a length prefix followed by a parcel:
//! ```text
//! ┌──────────────┬────────────────────────────┐
//! │ Length       │ Parcel                     │
//! │ 4 bytes BE   │ `length` bytes             │
//! └──────────────┴────────────────────────────┘
//! ```
//!
//! Inbound parcels start with a response type:
//! ```text
//! solicited:   i32 0, i32 serial, i32 error, payload...
//! unsolicited: i32 1, i32 response_id, payload...
//! ```
//! Outbound parcels start with `i32 request_id, i32 serial`.

use crate::error::{Result, RilError};

/// Length prefix size in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum parcel size (8 KiB).
pub const DEFAULT_MAX_RECORD_SIZE: u32 = 8 * 1024;

/// Response type of a reply correlated to a request serial.
pub const RESPONSE_SOLICITED: i32 = 0;

/// Response type of a modem-initiated event.
pub const RESPONSE_UNSOLICITED: i32 = 1;

/// Decoded length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Parcel length in bytes.
    pub length: u32,
}

impl RecordHeader {
    pub fn new(length: u32) -> Self {
        Self { length }
    }

    /// Encode the prefix (Big Endian).
    ///
    /// ```
    /// use ril_client::protocol::RecordHeader;
    ///
    /// assert_eq!(RecordHeader::new(0x0102).encode(), [0, 0, 1, 2]);
    /// ```
    pub fn encode(&self) -> [u8; LENGTH_PREFIX_SIZE] {
        self.length.to_be_bytes()
    }

    /// Decode the prefix. Returns `None` if the buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < LENGTH_PREFIX_SIZE {
            return None;
        }
        Some(Self {
            length: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
        })
    }

    /// Reject empty and oversized records.
    pub fn validate(&self, max_record_size: u32) -> Result<()> {
        if self.length == 0 {
            return Err(RilError::Protocol("zero-length record".to_string()));
        }
        if self.length > max_record_size {
            return Err(RilError::Protocol(format!(
                "Record size {} exceeds maximum {}",
                self.length, max_record_size
            )));
        }
        Ok(())
    }
}

/// Prefix `parcel` with its length.
pub fn build_record(parcel: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + parcel.len());
    buf.extend_from_slice(&RecordHeader::new(parcel.len() as u32).encode());
    buf.extend_from_slice(parcel);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_big_endian() {
        let bytes = RecordHeader::new(0x0A0B0C0D).encode();
        assert_eq!(bytes, [0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(RecordHeader::decode(&bytes).unwrap().length, 0x0A0B0C0D);
    }

    #[test]
    fn test_decode_too_short() {
        assert!(RecordHeader::decode(&[0, 0, 1]).is_none());
    }

    #[test]
    fn test_validate_zero_length() {
        let err = RecordHeader::new(0).validate(DEFAULT_MAX_RECORD_SIZE).unwrap_err();
        assert!(err.to_string().contains("zero-length"));
    }

    #[test]
    fn test_validate_oversized() {
        let err = RecordHeader::new(9000).validate(DEFAULT_MAX_RECORD_SIZE).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
        assert!(RecordHeader::new(8192).validate(DEFAULT_MAX_RECORD_SIZE).is_ok());
    }

    #[test]
    fn test_build_record() {
        let record = build_record(&[1, 2, 3, 4]);
        assert_eq!(record, vec![0, 0, 0, 4, 1, 2, 3, 4]);
    }
}
