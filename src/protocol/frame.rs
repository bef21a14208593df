//! Inbound frame classification.
//!
//! A [`Frame`] is one inbound parcel with its leading discriminator already
//! read. The raw bytes stay intact: [`Frame::body`] hands out a fresh
//! [`ParcelReader`] positioned just after the header, so any number of
//! layers can inspect the same frame independently.
//!
//! # Example
//!
//! ```
//! use ril_client::protocol::{build_solicited, Frame, FrameKind, LENGTH_PREFIX_SIZE};
//! use bytes::Bytes;
//!
//! let record = build_solicited(42, 0, &[]);
//! let frame = Frame::decode(Bytes::copy_from_slice(&record[LENGTH_PREFIX_SIZE..])).unwrap();
//! assert_eq!(frame.kind, FrameKind::Solicited { serial: 42, error: 0 });
//! assert_eq!(frame.body().data_avail(), 0);
//! ```

use bytes::Bytes;

use super::wire_format::{build_record, RESPONSE_SOLICITED, RESPONSE_UNSOLICITED};
use crate::codec::{ParcelReader, ParcelWriter};
use crate::error::{Result, RilError};

/// Leading discriminator of an inbound parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Reply to a request; `error` is the modem status (0 = success).
    Solicited { serial: u32, error: i32 },
    /// Modem-initiated event. The message type is the first body field.
    Unsolicited,
}

/// A classified inbound parcel.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameKind,
    /// The complete parcel, header included.
    pub raw: Bytes,
    body_offset: usize,
}

impl Frame {
    /// Classify a parcel by its response type.
    pub fn decode(raw: Bytes) -> Result<Self> {
        let mut reader = ParcelReader::new(&raw);
        let response_type = reader.read_i32()?;
        let kind = match response_type {
            RESPONSE_SOLICITED => {
                let serial = reader.read_u32()?;
                let error = reader.read_i32()?;
                FrameKind::Solicited { serial, error }
            }
            RESPONSE_UNSOLICITED => FrameKind::Unsolicited,
            other => {
                return Err(RilError::Protocol(format!(
                    "unknown response type {}",
                    other
                )))
            }
        };
        let body_offset = reader.position();
        Ok(Self {
            kind,
            raw,
            body_offset,
        })
    }

    /// Reader positioned at the first byte after the header.
    pub fn body(&self) -> ParcelReader<'_> {
        ParcelReader::at(&self.raw, self.body_offset)
    }

    /// Offset of the body within [`Frame::raw`].
    #[inline]
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    #[inline]
    pub fn is_solicited(&self) -> bool {
        matches!(self.kind, FrameKind::Solicited { .. })
    }

    #[inline]
    pub fn serial(&self) -> Option<u32> {
        match self.kind {
            FrameKind::Solicited { serial, .. } => Some(serial),
            FrameKind::Unsolicited => None,
        }
    }

    #[inline]
    pub fn error_code(&self) -> Option<i32> {
        match self.kind {
            FrameKind::Solicited { error, .. } => Some(error),
            FrameKind::Unsolicited => None,
        }
    }
}

/// Build a length-prefixed solicited record as the modem would send it.
pub fn build_solicited(serial: u32, error: i32, payload: &[u8]) -> Vec<u8> {
    let mut w = ParcelWriter::with_capacity(12 + payload.len());
    w.write_i32(RESPONSE_SOLICITED);
    w.write_u32(serial);
    w.write_i32(error);
    w.write_raw(payload);
    build_record(w.as_bytes())
}

/// Build a length-prefixed unsolicited record as the modem would send it.
pub fn build_unsolicited(response_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut w = ParcelWriter::with_capacity(8 + payload.len());
    w.write_i32(RESPONSE_UNSOLICITED);
    w.write_u32(response_id);
    w.write_raw(payload);
    build_record(w.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::LENGTH_PREFIX_SIZE;

    fn parcel(record: Vec<u8>) -> Bytes {
        Bytes::from(record).slice(LENGTH_PREFIX_SIZE..)
    }

    #[test]
    fn test_decode_solicited() {
        let frame = Frame::decode(parcel(build_solicited(9, 2, &[7, 0, 0, 0]))).unwrap();
        assert_eq!(frame.kind, FrameKind::Solicited { serial: 9, error: 2 });
        assert_eq!(frame.serial(), Some(9));
        assert_eq!(frame.error_code(), Some(2));
        assert_eq!(frame.body_offset(), 12);
        assert_eq!(frame.body().read_i32().unwrap(), 7);
    }

    #[test]
    fn test_decode_unsolicited_leaves_type_in_body() {
        let frame = Frame::decode(parcel(build_unsolicited(1009, &[]))).unwrap();
        assert_eq!(frame.kind, FrameKind::Unsolicited);
        assert_eq!(frame.serial(), None);
        assert_eq!(frame.body().read_u32().unwrap(), 1009);
    }

    #[test]
    fn test_body_is_independent_per_call() {
        let frame = Frame::decode(parcel(build_unsolicited(1001, &[]))).unwrap();
        let mut a = frame.body();
        a.read_i32().unwrap();
        let b = frame.body();
        assert_eq!(b.position(), frame.body_offset());
    }

    #[test]
    fn test_unknown_response_type() {
        let err = Frame::decode(Bytes::from_static(&[3, 0, 0, 0])).unwrap_err();
        assert!(err.to_string().contains("unknown response type 3"));
    }

    #[test]
    fn test_truncated_solicited_header() {
        let err = Frame::decode(Bytes::from_static(&[0, 0, 0, 0, 1, 0, 0, 0])).unwrap_err();
        assert!(matches!(err, RilError::Protocol(_)));
    }
}
