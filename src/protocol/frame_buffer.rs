//! Frame buffer for accumulating partial reads.
//!
//! Implements a state machine for handling fragmented records:
//! - `WaitingForLength`: need the 4-byte prefix
//! - `WaitingForParcel`: prefix parsed, need N more bytes
//!
//! Each complete parcel is classified with [`Frame::decode`]. A parcel that
//! fails classification is reported per record and does not poison the
//! buffer; only a bad length prefix does, because the stream cannot be
//! resynchronised after it.

use bytes::{Bytes, BytesMut};

use super::wire_format::{RecordHeader, DEFAULT_MAX_RECORD_SIZE, LENGTH_PREFIX_SIZE};
use super::Frame;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
enum State {
    WaitingForLength,
    WaitingForParcel { remaining: usize },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    max_record_size: u32,
}

impl FrameBuffer {
    /// Default capacity: 16KB, max record: 8KB.
    pub fn new() -> Self {
        Self::with_max_record(DEFAULT_MAX_RECORD_SIZE)
    }

    pub fn with_max_record(max_record_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(16 * 1024),
            state: State::WaitingForLength,
            max_record_size,
        }
    }

    /// Push data into the buffer and extract all complete records.
    ///
    /// The outer `Err` is a framing failure (bad length prefix) and ends the
    /// stream. Inner `Err`s are per-frame classification failures.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Result<Frame>>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(parcel) = self.try_extract_one()? {
            frames.push(Frame::decode(parcel));
        }
        Ok(frames)
    }

    fn try_extract_one(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.state {
                State::WaitingForLength => {
                    let Some(header) = RecordHeader::decode(&self.buffer) else {
                        return Ok(None);
                    };
                    header.validate(self.max_record_size)?;
                    let _ = self.buffer.split_to(LENGTH_PREFIX_SIZE);
                    self.state = State::WaitingForParcel {
                        remaining: header.length as usize,
                    };
                }
                State::WaitingForParcel { remaining } => {
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }
                    let parcel = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForLength;
                    return Ok(Some(parcel));
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForLength => "WaitingForLength",
            State::WaitingForParcel { .. } => "WaitingForParcel",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_solicited, build_unsolicited, FrameKind};

    #[test]
    fn test_single_complete_record() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&build_solicited(42, 0, &[1, 0, 0, 0])).unwrap();

        assert_eq!(frames.len(), 1);
        let frame = frames[0].as_ref().unwrap();
        assert_eq!(frame.kind, FrameKind::Solicited { serial: 42, error: 0 });
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_records_in_one_push() {
        let mut buffer = FrameBuffer::new();
        let mut data = build_solicited(1, 0, &[]);
        data.extend(build_unsolicited(1001, &[]));
        data.extend(build_solicited(2, 2, &[]));

        let frames = buffer.push(&data).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].as_ref().unwrap().serial(), Some(1));
        assert!(!frames[1].as_ref().unwrap().is_solicited());
        assert_eq!(frames[2].as_ref().unwrap().error_code(), Some(2));
    }

    #[test]
    fn test_fragmented_prefix_and_parcel() {
        let mut buffer = FrameBuffer::new();
        let bytes = build_solicited(7, 0, &[9, 0, 0, 0, 8, 0, 0, 0]);

        assert!(buffer.push(&bytes[..2]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForLength");

        assert!(buffer.push(&bytes[2..10]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForParcel");

        let frames = buffer.push(&bytes[10..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap().serial(), Some(7));
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let bytes = build_unsolicited(1009, &[0xFF; 8]);
        let mut all = Vec::new();
        for b in &bytes {
            all.extend(buffer.push(&[*b]).unwrap());
        }
        assert_eq!(all.len(), 1);
        assert!(all[0].is_ok());
    }

    #[test]
    fn test_oversized_record_is_fatal() {
        let mut buffer = FrameBuffer::with_max_record(16);
        let result = buffer.push(&RecordHeader::new(17).encode());
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_bad_discriminator_is_per_frame() {
        let mut buffer = FrameBuffer::new();
        let mut data = super::super::build_record(&[5, 0, 0, 0]);
        data.extend(build_solicited(3, 0, &[]));

        let frames = buffer.push(&data).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_err());
        assert_eq!(frames[1].as_ref().unwrap().serial(), Some(3));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        buffer.push(&[0, 0, 0, 8, 1]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForParcel");
        buffer.clear();
        assert_eq!(buffer.state_name(), "WaitingForLength");
        assert!(buffer.is_empty());
    }
}
