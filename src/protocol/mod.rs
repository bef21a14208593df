//! Protocol module - record framing, frame classification, requests.
//!
//! This module implements the outer layers of the wire protocol:
//! - 4-byte length prefix around every parcel
//! - Frame buffer for accumulating partial reads
//! - Inbound frame classification (solicited / unsolicited)
//! - Outbound request records and typed commands

mod frame;
mod frame_buffer;
mod kinds;
mod request;
mod wire_format;

pub use frame::{build_solicited, build_unsolicited, Frame, FrameKind};
pub use frame_buffer::FrameBuffer;
pub use kinds::{RequestKind, UnsolicitedKind};
pub use request::{encode_request, request_parcel, Command, DialParams, Field, RequestRecord, UusInfo};
pub use wire_format::{
    build_record, RecordHeader, DEFAULT_MAX_RECORD_SIZE, LENGTH_PREFIX_SIZE, RESPONSE_SOLICITED,
    RESPONSE_UNSOLICITED,
};
