//! Parcel codec - the primitive field layer of every record.
//!
//! ```text
//! i32          4 bytes, little endian
//! string       i32 length in UTF-16 units (-1 = null),
//!              UTF-16LE units, u16 terminator, pad to 4
//! byte array   i32 length (-1 = null), bytes, pad to 4
//! int array    i32 count, count x i32
//! ```
//!
//! [`ParcelReader`] carries an explicit cursor. Layered decoders record
//! [`ParcelReader::position`] before peeking and call
//! [`ParcelReader::set_position`] to hand the same bytes to a fallback.
//!
//! # Example
//!
//! ```
//! use ril_client::codec::{ParcelReader, ParcelWriter};
//!
//! let mut w = ParcelWriter::new();
//! w.write_i32(7);
//! w.write_string(Some("hello"));
//! let bytes = w.freeze();
//!
//! let mut r = ParcelReader::new(&bytes);
//! assert_eq!(r.read_i32().unwrap(), 7);
//! let mark = r.position();
//! assert_eq!(r.read_string().unwrap().as_deref(), Some("hello"));
//! r.set_position(mark);
//! assert_eq!(r.read_string().unwrap().as_deref(), Some("hello"));
//! assert_eq!(r.data_avail(), 0);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, RilError};

/// Marker length for a null string or byte array.
pub const NULL_LENGTH: i32 = -1;

#[inline]
fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// Writes parcel primitives into a growable buffer.
#[derive(Debug, Clone, Default)]
pub struct ParcelWriter {
    buf: BytesMut,
}

impl ParcelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.write_i32(value as i32);
    }

    /// Write a UTF-16 string, or the null marker for `None`.
    pub fn write_string(&mut self, value: Option<&str>) {
        let Some(s) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };
        let units: Vec<u16> = s.encode_utf16().collect();
        self.write_i32(units.len() as i32);
        let body = (units.len() + 1) * 2;
        for unit in &units {
            self.buf.put_u16_le(*unit);
        }
        self.buf.put_u16_le(0);
        self.pad(body);
    }

    /// Write a length-prefixed byte array, or the null marker for `None`.
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) {
        let Some(data) = value else {
            self.write_i32(NULL_LENGTH);
            return;
        };
        self.write_i32(data.len() as i32);
        self.buf.put_slice(data);
        self.pad(data.len());
    }

    pub fn write_int_array(&mut self, values: &[i32]) {
        self.write_i32(values.len() as i32);
        for v in values {
            self.write_i32(*v);
        }
    }

    pub fn write_string_array<S: AsRef<str>>(&mut self, values: &[Option<S>]) {
        self.write_i32(values.len() as i32);
        for v in values {
            self.write_string(v.as_ref().map(|s| s.as_ref()));
        }
    }

    /// Append already-encoded parcel bytes.
    pub fn write_raw(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    fn pad(&mut self, written: usize) {
        for _ in written..padded(written) {
            self.buf.put_u8(0);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Reads parcel primitives from a borrowed buffer at an explicit position.
///
/// Cloning a reader forks the cursor; the clone can be advanced freely
/// without disturbing the original.
#[derive(Debug, Clone)]
pub struct ParcelReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ParcelReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader positioned at `pos` within `data`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Positions past the end clamp to the end.
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Bytes remaining after the cursor.
    #[inline]
    pub fn data_avail(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.data_avail() < n {
            return Err(RilError::Protocol(format!(
                "truncated parcel: need {} bytes at offset {}, have {}",
                n,
                self.pos,
                self.data_avail()
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_i32()? as u32)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Read an element count and check that `min_element_size` bytes per
    /// element could still follow.
    pub fn read_count(&mut self, min_element_size: usize) -> Result<usize> {
        let count = self.read_i32()?;
        if count < 0 {
            return Err(RilError::Protocol(format!("negative element count {}", count)));
        }
        let count = count as usize;
        if count.saturating_mul(min_element_size) > self.data_avail() {
            return Err(RilError::Protocol(format!(
                "element count {} exceeds remaining {} bytes",
                count,
                self.data_avail()
            )));
        }
        Ok(count)
    }

    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(RilError::Protocol(format!("invalid string length {}", len)));
        }
        let len = len as usize;
        let body = len
            .checked_add(1)
            .and_then(|n| n.checked_mul(2))
            .ok_or_else(|| RilError::Protocol(format!("invalid string length {}", len)))?;
        let raw = self.take(padded(body))?;
        let units: Vec<u16> = raw[..len * 2]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map(Some)
            .map_err(|e| RilError::Protocol(format!("invalid UTF-16 string: {}", e)))
    }

    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>> {
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        if len < 0 {
            return Err(RilError::Protocol(format!("invalid byte array length {}", len)));
        }
        let len = len as usize;
        let raw = self.take(padded(len))?;
        Ok(Some(raw[..len].to_vec()))
    }

    pub fn read_int_array(&mut self) -> Result<Vec<i32>> {
        let count = self.read_count(4)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_i32()?);
        }
        Ok(out)
    }

    pub fn read_string_array(&mut self) -> Result<Vec<Option<String>>> {
        let count = self.read_count(4)?;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.read_string()?);
        }
        Ok(out)
    }

    /// The unread tail.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}
