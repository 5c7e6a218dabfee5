//! Minimal reader for the tag/value framing used by the charger's status
//! payload: base-128 varints, fixed 32/64-bit values and length-delimited
//! byte ranges, each field introduced by a varint tag.
//!
//! Nothing here knows about field meanings. Message decoders walk a byte
//! range with [`decode_fields`] and claim the fields they recognise; anything
//! left unclaimed is skipped by its wire type so the cursor stays in sync.

use log::debug;
use std::ops::Range;
use thiserror::Error;

/// A varint longer than this many 7-bit groups is rejected.
pub const MAX_VARINT_GROUPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("input truncated at byte {0}")]
    TruncatedInput(usize),

    #[error("unsupported wire type {wire_type} at byte {position}")]
    UnsupportedWireType { wire_type: u8, position: usize },

    #[error("varint at byte {0} does not terminate within 10 bytes")]
    MalformedVarint(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn bits(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub field_number: u64,
    pub wire_type: WireType,
}

/// Decode one unsigned varint starting at `position`, least significant
/// group first. Returns the value and the position just past it.
pub fn decode_varint(buf: &[u8], position: usize) -> Result<(u64, usize), DecodeError> {
    let mut value = 0u64;
    let mut pos = position;

    for group in 0..MAX_VARINT_GROUPS {
        let byte = *buf.get(pos).ok_or(DecodeError::TruncatedInput(pos))?;
        pos += 1;
        value |= u64::from(byte & 0x7f) << (7 * group);
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }

    Err(DecodeError::MalformedVarint(position))
}

/// Position-tracking view over `buf[start..end]`. Reads never look past `end`.
pub struct WireCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> WireCursor<'a> {
    pub fn new(buf: &'a [u8], range: Range<usize>) -> Result<Self, DecodeError> {
        if range.end > buf.len() || range.start > range.end {
            return Err(DecodeError::TruncatedInput(buf.len()));
        }
        Ok(Self {
            buf: &buf[..range.end],
            pos: range.start,
            end: range.end,
        })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let (value, pos) = decode_varint(self.buf, self.pos)?;
        self.pos = pos;
        Ok(value)
    }

    pub fn read_tag(&mut self) -> Result<Tag, DecodeError> {
        let start = self.pos;
        let key = self.read_varint()?;
        let bits = (key & 7) as u8;
        let wire_type = WireType::from_bits(bits).ok_or(DecodeError::UnsupportedWireType {
            wire_type: bits,
            position: start,
        })?;
        Ok(Tag {
            field_number: key >> 3,
            wire_type,
        })
    }

    /// Reads a length prefix and returns the range of the payload that follows.
    pub fn read_length_delimited(&mut self) -> Result<Range<usize>, DecodeError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::TruncatedInput(self.end))?;
        self.take(len)
    }

    pub fn read_fixed32(&mut self) -> Result<[u8; 4], DecodeError> {
        let range = self.take(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.buf[range]);
        Ok(raw)
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_fixed32().map(f32::from_le_bytes)
    }

    pub fn bytes(&self, range: Range<usize>) -> &'a [u8] {
        &self.buf[range]
    }

    /// Advance past one field's payload without interpreting it.
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(drop),
            WireType::Fixed64 => self.take(8).map(drop),
            WireType::LengthDelimited => self.read_length_delimited().map(drop),
            WireType::Fixed32 => self.take(4).map(drop),
        }
    }

    fn take(&mut self, len: usize) -> Result<Range<usize>, DecodeError> {
        let stop = self
            .pos
            .checked_add(len)
            .filter(|stop| *stop <= self.end)
            .ok_or(DecodeError::TruncatedInput(self.end))?;
        let range = self.pos..stop;
        self.pos = stop;
        Ok(range)
    }
}

/// Walk every field in `buf[range]`. `on_field` receives each tag with the
/// cursor positioned at its payload and returns `true` once it has consumed
/// the payload, or `false` to have the field skipped.
pub fn decode_fields<'a, F>(buf: &'a [u8], range: Range<usize>, mut on_field: F) -> Result<(), DecodeError>
where
    F: FnMut(Tag, &mut WireCursor<'a>) -> Result<bool, DecodeError>,
{
    let mut cursor = WireCursor::new(buf, range)?;

    while !cursor.is_at_end() {
        let tag = cursor.read_tag()?;
        if !on_field(tag, &mut cursor)? {
            debug!(
                "Skipping field {} ({:?}) at byte {}",
                tag.field_number,
                tag.wire_type,
                cursor.position()
            );
            cursor.skip(tag.wire_type)?;
        }
    }

    Ok(())
}
