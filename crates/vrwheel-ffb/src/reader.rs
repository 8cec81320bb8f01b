//! Bounds-checked little-endian field reader over a report payload.

use vrwheel_errors::{DecodeError, DecodeResult};

pub struct ReportReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ReportReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let end = self.position.saturating_add(N);
        let bytes = self
            .buffer
            .get(self.position..end)
            .ok_or(DecodeError::Truncated {
                needed: N,
                available: self.remaining(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.position = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(u8::from_le_bytes(self.take::<1>()?))
    }

    pub fn read_i8(&mut self) -> DecodeResult<i8> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    pub fn read_u16_le(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.take::<2>()?))
    }

    pub fn read_i16_le(&mut self) -> DecodeResult<i16> {
        Ok(i16::from_le_bytes(self.take::<2>()?))
    }

    pub fn read_u32_le(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    /// Everything not read yet.
    pub fn rest(&self) -> &'a [u8] {
        self.buffer.get(self.position..).unwrap_or_default()
    }
}
