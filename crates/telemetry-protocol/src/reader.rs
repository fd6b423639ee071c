//! Cursor-style little-endian byte reader used by every schema decoder.

use crate::error::DecodeError;

/// Reads fixed-width little-endian values from a borrowed buffer.
///
/// Every read is bounds-checked and fails with [`DecodeError::Truncated`]
/// instead of panicking.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, pos: offset }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(DecodeError::truncated(usize::MAX, self.data.len()))?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(DecodeError::truncated(end, self.data.len()))?;
        self.pos = end;
        Ok(slice)
    }

    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.bytes(n).map(|_| ())
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        self.take::<1>().map(|[b]| b)
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        self.take().map(i8::from_le_bytes)
    }

    #[inline]
    pub fn u16_le(&mut self) -> Result<u16, DecodeError> {
        self.take().map(u16::from_le_bytes)
    }

    #[inline]
    pub fn i16_le(&mut self) -> Result<i16, DecodeError> {
        self.take().map(i16::from_le_bytes)
    }

    #[inline]
    pub fn u32_le(&mut self) -> Result<u32, DecodeError> {
        self.take().map(u32::from_le_bytes)
    }

    #[inline]
    pub fn u64_le(&mut self) -> Result<u64, DecodeError> {
        self.take().map(u64::from_le_bytes)
    }

    #[inline]
    pub fn f32_le(&mut self) -> Result<f32, DecodeError> {
        self.take().map(f32::from_le_bytes)
    }

    #[inline]
    pub fn f64_le(&mut self) -> Result<f64, DecodeError> {
        self.take().map(f64::from_le_bytes)
    }

    pub fn u8_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.take()
    }

    pub fn u16_le_array<const N: usize>(&mut self) -> Result<[u16; N], DecodeError> {
        let mut arr = [0u16; N];
        for item in arr.iter_mut() {
            *item = self.u16_le()?;
        }
        Ok(arr)
    }

    pub fn f32_le_array<const N: usize>(&mut self) -> Result<[f32; N], DecodeError> {
        let mut arr = [0.0f32; N];
        for item in arr.iter_mut() {
            *item = self.f32_le()?;
        }
        Ok(arr)
    }

    /// Fixed-width, NUL-padded character field decoded lossily as UTF-8.
    pub fn fixed_str(&mut self, width: usize) -> Result<String, DecodeError> {
        let raw = self.bytes(width)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let text = raw.get(..end).unwrap_or(raw);
        Ok(String::from_utf8_lossy(text).into_owned())
    }

    /// Decode `count` consecutive entries with `f`.
    pub fn repeat<T>(
        &mut self,
        count: usize,
        mut f: impl FnMut(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Vec<T>, DecodeError> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(f(self)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn reads_little_endian_values_in_sequence() -> TestResult {
        let data = [0x34, 0x12, 0xff, 0x78, 0x56, 0x34, 0x12];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.u16_le()?, 0x1234);
        assert_eq!(r.i8()?, -1);
        assert_eq!(r.u32_le()?, 0x1234_5678);
        assert_eq!(r.remaining(), 0);
        Ok(())
    }

    #[test]
    fn out_of_bounds_read_reports_needed_and_available() {
        let mut r = ByteReader::at(&[0u8; 6], 4);
        assert_eq!(
            r.u32_le(),
            Err(DecodeError::Truncated {
                needed: 8,
                available: 6
            })
        );
        assert_eq!(r.position(), 4, "failed read must not advance");
    }

    #[test]
    fn fixed_str_stops_at_nul() -> TestResult {
        let mut raw = [0u8; 8];
        raw[..3].copy_from_slice(b"VER");
        let mut r = ByteReader::new(&raw);
        assert_eq!(r.fixed_str(8)?, "VER");
        assert_eq!(r.position(), 8);
        Ok(())
    }
}
