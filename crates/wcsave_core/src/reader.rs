use std::io::{self, Read, Seek, SeekFrom};

use crate::codec;

/// Fixed-width little-endian reads over a seekable stream. Every read is
/// exact: running out of input is `UnexpectedEof`, never a short value.
pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read + Seek> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_i16(&mut self) -> io::Result<(i16, [u8; 2])> {
        let raw = self.read_array::<2>()?;
        Ok((codec::decode_i16_le(raw), raw))
    }

    pub fn read_i32(&mut self) -> io::Result<(i32, [u8; 4])> {
        let raw = self.read_array::<4>()?;
        Ok((codec::decode_i32_le(raw), raw))
    }

    /// Consumes `n` bytes. Seeking past the end of a file succeeds silently,
    /// so the bytes are read instead and a short count is an error.
    pub fn skip(&mut self, n: u64) -> io::Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        if skipped < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("skip of {n} bytes stopped after {skipped}"),
            ));
        }
        Ok(())
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn rewind_by(&mut self, n: i64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Current(-n))?;
        Ok(())
    }

    pub fn stream_len(&mut self) -> io::Result<u64> {
        let cur = self.position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(cur))?;
        Ok(end)
    }
}
