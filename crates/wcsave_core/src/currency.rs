use std::io::{Read, Seek};

use log::debug;

use crate::error::{Result, SaveError};
use crate::layout::CURRENCY_WIDTH;
use crate::reader::LittleEndianReader;
use crate::record::CurrencyRecord;

/// Reads the 4-byte little-endian currency value at `position`.
pub fn read_currency<R: Read + Seek>(inner: R, position: u64) -> Result<CurrencyRecord> {
    let mut r = LittleEndianReader::new(inner);

    let file_len = r.stream_len()?;
    if position >= file_len {
        return Err(SaveError::OutOfRange {
            offset: position,
            len: CURRENCY_WIDTH as u64,
            file_len,
        });
    }

    r.seek_to(position)?;
    let (value, raw) = r.read_i32()?;
    debug!("currency {value} at offset {position}");
    Ok(CurrencyRecord::loaded(value, position, raw))
}
