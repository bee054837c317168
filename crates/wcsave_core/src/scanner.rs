use std::io::{self, Read, Seek};

use log::debug;

use crate::codec;
use crate::error::{Result, SaveError};
use crate::layout::{FieldWidth, NAME_WIDTH, PADDING_RANGES, RECORD_SIZE, SENTINEL_WIDTH, StatField};
use crate::reader::LittleEndianReader;
use crate::record::{CharacterRecord, CharacterStats, RawSnapshot};

/// Walks the character table from a fixed offset, yielding one record per
/// 84-byte block until a block whose first two bytes are zero.
///
/// The sequence is finite and cannot be restarted: after the sentinel or the
/// first error the iterator is exhausted. On a clean finish the stream sits
/// right after the two sentinel bytes.
pub struct RecordScanner<R> {
    reader: LittleEndianReader<R>,
    start: u64,
    started: bool,
    index: usize,
    done: bool,
}

impl<R: Read + Seek> RecordScanner<R> {
    pub fn new(inner: R, start: u64) -> Self {
        Self {
            reader: LittleEndianReader::new(inner),
            start,
            started: false,
            index: 0,
            done: false,
        }
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.reader.position()
    }

    fn next_record(&mut self) -> Result<Option<CharacterRecord>> {
        if !self.started {
            self.started = true;
            self.reader.seek_to(self.start)?;
        }

        let index = self.index;
        let position = self.reader.position()?;
        let field_err = |field: &'static str| {
            move |source: io::Error| SaveError::FieldRead {
                index,
                position,
                field,
                source,
            }
        };

        let probe = self
            .reader
            .read_array::<SENTINEL_WIDTH>()
            .map_err(field_err("name"))?;
        if probe.iter().all(|&b| b == 0) {
            debug!("record table ends at offset {position} after {index} records");
            return Ok(None);
        }
        self.reader.rewind_by(SENTINEL_WIDTH as i64)?;

        let name_bytes = self
            .reader
            .read_array::<NAME_WIDTH>()
            .map_err(field_err("name"))?;
        let mut raw = RawSnapshot::new(name_bytes);
        let mut stats = CharacterStats::default();

        let mut cursor = NAME_WIDTH as u64;
        for field in StatField::ALL {
            self.skip_padding_to(field.offset(), &mut cursor)
                .map_err(field_err("padding"))?;
            let value = match field.width() {
                FieldWidth::I32 => {
                    let (value, bytes) = self.reader.read_i32().map_err(field_err(field.key()))?;
                    raw.push(field, &bytes);
                    value as i64
                }
                FieldWidth::I16 => {
                    let (value, bytes) = self.reader.read_i16().map_err(field_err(field.key()))?;
                    raw.push(field, &bytes);
                    value as i64
                }
            };
            field.set(&mut stats, value)?;
            cursor = field.range().end;
        }
        self.skip_padding_to(RECORD_SIZE, &mut cursor)
            .map_err(field_err("padding"))?;

        let name = codec::decode_legacy_text(&name_bytes);
        debug!("record {index} '{name}' at offset {position}");
        self.index += 1;
        Ok(Some(CharacterRecord::new(name, stats, position, raw)))
    }

    fn skip_padding_to(&mut self, target: u64, cursor: &mut u64) -> io::Result<()> {
        if target > *cursor {
            debug_assert!(
                PADDING_RANGES
                    .iter()
                    .any(|r| r.start == *cursor && r.end == target)
            );
            self.reader.skip(target - *cursor)?;
            *cursor = target;
        }
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for RecordScanner<R> {
    type Item = Result<CharacterRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for RecordScanner<R> {}

/// Scans the whole table eagerly. Any read failure discards the records
/// already decoded and returns the error.
pub fn scan_records<R: Read + Seek>(inner: R, start: u64) -> Result<Vec<CharacterRecord>> {
    RecordScanner::new(inner, start).collect()
}
