use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::{info, warn};

use crate::currency::read_currency;
use crate::error::{Result, SaveError};
use crate::layout::{CURRENCY_OFFSET, RECORD_TABLE_OFFSET, StatField};
use crate::record::{CharacterRecord, CharacterStats, CurrencyRecord};
use crate::scanner::scan_records;
use crate::writer;

/// Decoded contents of one save file.
///
/// Records keep scan order and their indices are stable after load. Updates
/// replace typed values only; positions and raw snapshots never change. Not
/// meant for shared mutation: callers serialize updates and saves.
#[derive(Debug, Clone, Default)]
pub struct SaveModel {
    records: Vec<CharacterRecord>,
    currency: CurrencyRecord,
}

impl SaveModel {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let model = Self::load(BufReader::new(file))?;
        info!(
            "loaded {} characters from {}",
            model.record_count(),
            path.display()
        );
        Ok(model)
    }

    /// Scans the character table, then reads the currency from the same
    /// stream. A failed currency read leaves the currency absent instead of
    /// failing the load; a failed record scan fails the load.
    pub fn load<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let records = scan_records(&mut reader, RECORD_TABLE_OFFSET)?;

        let currency = match read_currency(&mut reader, CURRENCY_OFFSET) {
            Ok(currency) => currency,
            Err(e) => {
                warn!("currency not loaded: {e}");
                CurrencyRecord::default()
            }
        };

        Ok(Self { records, currency })
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record_at(&self, index: usize) -> Option<&CharacterRecord> {
        self.records.get(index)
    }

    /// Replaces the typed fields of record `index`. Returns `false` and
    /// changes nothing when the index is out of bounds.
    pub fn update_record(&mut self, index: usize, stats: CharacterStats) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.stats = stats;
                true
            }
            None => false,
        }
    }

    /// Sets a single field of record `index`, checking the value against the
    /// field's on-disk width.
    pub fn set_stat(&mut self, index: usize, field: StatField, value: i64) -> Result<()> {
        let count = self.record_count();
        let record = self
            .records
            .get_mut(index)
            .ok_or(SaveError::RecordNotFound { index, count })?;
        let mut stats = record.stats;
        field.set(&mut stats, value)?;
        record.stats = stats;
        Ok(())
    }

    pub fn currency(&self) -> &CurrencyRecord {
        &self.currency
    }

    pub fn update_currency(&mut self, value: i32) {
        self.currency.value = value;
    }

    pub fn has_changes(&self) -> bool {
        let currency_changed = self
            .currency
            .original_value()
            .is_some_and(|v| v != self.currency.value);
        currency_changed || self.records.iter().any(|r| !r.changes().is_empty())
    }

    /// See [`writer::save`] for the consistency contract on failure.
    pub fn save(&self, source_path: &Path, dest_path: &Path) -> Result<()> {
        writer::save(source_path, dest_path, self)
    }
}
