use serde::{Deserialize, Serialize};

use crate::codec;
use crate::layout::{CURRENCY_WIDTH, FieldWidth, NAME_WIDTH, StatField, StatValue};

/// Typed numeric fields of one character, as edited by collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterStats {
    pub current_exp: i32,
    pub next_level_exp: i32,
    pub current_hp: i32,
    pub current_mp: i32,
    pub max_hp: i32,
    pub max_mp: i32,
    pub strength: i16,
    pub reaction: i16,
    pub constitution: i16,
    pub speed: i16,
    pub attack: i16,
    pub defense: i16,
    pub luck: i16,
    pub level: i16,
}

impl CharacterStats {
    pub fn get(&self, field: StatField) -> StatValue {
        field.get(self)
    }
}

/// On-disk bytes of every field, captured once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot {
    name: [u8; NAME_WIDTH],
    fields: Vec<(StatField, Vec<u8>)>,
}

impl RawSnapshot {
    pub(crate) fn new(name: [u8; NAME_WIDTH]) -> Self {
        Self {
            name,
            fields: Vec::with_capacity(StatField::ALL.len()),
        }
    }

    pub(crate) fn push(&mut self, field: StatField, bytes: &[u8]) {
        self.fields.push((field, bytes.to_vec()));
    }

    pub fn name(&self) -> &[u8; NAME_WIDTH] {
        &self.name
    }

    pub fn field(&self, field: StatField) -> Option<&[u8]> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn decode(&self, field: StatField) -> Option<StatValue> {
        let bytes = self.field(field)?;
        match field.width() {
            FieldWidth::I32 => Some(StatValue::I32(codec::decode_i32_le(bytes.try_into().ok()?))),
            FieldWidth::I16 => Some(StatValue::I16(codec::decode_i16_le(bytes.try_into().ok()?))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: StatField,
    pub before: i64,
    pub after: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterRecord {
    pub name: String,
    pub stats: CharacterStats,
    /// Absolute offset of this record's block in the source file.
    pub position: u64,
    #[serde(skip)]
    raw: RawSnapshot,
}

impl CharacterRecord {
    pub(crate) fn new(name: String, stats: CharacterStats, position: u64, raw: RawSnapshot) -> Self {
        Self {
            name,
            stats,
            position,
            raw,
        }
    }

    pub fn raw_snapshot(&self) -> &RawSnapshot {
        &self.raw
    }

    /// The stats as they were on disk when the record was loaded.
    pub fn original_stats(&self) -> CharacterStats {
        let mut stats = CharacterStats::default();
        for field in StatField::ALL {
            if let Some(value) = self.raw.decode(field) {
                // The snapshot was read at the field's own width, so this cannot overflow.
                let _ = field.set(&mut stats, value.as_i64());
            }
        }
        stats
    }

    pub fn changes(&self) -> Vec<FieldChange> {
        StatField::ALL
            .into_iter()
            .filter_map(|field| {
                let before = self.raw.decode(field)?.as_i64();
                let after = field.get(&self.stats).as_i64();
                (before != after).then_some(FieldChange {
                    field,
                    before,
                    after,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyRecord {
    pub value: i32,
    /// Absolute offset of the value; zero means it was never read.
    pub position: u64,
    #[serde(skip)]
    raw: Vec<u8>,
}

impl CurrencyRecord {
    pub(crate) fn loaded(value: i32, position: u64, raw: [u8; CURRENCY_WIDTH]) -> Self {
        Self {
            value,
            position,
            raw: raw.to_vec(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.position != 0 && !self.raw.is_empty()
    }

    pub fn raw_snapshot(&self) -> &[u8] {
        &self.raw
    }

    pub fn original_value(&self) -> Option<i32> {
        let raw: [u8; CURRENCY_WIDTH] = self.raw.as_slice().try_into().ok()?;
        Some(codec::decode_i32_le(raw))
    }
}
