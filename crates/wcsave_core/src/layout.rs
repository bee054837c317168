use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::record::CharacterStats;

/// Absolute offset of the character-record table.
pub const RECORD_TABLE_OFFSET: u64 = 202_618;
/// Absolute offset of the 4-byte currency value.
pub const CURRENCY_OFFSET: u64 = 203_054;
/// Size of one character block, padding included.
pub const RECORD_SIZE: u64 = 84;

pub const NAME_OFFSET: u64 = 0;
pub const NAME_WIDTH: usize = 6;
/// Bytes probed at the start of each block; both zero ends the table.
pub const SENTINEL_WIDTH: usize = 2;
pub const CURRENCY_WIDTH: usize = 4;

/// Unknown regions inside a record block, relative to the block start.
pub const PADDING_RANGES: [ByteRange; 4] = [
    ByteRange { start: 6, end: 8 },
    ByteRange { start: 44, end: 52 },
    ByteRange { start: 54, end: 70 },
    ByteRange { start: 72, end: 84 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn shifted(&self, base: u64) -> ByteRange {
        ByteRange {
            start: base + self.start,
            end: base + self.end,
        }
    }

    /// The bytes covered by both ranges, if any.
    pub fn intersection(&self, other: &ByteRange) -> Option<ByteRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(ByteRange { start, end })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    I32,
    I16,
}

impl FieldWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::I32 => 4,
            Self::I16 => 2,
        }
    }
}

impl fmt::Display for FieldWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32 => f.write_str("32-bit"),
            Self::I16 => f.write_str("16-bit"),
        }
    }
}

/// The numeric fields of a character block, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    CurrentExp,
    NextLevelExp,
    MaxHp,
    MaxMp,
    CurrentHp,
    CurrentMp,
    Strength,
    Reaction,
    Constitution,
    Speed,
    Attack,
    Defense,
    Luck,
    Level,
}

impl StatField {
    pub const ALL: [StatField; 14] = [
        Self::CurrentExp,
        Self::NextLevelExp,
        Self::MaxHp,
        Self::MaxMp,
        Self::CurrentHp,
        Self::CurrentMp,
        Self::Strength,
        Self::Reaction,
        Self::Constitution,
        Self::Speed,
        Self::Attack,
        Self::Defense,
        Self::Luck,
        Self::Level,
    ];

    /// Offset relative to the start of the record block.
    pub fn offset(self) -> u64 {
        match self {
            Self::CurrentExp => 8,
            Self::NextLevelExp => 12,
            Self::MaxHp => 16,
            Self::MaxMp => 20,
            Self::CurrentHp => 24,
            Self::CurrentMp => 28,
            Self::Strength => 32,
            Self::Reaction => 34,
            Self::Constitution => 36,
            Self::Speed => 38,
            Self::Attack => 40,
            Self::Defense => 42,
            Self::Luck => 52,
            Self::Level => 70,
        }
    }

    pub fn width(self) -> FieldWidth {
        match self {
            Self::CurrentExp
            | Self::NextLevelExp
            | Self::MaxHp
            | Self::MaxMp
            | Self::CurrentHp
            | Self::CurrentMp => FieldWidth::I32,
            _ => FieldWidth::I16,
        }
    }

    pub fn range(self) -> ByteRange {
        let start = self.offset();
        ByteRange {
            start,
            end: start + self.width().bytes() as u64,
        }
    }

    /// Absolute byte range of this field for a record starting at `position`.
    pub fn field_range(self, position: u64) -> ByteRange {
        self.range().shifted(position)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::CurrentExp => "current_exp",
            Self::NextLevelExp => "next_level_exp",
            Self::MaxHp => "max_hp",
            Self::MaxMp => "max_mp",
            Self::CurrentHp => "current_hp",
            Self::CurrentMp => "current_mp",
            Self::Strength => "strength",
            Self::Reaction => "reaction",
            Self::Constitution => "constitution",
            Self::Speed => "speed",
            Self::Attack => "attack",
            Self::Defense => "defense",
            Self::Luck => "luck",
            Self::Level => "level",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CurrentExp => "Experience",
            Self::NextLevelExp => "Next Level",
            Self::MaxHp => "Max HP",
            Self::MaxMp => "Max MP",
            Self::CurrentHp => "HP",
            Self::CurrentMp => "MP",
            Self::Strength => "Strength",
            Self::Reaction => "Reaction",
            Self::Constitution => "Constitution",
            Self::Speed => "Speed",
            Self::Attack => "Attack",
            Self::Defense => "Defense",
            Self::Luck => "Luck",
            Self::Level => "Level",
        }
    }

    pub fn get(self, stats: &CharacterStats) -> StatValue {
        match self {
            Self::CurrentExp => StatValue::I32(stats.current_exp),
            Self::NextLevelExp => StatValue::I32(stats.next_level_exp),
            Self::MaxHp => StatValue::I32(stats.max_hp),
            Self::MaxMp => StatValue::I32(stats.max_mp),
            Self::CurrentHp => StatValue::I32(stats.current_hp),
            Self::CurrentMp => StatValue::I32(stats.current_mp),
            Self::Strength => StatValue::I16(stats.strength),
            Self::Reaction => StatValue::I16(stats.reaction),
            Self::Constitution => StatValue::I16(stats.constitution),
            Self::Speed => StatValue::I16(stats.speed),
            Self::Attack => StatValue::I16(stats.attack),
            Self::Defense => StatValue::I16(stats.defense),
            Self::Luck => StatValue::I16(stats.luck),
            Self::Level => StatValue::I16(stats.level),
        }
    }

    /// Stores `value` into `stats`, rejecting values wider than the field.
    pub fn set(self, stats: &mut CharacterStats, value: i64) -> Result<(), SaveError> {
        match self {
            Self::CurrentExp => stats.current_exp = self.narrow(value)?,
            Self::NextLevelExp => stats.next_level_exp = self.narrow(value)?,
            Self::MaxHp => stats.max_hp = self.narrow(value)?,
            Self::MaxMp => stats.max_mp = self.narrow(value)?,
            Self::CurrentHp => stats.current_hp = self.narrow(value)?,
            Self::CurrentMp => stats.current_mp = self.narrow(value)?,
            Self::Strength => stats.strength = self.narrow(value)?,
            Self::Reaction => stats.reaction = self.narrow(value)?,
            Self::Constitution => stats.constitution = self.narrow(value)?,
            Self::Speed => stats.speed = self.narrow(value)?,
            Self::Attack => stats.attack = self.narrow(value)?,
            Self::Defense => stats.defense = self.narrow(value)?,
            Self::Luck => stats.luck = self.narrow(value)?,
            Self::Level => stats.level = self.narrow(value)?,
        }
        Ok(())
    }

    fn narrow<T: TryFrom<i64>>(self, value: i64) -> Result<T, SaveError> {
        T::try_from(value).map_err(|_| SaveError::ValueOutOfRange { field: self, value })
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.key() == wanted)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    I32(i32),
    I16(i16),
}

impl StatValue {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::I32(v) => v as i64,
            Self::I16(v) => v as i64,
        }
    }

    pub fn to_le_bytes(self) -> Vec<u8> {
        match self {
            Self::I32(v) => crate::codec::encode_i32_le(v).to_vec(),
            Self::I16(v) => crate::codec::encode_i16_le(v).to_vec(),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}
