#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use wcsave_core::{CURRENCY_OFFSET, CharacterStats, RECORD_SIZE, RECORD_TABLE_OFFSET, StatField};

pub const TRAILER_LEN: usize = 64;

pub struct FixtureRecord {
    pub name: [u8; 6],
    pub stats: CharacterStats,
}

impl FixtureRecord {
    pub fn new(name: &[u8], level: i16) -> Self {
        let mut padded = [0u8; 6];
        padded[..name.len()].copy_from_slice(name);
        Self {
            name: padded,
            stats: CharacterStats {
                current_exp: 1200 * level as i32,
                next_level_exp: 1500 * level as i32,
                current_hp: 80,
                current_mp: 40,
                max_hp: 100 + level as i32,
                max_mp: 50,
                strength: 12,
                reaction: 9,
                constitution: 11,
                speed: 8,
                attack: 30,
                defense: 25,
                luck: 5,
                level,
            },
        }
    }
}

/// Byte `i` of the filler; never zero so padding changes are visible.
pub fn filler(i: usize) -> u8 {
    ((i * 131 + 17) % 255) as u8 + 1
}

/// Builds a save image with `records` at the table offset, the sentinel
/// after them, and the currency at its fixed offset when given. Without a
/// currency the image ends before the currency offset.
///
/// From the sixth record on the table covers the currency offset, so record
/// 5's `max_hp` must equal the currency.
pub fn build_image(records: &[FixtureRecord], currency: Option<i32>) -> Vec<u8> {
    let sentinel = (RECORD_TABLE_OFFSET + records.len() as u64 * RECORD_SIZE) as usize;
    let total = (CURRENCY_OFFSET as usize + 4).max(sentinel + 2) + TRAILER_LEN;
    let mut data: Vec<u8> = (0..total).map(filler).collect();

    match (currency, records.get(5)) {
        (Some(value), Some(sixth)) => assert_eq!(
            sixth.stats.max_hp, value,
            "record 5 max_hp is the currency"
        ),
        (None, Some(_)) => panic!("six records need a currency"),
        _ => {}
    }

    for (i, record) in records.iter().enumerate() {
        let position = RECORD_TABLE_OFFSET + i as u64 * RECORD_SIZE;
        let p = position as usize;
        data[p..p + 6].copy_from_slice(&record.name);
        for field in StatField::ALL {
            let range = field.field_range(position);
            let bytes = field.get(&record.stats).to_le_bytes();
            data[range.start as usize..range.end as usize].copy_from_slice(&bytes);
        }
    }

    data[sentinel..sentinel + 2].fill(0);

    match currency {
        Some(value) => {
            let c = CURRENCY_OFFSET as usize;
            data[c..c + 4].copy_from_slice(&value.to_le_bytes());
        }
        None => data.truncate(CURRENCY_OFFSET as usize),
    }
    data
}

pub fn write_image(dir: &Path, file_name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, data).expect("failed to write fixture image");
    path
}

pub fn record_position(index: usize) -> u64 {
    RECORD_TABLE_OFFSET + index as u64 * RECORD_SIZE
}

/// Offsets at which `a` and `b` differ.
pub fn diff_offsets(a: &[u8], b: &[u8]) -> Vec<usize> {
    assert_eq!(a.len(), b.len(), "images differ in length");
    a.iter()
        .zip(b)
        .enumerate()
        .filter_map(|(i, (x, y))| (x != y).then_some(i))
        .collect()
}
