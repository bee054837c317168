use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{Result, SaveError};
use crate::layout::{ByteRange, StatField};
use crate::model::SaveModel;

/// A write confined to `bytes.len()` bytes at an absolute offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub offset: u64,
    pub bytes: Vec<u8>,
    pub label: String,
    /// The bytes differ from what was on disk at load time.
    pub edited: bool,
}

impl Patch {
    pub fn end(&self) -> u64 {
        self.offset + self.bytes.len() as u64
    }

    pub fn range(&self) -> ByteRange {
        ByteRange {
            start: self.offset,
            end: self.end(),
        }
    }

    /// True when both patches write the same bytes wherever they overlap.
    fn agrees_with(&self, other: &Patch) -> bool {
        match self.range().intersection(&other.range()) {
            Some(shared) => self.slice(shared) == other.slice(shared),
            None => true,
        }
    }

    fn slice(&self, range: ByteRange) -> &[u8] {
        let start = (range.start - self.offset) as usize;
        let end = (range.end - self.offset) as usize;
        &self.bytes[start..end]
    }
}

/// Every positioned write a save will perform, in write order: currency
/// first, then each record's numeric fields in file order. Names and padding
/// never appear in a plan.
///
/// With six or more records the currency shares its bytes with record 5's
/// `max_hp`. Where two patches overlap and disagree, an edited value replaces
/// an unedited one; two edits that disagree are a [`SaveError::PatchConflict`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    patches: Vec<Patch>,
}

impl PatchPlan {
    pub fn from_model(model: &SaveModel) -> Result<Self> {
        let mut patches = Vec::with_capacity(1 + model.record_count() * StatField::ALL.len());

        let currency = model.currency();
        if currency.is_loaded() {
            patches.push(Patch {
                offset: currency.position,
                bytes: crate::codec::encode_i32_le(currency.value).to_vec(),
                label: "currency".to_string(),
                edited: currency.original_value() != Some(currency.value),
            });
        }

        for (index, record) in model.records().iter().enumerate() {
            let snapshot = record.raw_snapshot();
            for field in StatField::ALL {
                let value = field.get(&record.stats);
                patches.push(Patch {
                    offset: field.field_range(record.position).start,
                    bytes: value.to_le_bytes(),
                    label: format!("record {index} {}", field.key()),
                    edited: snapshot.decode(field) != Some(value),
                });
            }
        }

        Ok(Self {
            patches: resolve_overlaps(patches)?,
        })
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Rejects any patch that would write past `file_len`.
    pub fn validate(&self, file_len: u64) -> Result<()> {
        match self.patches.iter().find(|p| p.end() > file_len) {
            Some(patch) => Err(SaveError::OutOfRange {
                offset: patch.offset,
                len: patch.end() - patch.offset,
                file_len,
            }),
            None => Ok(()),
        }
    }

    /// Applies every patch through one open handle, then syncs it.
    pub fn apply(&self, file: &mut File) -> Result<()> {
        let file_len = file.metadata()?.len();
        self.validate(file_len)?;

        for patch in &self.patches {
            file.seek(SeekFrom::Start(patch.offset))?;
            file.write_all(&patch.bytes)?;
            debug!(
                "wrote {} ({} bytes) at offset {}",
                patch.label,
                patch.bytes.len(),
                patch.offset
            );
        }
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}

/// Writes the model's numeric values into `dest_path`, first copying
/// `source_path` over it when the two are different files.
///
/// Only the byte ranges of numeric fields and of the currency are written;
/// every other byte of the destination keeps the source's value. If this
/// returns an error the destination may be partially patched: treat it as
/// untrusted and copy it again from the source before retrying. Conflicting
/// edits are detected before the copy, so they leave the destination alone.
pub fn save(source_path: &Path, dest_path: &Path, model: &SaveModel) -> Result<()> {
    let plan = PatchPlan::from_model(model)?;

    if !same_file(source_path, dest_path)? {
        let copied = fs::copy(source_path, dest_path)?;
        debug!(
            "copied {copied} bytes from {} to {}",
            source_path.display(),
            dest_path.display()
        );
    }

    let mut file = OpenOptions::new().write(true).open(dest_path)?;
    plan.apply(&mut file)?;

    info!(
        "patched {} fields in {}",
        plan.len(),
        dest_path.display()
    );
    Ok(())
}

/// Drops patches made redundant by an overlapping edit. An unedited patch
/// rewrites the bytes already on disk, so removing it never loses data.
fn resolve_overlaps(patches: Vec<Patch>) -> Result<Vec<Patch>> {
    let mut order: Vec<usize> = (0..patches.len()).collect();
    order.sort_by_key(|&i| patches[i].offset);

    let mut dropped = vec![false; patches.len()];
    for (k, &i) in order.iter().enumerate() {
        for &j in &order[k + 1..] {
            let (a, b) = (&patches[i], &patches[j]);
            if b.offset >= a.end() {
                break;
            }
            if a.agrees_with(b) {
                continue;
            }
            match (a.edited, b.edited) {
                (true, true) => {
                    return Err(SaveError::PatchConflict {
                        offset: b.offset,
                        first: a.label.clone(),
                        second: b.label.clone(),
                    });
                }
                (true, false) => dropped[j] = true,
                (false, _) => dropped[i] = true,
            }
            warn!(
                "{} and {} share offset {}; keeping the edited value",
                a.label, b.label, b.offset
            );
        }
    }

    Ok(patches
        .into_iter()
        .zip(dropped)
        .filter_map(|(patch, dropped)| (!dropped).then_some(patch))
        .collect())
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    if a == b {
        return Ok(true);
    }
    if !b.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}
