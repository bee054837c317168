//! Reader and patch writer for the fixed-layout save files of a legacy
//! role-playing game.
//!
//! Loading scans the character table and reads the currency into a
//! [`SaveModel`]. Saving copies the source file and overwrites only the byte
//! ranges of numeric fields, so names, padding and every unknown byte stay
//! exactly as they were.
//!
//! ```no_run
//! use std::path::Path;
//! use wcsave_core::{SaveModel, StatField};
//!
//! let source = Path::new("Save1.dat");
//! let mut model = SaveModel::open(source)?;
//! model.set_stat(0, StatField::Level, 50)?;
//! model.update_currency(99_999);
//! model.save(source, Path::new("Save1_edited.dat"))?;
//! # Ok::<(), wcsave_core::SaveError>(())
//! ```

pub mod codec;
pub mod currency;
pub mod error;
pub mod layout;
pub mod model;
pub mod reader;
pub mod record;
pub mod scanner;
pub mod writer;

pub use error::{ErrorCode, Result, SaveError};
pub use layout::{
    ByteRange, CURRENCY_OFFSET, FieldWidth, RECORD_SIZE, RECORD_TABLE_OFFSET, StatField, StatValue,
};
pub use model::SaveModel;
pub use record::{CharacterRecord, CharacterStats, CurrencyRecord, FieldChange, RawSnapshot};
pub use scanner::{RecordScanner, scan_records};
pub use writer::{Patch, PatchPlan};
