mod common;

use std::fs;

use common::{FixtureRecord, build_image, diff_offsets, record_position, write_image};
use wcsave_core::layout::{NAME_WIDTH, PADDING_RANGES};
use wcsave_core::{CURRENCY_OFFSET, ErrorCode, PatchPlan, SaveError, SaveModel, StatField};

/// Six characters; the last one's `max_hp` lives at the currency offset.
fn full_party(currency: i32) -> Vec<FixtureRecord> {
    let mut records: Vec<FixtureRecord> = [&b"Ann"[..], b"Bo", b"Cy", b"Di", b"Ed", b"Fay"]
        .iter()
        .zip(1i16..)
        .map(|(name, level)| FixtureRecord::new(name, level))
        .collect();
    records[5].stats.max_hp = currency;
    records
}

fn party() -> Vec<FixtureRecord> {
    vec![
        FixtureRecord::new(b"Ann", 10),
        FixtureRecord::new(b"Bo", 20),
        FixtureRecord::new(b"Cy", 30),
    ]
}

#[test]
fn unmodified_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1234));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_copy.dat");

    let model = SaveModel::open(&source).unwrap();
    model.save(&source, &dest).unwrap();

    let written = fs::read(&dest).unwrap();
    assert_eq!(written, data);
    assert_eq!(fs::read(&source).unwrap(), data);
}

#[test]
fn level_update_touches_only_its_two_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1234));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_level.dat");

    let mut model = SaveModel::open(&source).unwrap();
    let mut stats = model.record_at(1).unwrap().stats;
    stats.level = 50;
    assert!(model.update_record(1, stats));
    model.save(&source, &dest).unwrap();

    let written = fs::read(&dest).unwrap();
    let p = record_position(1) as usize;
    assert_eq!(diff_offsets(&data, &written), vec![p + 70]);
    assert_eq!(&written[p + 70..p + 72], &50i16.to_le_bytes());
}

#[test]
fn each_field_update_is_isolated_to_its_range() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1234));
    let source = write_image(dir.path(), "Save1.dat", &data);

    for field in StatField::ALL {
        let dest = dir.path().join(format!("Save1_{}.dat", field.key()));
        let mut model = SaveModel::open(&source).unwrap();
        // -1 differs from every fixture value in every byte.
        model.set_stat(2, field, -1).unwrap();
        model.save(&source, &dest).unwrap();

        let written = fs::read(&dest).unwrap();
        let range = field.field_range(record_position(2));
        let expected: Vec<usize> = (range.start as usize..range.end as usize).collect();
        assert_eq!(diff_offsets(&data, &written), expected, "field {field}");
    }
}

#[test]
fn currency_write_uses_little_endian_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1000));
    let c = CURRENCY_OFFSET as usize;
    assert_eq!(&data[c..c + 4], &[0xE8, 0x03, 0x00, 0x00]);
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_money.dat");

    let mut model = SaveModel::open(&source).unwrap();
    assert_eq!(model.currency().value, 1000);
    model.update_currency(500);
    model.save(&source, &dest).unwrap();

    let written = fs::read(&dest).unwrap();
    assert_eq!(&written[c..c + 4], &[0xF4, 0x01, 0x00, 0x00]);
    assert_eq!(diff_offsets(&data, &written), vec![c, c + 1]);
}

#[test]
fn names_and_padding_survive_in_place_save() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(9));
    let path = write_image(dir.path(), "Save1.dat", &data);

    let mut model = SaveModel::open(&path).unwrap();
    for index in 0..model.record_count() {
        for field in StatField::ALL {
            model.set_stat(index, field, 7).unwrap();
        }
    }
    model.update_currency(-3);
    model.save(&path, &path).unwrap();

    let written = fs::read(&path).unwrap();
    assert_eq!(written.len(), data.len());
    for index in 0..3 {
        let p = record_position(index) as usize;
        assert_eq!(&written[p..p + NAME_WIDTH], &data[p..p + NAME_WIDTH]);
        for pad in PADDING_RANGES {
            let r = pad.shifted(p as u64);
            assert_eq!(
                &written[r.start as usize..r.end as usize],
                &data[r.start as usize..r.end as usize]
            );
        }
        assert_eq!(&written[p + 70..p + 72], &7i16.to_le_bytes());
        assert_eq!(&written[p + 8..p + 12], &7i32.to_le_bytes());
    }

    let reloaded = SaveModel::open(&path).unwrap();
    assert_eq!(reloaded.currency().value, -3);
    assert!(reloaded.records().iter().all(|r| r.stats.luck == 7));
}

#[test]
fn equivalent_paths_do_not_truncate_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(9));
    let path = write_image(dir.path(), "Save1.dat", &data);
    let dotted = dir.path().join(".").join("Save1.dat");

    let model = SaveModel::open(&path).unwrap();
    model.save(&path, &dotted).unwrap();
    assert_eq!(fs::read(&path).unwrap(), data);
}

#[test]
fn missing_currency_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), None);
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_out.dat");

    let mut model = SaveModel::open(&source).unwrap();
    model.update_currency(5000);
    let plan = PatchPlan::from_model(&model).unwrap();
    assert_eq!(plan.len(), 3 * StatField::ALL.len());

    model.save(&source, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), data);
}

#[test]
fn plan_lists_currency_then_fields_in_file_order() {
    let model = SaveModel::load(std::io::Cursor::new(build_image(&party(), Some(1)))).unwrap();
    let plan = PatchPlan::from_model(&model).unwrap();
    let patches = plan.patches();

    assert_eq!(patches[0].offset, CURRENCY_OFFSET);
    assert_eq!(patches[0].bytes.len(), 4);
    let record_offsets: Vec<u64> = patches[1..].iter().map(|p| p.offset).collect();
    assert!(record_offsets.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(patches[1].offset, record_position(0) + 8);
    assert_eq!(patches.last().unwrap().offset, record_position(2) + 70);
}

#[test]
fn plan_past_end_of_destination_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let model = SaveModel::open(&source).unwrap();

    // The destination exists but is shorter than the record table.
    let dest = write_image(dir.path(), "short.dat", &[0xAB; 64]);
    let plan = PatchPlan::from_model(&model).unwrap();
    let mut file = fs::OpenOptions::new().write(true).open(&dest).unwrap();
    let err = plan.apply(&mut file).unwrap_err();
    assert_eq!(err.code(), ErrorCode::OutOfRange);
    assert_eq!(fs::read(&dest).unwrap(), vec![0xAB; 64]);
}

#[test]
fn missing_source_fails_the_save() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&party(), Some(1));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let model = SaveModel::open(&source).unwrap();

    let err = model
        .save(&dir.path().join("gone.dat"), &dir.path().join("out.dat"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Io);
}

#[test]
fn six_record_save_without_edits_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&full_party(1000), Some(1000));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_copy.dat");

    let model = SaveModel::open(&source).unwrap();
    assert_eq!(model.record_count(), 6);
    assert_eq!(model.record_at(5).unwrap().stats.max_hp, 1000);
    model.save(&source, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), data);
}

#[test]
fn currency_edit_survives_a_sixth_record() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&full_party(1000), Some(1000));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_money.dat");

    let mut model = SaveModel::open(&source).unwrap();
    model.update_currency(500);
    model.save(&source, &dest).unwrap();

    let written = fs::read(&dest).unwrap();
    let c = CURRENCY_OFFSET as usize;
    assert_eq!(&written[c..c + 4], &[0xF4, 0x01, 0x00, 0x00]);
    assert_eq!(diff_offsets(&data, &written), vec![c, c + 1]);

    let plan = PatchPlan::from_model(&model).unwrap();
    assert_eq!(plan.len(), 6 * StatField::ALL.len());
    assert!(plan.patches().iter().all(|p| p.label != "record 5 max_hp"));
}

#[test]
fn sixth_record_max_hp_edit_wins_over_unchanged_currency() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&full_party(1000), Some(1000));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_hp.dat");

    let mut model = SaveModel::open(&source).unwrap();
    model.set_stat(5, StatField::MaxHp, 777).unwrap();
    model.save(&source, &dest).unwrap();

    let reloaded = SaveModel::open(&dest).unwrap();
    assert_eq!(reloaded.record_at(5).unwrap().stats.max_hp, 777);
    assert_eq!(reloaded.currency().value, 777);
}

#[test]
fn disagreeing_edits_on_shared_bytes_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&full_party(1000), Some(1000));
    let source = write_image(dir.path(), "Save1.dat", &data);
    let dest = dir.path().join("Save1_out.dat");

    let mut model = SaveModel::open(&source).unwrap();
    model.update_currency(500);
    model.set_stat(5, StatField::MaxHp, 777).unwrap();

    let err = model.save(&source, &dest).unwrap_err();
    assert_eq!(err.code(), ErrorCode::OutOfRange);
    assert!(matches!(
        err,
        SaveError::PatchConflict { offset, .. } if offset == CURRENCY_OFFSET
    ));
    assert!(!dest.exists());

    let err = model.save(&source, &source).unwrap_err();
    assert!(matches!(err, SaveError::PatchConflict { .. }));
    assert_eq!(fs::read(&source).unwrap(), data);
}

#[test]
fn agreeing_edits_on_shared_bytes_are_both_kept() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_image(&full_party(1000), Some(1000));
    let path = write_image(dir.path(), "Save1.dat", &data);

    let mut model = SaveModel::open(&path).unwrap();
    model.update_currency(4321);
    model.set_stat(5, StatField::MaxHp, 4321).unwrap();
    model.save(&path, &path).unwrap();

    let reloaded = SaveModel::open(&path).unwrap();
    assert_eq!(reloaded.currency().value, 4321);
    assert_eq!(reloaded.record_at(5).unwrap().stats.max_hp, 4321);
}
