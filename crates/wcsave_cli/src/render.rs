use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use wcsave_core::{CharacterRecord, SaveModel, StatField};

const LABEL_WIDTH: usize = 14;

pub fn summary(model: &SaveModel, only: Option<usize>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Characters: {}", model.record_count());

    for (index, record) in selected(model, only) {
        out.push('\n');
        let _ = writeln!(out, "[{index}] {}  (offset {})", record.name, record.position);
        let s = &record.stats;
        push_row(&mut out, "Level", s.level.to_string());
        push_row(
            &mut out,
            "Experience",
            format!("{}/{}", s.current_exp, s.next_level_exp),
        );
        push_row(&mut out, "HP", format!("{}/{}", s.current_hp, s.max_hp));
        push_row(&mut out, "MP", format!("{}/{}", s.current_mp, s.max_mp));
        for field in [
            StatField::Strength,
            StatField::Reaction,
            StatField::Constitution,
            StatField::Speed,
            StatField::Attack,
            StatField::Defense,
            StatField::Luck,
        ] {
            push_row(&mut out, field.label(), s.get(field).to_string());
        }
    }

    out.push('\n');
    let _ = writeln!(out, "Currency: {}", currency_text(model));
    out
}

pub fn change_report(model: &SaveModel) -> String {
    let mut out = String::new();

    let currency = model.currency();
    if let Some(before) = currency.original_value().filter(|v| *v != currency.value) {
        let _ = writeln!(out, "Currency: {before} -> {}", currency.value);
    }

    for (index, record) in model.records().iter().enumerate() {
        let changes = record.changes();
        if changes.is_empty() {
            continue;
        }
        let _ = writeln!(out, "[{index}] {}", record.name);
        for change in &changes {
            push_row(
                &mut out,
                change.field.label(),
                format!("{} -> {}", change.before, change.after),
            );
        }
    }

    if out.is_empty() {
        out.push_str("No values changed\n");
    }
    out
}

pub fn model_json(model: &SaveModel, only: Option<usize>) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert(
        "characters".to_string(),
        JsonValue::Array(
            selected(model, only)
                .map(|(index, record)| record_json(index, record))
                .collect(),
        ),
    );
    out.insert("currency".to_string(), currency_json(model));
    JsonValue::Object(out)
}

pub fn changes_json(model: &SaveModel) -> JsonValue {
    let mut out = JsonMap::new();

    let currency = model.currency();
    let currency_change = match currency.original_value() {
        Some(before) if before != currency.value => {
            let mut change = JsonMap::new();
            change.insert("before".to_string(), JsonValue::from(before));
            change.insert("after".to_string(), JsonValue::from(currency.value));
            JsonValue::Object(change)
        }
        _ => JsonValue::Null,
    };
    out.insert("currency".to_string(), currency_change);

    let characters = model
        .records()
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let changes = record.changes();
            if changes.is_empty() {
                return None;
            }
            let mut entry = JsonMap::new();
            entry.insert("index".to_string(), JsonValue::from(index));
            entry.insert("name".to_string(), JsonValue::String(record.name.clone()));
            entry.insert(
                "changes".to_string(),
                serde_json::to_value(&changes).unwrap_or(JsonValue::Null),
            );
            Some(JsonValue::Object(entry))
        })
        .collect();
    out.insert("characters".to_string(), JsonValue::Array(characters));

    JsonValue::Object(out)
}

fn record_json(index: usize, record: &CharacterRecord) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("index".to_string(), JsonValue::from(index));
    out.insert("name".to_string(), JsonValue::String(record.name.clone()));
    out.insert("position".to_string(), JsonValue::from(record.position));
    out.insert(
        "stats".to_string(),
        serde_json::to_value(record.stats).unwrap_or(JsonValue::Null),
    );
    JsonValue::Object(out)
}

fn currency_json(model: &SaveModel) -> JsonValue {
    let currency = model.currency();
    if currency.is_loaded() {
        JsonValue::from(currency.value)
    } else {
        JsonValue::Null
    }
}

fn currency_text(model: &SaveModel) -> String {
    let currency = model.currency();
    if currency.is_loaded() {
        currency.value.to_string()
    } else {
        "unknown".to_string()
    }
}

fn selected(
    model: &SaveModel,
    only: Option<usize>,
) -> impl Iterator<Item = (usize, &CharacterRecord)> {
    model
        .records()
        .iter()
        .enumerate()
        .filter(move |(index, _)| only.is_none_or(|wanted| wanted == *index))
}

fn push_row(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value}");
}
