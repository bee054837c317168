mod render;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::debug;
use serde_json::Value as JsonValue;
use wcsave_core::{SaveError, SaveModel, StatField};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE.DAT")]
    path: PathBuf,
    #[arg(long)]
    json: bool,
    /// Log decoding and patch details to stderr.
    #[arg(long, short)]
    verbose: bool,
    /// 0-based character index to show or edit.
    #[arg(long, value_name = "INDEX")]
    character: Option<usize>,
    #[arg(long = "set-current-exp", allow_hyphen_values = true)]
    set_current_exp: Option<i32>,
    #[arg(long = "set-next-level-exp", allow_hyphen_values = true)]
    set_next_level_exp: Option<i32>,
    #[arg(long = "set-current-hp", allow_hyphen_values = true)]
    set_current_hp: Option<i32>,
    #[arg(long = "set-current-mp", allow_hyphen_values = true)]
    set_current_mp: Option<i32>,
    #[arg(long = "set-max-hp", allow_hyphen_values = true)]
    set_max_hp: Option<i32>,
    #[arg(long = "set-max-mp", allow_hyphen_values = true)]
    set_max_mp: Option<i32>,
    #[arg(long = "set-strength", allow_hyphen_values = true)]
    set_strength: Option<i16>,
    #[arg(long = "set-reaction", allow_hyphen_values = true)]
    set_reaction: Option<i16>,
    #[arg(long = "set-constitution", allow_hyphen_values = true)]
    set_constitution: Option<i16>,
    #[arg(long = "set-speed", allow_hyphen_values = true)]
    set_speed: Option<i16>,
    #[arg(long = "set-attack", allow_hyphen_values = true)]
    set_attack: Option<i16>,
    #[arg(long = "set-defense", allow_hyphen_values = true)]
    set_defense: Option<i16>,
    #[arg(long = "set-luck", allow_hyphen_values = true)]
    set_luck: Option<i16>,
    #[arg(long = "set-level", allow_hyphen_values = true)]
    set_level: Option<i16>,
    #[arg(long = "set-currency", allow_hyphen_values = true)]
    set_currency: Option<i32>,
    /// Where to write the patched save; may equal the input path.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn stat_edits(&self) -> Vec<(StatField, i64)> {
        let wide = [
            (StatField::CurrentExp, self.set_current_exp),
            (StatField::NextLevelExp, self.set_next_level_exp),
            (StatField::CurrentHp, self.set_current_hp),
            (StatField::CurrentMp, self.set_current_mp),
            (StatField::MaxHp, self.set_max_hp),
            (StatField::MaxMp, self.set_max_mp),
        ];
        let narrow = [
            (StatField::Strength, self.set_strength),
            (StatField::Reaction, self.set_reaction),
            (StatField::Constitution, self.set_constitution),
            (StatField::Speed, self.set_speed),
            (StatField::Attack, self.set_attack),
            (StatField::Defense, self.set_defense),
            (StatField::Luck, self.set_luck),
            (StatField::Level, self.set_level),
        ];

        let mut edits: Vec<(StatField, i64)> = wide
            .into_iter()
            .filter_map(|(field, v)| v.map(|v| (field, v as i64)))
            .chain(
                narrow
                    .into_iter()
                    .filter_map(|(field, v)| v.map(|v| (field, v as i64))),
            )
            .collect();
        edits.sort_by_key(|(field, _)| *field);
        edits
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stat_edits = cli.stat_edits();
    let has_edits = !stat_edits.is_empty() || cli.set_currency.is_some();

    if !stat_edits.is_empty() && cli.character.is_none() {
        eprintln!("field --set-* flags require --character <INDEX>");
        process::exit(2);
    }
    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }

    let mut model = SaveModel::open(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if let Some(index) = cli.character {
        if model.record_at(index).is_none() {
            eprintln!(
                "character {index} not found, save has {} characters",
                model.record_count()
            );
            process::exit(1);
        }
        for &(field, value) in &stat_edits {
            debug!("setting {field} of character {index} to {value}");
            model.set_stat(index, field, value).unwrap_or_else(|e| {
                eprintln!("Error applying {field} edit: {e}");
                process::exit(1);
            });
        }
    }

    if let Some(value) = cli.set_currency {
        if !model.currency().is_loaded() {
            eprintln!("currency was not found in this save and cannot be edited");
            process::exit(1);
        }
        model.update_currency(value);
    }

    if let Some(out_path) = cli.output.as_ref() {
        model.save(&cli.path, out_path).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            if !matches!(e, SaveError::PatchConflict { .. }) {
                eprintln!("  the output may be partially written; copy the source again before retrying");
            }
            process::exit(1);
        });

        if cli.json {
            print_json(&render::changes_json(&model));
        } else {
            println!("Wrote edited save to {}", out_path.display());
            print!("{}", render::change_report(&model));
        }
        return;
    }

    if cli.json {
        print_json(&render::model_json(&model, cli.character));
    } else {
        print!("{}", render::summary(&model, cli.character));
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}
