use std::path::PathBuf;

use crate::calc::{calculate_from_tokens, calculate_unit_hits, BallisticSkill};
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::data::{load_tables, validate_tables, ValidationSeverity};
use crate::server;

const USAGE: &str = "usage: datasheets <serve|calc|factions|units|unit|keywords|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Calc,
    Factions,
    Units,
    Unit,
    Keywords,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("calc") => Some(Command::Calc),
        Some("factions") => Some(Command::Factions),
        Some("units") => Some(Command::Units),
        Some("unit") => Some(Command::Unit),
        Some("keywords") => Some(Command::Keywords),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(config),
        Command::Calc => handle_calc(&config, args),
        Command::Validate => handle_validate(&config, args),
        Command::Factions | Command::Units | Command::Unit | Command::Keywords => {
            let dashboard = match Dashboard::open(config) {
                Ok(dashboard) => dashboard,
                Err(err) => {
                    eprintln!("failed to load data: {err}");
                    return 1;
                }
            };
            match command {
                Command::Factions => handle_factions(&dashboard),
                Command::Units => handle_units(&dashboard, args),
                Command::Unit => handle_unit(&dashboard, args),
                _ => handle_keywords(&dashboard, args),
            }
        }
    }
}

fn handle_serve(config: AppConfig) -> i32 {
    let dashboard = match Dashboard::open(config) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            eprintln!("failed to load data: {err}");
            return 1;
        }
    };
    match server::run_server(&dashboard) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}

/// Arguments after the command name, without `--flags`.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn handle_calc(config: &AppConfig, args: &[String]) -> i32 {
    let positional = positional(args);
    let (Some(attacks), Some(ballistic_skill)) = (positional.first(), positional.get(1)) else {
        eprintln!("usage: datasheets calc <attacks> <ballistic_skill> [hit_modifier] [save_roll] [--table]");
        return 2;
    };
    let hit_modifier = parse_i32_arg(positional.get(2), "hit_modifier", config.default_hit_modifier);
    let save_roll = parse_i32_arg(positional.get(3), "save_roll", config.default_save_roll);
    let as_table = args.iter().any(|arg| arg == "--table");

    let hits = match calculate_from_tokens(
        attacks,
        ballistic_skill,
        hit_modifier,
        save_roll,
        config.dice_average,
    ) {
        Ok(hits) => hits,
        Err(err) => {
            eprintln!("calculation failed: {err}");
            return 1;
        }
    };

    if as_table {
        println!("wound_roll\texpected_hits");
        for (threshold, value) in hits.iter() {
            println!("{threshold}\t{value:.2}");
        }
        return 0;
    }

    let effective_hit_roll = ballistic_skill
        .parse::<BallisticSkill>()
        .map(|bs| bs.effective_roll(hit_modifier))
        .unwrap_or(1);
    print_json(&serde_json::json!({
        "attacks": attacks,
        "ballistic_skill": ballistic_skill,
        "hit_modifier": hit_modifier,
        "save_roll": save_roll,
        "effective_hit_roll": effective_hit_roll,
        "expected_hits": hits,
    }))
}

fn handle_factions(dashboard: &Dashboard) -> i32 {
    for faction in dashboard.tables.factions() {
        println!("{faction}");
    }
    0
}

fn handle_units(dashboard: &Dashboard, args: &[String]) -> i32 {
    let positional = positional(args);
    if positional.is_empty() {
        eprintln!("usage: datasheets units <faction>");
        return 2;
    }
    let faction = positional.join(" ");
    let units = dashboard.tables.units_in_faction(&faction);
    if units.is_empty() {
        eprintln!("no units for faction '{faction}'");
        return 1;
    }
    for unit in units {
        println!("{}", unit.name);
    }
    0
}

fn handle_unit(dashboard: &Dashboard, args: &[String]) -> i32 {
    let positional = positional(args);
    let (name_words, numbers) = split_unit_args(&positional);
    if name_words.is_empty() {
        eprintln!("usage: datasheets unit <name> [save_roll] [hit_modifier]");
        return 2;
    }
    let name = name_words.join(" ");
    let Some(unit) = dashboard.tables.unit(&name) else {
        eprintln!("unknown unit '{name}'");
        return 1;
    };
    let save_roll = numbers
        .first()
        .and_then(|raw| parse_optional_i32(raw, "save_roll"));
    let hit_modifier = numbers
        .get(1)
        .and_then(|raw| parse_optional_i32(raw, "hit_modifier"));
    let settings = dashboard.config.calc_settings(hit_modifier, save_roll);

    let weapons: Vec<_> = dashboard
        .tables
        .weapons_for_unit(&unit.name)
        .into_iter()
        .cloned()
        .collect();
    let results = calculate_unit_hits(&weapons, settings, dashboard.pool());
    print_json(&serde_json::json!({
        "datasheet": unit.datasheet(),
        "hit_modifier": settings.hit_modifier,
        "save_roll": settings.save_roll,
        "weapons": results,
    }))
}

/// Leading words form the unit name; the first numeric argument starts the rolls.
fn split_unit_args<'a>(positional: &'a [&'a str]) -> (&'a [&'a str], &'a [&'a str]) {
    let split = positional
        .iter()
        .position(|arg| arg.parse::<i32>().is_ok())
        .unwrap_or(positional.len());
    positional.split_at(split)
}

fn handle_keywords(dashboard: &Dashboard, args: &[String]) -> i32 {
    let positional = positional(args);
    let Some(raw) = positional.first() else {
        eprintln!("usage: datasheets keywords <unit>[,<unit>...]");
        return 2;
    };
    let names: Vec<&str> = raw.split(',').map(str::trim).filter(|n| !n.is_empty()).collect();
    print_json(&serde_json::json!({ "keywords": dashboard.tables.keywords_for_units(&names) }))
}

fn handle_validate(config: &AppConfig, args: &[String]) -> i32 {
    let data_dir = positional(args)
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());

    let tables = match load_tables(&data_dir) {
        Ok(tables) => tables,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let report = validate_tables(&tables);
    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s)",
            report.count(ValidationSeverity::Error)
        );
        return 1;
    }
    println!(
        "validation passed: {} ({} warning(s))",
        data_dir.display(),
        report.count(ValidationSeverity::Warning)
    );
    0
}

fn parse_optional_i32(raw: &str, name: &str) -> Option<i32> {
    match raw.parse::<i32>() {
        Ok(value) => Some(value),
        Err(_) => {
            eprintln!("invalid {name} '{raw}', using default");
            None
        }
    }
}

fn parse_i32_arg(raw: Option<&&str>, name: &str, default: i32) -> i32 {
    raw.and_then(|value| parse_optional_i32(value, name))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_command(&args(&["datasheets", "calc"])), Some(Command::Calc));
        assert_eq!(parse_command(&args(&["datasheets", "serve"])), Some(Command::Serve));
        assert_eq!(parse_command(&args(&["datasheets", "simulate"])), None);
        assert_eq!(parse_command(&args(&["datasheets"])), None);
    }

    #[test]
    fn positional_skips_flags() {
        let a = args(&["datasheets", "calc", "D3", "--table", "4"]);
        assert_eq!(positional(&a), vec!["D3", "4"]);
    }

    #[test]
    fn unit_name_spans_words_before_the_rolls() {
        let words = ["Intercessor", "Squad", "3", "-1"];
        let (name, numbers) = split_unit_args(&words);
        assert_eq!(name, ["Intercessor", "Squad"]);
        assert_eq!(numbers, ["3", "-1"]);

        let (name, numbers) = split_unit_args(&["Boyz"]);
        assert_eq!(name, ["Boyz"]);
        assert!(numbers.is_empty());
    }
}
