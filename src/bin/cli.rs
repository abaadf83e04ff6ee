use chrono::NaiveDate;
use queue_desk::config::{Config, init_logging};
use queue_desk::export::{DirectorySink, DownloadSink, ExportData, ExportOptions, Record};
use queue_desk::{
    ExclusionScope, ExclusionScopes, ScopeLevel, format_currency, format_percentage,
    load_scopes_from_csv, load_scopes_from_json, prepare_json_csv_download, save_scopes_to_csv,
    save_scopes_to_json, trigger_download,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

fn render_scopes_as_text_table(scopes: &ExclusionScopes) -> String {
    let header = ["scope", "date"];
    let mut rows: Vec<[String; 2]> = Vec::new();
    for (level, scope) in scopes.iter() {
        if scope.declared_dates().is_empty() {
            rows.push([level.to_string(), String::new()]);
        }
        for date in scope.declared_dates() {
            rows.push([level.to_string(), date.clone()]);
        }
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[&str]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&header[..]));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(&[row[0].as_str(), row[1].as_str()][..]));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  scope show                         Show declared non-working dates\n  scope add <level> <YYYY-MM-DD>     Declare a date on business|commerce|queue\n  scope clear <level>                Remove a scope\n  scope load <level> <json_path>     Replace a scope with an entity JSON file\n  exclusions                         List the aggregated exclusion dates\n  month <year> <month>               List exclusions within one month\n  check <YYYY-MM-DD>                 Tell whether a date is excluded\n  filter <d1,d2,...>                 Keep only bookable dates\n  next <YYYY-MM-DD>                  First bookable date after the given one\n  export <json_path> <name>          Write <name>.csv from records or named lists\n  jsoncsv <json_path> <name>         Write <name>.csv in the semicolon JSON format\n  currency <value>                   Format an amount\n  percent <value>                    Format a percentage\n  save <json|csv> <path>             Persist scopes to disk\n  load <json|csv> <path>             Load scopes from disk\n  quit|exit                          Exit"
    );
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("cannot parse {path}: {e}"))
}

fn handle_scope(scopes: &mut ExclusionScopes, mut parts: std::str::SplitWhitespace<'_>) {
    match parts.next() {
        Some("show") | None => print!("{}", render_scopes_as_text_table(scopes)),
        Some("add") => match (parts.next(), parts.next()) {
            (Some(level), Some(date)) => match level.parse::<ScopeLevel>() {
                Ok(level) => {
                    scopes.add_date(level, date);
                    println!("Added {date} to {level} scope.");
                }
                Err(e) => println!("Error: {e}"),
            },
            _ => println!("Usage: scope add <level> <YYYY-MM-DD>"),
        },
        Some("clear") => match parts.next().map(str::parse::<ScopeLevel>) {
            Some(Ok(level)) => match scopes.clear(level) {
                Some(_) => println!("Cleared {level} scope."),
                None => println!("{level} scope was not set."),
            },
            Some(Err(e)) => println!("Error: {e}"),
            None => println!("Usage: scope clear <level>"),
        },
        Some("load") => match (parts.next(), parts.next()) {
            (Some(level), Some(path)) => {
                let level = match level.parse::<ScopeLevel>() {
                    Ok(level) => level,
                    Err(e) => {
                        println!("Error: {e}");
                        return;
                    }
                };
                match read_json::<ExclusionScope>(path) {
                    Ok(scope) => {
                        println!(
                            "Loaded {} dates into {level} scope.",
                            scope.declared_dates().len()
                        );
                        scopes.set(level, scope);
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => println!("Usage: scope load <level> <json_path>"),
        },
        Some(other) => println!("Unknown scope command '{other}'. Type 'help'."),
    }
}

fn export_records(sink: &DirectorySink, path: &str, name: &str) {
    let data = match read_json::<ExportData>(path) {
        Ok(data) => data,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    match trigger_download(&data, name, &ExportOptions::default(), sink) {
        Ok(download) => println!("Exported to {}", sink.target_path(&download).display()),
        Err(e) => println!("Error exporting: {e}"),
    }
}

fn export_json_csv(sink: &DirectorySink, path: &str, name: &str) {
    let records = match read_json::<Vec<Record>>(path) {
        Ok(records) => records,
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };
    let delivered = prepare_json_csv_download(&records, name)
        .and_then(|download| sink.deliver(&download).map(|_| download));
    match delivered {
        Ok(download) => println!("Exported to {}", sink.target_path(&download).display()),
        Err(e) => println!("Error exporting: {e}"),
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = Config::from_env()?;
    let sink = DirectorySink::new(&config.export_dir);
    let mut scopes = ExclusionScopes::default();

    println!("Queue Desk (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "scope" => handle_scope(&mut scopes, parts),
            "exclusions" => {
                let dates = scopes.collect_exclusion_dates();
                if dates.is_empty() {
                    println!("No exclusions.");
                } else {
                    println!("Exclusions: {}", dates.join(", "));
                }
            }
            "month" => {
                let year = parts.next().and_then(|s| s.parse::<i32>().ok());
                let month = parts
                    .next()
                    .and_then(|s| s.parse::<u32>().ok())
                    .filter(|m| (1..=12).contains(m));
                match (year, month) {
                    (Some(year), Some(month)) => {
                        let dates = scopes.exclusions_for_month(year, month);
                        if dates.is_empty() {
                            println!("No exclusions in {year:04}-{month:02}.");
                        } else {
                            println!("Exclusions in {year:04}-{month:02}: {}", dates.join(", "));
                        }
                    }
                    _ => println!("Usage: month <year> <1-12>"),
                }
            }
            "check" => match parts.next() {
                Some(date) => {
                    if scopes.is_excluded(date) {
                        println!("{date} is excluded.");
                    } else {
                        println!("{date} is available.");
                    }
                }
                None => println!("Usage: check <YYYY-MM-DD>"),
            },
            "filter" => match parts.next() {
                Some(list) => {
                    let candidates: Vec<&str> = list
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .collect();
                    let available = scopes.filter_available(Some(candidates.as_slice()));
                    println!("Available: {}", available.join(", "));
                }
                None => println!("Usage: filter <d1,d2,...>"),
            },
            "next" => match parts.next().and_then(parse_date) {
                Some(from) => match scopes.exclusion_set().next_available(from) {
                    Some(next) => println!("Next available: {next}"),
                    None => println!("No available date within the lookahead window."),
                },
                None => println!("Usage: next <YYYY-MM-DD>"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some(path), Some(name)) => export_records(&sink, path, name),
                _ => println!("Usage: export <json_path> <name>"),
            },
            "jsoncsv" => match (parts.next(), parts.next()) {
                (Some(path), Some(name)) => export_json_csv(&sink, path, name),
                _ => println!("Usage: jsoncsv <json_path> <name>"),
            },
            "currency" => {
                let value = parts.next().and_then(|s| s.parse::<f64>().ok());
                println!("{}", format_currency(value));
            }
            "percent" => {
                let value = parts.next().and_then(|s| s.parse::<f64>().ok());
                println!("{}", format_percentage(value));
            }
            "save" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        "json" => save_scopes_to_json(&scopes, path),
                        "csv" => save_scopes_to_csv(&scopes, path),
                        _ => {
                            println!("Usage: save <json|csv> <path>");
                            continue;
                        }
                    };
                    match result {
                        Ok(()) => println!("Scopes saved to {}", Path::new(path).display()),
                        Err(e) => println!("Error saving scopes: {e}"),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        "json" => load_scopes_from_json(path),
                        "csv" => load_scopes_from_csv(path),
                        _ => {
                            println!("Usage: load <json|csv> <path>");
                            continue;
                        }
                    };
                    match result {
                        Ok(loaded) => {
                            scopes = loaded;
                            println!("Scopes loaded from {}", Path::new(path).display());
                            print!("{}", render_scopes_as_text_table(&scopes));
                        }
                        Err(e) => println!("Error loading scopes: {e}"),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
