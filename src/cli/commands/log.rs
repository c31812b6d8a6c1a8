use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::DocumentStore;
use crate::db::log::{LogEntry, load_log};
use crate::errors::AppResult;
use crate::utils::path::expand_tilde;
use ansi_term::Colour;

const MAX_OP_WIDTH: usize = 60;

/// Colour of the operation word in `log --print`.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "ingest" => Colour::Green,
        "ingest_error" => Colour::Red,
        "ingest_partial" => Colour::Yellow,
        "init" => Colour::RGB(255, 153, 51), // arancione
        _ => Colour::White,
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let store = DocumentStore::open(expand_tilde(&cfg.database), cfg.busy_timeout())?;
        let entries = load_log(&store.conn);
        store.close()?;
        print_log(&entries?);
    }
    Ok(())
}

fn print_log(entries: &[LogEntry]) {
    if entries.is_empty() {
        println!("📜 Internal log is empty.");
        return;
    }

    // op+target in una colonna, senza ANSI per il calcolo delle larghezze
    let rows: Vec<(&LogEntry, String, String)> = entries
        .iter()
        .map(|e| {
            let date = chrono::DateTime::parse_from_rfc3339(&e.date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or_else(|_| e.date.clone());
            let plain = if e.target.is_empty() {
                e.operation.clone()
            } else {
                format!("{} ({})", e.operation, e.target)
            };
            (e, date, truncate(&plain, MAX_OP_WIDTH))
        })
        .collect();

    let op_w = rows
        .iter()
        .map(|(_, _, op)| op.chars().count())
        .max()
        .unwrap_or(10);
    let id_w = rows
        .iter()
        .map(|(e, _, _)| e.id.to_string().len())
        .max()
        .unwrap_or(1);
    let date_w = rows.iter().map(|(_, d, _)| d.len()).max().unwrap_or(0);

    println!("📜 Internal log:\n");

    for (entry, date, plain) in rows {
        let color = color_for_operation(&entry.operation);
        let padding = " ".repeat(op_w.saturating_sub(plain.chars().count()));

        // solo la prima parola viene colorata
        let colored = match plain.split_once(' ') {
            Some((op, rest)) => format!("{} {}", color.paint(op), rest),
            None => color.paint(plain.as_str()).to_string(),
        };

        println!(
            "{:>id_w$}: {:<date_w$} | {}{} => {}",
            entry.id,
            date,
            colored,
            padding,
            entry.message,
            id_w = id_w,
            date_w = date_w
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut t: String = s.chars().take(max - 3).collect();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
