use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ingest::{IngestSummary, Ingestor, collect_inputs};
use crate::db::DocumentStore;
use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::export::SheetStore;
use crate::ui::messages::{header, info, warning};
use crate::utils::path::expand_tilde;

/// Handle the `ingest` command
///
/// The document store (unless `--no-store`) is opened once for the whole run
/// and closed before returning, whatever the outcome.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Ingest {
        input,
        output,
        mode,
        no_store,
    } = cmd
    else {
        return Ok(());
    };

    let mode = mode.unwrap_or(cfg.default_mode);
    let output = output
        .clone()
        .unwrap_or_else(|| expand_tilde(&cfg.output));

    let inputs = collect_inputs(input)?;
    if inputs.is_empty() {
        warning(format!("No .tcx files found in {}", input.display()));
        return Ok(());
    }

    header(format!("Ingesting {} file(s) into {}", inputs.len(), output.display()));

    let mut sheets = SheetStore::new(output);
    let mut store = if *no_store {
        None
    } else {
        Some(DocumentStore::open(
            expand_tilde(&cfg.database),
            cfg.busy_timeout(),
        )?)
    };

    let summary = {
        let mut ingestor = Ingestor::new(mode).with_sink(&mut sheets);
        if let Some(store) = store.as_mut() {
            ingestor = ingestor.with_sink(store);
        }
        ingestor.run(&inputs)
    };

    if let Some(store) = store {
        record_run(&store, &summary);
        store.close()?;
    }

    info(format!(
        "{} file(s) ingested, {} failed",
        summary.files.iter().filter(|f| f.is_complete()).count(),
        summary.failed.len() + summary.files.iter().filter(|f| !f.is_complete()).count()
    ));

    if summary.has_failures() {
        return Err(AppError::Other(
            "some files were not fully ingested (see messages above)".to_string(),
        ));
    }
    Ok(())
}

/// Append one internal log line per file; logging failures are non-fatal.
fn record_run(store: &DocumentStore, summary: &IngestSummary) {
    let mut lines: Vec<(&str, String, String)> = Vec::new();

    for report in &summary.files {
        let targets: Vec<String> = report
            .branches
            .iter()
            .map(|b| format!("{}:{}={}", b.sink, b.target, b.written))
            .collect();
        if report.is_complete() {
            lines.push(("ingest", report.source_file.clone(), targets.join(", ")));
        } else {
            let errors: Vec<String> = report
                .failures
                .iter()
                .map(|f| format!("{} {}: {}", f.sink, f.kind.as_str(), f.error))
                .collect();
            lines.push((
                "ingest_partial",
                report.source_file.clone(),
                errors.join("; "),
            ));
        }
    }
    for (path, err) in &summary.failed {
        lines.push(("ingest_error", path.display().to_string(), err.to_string()));
    }

    for (op, target, message) in lines {
        if let Err(e) = ttlog(&store.conn, op, &target, &message) {
            warning(format!("Failed to write internal log: {e}"));
        }
    }
}
