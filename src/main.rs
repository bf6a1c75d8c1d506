#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use texit::cli::{CliArgs, DocumentStats, RunConfig, SearchRequest, StatsFormat};
use texit::io::{open_session, save_session, FsFileService};
use texit::search::{self, SearchQuery};
use texit::{EditorConfig, EditorSession};

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    texit::tracing::init();

    let run = CliArgs::parse().into_config().map_err(anyhow::Error::msg)?;
    let config = match &run.config_path {
        Some(path) => EditorConfig::load_from(path),
        None => EditorConfig::load(),
    };

    let service = FsFileService;
    let mut session = open_session(
        &service,
        &run.path,
        run.declared_encoding,
        &config.session_options(),
    )
    .with_context(|| format!("Failed to open {}", run.path.display()))?;

    if let Some(request) = &run.search {
        run_search(&mut session, request)?;
    }
    if let Some(line_ending) = run.line_ending {
        session.set_line_ending(line_ending);
    }
    if let Some(encoding) = run.to_encoding {
        session.set_encoding(encoding);
    }

    if let Some(format) = run.stats {
        print_stats(&session, format)?;
    }

    write_output(&service, &mut session, &run)
}

fn run_search(session: &mut EditorSession, request: &SearchRequest) -> Result<()> {
    let query = SearchQuery::new(&request.pattern, request.case_sensitive, request.regex)?;

    if let Some(replacement) = &request.replacement {
        let count = search::replace_all(session, &query, replacement)?;
        eprintln!("{} replacement(s)", count);
        return Ok(());
    }

    let name = session.display_name();
    let matches = search::find_all(session.buffer(), &query);
    for m in &matches {
        let line = session.buffer().line(m.start.line).unwrap_or_default();
        println!("{}:{}:{}: {}", name, m.start.line + 1, m.start.column + 1, line);
    }
    tracing::debug!("{} match(es) for {:?}", matches.len(), request.pattern);
    Ok(())
}

fn print_stats(session: &EditorSession, format: StatsFormat) -> Result<()> {
    let stats = DocumentStats::collect(session);
    match format {
        StatsFormat::Text => println!("{}", stats.to_text()),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

fn write_output(
    service: &FsFileService,
    session: &mut EditorSession,
    run: &RunConfig,
) -> Result<()> {
    if !run.modifies() {
        return Ok(());
    }

    if run.write {
        if session.is_dirty() {
            let path = save_session(service, session)?;
            eprintln!("Wrote {}", path.display());
        } else {
            eprintln!("No changes");
        }
        return Ok(());
    }

    let bytes = session.snapshot_bytes()?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes).context("Failed to write to stdout")?;
    stdout.flush()?;
    Ok(())
}
