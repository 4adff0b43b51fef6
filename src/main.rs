//! Esoterica Demo
//!
//! Plays the first unlocked puzzle in both interaction modes against a
//! file-backed progress store and prints the resulting unlock state.
//!
//! Environment:
//! - `ESOTERICA_CONFIG`: optional JSON engine config file
//! - `ESOTERICA_DATA_DIR`: progress directory (default `./.esoterica`)
//! - `RUST_LOG`: log filter (default `info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use esoterica::{
    Catalog, EngineConfig, FileStore, GameContext, InteractionMode, PuzzleSession, VERSION,
};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");
const DEFAULT_DATA_DIR: &str = ".esoterica";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    info!("Esoterica v{}", VERSION);

    let config = match std::env::var_os("ESOTERICA_CONFIG") {
        Some(path) => EngineConfig::from_file(&path)
            .await
            .with_context(|| format!("Failed to load config from {}", PathBuf::from(&path).display()))?,
        None => EngineConfig::default(),
    };
    let data_dir = std::env::var_os("ESOTERICA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let catalog = Catalog::from_json_str(BUNDLED_CATALOG).context("Bundled catalog is invalid")?;
    info!("Catalog: {} puzzles, progress in {}", catalog.len(), data_dir.display());

    let ctx = GameContext::new(catalog, Arc::new(FileStore::new(data_dir)), config);
    let mut completions = ctx.subscribe_completions();

    let Some(puzzle_id) = ctx
        .puzzle_overview()
        .await
        .iter()
        .find(|s| s.is_unlocked && !s.is_completed)
        .map(|s| s.puzzle.id.clone())
    else {
        info!("Every unlocked puzzle is already complete");
        log_overview(&ctx).await;
        return Ok(());
    };

    // Discrete: swap every piece into its home slot
    let mut session = ctx
        .open_session_with_recommended_board(&puzzle_id, InteractionMode::Discrete)
        .await?;
    info!("=== Discrete: {} ===", session.puzzle().title);
    solve_by_swapping(&mut session)?;
    report(&mut session).await;

    // Continuous: drag every piece onto its target
    let mut session = ctx
        .open_session_with_recommended_board(&puzzle_id, InteractionMode::Continuous)
        .await?;
    info!("=== Continuous: {} ===", session.puzzle().title);
    solve_by_dragging(&mut session)?;
    report(&mut session).await;

    while let Ok(event) = completions.try_recv() {
        info!(
            "Completion event: puzzle {} via {:?} at {}",
            event.puzzle_id, event.mode, event.completed_at
        );
    }

    log_overview(&ctx).await;
    Ok(())
}

fn solve_by_swapping(session: &mut PuzzleSession) -> Result<()> {
    let mut swaps = 0;
    while !session.is_complete() {
        let Some(misplaced) = session
            .pieces()
            .iter()
            .position(|p| p.current_slot() != Some(p.home))
        else {
            break;
        };
        let home = session.pieces()[misplaced].home;
        let occupant = session
            .pieces()
            .iter()
            .position(|p| p.current_slot() == Some(home))
            .context("Home slot has no occupant")?;

        session.select_or_swap(misplaced)?;
        session.select_or_swap(occupant)?;
        swaps += 1;
    }
    info!("Solved in {} swaps", swaps);
    Ok(())
}

fn solve_by_dragging(session: &mut PuzzleSession) -> Result<()> {
    let targets: Vec<_> = session.pieces().iter().map(|p| (p.index, p.target)).collect();
    for (index, target) in targets {
        // Land a little off target; the tolerance snaps it home
        session.move_piece(index, target.x + 12.0, target.y - 7.0)?;
    }
    info!("Placed {}/{} pieces", session.placed_count(), session.pieces().len());
    Ok(())
}

async fn report(session: &mut PuzzleSession) {
    match session.persisted().await {
        Some(record) => info!(
            "Session {} finished: {:?}, {} puzzles completed overall",
            session.id(),
            record.outcome,
            record.progress.completed_puzzle_ids.len()
        ),
        None => info!("Session {} did not finish", session.id()),
    }
}

async fn log_overview(ctx: &GameContext) {
    info!("=== Puzzles ===");
    for status in ctx.puzzle_overview().await {
        let mark = match (status.is_completed, status.is_unlocked) {
            (true, _) => "completed",
            (false, true) => "unlocked",
            (false, false) => "locked",
        };
        info!("#{:>2} {:<24} {}", status.puzzle.sequence, status.puzzle.title, mark);
    }

    info!("=== Journal ===");
    for entry in ctx.journal().await {
        info!("{}: \"{}\" ({})", entry.title, entry.quote, entry.attribution);
    }
}
