use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use gotham_core::*;
use gotham_reporter::{BufferedReporter, OfflineTransport, SessionRequest, spawn_reporter};

/// Plays scripted games headlessly and prints their scores.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level to play, defaults to the table's default
    #[arg(short, long)]
    level: Option<String>,

    /// How many games to play
    #[arg(short, long, default_value_t = 10)]
    games: u32,

    /// Seed of the first game, each following game adds one
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// How far from home the walker goes before turning back
    #[arg(short, long, default_value_t = 2)]
    radius: u8,

    /// TOML file with a level table to use instead of the built-in one
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Where to write the buffered reports as JSON
    #[arg(long)]
    reports: Option<PathBuf>,
}

fn load_levels(path: Option<&PathBuf>) -> anyhow::Result<LevelTable> {
    let Some(path) = path else {
        return Ok(LevelTable::standard());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read level table {}", path.display()))?;
    let table: LevelTable = toml::from_str(&text)
        .with_context(|| format!("could not parse level table {}", path.display()))?;
    table.validate()?;
    Ok(table)
}

/// East, south, west, north.
const HEADINGS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Heads out in one direction per round, rotating clockwise, and walks back.
fn walk_round(session: &mut GameSession, radius: u8) -> anyhow::Result<MoveOutcome> {
    let (home_row, home_col) = session.config().home();
    let (dr, dc) = HEADINGS[(session.round() as usize - 1) % HEADINGS.len()];
    let reach = home_row.min(home_col);
    if reach == 0 {
        bail!("level {} is too narrow to walk", session.level_id());
    }
    let radius = radius.clamp(1, reach);

    let out = (1..=radius as i8).map(|step| (dr * step, dc * step));
    let back = (0..radius as i8).rev().map(|step| (dr * step, dc * step));

    for (row_off, col_off) in out.chain(back) {
        let to = (
            home_row.wrapping_add_signed(row_off),
            home_col.wrapping_add_signed(col_off),
        );
        match session.move_to(to) {
            Ok(outcome) if outcome.ends_round() => return Ok(outcome),
            Ok(_) => {}
            Err(rejection) => bail!("walker was refused at {to:?}: {rejection:?}"),
        }
    }
    bail!("walk of radius {radius} never ended the round")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log::debug!("{:?}", args);

    let levels = load_levels(args.levels.as_ref())?;
    let request = SessionRequest {
        game_id: "gotham-sim".into(),
        ..Default::default()
    };
    let (sink, worker) = spawn_reporter(BufferedReporter::new(OfflineTransport, request));

    let mut totals = Vec::with_capacity(args.games as usize);
    for game in 0..args.games {
        let seed = args.seed + game as u64;
        let mut session = GameSession::new(levels.clone(), seed)?.with_sink(sink.clone());
        if let Some(level) = &args.level {
            session
                .change_level(level)
                .with_context(|| format!("level {level:?} is not in the table"))?;
        }

        let total = loop {
            let outcome = walk_round(&mut session, args.radius)?;
            log::debug!("game {} round {}: {:?}", game, session.round(), outcome);
            match session.start_new_round()? {
                NewRound::Started(_) => {}
                NewRound::GameOver(total) => break total,
                NewRound::NotReady => bail!("round {} did not end", session.round()),
            }
        };

        let rounds: Vec<String> = session
            .archive()
            .iter()
            .map(|round| round.final_score.to_string())
            .collect();
        println!(
            "game {:>3} seed {:>5} [{}] total {}",
            game,
            seed,
            rounds.join(" "),
            total
        );
        totals.push(total);
    }
    drop(sink);

    if !totals.is_empty() {
        let mean = totals.iter().map(|&total| total as f64).sum::<f64>() / totals.len() as f64;
        let best = totals.iter().max().copied().unwrap_or_default();
        println!("{} games, mean {:.2}, best {}", totals.len(), mean, best);
    }

    let reporter = match worker.join() {
        Ok(reporter) => reporter,
        Err(_) => bail!("reporter thread panicked"),
    };
    let buffer = reporter.into_buffer();
    log::info!("{} reports buffered", buffer.len());
    if let Some(path) = &args.reports {
        fs::write(path, buffer.to_json()?)
            .with_context(|| format!("could not write reports to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_on(table: &str, seed: u64) -> GameSession {
        let levels: LevelTable = toml::from_str(table).unwrap();
        GameSession::new(levels, seed).unwrap()
    }

    #[test]
    fn single_row_levels_are_refused() {
        let mut session = session_on(
            r#"
            default = "strip"

            [levels.strip]
            rows = 1
            cols = 5
            coins = 2
            "#,
            3,
        );

        let err = walk_round(&mut session, 2).unwrap_err();

        assert!(err.to_string().contains("too narrow"));
        assert!(session.moves().is_empty());
    }

    #[test]
    fn radius_is_clamped_to_the_board() {
        let mut session = session_on(
            r#"
            default = "tiny"

            [levels.tiny]
            rows = 3
            cols = 3
            coins = 1
            "#,
            5,
        );

        let outcome = walk_round(&mut session, 9).unwrap();

        assert!(outcome.ends_round());
        assert!(session.moves().len() <= 2);
        assert!(session.moves().iter().all(|step| step.position.1 <= 2));
    }
}
