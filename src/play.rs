//! Interactive terminal game.
//!
//! Uses crossterm for raw-mode input and draws the snapshot as plain text
//! once per frame. When the player quits, the score goes into the ranking.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::{cursor, terminal, QueueableCommand};
use tracing::warn;

use blockfall::core::{GameConfig, GameEngine, GameSnapshot, RankingTable, SystemClock};
use blockfall::engine::{epoch_seconds, record_score, PlaySession, SessionResponse};
use blockfall::input::handle_key_event;
use blockfall::types::{Shape, HIDDEN_ROWS};

const FRAME: Duration = Duration::from_millis(16);

/// Raw mode and alternate screen, restored on drop
struct Terminal {
    stdout: Stdout,
}

impl Terminal {
    fn enter() -> Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.queue(terminal::EnterAlternateScreen)?;
        stdout.queue(cursor::Hide)?;
        stdout.flush()?;
        Ok(Self { stdout })
    }

    fn draw(&mut self, snapshot: &GameSnapshot, status: &str) -> Result<()> {
        self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        for (row, line) in frame_lines(snapshot, status).iter().enumerate() {
            self.stdout.queue(cursor::MoveTo(0, row as u16))?;
            self.stdout.queue(Print(line))?;
        }
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.stdout.queue(cursor::Show);
        let _ = self.stdout.queue(terminal::LeaveAlternateScreen);
        let _ = self.stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// Text rendering of the visible rows with a side panel
fn frame_lines(snapshot: &GameSnapshot, status: &str) -> Vec<String> {
    let active: Vec<(i32, i32)> = snapshot
        .active
        .map(|a| a.cells.to_vec())
        .unwrap_or_default();
    let ghost: Vec<(i32, i32)> = match (snapshot.active, snapshot.ghost_y) {
        (Some(a), Some(gy)) => a.cells.iter().map(|&(x, y)| (x, y - a.y + gy)).collect(),
        _ => Vec::new(),
    };

    let panel = [
        format!("Score {}", snapshot.score),
        format!("Rows  {}", snapshot.rows),
        format!("Level {}", snapshot.level),
        format!("Next  {}", snapshot.next.symbol()),
        String::new(),
        status.to_string(),
    ];

    let mut lines = Vec::with_capacity(snapshot.height as usize);
    for (i, row) in snapshot.board.iter().skip(HIDDEN_ROWS as usize).enumerate() {
        let y = i as i32 + HIDDEN_ROWS as i32;
        let mut line = String::from("|");
        for (x, &cell) in row.iter().enumerate() {
            let pos = (x as i32, y);
            let glyph = if active.contains(&pos) {
                "[]".to_string()
            } else if cell != 0 {
                let symbol = Shape::from_id(u32::from(cell) - 1).map_or('#', Shape::symbol);
                format!("{symbol}{symbol}")
            } else if ghost.contains(&pos) {
                "::".to_string()
            } else {
                "  ".to_string()
            };
            line.push_str(&glyph);
        }
        line.push('|');
        if let Some(text) = panel.get(i) {
            line.push_str("  ");
            line.push_str(text);
        }
        lines.push(line);
    }
    lines.push(format!("+{}+", "--".repeat(snapshot.width as usize)));
    lines
}

fn status_text(snapshot: &GameSnapshot, note: &str) -> String {
    let state = if snapshot.game_over {
        "GAME OVER - F2 saves the demo, q quits"
    } else if snapshot.paused {
        "PAUSED"
    } else {
        ""
    };
    format!("{state} {note}").trim().to_string()
}

pub fn run(config: &GameConfig, name: &str) -> Result<()> {
    let engine =
        GameEngine::from_config(config, SystemClock::new()).context("failed to create game")?;
    let mut session = PlaySession::new(engine, &config.demo_path);
    let mut note = String::new();

    {
        let mut term = Terminal::enter().context("failed to set up terminal")?;
        loop {
            let snapshot = session.engine().snapshot();
            term.draw(&snapshot, &status_text(&snapshot, &note))?;

            if event::poll(FRAME)? {
                if let Event::Key(key) = event::read()? {
                    if let Some(input) = handle_key_event(key) {
                        match session.handle(input) {
                            Ok(SessionResponse::Quit) => break,
                            Ok(SessionResponse::DemoSaved(bytes)) => {
                                note = format!("demo saved ({bytes} bytes)");
                            }
                            Ok(_) => {}
                            Err(err) => note = format!("save failed: {err}"),
                        }
                    }
                }
            }
            session.tick();
        }
    }

    let entry = session.rank_entry(name, epoch_seconds());
    if let Err(err) = session.finish() {
        warn!(path = %config.demo_path.display(), error = %err, "failed to save demo");
        eprintln!("could not save demo to {}: {err}", config.demo_path.display());
    }

    let mut table = RankingTable::load_or_default(&config.ranking_path, config.ranking_len)
        .with_context(|| format!("failed to read {}", config.ranking_path.display()))?;
    let score = entry.score;
    let rank = record_score(&mut table, entry, &config.ranking_path)
        .with_context(|| format!("failed to write {}", config.ranking_path.display()))?;

    if rank < table.len() {
        println!("{name}: {score} points, rank {}", rank + 1);
    } else {
        println!("{name}: {score} points");
    }
    Ok(())
}
