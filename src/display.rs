//! Terminal rendering
//!
//! Every function writes to the sink it is given and reads only the
//! snapshot it is passed.

use colored::{Color, Colorize};
use std::io::{self, Write};

use crate::core::RaceSnapshot;
use crate::models::{BetRecord, HorseColor, PlayerState, RaceField};
use crate::stats::{BettingSummary, DimensionAnalysis};

/// Drawn at a horse's position on the track
pub const HORSE_MARKER: &str = ">=>";

impl From<HorseColor> for Color {
    fn from(color: HorseColor) -> Self {
        match color {
            HorseColor::Red => Color::Red,
            HorseColor::Green => Color::Green,
            HorseColor::Yellow => Color::Yellow,
            HorseColor::Blue => Color::Blue,
            HorseColor::Magenta => Color::Magenta,
            HorseColor::Cyan => Color::Cyan,
        }
    }
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[2J\x1b[H")
}

pub fn hide_cursor<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?25l")
}

pub fn show_cursor<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?25h")
}

pub fn render_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "    ╔══════════════════════════════════════╗")?;
    writeln!(out, "    ║         {}          ║", "TERMINAL HORSE RACE".bold())?;
    writeln!(out, "    ╚══════════════════════════════════════╝")?;
    Ok(())
}

pub fn render_bankroll<W: Write>(out: &mut W, state: &PlayerState) -> io::Result<()> {
    let debt = format!("${:.2}", state.debt);
    writeln!(
        out,
        "  Balance: {}   Debt: {}",
        format!("${:.2}", state.balance).green().bold(),
        if state.debt > 0.0 { debt.red() } else { debt.normal() }
    )
}

/// Numbered list of the runners with their odds
pub fn render_field<W: Write>(out: &mut W, field: &RaceField) -> io::Result<()> {
    writeln!(out, "\n     Available Horses:\n")?;
    for (i, horse) in field.horses.iter().enumerate() {
        writeln!(
            out,
            "  {}. {:<10} (Odds: {}:1)",
            i + 1,
            horse.name.color(horse.color),
            horse.odds
        )?;
    }
    writeln!(out)
}

/// One frame of the race
pub fn render_track<W: Write>(
    out: &mut W,
    field: &RaceField,
    snapshot: &RaceSnapshot,
    finish_line: u32,
) -> io::Result<()> {
    let width = finish_line as usize + HORSE_MARKER.len();
    let border = "═".repeat(width);

    writeln!(out, "\n")?;
    writeln!(out, "╔{}╗", border)?;
    for (horse, &position) in field.horses.iter().zip(&snapshot.positions) {
        let cell = position.min(finish_line) as usize;
        writeln!(
            out,
            "║{}{}{}║ {}",
            " ".repeat(cell),
            HORSE_MARKER.color(horse.color),
            " ".repeat(width - cell - HORSE_MARKER.len()),
            horse.name.color(horse.color)
        )?;
    }
    writeln!(out, "╚{}╝", border)?;
    writeln!(out, "  Tick {}", snapshot.tick)?;
    Ok(())
}

/// Winner announcement and the player's result
pub fn render_outcome<W: Write>(
    out: &mut W,
    field: &RaceField,
    winner_index: usize,
    record: &BetRecord,
) -> io::Result<()> {
    if let Some(winner) = field.get(winner_index) {
        writeln!(
            out,
            "\nAND THE WINNER IS... {}!",
            winner.name.color(winner.color).bold()
        )?;
    }

    if record.won() {
        writeln!(
            out,
            "\n{} You won ${:.2}!",
            "CONGRATULATIONS!".green().bold(),
            record.win_amount
        )?;
    } else {
        writeln!(
            out,
            "\nSorry, you lost ${:.2}. Better luck next time!",
            record.bet_amount
        )?;
    }
    Ok(())
}

/// Table of recent bets, newest first
pub fn render_history<W: Write>(out: &mut W, records: &[BetRecord]) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "{}", "No bets on record yet.".yellow())?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<17} {:<10} {:>5} {:>9} {:>9} {:>6} {:>10} {:>9}",
        "When", "Horse", "Odds", "Bet", "Won", "Result", "Balance", "Debt"
    )?;
    writeln!(out, "{}", "-".repeat(82))?;

    for record in records {
        let result = if record.won() {
            record.result.as_str().green()
        } else {
            record.result.as_str().red()
        };
        writeln!(
            out,
            "{:<17} {:<10} {:>5} {:>9.2} {:>9.2} {:>6} {:>10.2} {:>9.2}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.horse_name,
            format!("{}:1", record.odds),
            record.bet_amount,
            record.win_amount,
            result,
            record.balance,
            record.debt
        )?;
    }
    Ok(())
}

pub fn render_summary<W: Write>(
    out: &mut W,
    summary: &BettingSummary,
    by_odds: &[DimensionAnalysis],
    by_horse: &[DimensionAnalysis],
) -> io::Result<()> {
    if summary.total_bets == 0 {
        return Ok(());
    }

    writeln!(out, "\n{}", "Summary:".yellow().bold())?;
    writeln!(
        out,
        "  Bets: {}  Wins: {}  Hit rate: {:.1}%",
        summary.total_bets,
        summary.wins,
        summary.hit_rate * 100.0
    )?;
    writeln!(
        out,
        "  Wagered: ${:.2}  Won: ${:.2}  Net: ${:.2}  ROI: {:.1}%",
        summary.total_wagered,
        summary.total_won,
        summary.net_profit,
        summary.roi * 100.0
    )?;
    writeln!(
        out,
        "  Biggest win: ${:.2}  Max drawdown: ${:.2}",
        summary.biggest_win, summary.max_drawdown
    )?;

    render_breakdown(out, "By odds:", by_odds)?;
    render_breakdown(out, "By horse:", by_horse)
}

fn render_breakdown<W: Write>(
    out: &mut W,
    title: &str,
    groups: &[DimensionAnalysis],
) -> io::Result<()> {
    if groups.is_empty() {
        return Ok(());
    }

    writeln!(out, "\n{}", title.yellow().bold())?;
    for group in groups {
        writeln!(
            out,
            "  {:<18} {:>3} bets {:>3} wins {:>6.1}%  net ${:.2}",
            group.key,
            group.bets,
            group.wins,
            group.hit_rate * 100.0,
            group.profit
        )?;
    }
    Ok(())
}
