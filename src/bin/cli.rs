//! Horse Race CLI - play the betting game in the terminal

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use horserace::core::{Race, RaceSnapshot};
use horserace::display;
use horserace::stats::{analyze_by_horse, analyze_by_odds_range};
use horserace::{GameConfig, HistoryStore, MemoryHistoryStore, RaceField, Session, SqliteHistoryStore};

/// Bets included in the history statistics
const SUMMARY_WINDOW: usize = 1000;

#[derive(Parser)]
#[command(name = "horserace")]
#[command(about = "Terminal horse race betting game")]
#[command(
    long_about = "Terminal horse race betting game.\n\n\
    Pick a horse, place a bet and watch the race. Your balance, debt and \
    betting history are saved between runs in horserace.db (or the path in \
    HORSERACE_DB). Delete that file to start over with a fresh bankroll."
)]
struct Cli {}

fn main() -> Result<()> {
    let _ = Cli::parse();

    init_logging();

    let config = GameConfig::from_env().context("Invalid configuration")?;
    let store = open_store(&config);
    let mut session = Session::open(config, store).context("Failed to start the game")?;

    let mut rng = match session.config().seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    run_interactive(&mut session, &mut rng)
}

/// Log to stderr, quiet by default so the race animation stays intact
fn init_logging() {
    let filter = EnvFilter::try_from_env("HORSERACE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }
}

/// SQLite store, or an in-memory one if the database cannot be opened
fn open_store(config: &GameConfig) -> Box<dyn HistoryStore> {
    match SqliteHistoryStore::open(&config.db_path) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("Failed to open {:?}: {}", config.db_path, e);
            println!(
                "{}",
                "Could not open the save file. Progress will not be saved this session.".yellow()
            );
            Box::new(MemoryHistoryStore::new())
        }
    }
}

fn run_interactive(session: &mut Session, rng: &mut StdRng) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut stdout = io::stdout();

    display::clear_screen(&mut stdout)?;
    display::render_banner(&mut stdout)?;

    loop {
        println!();
        display::render_bankroll(&mut stdout, session.state())?;
        println!();

        let options = vec!["Race", "Betting history", "Repay debt", "Quit"];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => run_round(session, rng, &theme)?,
            1 => show_history(session)?,
            2 => repay_debt(session, &theme)?,
            3 => {
                println!("Thanks for playing!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

/// One full round: loan if needed, pick, bet, race, settle
fn run_round(session: &mut Session, rng: &mut StdRng, theme: &ColorfulTheme) -> Result<()> {
    if session.needs_loan() && !offer_loan(session, theme)? {
        return Ok(());
    }

    let mut stdout = io::stdout();
    let field = session.new_field(rng);

    display::clear_screen(&mut stdout)?;
    display::render_banner(&mut stdout)?;
    display::render_bankroll(&mut stdout, session.state())?;
    display::render_field(&mut stdout, &field)?;

    let names: Vec<String> = field
        .horses
        .iter()
        .map(|h| format!("{} ({}:1)", h.name, h.odds))
        .collect();

    let choice = Select::with_theme(theme)
        .with_prompt("Choose your horse")
        .items(&names)
        .default(0)
        .interact()?;

    let ledger = *session.ledger();
    let state = *session.state();
    let amount: f64 = Input::with_theme(theme)
        .with_prompt(format!("Place your bet (max ${:.2})", session.max_bet()))
        .validate_with(move |amount: &f64| {
            ledger.check_bet(&state, *amount).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let finish_line = session.config().finish_line;
    let interval = Duration::from_millis(session.config().tick_interval_ms);
    let mut race = Race::new(field.clone(), finish_line)?;
    let wager = session.place_bet(&field, choice, amount)?;

    // The stake is already saved: settle even if the animation is cut short
    let watched = watch_race(&mut stdout, &mut race, rng, theme, interval);
    let record = session.settle_race(wager, &mut race, rng);
    let _ = display::show_cursor(&mut stdout);
    if let Err(e) = watched {
        warn!("Race display interrupted, bet settled: {}", record.result);
        return Err(e);
    }

    let winner = race.winner().context("Race ended without a winner")?;
    display::render_outcome(&mut stdout, &field, winner, &record)?;
    stdout.flush()?;

    Ok(())
}

fn watch_race(
    stdout: &mut io::Stdout,
    race: &mut Race,
    rng: &mut StdRng,
    theme: &ColorfulTheme,
    interval: Duration,
) -> Result<()> {
    let _: String = Input::with_theme(theme)
        .with_prompt("Press Enter to start the race!")
        .allow_empty(true)
        .interact_text()?;

    let field = race.field().clone();
    let finish_line = race.finish_line();

    display::hide_cursor(stdout)?;
    draw_frame(stdout, &field, &race.snapshot(), finish_line)?;
    for snapshot in race.ticks(rng) {
        thread::sleep(interval);
        draw_frame(stdout, &field, &snapshot, finish_line)?;
    }
    Ok(())
}

fn draw_frame<W: Write>(
    out: &mut W,
    field: &RaceField,
    snapshot: &RaceSnapshot,
    finish_line: u32,
) -> Result<()> {
    display::clear_screen(out)?;
    display::render_track(out, field, snapshot, finish_line)?;
    out.flush()?;
    Ok(())
}

/// Returns false if the player backs out
fn offer_loan(session: &mut Session, theme: &ColorfulTheme) -> Result<bool> {
    let config = session.config();
    println!(
        "{}",
        "You're out of money! You need a loan to keep betting.".yellow().bold()
    );
    println!(
        "Loans up to ${:.2} at {:.1}% interest.",
        config.max_loan,
        config.interest_rate * 100.0
    );

    let choice = Select::with_theme(theme)
        .with_prompt("Take a loan?")
        .items(&["Take a loan", "Back to menu"])
        .default(0)
        .interact()?;
    if choice == 1 {
        return Ok(false);
    }

    let ledger = *session.ledger();
    let state = *session.state();
    let amount: f64 = Input::with_theme(theme)
        .with_prompt(format!("Loan amount (max ${:.2})", ledger.max_loan))
        .validate_with(move |amount: &f64| {
            ledger.check_loan(&state, *amount).map_err(|e| e.to_string())
        })
        .interact_text()?;

    let state = session.take_loan(amount)?;
    println!(
        "{} ${:.2}. You now owe ${:.2}.",
        "Loan granted:".green(),
        amount,
        state.debt
    );
    Ok(true)
}

fn repay_debt(session: &mut Session, theme: &ColorfulTheme) -> Result<()> {
    if session.state().debt <= 0.0 {
        println!("{}", "You don't owe anything.".green());
        return Ok(());
    }

    let max = session.max_repayment();
    if max <= 0.0 {
        println!("{}", "You have no balance to repay with.".yellow());
        return Ok(());
    }

    let ledger = *session.ledger();
    let state = *session.state();
    let amount: f64 = Input::with_theme(theme)
        .with_prompt(format!("Repay how much? (max ${:.2})", max))
        .default(0.0)
        .validate_with(move |amount: &f64| {
            ledger
                .check_repayment(&state, *amount)
                .map_err(|e| e.to_string())
        })
        .interact_text()?;

    let state = session.repay(amount)?;
    println!("Remaining debt: ${:.2}", state.debt);
    Ok(())
}

fn show_history(session: &Session) -> Result<()> {
    let mut stdout = io::stdout();
    let limit = session.config().history_limit;

    println!("\n{}", format!("Last {} bets:", limit).yellow().bold());
    display::render_history(&mut stdout, &session.recent_history(limit))?;

    let window = session.recent_history(SUMMARY_WINDOW);
    let summary = session.summary(SUMMARY_WINDOW);
    display::render_summary(
        &mut stdout,
        &summary,
        &analyze_by_odds_range(&window, session.odds_bands()),
        &analyze_by_horse(&window),
    )?;
    Ok(())
}
