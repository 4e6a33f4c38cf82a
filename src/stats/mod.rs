//! Betting statistics over the settled-bet log

pub mod metrics;

pub use metrics::{
    analyze_by_horse, analyze_by_odds_range, calculate_summary, BettingSummary, DimensionAnalysis,
};
