//! Betting Metrics
//!
//! Hit rate, net profit, drawdown and per-group breakdowns of the bet log.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::OddsBand;
use crate::models::BetRecord;

/// Aggregate results of a run of bets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingSummary {
    pub total_bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub net_profit: f64,
    pub roi: f64,
    pub biggest_win: f64,
    pub max_drawdown: f64,
}

impl Default for BettingSummary {
    fn default() -> Self {
        Self {
            total_bets: 0,
            wins: 0,
            hit_rate: 0.0,
            total_wagered: 0.0,
            total_won: 0.0,
            net_profit: 0.0,
            roi: 0.0,
            biggest_win: 0.0,
            max_drawdown: 0.0,
        }
    }
}

/// Summarize bets given in chronological order (oldest first)
pub fn calculate_summary(bets: &[BetRecord]) -> BettingSummary {
    if bets.is_empty() {
        return BettingSummary::default();
    }

    let total_bets = bets.len();
    let wins = bets.iter().filter(|b| b.won()).count();
    let total_wagered: f64 = bets.iter().map(|b| b.bet_amount).sum();
    let total_won: f64 = bets.iter().map(|b| b.win_amount).sum();
    let net_profit = total_won - total_wagered;
    let biggest_win = bets.iter().map(|b| b.win_amount).fold(0.0, f64::max);

    // Largest peak-to-trough drop in cumulative profit
    let mut cumulative = 0.0;
    let mut peak = 0.0;
    let mut max_drawdown: f64 = 0.0;
    for bet in bets {
        cumulative += bet.profit();
        if cumulative > peak {
            peak = cumulative;
        }
        max_drawdown = max_drawdown.max(peak - cumulative);
    }

    BettingSummary {
        total_bets,
        wins,
        hit_rate: wins as f64 / total_bets as f64,
        total_wagered,
        total_won,
        net_profit,
        roi: if total_wagered > 0.0 {
            net_profit / total_wagered
        } else {
            0.0
        },
        biggest_win,
        max_drawdown,
    }
}

/// Results for one group of bets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAnalysis {
    pub key: String,
    pub bets: usize,
    pub wins: usize,
    pub hit_rate: f64,
    pub wagered: f64,
    pub profit: f64,
}

fn analyze_groups(groups: HashMap<String, Vec<&BetRecord>>) -> Vec<DimensionAnalysis> {
    let mut results: Vec<DimensionAnalysis> = groups
        .into_iter()
        .map(|(key, group)| {
            let total = group.len();
            let wins = group.iter().filter(|b| b.won()).count();
            DimensionAnalysis {
                key,
                bets: total,
                wins,
                hit_rate: if total > 0 {
                    wins as f64 / total as f64
                } else {
                    0.0
                },
                wagered: group.iter().map(|b| b.bet_amount).sum(),
                profit: group.iter().map(|b| b.profit()).sum(),
            }
        })
        .collect();

    results.sort_by(|a, b| a.key.cmp(&b.key));
    results
}

/// Favorite / mid / long-shot groups over contiguous bands, favorite first
///
/// A third of the bands (rounded up) are favorites, half of the rest
/// (rounded up) are long shots, and whatever is left is mid. Six bands
/// split 2 / 2 / 2.
fn odds_groups(bands: &[OddsBand]) -> Vec<(String, OddsBand)> {
    let favorites = bands.len().div_ceil(3);
    let long_shots = (bands.len() - favorites).div_ceil(2);
    let mid_end = bands.len() - long_shots;

    [
        ("favorite", &bands[..favorites]),
        ("mid", &bands[favorites..mid_end]),
        ("long shot", &bands[mid_end..]),
    ]
    .into_iter()
    .filter_map(|(label, group)| {
        let span = OddsBand::new(group.first()?.min, group.last()?.max);
        Some((format!("{} ({}-{})", label, span.min, span.max), span))
    })
    .collect()
}

/// Break results down by favorite / mid / long-shot odds, grouping `bands`
///
/// Bets whose odds fall outside every band are grouped as "other".
pub fn analyze_by_odds_range(bets: &[BetRecord], bands: &[OddsBand]) -> Vec<DimensionAnalysis> {
    let groups = odds_groups(bands);
    let mut grouped: HashMap<String, Vec<&BetRecord>> = HashMap::new();
    for bet in bets {
        let key = groups
            .iter()
            .find(|(_, span)| span.contains(bet.odds))
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| "other".to_string());
        grouped.entry(key).or_default().push(bet);
    }
    analyze_groups(grouped)
}

/// Break results down by horse name
pub fn analyze_by_horse(bets: &[BetRecord]) -> Vec<DimensionAnalysis> {
    let mut grouped: HashMap<String, Vec<&BetRecord>> = HashMap::new();
    for bet in bets {
        grouped.entry(bet.horse_name.clone()).or_default().push(bet);
    }
    analyze_groups(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{partition_bands, DEFAULT_BANDS};
    use crate::models::BetOutcome;
    use chrono::Utc;

    fn bet(name: &str, odds: u32, amount: f64, won: bool) -> BetRecord {
        BetRecord {
            timestamp: Utc::now(),
            horse_name: name.to_string(),
            odds,
            bet_amount: amount,
            win_amount: if won { amount * odds as f64 } else { 0.0 },
            result: if won { BetOutcome::Won } else { BetOutcome::Lost },
            balance: 0.0,
            debt: 0.0,
        }
    }

    fn create_test_bets() -> Vec<BetRecord> {
        vec![
            bet("Thunder", 3, 20.0, true),  // +40
            bet("Comet", 12, 10.0, false),  // -10
            bet("Thunder", 5, 10.0, false), // -10
            bet("Bolt", 28, 5.0, true),     // +135
        ]
    }

    #[test]
    fn test_calculate_summary() {
        let summary = calculate_summary(&create_test_bets());

        assert_eq!(summary.total_bets, 4);
        assert_eq!(summary.wins, 2);
        assert!((summary.hit_rate - 0.5).abs() < 1e-9);
        assert!((summary.total_wagered - 45.0).abs() < 1e-9);
        assert!((summary.total_won - 200.0).abs() < 1e-9);
        assert!((summary.net_profit - 155.0).abs() < 1e-9);
        assert!((summary.biggest_win - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_summary_empty() {
        let summary = calculate_summary(&[]);
        assert_eq!(summary.total_bets, 0);
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.roi, 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        // Cumulative: +40, +30, +20, +155 -> peak 40, trough 20
        let summary = calculate_summary(&create_test_bets());
        assert!((summary.max_drawdown - 20.0).abs() < 1e-9);

        // Losing from the start counts against a zero peak
        let losses = vec![bet("Dash", 9, 10.0, false), bet("Dash", 9, 15.0, false)];
        let summary = calculate_summary(&losses);
        assert!((summary.max_drawdown - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_odds_groups_follow_bands() {
        let keys: Vec<String> = odds_groups(&DEFAULT_BANDS).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["favorite (2-8)", "mid (9-22)", "long shot (23-30)"]);

        let two = [OddsBand::new(2, 16), OddsBand::new(17, 30)];
        let keys: Vec<String> = odds_groups(&two).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["favorite (2-16)", "long shot (17-30)"]);

        let bands = partition_bands(4).unwrap();
        let groups = odds_groups(&bands);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].1.min, 2);
        assert_eq!(groups[2].1.max, 30);

        assert!(odds_groups(&[]).is_empty());
    }

    #[test]
    fn test_analyze_by_odds_range() {
        let analysis = analyze_by_odds_range(&create_test_bets(), &DEFAULT_BANDS);
        assert_eq!(analysis.len(), 3);

        let favorites = analysis.iter().find(|a| a.key.starts_with("favorite")).unwrap();
        assert_eq!(favorites.bets, 2);
        assert_eq!(favorites.wins, 1);
        assert!((favorites.profit - 30.0).abs() < 1e-9);

        let long_shots = analysis.iter().find(|a| a.key.starts_with("long")).unwrap();
        assert_eq!(long_shots.bets, 1);
        assert!((long_shots.hit_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_by_odds_range_other_horse_counts() {
        // Two bands: everything up to 16 counts as a favorite
        let two = [OddsBand::new(2, 16), OddsBand::new(17, 30)];
        let analysis = analyze_by_odds_range(&create_test_bets(), &two);
        let keys: Vec<&str> = analysis.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["favorite (2-16)", "long shot (17-30)"]);
        assert_eq!(analysis[0].bets, 3);

        let analysis = analyze_by_odds_range(&create_test_bets(), &[OddsBand::new(2, 10)]);
        let other = analysis.iter().find(|a| a.key == "other").unwrap();
        assert_eq!(other.bets, 2);
    }

    #[test]
    fn test_analyze_by_horse() {
        let analysis = analyze_by_horse(&create_test_bets());
        let names: Vec<&str> = analysis.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(names, vec!["Bolt", "Comet", "Thunder"]);
        assert_eq!(analysis[2].bets, 2);
        assert!((analysis[2].wagered - 30.0).abs() < 1e-9);
    }
}
