//! Odds Generation
//!
//! Builds a fresh race field each round. The odds range is split into
//! contiguous bands from favorite to long-shot and every band contributes
//! exactly one horse, so each race has one clear favorite and one clear
//! long-shot. The field is shuffled afterwards so list order says nothing
//! about the odds.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

use crate::error::{GameError, Result};
use crate::models::{Horse, HorseColor, RaceField};

/// Shortest odds a horse can get
pub const MIN_ODDS: u32 = 2;

/// Longest odds a horse can get
pub const MAX_ODDS: u32 = 30;

/// Name pool horses are drawn from
pub const HORSE_NAMES: [&str; 12] = [
    "Thunder", "Lightning", "Shadow", "Spirit", "Storm", "Flash", "Blitz", "Dash", "Arrow",
    "Comet", "Rocket", "Bolt",
];

/// Inclusive odds range assigned to one horse per race
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OddsBand {
    pub min: u32,
    pub max: u32,
}

impl OddsBand {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, odds: u32) -> bool {
        (self.min..=self.max).contains(&odds)
    }
}

/// Hand-tuned bands for the standard six-horse field
pub const DEFAULT_BANDS: [OddsBand; 6] = [
    OddsBand::new(2, 3),
    OddsBand::new(4, 8),
    OddsBand::new(9, 15),
    OddsBand::new(16, 22),
    OddsBand::new(23, 27),
    OddsBand::new(28, 30),
];

/// Split the odds range into `count` contiguous bands
///
/// Six horses use [`DEFAULT_BANDS`]. Any other count gets an even split,
/// with leftover values going to the long-shot end.
pub fn partition_bands(count: usize) -> Result<Vec<OddsBand>> {
    if count == DEFAULT_BANDS.len() {
        return Ok(DEFAULT_BANDS.to_vec());
    }

    let span = (MAX_ODDS - MIN_ODDS + 1) as usize;
    if count == 0 || count > span {
        return Err(GameError::Config(format!(
            "Cannot split odds {}-{} into {} bands",
            MIN_ODDS, MAX_ODDS, count
        )));
    }

    let base = span / count;
    let extra = span % count;
    let mut bands = Vec::with_capacity(count);
    let mut start = MIN_ODDS;
    for i in 0..count {
        let width = base + usize::from(i >= count - extra);
        let end = start + width as u32 - 1;
        bands.push(OddsBand::new(start, end));
        start = end + 1;
    }

    Ok(bands)
}

/// Check that bands are non-empty, inside the odds range, ascending and contiguous
pub fn validate_bands(bands: &[OddsBand]) -> Result<()> {
    if bands.is_empty() {
        return Err(GameError::Config("No odds bands configured".to_string()));
    }

    for (i, band) in bands.iter().enumerate() {
        if band.min > band.max {
            return Err(GameError::Config(format!(
                "Band {} is inverted: {}-{}",
                i, band.min, band.max
            )));
        }
        if band.min < MIN_ODDS || band.max > MAX_ODDS {
            return Err(GameError::Config(format!(
                "Band {} ({}-{}) is outside odds range {}-{}",
                i, band.min, band.max, MIN_ODDS, MAX_ODDS
            )));
        }
    }

    for pair in bands.windows(2) {
        if pair[1].min != pair[0].max + 1 {
            return Err(GameError::Config(format!(
                "Bands {}-{} and {}-{} are not contiguous",
                pair[0].min, pair[0].max, pair[1].min, pair[1].max
            )));
        }
    }

    Ok(())
}

/// Race field generator
#[derive(Debug, Clone)]
pub struct OddsGenerator {
    bands: Vec<OddsBand>,
    names: Vec<String>,
}

impl OddsGenerator {
    /// Create a generator from explicit bands and a name pool
    ///
    /// # Errors
    /// `Config` when the bands are malformed, the pool has duplicates, or
    /// the pool is smaller than the number of horses.
    pub fn new(bands: Vec<OddsBand>, names: Vec<String>) -> Result<Self> {
        validate_bands(&bands)?;

        if names.len() < bands.len() {
            return Err(GameError::Config(format!(
                "Name pool has {} names but {} horses are needed",
                names.len(),
                bands.len()
            )));
        }

        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
        if unique.len() != names.len() {
            return Err(GameError::Config(
                "Name pool contains duplicate names".to_string(),
            ));
        }

        Ok(Self { bands, names })
    }

    /// Standard bands for `horse_count` horses drawn from the built-in pool
    pub fn with_horse_count(horse_count: usize) -> Result<Self> {
        Self::with_pool_size(horse_count, HORSE_NAMES.len())
    }

    /// Like [`OddsGenerator::with_horse_count`] but only the first
    /// `name_count` names of the built-in pool are eligible
    pub fn with_pool_size(horse_count: usize, name_count: usize) -> Result<Self> {
        if name_count > HORSE_NAMES.len() {
            return Err(GameError::Config(format!(
                "Only {} built-in names available, {} requested",
                HORSE_NAMES.len(),
                name_count
            )));
        }
        let names = HORSE_NAMES[..name_count]
            .iter()
            .map(|n| n.to_string())
            .collect();
        Self::new(partition_bands(horse_count)?, names)
    }

    pub fn bands(&self) -> &[OddsBand] {
        &self.bands
    }

    pub fn horse_count(&self) -> usize {
        self.bands.len()
    }

    /// Index of the band containing `odds`
    pub fn band_index(&self, odds: u32) -> Option<usize> {
        self.bands.iter().position(|b| b.contains(odds))
    }

    /// Draw a new shuffled field: one horse per band, distinct names
    pub fn generate_field<R: Rng + ?Sized>(&self, rng: &mut R) -> RaceField {
        let picks = index::sample(rng, self.names.len(), self.bands.len());

        let mut horses: Vec<Horse> = self
            .bands
            .iter()
            .zip(picks.iter())
            .map(|(band, name_idx)| {
                let odds = rng.random_range(band.min..=band.max);
                Horse::new(self.names[name_idx].clone(), odds, HorseColor::Red)
            })
            .collect();

        horses.shuffle(rng);
        for (slot, horse) in horses.iter_mut().enumerate() {
            horse.color = HorseColor::for_slot(slot);
        }

        RaceField::new(horses)
    }
}

impl Default for OddsGenerator {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS.to_vec(),
            names: HORSE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// One-shot field generation from the built-in pool
pub fn generate_field<R: Rng + ?Sized>(
    rng: &mut R,
    horse_count: usize,
    name_count: usize,
) -> Result<RaceField> {
    Ok(OddsGenerator::with_pool_size(horse_count, name_count)?.generate_field(rng))
}
