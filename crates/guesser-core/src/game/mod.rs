//! Round state machine.
//!
//! `Idle → RoundActive → Evaluated → RoundActive (next) | Idle (quit)`.
//! Front ends feed [`GameEvent`]s into [`Game::advance`] and render whatever
//! state comes back; no UI toolkit is involved here.

pub mod matcher;

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, FeatureRecord};
use crate::crop::{self, CropRegion, PatchSize};
use crate::error::{GuesserError, Result};
use crate::planet::PlanetProfile;
use crate::selector::{self, FeatureFilter, RandomSource};

pub use matcher::NameMatcher;

/// Running tally for one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Correct guesses.
    pub points: u32,
    /// Guesses evaluated so far.
    pub rounds: u32,
}

/// One round: the hidden feature and the patch shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    /// 1-based.
    pub number: u32,
    pub feature: FeatureRecord,
    pub region: CropRegion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub guess: String,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameState {
    Idle { final_score: Option<Score> },
    RoundActive { round: Round, score: Score },
    Evaluated { round: Round, outcome: Outcome, score: Score },
}

impl GameState {
    pub fn idle() -> Self {
        GameState::Idle { final_score: None }
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            GameState::Idle { final_score } => *final_score,
            GameState::RoundActive { score, .. } | GameState::Evaluated { score, .. } => Some(*score),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Start,
    Guess(String),
    Next,
    Quit,
}

/// Fixed game setup: which planet, which features, how big a patch.
#[derive(Debug, Clone)]
pub struct Game<'a> {
    planet: &'a PlanetProfile,
    catalog: &'a Catalog,
    patch: PatchSize,
    filter: FeatureFilter,
    matcher: NameMatcher,
}

impl<'a> Game<'a> {
    /// Fails with `PatchTooLarge` / `EmptyPatch` if the patch does not fit the map.
    pub fn new(planet: &'a PlanetProfile, catalog: &'a Catalog, patch: PatchSize) -> Result<Self> {
        if catalog.body != planet.body {
            return Err(GuesserError::Config(format!(
                "catalog for {} used with {} map",
                catalog.body, planet.body
            )));
        }
        crop::validate_patch(planet, patch)?;
        Ok(Self {
            planet,
            catalog,
            patch,
            filter: FeatureFilter::default(),
            matcher: NameMatcher::default(),
        })
    }

    pub fn with_filter(mut self, filter: FeatureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_matcher(mut self, matcher: NameMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn planet(&self) -> &PlanetProfile {
        self.planet
    }

    pub fn patch(&self) -> PatchSize {
        self.patch
    }

    /// Pick a feature and compute its patch.
    pub fn draw_round<R>(&self, number: u32, rng: &mut R) -> Result<Round>
    where
        R: RandomSource + ?Sized,
    {
        let keep = |f: &FeatureRecord| self.filter.matches(f);
        let filter: Option<&dyn Fn(&FeatureRecord) -> bool> =
            if self.filter.is_empty() { None } else { Some(&keep) };

        let feature = selector::select(self.catalog.features(), rng, filter)?;
        let region = crop::compute(self.planet, feature.pixel, self.patch)?;
        debug!(round = number, feature = %feature.name, ?region, "round drawn");
        Ok(Round {
            number,
            feature: feature.clone(),
            region,
        })
    }

    /// Apply one event. Events that make no sense in the current state
    /// (a guess while idle, `Next` before guessing) leave it unchanged.
    pub fn advance<R>(&self, state: &GameState, event: GameEvent, rng: &mut R) -> Result<GameState>
    where
        R: RandomSource + ?Sized,
    {
        let next = match (state, event) {
            (GameState::Idle { .. }, GameEvent::Start) => GameState::RoundActive {
                round: self.draw_round(1, rng)?,
                score: Score::default(),
            },
            (GameState::RoundActive { round, score }, GameEvent::Guess(guess)) => {
                let correct = self.matcher.matches(&guess, &round.feature.name);
                let score = Score {
                    points: score.points + u32::from(correct),
                    rounds: score.rounds + 1,
                };
                GameState::Evaluated {
                    round: round.clone(),
                    outcome: Outcome { guess, correct },
                    score,
                }
            }
            (GameState::Evaluated { round, score, .. }, GameEvent::Next) => GameState::RoundActive {
                round: self.draw_round(round.number + 1, rng)?,
                score: *score,
            },
            (GameState::RoundActive { score, .. } | GameState::Evaluated { score, .. }, GameEvent::Quit) => {
                GameState::Idle {
                    final_score: Some(*score),
                }
            }
            (state, event) => {
                debug!(?event, "event ignored in current state");
                state.clone()
            }
        };
        Ok(next)
    }
}
