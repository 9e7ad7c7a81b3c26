//! Random feature selection.
//!
//! Selection is a pure function of the catalog, the filter and the draw
//! sequence of the injected random source: one draw per successful call.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::FeatureRecord;
use crate::error::{GuesserError, Result};

/// Uniform integer draws over `[0, n)`.
pub trait RandomSource {
    /// `n` is always at least 1.
    fn draw_index(&mut self, n: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn draw_index(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

/// Declarative selection constraints, usable from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFilter {
    /// Keep only features with a known diameter of at least this many km.
    pub min_diameter_km: Option<f64>,
    /// Keep only features whose type tag contains this word, ignoring case
    /// (`"crater"` matches `"Crater, craters"`).
    pub feature_type: Option<String>,
}

impl FeatureFilter {
    pub fn is_empty(&self) -> bool {
        self.min_diameter_km.is_none() && self.feature_type.is_none()
    }

    pub fn matches(&self, feature: &FeatureRecord) -> bool {
        if let Some(min) = self.min_diameter_km {
            match feature.diameter_km {
                Some(d) if d >= min => {}
                _ => return false,
            }
        }
        if let Some(want) = &self.feature_type {
            let want = want.trim().to_lowercase();
            let Some(have) = &feature.feature_type else {
                return false;
            };
            let have = have.to_lowercase();
            if !have
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == want || word.trim_end_matches('s') == want)
                && have.trim() != want
            {
                return false;
            }
        }
        true
    }
}

/// Draw one feature uniformly from those passing `filter`.
pub fn select<'a, R>(
    catalog: &'a [FeatureRecord],
    rng: &mut R,
    filter: Option<&dyn Fn(&FeatureRecord) -> bool>,
) -> Result<&'a FeatureRecord>
where
    R: RandomSource + ?Sized,
{
    let candidates: Vec<&FeatureRecord> = match filter {
        Some(keep) => catalog.iter().filter(|f| keep(f)).collect(),
        None => catalog.iter().collect(),
    };
    if candidates.is_empty() {
        return Err(GuesserError::NoMatchingFeature);
    }
    let i = rng.draw_index(candidates.len());
    // Out-of-range draws from a misbehaving source wrap rather than panic.
    Ok(candidates[i % candidates.len()])
}
