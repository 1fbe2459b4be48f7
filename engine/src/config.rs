use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::index::Field;

/// Per-field multipliers applied to term frequency when scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBoosts {
    pub title: f32,
    pub description: f32,
    pub venue: f32,
    pub organizer: f32,
    pub city: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self { title: 3.0, description: 2.0, venue: 1.0, organizer: 1.0, city: 1.0 }
    }
}

impl FieldBoosts {
    pub fn boost(&self, field: Field) -> f32 {
        match field {
            Field::Title => self.title,
            Field::Description => self.description,
            Field::Venue => self.venue,
            Field::Organizer => self.organizer,
            Field::City => self.city,
        }
    }
}

/// Maximum edit distance by token length, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Fuzziness {
    /// Tokens up to this length must match exactly.
    pub exact_max_len: usize,
    /// Tokens up to this length tolerate one edit; longer ones tolerate two.
    pub one_edit_max_len: usize,
    /// Cap on vocabulary terms a single query token may expand to.
    pub max_expansions: usize,
}

impl Default for Fuzziness {
    fn default() -> Self {
        Self { exact_max_len: 2, one_edit_max_len: 5, max_expansions: 50 }
    }
}

impl Fuzziness {
    pub fn max_edits(&self, token_len: usize) -> usize {
        if token_len <= self.exact_max_len {
            0
        } else if token_len <= self.one_edit_max_len {
            1
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub boosts: FieldBoosts,
    pub fuzziness: Fuzziness,
    /// Radius used when an origin is given without one.
    pub default_radius_km: f64,
    pub max_categories: usize,
    pub stats_top_n: usize,
    /// Hard cap on events returned by a bounding-box query.
    pub map_result_cap: usize,
    pub max_page_size: usize,
    /// Highlight fragment length in characters.
    pub fragment_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            boosts: FieldBoosts::default(),
            fuzziness: Fuzziness::default(),
            default_radius_km: 50.0,
            max_categories: 50,
            stats_top_n: 10,
            map_result_cap: 1000,
            max_page_size: 1000,
            fragment_size: 100,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref())?;
        let config: EngineConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let b = self.boosts.boost(field);
            if !b.is_finite() || b < 0.0 {
                bail!("boost for {} must be a non-negative number, got {b}", field.name());
            }
        }
        if self.fuzziness.one_edit_max_len < self.fuzziness.exact_max_len {
            bail!("fuzziness.one_edit_max_len must be >= fuzziness.exact_max_len");
        }
        if !self.default_radius_km.is_finite() || self.default_radius_km <= 0.0 {
            bail!("default_radius_km must be positive, got {}", self.default_radius_km);
        }
        if self.max_categories == 0 || self.stats_top_n == 0 || self.map_result_cap == 0 || self.max_page_size == 0 {
            bail!("result caps must be greater than zero");
        }
        if self.fragment_size == 0 {
            bail!("fragment_size must be greater than zero");
        }
        Ok(())
    }
}
