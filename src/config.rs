//! Engine configuration: scoring, group size, slot lengths.
//!
//! Defaults match the usual club format (groups of 4, 30 minute matches, 3 points per win).
//! Every field can be overridden from the environment (`ENGINE_*`), the same way the web
//! binary reads `HOST` and `PORT`.

use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Standings points for a match win (a loss is worth 0).
    pub points_per_win: u32,
    pub default_group_size: usize,
    /// Window used for court double-booking checks.
    pub match_duration_minutes: u32,
    /// Spacing between consecutive automatic slots on one court.
    pub slot_duration_minutes: u32,
    /// Teams per group that advance to the bracket.
    pub qualifiers_per_group: usize,
    /// Reject results on matches that were never given a court and time.
    pub require_schedule_before_result: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            points_per_win: 3,
            default_group_size: 4,
            match_duration_minutes: 30,
            slot_duration_minutes: 30,
            qualifiers_per_group: 2,
            require_schedule_before_result: true,
        }
    }
}

impl EngineConfig {
    /// Read overrides from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
            match lookup(key) {
                Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                    log::warn!("Ignoring invalid {}={:?}", key, raw);
                    default
                }),
                None => default,
            }
        }

        let d = Self::default();
        Self {
            points_per_win: parse(&lookup, "ENGINE_POINTS_PER_WIN", d.points_per_win),
            default_group_size: parse(&lookup, "ENGINE_GROUP_SIZE", d.default_group_size),
            match_duration_minutes: parse(&lookup, "ENGINE_MATCH_MINUTES", d.match_duration_minutes),
            slot_duration_minutes: parse(&lookup, "ENGINE_SLOT_MINUTES", d.slot_duration_minutes),
            qualifiers_per_group: parse(&lookup, "ENGINE_QUALIFIERS_PER_GROUP", d.qualifiers_per_group),
            require_schedule_before_result: parse(
                &lookup,
                "ENGINE_REQUIRE_SCHEDULE",
                d.require_schedule_before_result,
            ),
        }
    }

    pub fn match_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.match_duration_minutes))
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_duration_minutes))
    }
}
