//! Day/night phase for the daynight mode
//!
//! Purely a function of game time, so pausing needs no bookkeeping.

use serde::{Deserialize, Serialize};

const INITIAL_DAY_MS: f64 = 10_000.0;
const CYCLE_MS: f64 = 30_000.0;
const FADE_MS: f64 = 5_000.0;
const NIGHT_MS: f64 = 20_000.0;
pub const MAX_NIGHT_OPACITY: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Day,
    FadeToNight,
    Night,
    FadeToDay,
}

/// Phase at `game_time_ms` into the round
///
/// After the opening day, even cycles are nights (fade in, dark, fade out)
/// and odd cycles are days.
pub fn phase_at(game_time_ms: f64) -> DayPhase {
    let cycling = game_time_ms - INITIAL_DAY_MS;
    if cycling < 0.0 {
        return DayPhase::Day;
    }
    let cycle = (cycling / CYCLE_MS).floor() as u64;
    if cycle % 2 == 1 {
        return DayPhase::Day;
    }
    let position = cycling % CYCLE_MS;
    if position < FADE_MS {
        DayPhase::FadeToNight
    } else if position < FADE_MS + NIGHT_MS {
        DayPhase::Night
    } else {
        DayPhase::FadeToDay
    }
}

/// Darkness overlay opacity in [0, MAX_NIGHT_OPACITY]
pub fn night_opacity(game_time_ms: f64) -> f32 {
    let position = (game_time_ms - INITIAL_DAY_MS).rem_euclid(CYCLE_MS);
    let fraction = match phase_at(game_time_ms) {
        DayPhase::Day => 0.0,
        DayPhase::FadeToNight => position / FADE_MS,
        DayPhase::Night => 1.0,
        DayPhase::FadeToDay => 1.0 - (position - FADE_MS - NIGHT_MS) / FADE_MS,
    };
    fraction.clamp(0.0, 1.0) as f32 * MAX_NIGHT_OPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_timeline() {
        assert_eq!(phase_at(0.0), DayPhase::Day);
        assert_eq!(phase_at(9_999.0), DayPhase::Day);
        assert_eq!(phase_at(10_000.0), DayPhase::FadeToNight);
        assert_eq!(phase_at(15_000.0), DayPhase::Night);
        assert_eq!(phase_at(34_999.0), DayPhase::Night);
        assert_eq!(phase_at(35_000.0), DayPhase::FadeToDay);
        assert_eq!(phase_at(40_000.0), DayPhase::Day);
        assert_eq!(phase_at(69_999.0), DayPhase::Day);
        assert_eq!(phase_at(70_000.0), DayPhase::FadeToNight);
    }

    #[test]
    fn test_opacity() {
        assert_eq!(night_opacity(5_000.0), 0.0);
        assert!((night_opacity(12_500.0) - 0.475).abs() < 1e-6);
        assert_eq!(night_opacity(20_000.0), MAX_NIGHT_OPACITY);
        assert!((night_opacity(37_500.0) - 0.475).abs() < 1e-6);
        assert_eq!(night_opacity(50_000.0), 0.0);
    }
}
