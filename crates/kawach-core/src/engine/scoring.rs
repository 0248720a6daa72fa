//! XP formula and qualitative ratings for the timed drill.

use crate::models::{Rating, RatingThresholds, ScoringConfig, Verdict, XpBreakdown};

/// Splits the reward for a completed timed drill into its components.
///
/// Faster reactions and evacuations earn more, with each timed component
/// floored at `min_component`. Negative or non-finite timings count as zero.
pub fn score(config: &ScoringConfig, reaction_secs: f64, evacuation_secs: f64) -> XpBreakdown {
    XpBreakdown {
        reaction: timed_component(
            config.reaction_base,
            config.reaction_penalty_per_sec,
            reaction_secs,
            config.min_component,
        ),
        cover: config.cover_award,
        evacuation: timed_component(
            config.evacuation_base,
            config.evacuation_penalty_per_sec,
            evacuation_secs,
            config.min_component,
        ),
    }
}

fn timed_component(base: u32, penalty_per_sec: f64, secs: f64, min: u32) -> u32 {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let penalty = (penalty_per_sec.max(0.0) * secs).floor();
    let raw = f64::from(base) - penalty;
    if raw <= f64::from(min) {
        min
    } else {
        raw as u32
    }
}

/// Rates a timing against inclusive thresholds.
pub fn rate(secs: f64, thresholds: &RatingThresholds) -> Rating {
    if secs <= thresholds.excellent_secs {
        Rating::Excellent
    } else if secs <= thresholds.good_secs {
        Rating::Good
    } else {
        Rating::CouldBeFaster
    }
}

/// Combines the reaction and evacuation ratings into overall feedback.
pub fn verdict(reaction: Rating, evacuation: Rating) -> Verdict {
    match reaction.points() + evacuation.points() {
        3.. => Verdict::Excellent,
        2 => Verdict::Good,
        _ => Verdict::NeedsImprovement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_run_breakdown() {
        let xp = score(&ScoringConfig::default(), 2.0, 2.0);
        assert_eq!(xp.reaction, 30);
        assert_eq!(xp.cover, 50);
        assert_eq!(xp.evacuation, 40);
        assert_eq!(xp.total(), 120);
    }

    #[test]
    fn test_fractional_penalty_is_floored() {
        // 2.35s * 10 = 23.5 -> 23 penalty
        let xp = score(&ScoringConfig::default(), 2.35, 0.0);
        assert_eq!(xp.reaction, 27);
        assert_eq!(xp.evacuation, 50);
    }

    #[test]
    fn test_slow_run_hits_floor() {
        let xp = score(&ScoringConfig::default(), 60.0, 600.0);
        assert_eq!(xp.reaction, 10);
        assert_eq!(xp.evacuation, 10);
        assert_eq!(xp.total(), 70);
    }

    #[test]
    fn test_xp_is_monotonically_non_increasing() {
        let config = ScoringConfig::default();
        let samples: Vec<f64> = (0..200).map(|i| f64::from(i) * 0.1).collect();

        for pair in samples.windows(2) {
            let faster = score(&config, pair[0], 3.0).total();
            let slower = score(&config, pair[1], 3.0).total();
            assert!(slower <= faster, "reaction {} -> {}", pair[0], pair[1]);

            let faster = score(&config, 3.0, pair[0]).total();
            let slower = score(&config, 3.0, pair[1]).total();
            assert!(slower <= faster, "evacuation {} -> {}", pair[0], pair[1]);
        }

        for secs in samples {
            let xp = score(&config, secs, secs);
            assert!(xp.reaction >= config.min_component);
            assert!(xp.evacuation >= config.min_component);
        }
    }

    #[test]
    fn test_negative_timing_counts_as_zero() {
        let xp = score(&ScoringConfig::default(), -3.0, f64::NAN);
        assert_eq!(xp.reaction, 50);
        assert_eq!(xp.evacuation, 50);
    }

    #[test]
    fn test_ratings_are_inclusive() {
        let reaction = RatingThresholds {
            excellent_secs: 2.5,
            good_secs: 4.0,
        };
        assert_eq!(rate(2.5, &reaction), Rating::Excellent);
        assert_eq!(rate(2.51, &reaction), Rating::Good);
        assert_eq!(rate(4.0, &reaction), Rating::Good);
        assert_eq!(rate(4.2, &reaction), Rating::CouldBeFaster);
    }

    #[test]
    fn test_verdict_combines_points() {
        use Rating::*;
        assert_eq!(verdict(Excellent, Excellent), Verdict::Excellent);
        assert_eq!(verdict(Excellent, Good), Verdict::Excellent);
        assert_eq!(verdict(Good, Good), Verdict::Good);
        assert_eq!(verdict(Excellent, CouldBeFaster), Verdict::Good);
        assert_eq!(verdict(Good, CouldBeFaster), Verdict::NeedsImprovement);
    }
}
