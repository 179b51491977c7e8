use hilo_common::analysis::TrendAnalyzer;
use hilo_common::strategy::{self, AnalysisContext, PatternBreakStrategy, Signal, Strategy};
use hilo_common::{Category, Observation, Sample};
use hilo_core::config::EngineSettings;
use hilo_core::{PredictionEngine, Regime, Rule, Submission};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────────

fn samples(values: &[u8]) -> Vec<Sample> {
    values.iter().map(|&v| Sample::new(v).unwrap()).collect()
}

fn engine(seed: u64) -> PredictionEngine {
    PredictionEngine::with_seed(EngineSettings::default(), seed).unwrap()
}

fn votes(values: &[u8]) -> Vec<Signal> {
    let window = samples(values);
    let categories: Vec<Category> = window.iter().map(|s| s.category()).collect();
    let patterns = hilo_common::analysis::find_patterns(&categories);
    let trend = TrendAnalyzer::analyze(&window);
    let ctx = AnalysisContext {
        categories: &categories,
        top_pattern: patterns.first(),
        trend: &trend,
    };
    let mut rng = StdRng::seed_from_u64(0);
    strategy::ensemble()
        .iter()
        .map(|s| s.predict(&ctx, &mut rng))
        .collect()
}

fn opposite_sample(category: Category) -> Sample {
    match category {
        Category::High => Sample::new(0).unwrap(),
        Category::Low => Sample::new(9).unwrap(),
    }
}

/// Newest first. Top pattern High-Low aligned with the window head, momentum
/// 5 - 8 = -3, moving averages 5.4 > 5.0 > 4.5, calm volatility ending High.
const UNANIMOUS_HIGH: [u8; 20] = [
    5, 4, 6, 4, 8, 5, 4, 5, 4, 5, 5, 3, 5, 3, 5, 3, 5, 3, 5, 3,
];

/// `UNANIMOUS_HIGH` mirrored (9 - v): every reading flips to Low.
const UNANIMOUS_LOW: [u8; 20] = [
    4, 5, 3, 5, 1, 4, 5, 4, 5, 4, 4, 6, 4, 6, 4, 6, 4, 6, 4, 6,
];

// ── Scenarios ──────────────────────────────────────────────────────────────

#[test]
fn scenario_a_smart_weighted_average_fallthrough() {
    // Oldest to newest: 2, 7, 3, 8, 1.
    let mut engine = engine(1);
    let submission = engine
        .submit_observations(&samples(&[1, 8, 3, 7, 2]), "20240101005")
        .unwrap();
    let outcome = submission.outcome().unwrap();

    assert_eq!(outcome.regime, Regime::Smart);
    assert_eq!(outcome.rule, Rule::WeightedAverage);
    assert_eq!(outcome.predicted, Category::Low);
    assert_eq!(outcome.issued_period_id.as_deref(), Some("20240101006"));
    assert!(engine.trend().moving_averages.is_none());
}

#[test]
fn scenario_b_defensive_unanimous_vote() {
    assert!(votes(&UNANIMOUS_HIGH)
        .iter()
        .all(|v| *v == Signal::Conviction(Category::High)));
    assert!(votes(&UNANIMOUS_LOW)
        .iter()
        .all(|v| *v == Signal::Conviction(Category::Low)));

    let mut engine = engine(2);
    engine
        .submit_observations(&samples(&[3, 6, 2]), "1")
        .unwrap();

    // Lose every period until a Low prediction is pending on a live streak,
    // so the unanimous High window below is itself a loss.
    let mut period = 1;
    loop {
        let pending = engine.pending().unwrap().predicted;
        let streak = engine.metrics().loss_streak;
        if pending == Category::Low && streak >= 1 {
            break;
        }
        let window = match pending {
            Category::High => UNANIMOUS_LOW.to_vec(),
            Category::Low => vec![9, 3, 6, 2],
        };
        period += 1;
        engine
            .submit_observations(&samples(&window), &period.to_string())
            .unwrap();
        assert_eq!(engine.metrics().loss_streak, streak + 1);
        assert!(period < 6, "streak never reached a pending Low");
    }

    let streak = engine.metrics().loss_streak;
    let outcome = engine
        .submit_observations(&samples(&UNANIMOUS_HIGH), &(period + 1).to_string())
        .unwrap()
        .outcome()
        .cloned()
        .unwrap();
    assert_eq!(engine.metrics().loss_streak, streak + 1);
    assert!(engine.metrics().loss_streak >= 2);
    assert_eq!(outcome.regime, Regime::Defensive);
    assert_eq!(outcome.rule, Rule::Consensus);
    assert_eq!(outcome.predicted, Category::High);
}

#[test]
fn scenario_c_duplicate_period_is_noop() {
    let mut engine = engine(3);
    let observations = vec![
        Observation::new(Sample::new(6).unwrap(), "778"),
        Observation::new(Sample::new(1).unwrap(), "777"),
    ];

    assert!(matches!(engine.submit(&observations), Ok(Submission::Issued(_))));
    let streak = engine.metrics().loss_streak;
    assert_eq!(engine.submit(&observations), Ok(Submission::Duplicate));
    assert_eq!(engine.metrics().total_predictions, 1);
    assert_eq!(engine.metrics().loss_streak, streak);
    assert_eq!(engine.history().count(), 1);
}

#[test]
fn scenario_d_pattern_break_inverts_high_high() {
    let mut engine = engine(4);
    engine
        .submit_observations(&samples(&[7, 8, 9, 1, 2]), "50")
        .unwrap();

    let top = engine.top_pattern().unwrap();
    assert_eq!(top.categories, vec![Category::High, Category::High]);
    assert_eq!(top.occurrences, 2);

    let categories = engine.rolling().categories();
    let ctx = AnalysisContext {
        categories: &categories,
        top_pattern: Some(top),
        trend: engine.trend(),
    };
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        PatternBreakStrategy.predict(&ctx, &mut rng),
        Signal::Conviction(Category::Low)
    );
}

#[test]
fn statistics_follow_resolutions() {
    let mut engine = engine(5);
    let mut window = vec![4, 6, 2, 8, 5, 1];
    engine.submit_observations(&samples(&window), "1").unwrap();

    // Lose, lose, win: two analysis resets are not triggered by the win.
    let mut results = Vec::new();
    for (period, lose) in [(2, true), (3, true), (4, false)] {
        let predicted = engine.pending().unwrap().predicted;
        let next = if lose { opposite_sample(predicted) } else { opposite_sample(predicted.opposite()) };
        window.insert(0, next.value());
        engine
            .submit_observations(&samples(&window), &period.to_string())
            .unwrap();
        results.push(engine.metrics().loss_streak);
    }
    assert_eq!(results, vec![1, 2, 0]);
    assert_eq!(engine.metrics().analysis_resets, 1);

    let stats = engine.statistics();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.resolved, 3);
    assert_eq!(stats.correct, 1);
    assert!((stats.accuracy - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(stats.high_count + stats.low_count, 1);
    assert_eq!(stats.total_wins, 1);
    assert_eq!(stats.regime, Regime::Smart);
    assert!(stats.distribution.is_some());
    assert!(stats.confidence <= 100);
}

// ── Properties ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn engine_invariants_hold(
        seed in any::<u64>(),
        polls in proptest::collection::vec((proptest::collection::vec(0u8..=9, 1..35), any::<bool>()), 1..40),
    ) {
        let mut engine = engine(seed);
        let mut period = 1000u64;

        for (values, repeat) in polls {
            if !repeat {
                period += 1;
            }
            let before = engine.metrics().clone();
            let pending = engine.pending().map(|r| r.predicted);
            let window = samples(&values);

            let submission = engine.submit_observations(&window, &period.to_string()).unwrap();
            let after = engine.metrics();

            if submission.is_duplicate() {
                prop_assert_eq!(after.total_predictions, before.total_predictions);
                prop_assert_eq!(after.loss_streak, before.loss_streak);
            } else {
                prop_assert_eq!(after.total_predictions, before.total_predictions + 1);
                match pending {
                    Some(predicted) if predicted == window[0].category() => {
                        prop_assert_eq!(after.loss_streak, 0)
                    }
                    Some(_) => prop_assert_eq!(after.loss_streak, before.loss_streak + 1),
                    None => prop_assert_eq!(after.loss_streak, before.loss_streak),
                }
            }

            prop_assert!(engine.history().filter(|r| !r.is_resolved()).count() <= 1);
            prop_assert!(engine.rolling().pattern_window().len() <= 30);
            prop_assert!(engine.rolling().trend_window().len() <= 20);
            prop_assert!(engine.statistics().confidence <= 100);
        }
    }
}
