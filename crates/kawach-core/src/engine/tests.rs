#[cfg(test)]
mod scenario_engine_tests {
    use std::time::Duration;

    use crate::{
        clock::ManualClock,
        engine::{RunStatus, ScenarioEngine, ScenarioEvent, Selection},
        error::KawachError,
        models::{ScenarioDefinition, ScenarioEngineConfig, ScenarioOption, Step},
    };

    const DELAY: Duration = Duration::from_millis(4_000);

    /// Four steps whose correct options are 1, 0, 2 and 0.
    fn four_step_drill() -> ScenarioDefinition {
        let correct = [1, 0, 2, 0];
        ScenarioDefinition {
            id: "library-drill".to_string(),
            title: "Library Drill".to_string(),
            description: None,
            reward_per_step: 10,
            steps: correct
                .iter()
                .enumerate()
                .map(|(n, &answer)| Step {
                    situation: format!("Situation {n}"),
                    image: None,
                    options: (0..3)
                        .map(|i| ScenarioOption {
                            text: format!("Option {i}"),
                            is_correct: i == answer,
                            feedback: if i == answer {
                                "Correct".to_string()
                            } else {
                                "Not quite".to_string()
                            },
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn engine() -> (ManualClock, ScenarioEngine<ManualClock>) {
        let clock = ManualClock::new();
        let engine = ScenarioEngine::new(clock.clone(), ScenarioEngineConfig::default());
        (clock, engine)
    }

    fn answer(clock: &ManualClock, engine: &mut ScenarioEngine<ManualClock>, option: usize) {
        engine.select_option(option);
        clock.advance(DELAY);
        engine.poll();
    }

    #[test]
    fn test_n_selections_complete_the_run() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();

        for (step, option) in [1, 0, 2, 0].into_iter().enumerate() {
            assert_eq!(engine.current_step_index(), Some(step));
            answer(&clock, &mut engine, option);
        }

        assert_eq!(engine.status(), RunStatus::Completed);
        let summary = engine.results_summary().unwrap();
        assert_eq!(summary.score, 40);
        assert_eq!(summary.max_score, 40);
        assert_eq!(summary.correct_count(), 4);
    }

    #[test]
    fn test_score_counts_correct_answers() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();

        // Wrong on step 2 only.
        for option in [1, 0, 0, 0] {
            answer(&clock, &mut engine, option);
        }

        let summary = engine.results_summary().unwrap();
        assert_eq!(summary.score, 30);
        assert_eq!(summary.correct_count(), 3);
        assert!(!summary.outcomes[2].correct);
        assert_eq!(summary.outcomes[2].points, 0);
        assert_eq!(summary.run_result().awarded_xp, 30);
    }

    #[test]
    fn test_duplicate_selection_is_ignored() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();

        assert_eq!(
            engine.select_option(1),
            Selection::Recorded {
                correct: true,
                feedback: "Correct".to_string()
            }
        );
        assert_eq!(engine.select_option(0), Selection::Ignored);
        assert_eq!(engine.score(), 10);

        clock.advance(DELAY);
        engine.poll();
        assert_eq!(engine.current_step_index(), Some(1));
    }

    #[test]
    fn test_advance_waits_for_delay() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();
        engine.select_option(1);

        clock.advance(DELAY - Duration::from_millis(1));
        engine.poll();
        assert_eq!(engine.current_step_index(), Some(0));

        clock.advance(Duration::from_millis(1));
        engine.poll();
        assert_eq!(engine.current_step_index(), Some(1));
    }

    #[test]
    fn test_out_of_range_selection_is_ignored() {
        let (_clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();

        assert_eq!(engine.select_option(7), Selection::Ignored);
        assert!(engine.next_due().is_none());
        assert!(matches!(engine.select_option(1), Selection::Recorded { .. }));
    }

    #[test]
    fn test_selection_before_start_is_ignored() {
        let (_clock, mut engine) = engine();
        assert_eq!(engine.select_option(0), Selection::Ignored);
        assert_eq!(engine.status(), RunStatus::NotStarted);
    }

    #[test]
    fn test_restart_resets_score_and_step() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();
        answer(&clock, &mut engine, 1);
        answer(&clock, &mut engine, 0);
        assert_eq!(engine.score(), 20);

        engine.restart().unwrap();
        assert_eq!(engine.status(), RunStatus::InProgress);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.current_step_index(), Some(0));
    }

    #[test]
    fn test_restart_discards_pending_advance() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();
        engine.select_option(1);

        engine.restart().unwrap();
        clock.advance(DELAY * 2);
        engine.poll();

        assert_eq!(engine.current_step_index(), Some(0));
        assert_eq!(engine.score(), 0);
        assert!(matches!(engine.select_option(1), Selection::Recorded { .. }));
    }

    #[test]
    fn test_abandon_cancels_timers() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();
        engine.select_option(1);

        engine.abandon();
        assert!(engine.next_due().is_none());
        clock.advance(DELAY);
        engine.poll();

        assert_eq!(engine.status(), RunStatus::NotStarted);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_completed_event_emitted_once() {
        let (clock, mut engine) = engine();
        engine.start(four_step_drill()).unwrap();
        for option in [1, 0, 2, 0] {
            answer(&clock, &mut engine, option);
        }
        engine.select_option(0);
        clock.advance(DELAY);
        engine.poll();

        let events = engine.take_events();
        let completions = events
            .iter()
            .filter(|event| matches!(event, ScenarioEvent::Completed(_)))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(
            events[0],
            ScenarioEvent::Started {
                scenario_id: "library-drill".to_string(),
                total_steps: 4
            }
        );
        assert_eq!(events[1], ScenarioEvent::StepPresented { step_index: 0 });
        assert!(engine.take_events().is_empty());
    }

    #[test]
    fn test_summary_requires_completion() {
        let (_clock, mut engine) = engine();
        assert!(matches!(
            engine.results_summary(),
            Err(KawachError::NotCompleted)
        ));
        engine.start(four_step_drill()).unwrap();
        assert!(matches!(
            engine.results_summary(),
            Err(KawachError::NotCompleted)
        ));
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let (_clock, mut engine) = engine();
        let mut scenario = four_step_drill();
        scenario.steps[0].options[0].is_correct = true;

        let err = engine.start(scenario).unwrap_err();
        assert!(matches!(err, KawachError::InvalidScenario { .. }));
        assert_eq!(engine.status(), RunStatus::NotStarted);
        assert!(engine.restart().is_err());
    }

    #[test]
    fn test_overflowing_reward_is_rejected_at_start() {
        let (_clock, mut engine) = engine();
        let mut scenario = four_step_drill();
        scenario.reward_per_step = 2_000_000_000;

        let err = engine.start(scenario).unwrap_err();
        assert!(matches!(err, KawachError::InvalidScenario { .. }));
        assert_eq!(engine.status(), RunStatus::NotStarted);
    }
}

#[cfg(test)]
mod timed_drill_tests {
    use std::time::Duration;

    use crate::{
        clock::ManualClock,
        engine::{
            AvailableDevice, DrillPhase, HoldStage, TimedDrill, TimedDrillEvent,
            UnavailableDevice,
        },
        models::{Rating, TimedDrillConfig, Verdict},
    };

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn drill() -> (ManualClock, TimedDrill<ManualClock>) {
        let clock = ManualClock::new();
        let drill = TimedDrill::new(clock.clone(), TimedDrillConfig::default());
        (clock, drill)
    }

    fn wait(clock: &ManualClock, drill: &mut TimedDrill<ManualClock>, delta: Duration) {
        clock.advance(delta);
        drill.poll();
    }

    /// Starts a drill, takes cover right after the shaking and waits for the
    /// countdown to begin (t = 5s).
    fn reach_countdown(clock: &ManualClock, drill: &mut TimedDrill<ManualClock>) {
        drill.start(&mut AvailableDevice).unwrap();
        drill.on_hold_changed(true);
        wait(clock, drill, secs(5));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Countdown));
    }

    #[test]
    fn test_fast_run_rates_excellent() {
        let (clock, mut drill) = drill();
        assert_eq!(drill.start(&mut AvailableDevice).unwrap(), DrillPhase::Shaking);

        // Cover taken while the ground is still shaking counts at shake end.
        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(2));
        assert_eq!(drill.phase(), DrillPhase::HoldingCover);
        assert_eq!(drill.reaction_secs(), Some(2.0));

        wait(&clock, &mut drill, secs(3));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Countdown));
        wait(&clock, &mut drill, secs(10));
        assert_eq!(drill.phase(), DrillPhase::Evacuating);

        clock.advance(secs(2));
        assert!(drill.evacuate());

        let result = drill.result().unwrap();
        assert_eq!(result.reaction_rating, Rating::Excellent);
        assert_eq!(result.evacuation_rating, Rating::Excellent);
        assert_eq!(result.verdict, Verdict::Excellent);
        assert_eq!(result.evacuation_secs, 2.0);
        assert_eq!(result.awarded_xp, 120);
    }

    #[test]
    fn test_slow_run_gets_floored_xp() {
        let (clock, mut drill) = drill();
        drill.start(&mut AvailableDevice).unwrap();
        wait(&clock, &mut drill, secs(2));
        assert_eq!(drill.phase(), DrillPhase::AwaitingCover);

        wait(&clock, &mut drill, secs(4));
        drill.on_hold_changed(true);
        assert_eq!(drill.reaction_secs(), Some(6.0));

        wait(&clock, &mut drill, secs(13));
        assert_eq!(drill.phase(), DrillPhase::Evacuating);
        clock.advance(secs(9));
        assert!(drill.evacuate());

        let result = drill.result().unwrap();
        assert_eq!(result.reaction_rating, Rating::CouldBeFaster);
        assert_eq!(result.evacuation_rating, Rating::CouldBeFaster);
        assert_eq!(result.verdict, Verdict::NeedsImprovement);
        assert_eq!(result.xp.reaction, 10);
        assert_eq!(result.xp.evacuation, 10);
        assert_eq!(result.awarded_xp, 70);
    }

    #[test]
    fn test_countdown_ticks_down() {
        let (clock, mut drill) = drill();
        reach_countdown(&clock, &mut drill);
        assert_eq!(drill.countdown_remaining(), 10);

        wait(&clock, &mut drill, secs(1));
        assert_eq!(drill.countdown_remaining(), 9);

        let ticks: Vec<u32> = drill
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                TimedDrillEvent::CountdownTick { remaining } => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![9]);
    }

    #[test]
    fn test_release_during_countdown_resets_it() {
        let (clock, mut drill) = drill();
        reach_countdown(&clock, &mut drill);
        wait(&clock, &mut drill, secs(7));
        assert_eq!(drill.countdown_remaining(), 3);
        drill.take_events();

        drill.on_hold_changed(false);
        assert_eq!(drill.countdown_remaining(), 10);
        assert_eq!(drill.phase(), DrillPhase::HoldingCover);
        assert_eq!(
            drill.take_events(),
            vec![TimedDrillEvent::ReturnToCover {
                countdown_reset: true
            }]
        );

        // Ticking stops until cover is taken again.
        wait(&clock, &mut drill, secs(5));
        assert_eq!(drill.countdown_remaining(), 10);

        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(10));
        assert_eq!(drill.phase(), DrillPhase::Evacuating);
    }

    #[test]
    fn test_release_during_hold_cancels_timer() {
        let (clock, mut drill) = drill();
        drill.start(&mut AvailableDevice).unwrap();
        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(3));
        assert!(drill.is_hold_timer_armed());
        drill.take_events();

        drill.on_hold_changed(false);
        assert!(!drill.is_hold_timer_armed());
        assert_eq!(
            drill.take_events(),
            vec![TimedDrillEvent::ReturnToCover {
                countdown_reset: false
            }]
        );

        wait(&clock, &mut drill, secs(10));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Hold));

        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(3));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Countdown));
        // Reaction time is kept from the first time cover was taken.
        assert_eq!(drill.reaction_secs(), Some(2.0));
    }

    #[test]
    fn test_hazard_tap_cancels_hold_timer() {
        let (clock, mut drill) = drill();
        drill.start(&mut AvailableDevice).unwrap();
        assert!(!drill.tap_hazard("window"));

        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(3));
        drill.take_events();

        assert!(!drill.tap_hazard("door"));
        assert!(drill.tap_hazard("window"));
        assert!(!drill.is_hold_timer_armed());
        assert_eq!(
            drill.take_events(),
            vec![TimedDrillEvent::HazardWarning {
                hazard_id: "window".to_string(),
                tip: "Glass can shatter during an earthquake. Stay clear!".to_string(),
            }]
        );

        wait(&clock, &mut drill, secs(5));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Hold));

        // Taking cover again re-arms the hold timer.
        drill.on_hold_changed(true);
        assert!(drill.is_hold_timer_armed());
        wait(&clock, &mut drill, secs(3));
        assert_eq!(drill.hold_stage(), Some(HoldStage::Countdown));
        assert!(!drill.tap_hazard("shelf"));
    }

    #[test]
    fn test_device_failure_never_scores() {
        let (clock, mut drill) = drill();
        let mut device = UnavailableDevice {
            reason: "camera permission denied".to_string(),
        };

        assert_eq!(drill.start(&mut device).unwrap(), DrillPhase::DeviceError);
        assert_eq!(drill.device_error(), Some("camera permission denied"));
        assert!(drill.take_events().contains(&TimedDrillEvent::DeviceUnavailable {
            reason: "camera permission denied".to_string()
        }));

        drill.on_hold_changed(true);
        wait(&clock, &mut drill, secs(30));
        assert!(!drill.evacuate());
        assert_eq!(drill.phase(), DrillPhase::DeviceError);
        assert_eq!(drill.awarded_xp(), None);
        assert!(drill.next_due().is_none());
    }

    #[test]
    fn test_out_of_order_input_is_ignored() {
        let (clock, mut drill) = drill();
        assert!(!drill.evacuate());

        drill.start(&mut AvailableDevice).unwrap();
        assert!(!drill.evacuate());
        assert_eq!(drill.start(&mut AvailableDevice).unwrap(), DrillPhase::Shaking);

        wait(&clock, &mut drill, secs(1));
        assert_eq!(drill.phase(), DrillPhase::Shaking);
    }

    #[test]
    fn test_completion_is_reported_once() {
        let (clock, mut drill) = drill();
        reach_countdown(&clock, &mut drill);
        wait(&clock, &mut drill, secs(10));

        assert!(drill.evacuate());
        assert!(!drill.evacuate());

        let completions = drill
            .take_events()
            .iter()
            .filter(|event| matches!(event, TimedDrillEvent::Completed(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_reset_cancels_pending_timers() {
        let (clock, mut drill) = drill();
        drill.start(&mut AvailableDevice).unwrap();
        drill.on_hold_changed(true);

        drill.reset();
        assert_eq!(drill.phase(), DrillPhase::Idle);
        assert!(drill.next_due().is_none());
        assert!(!drill.is_in_safe_zone());

        wait(&clock, &mut drill, secs(20));
        assert_eq!(drill.phase(), DrillPhase::Idle);

        // A fresh run measures reaction time from its own start.
        drill.start(&mut AvailableDevice).unwrap();
        wait(&clock, &mut drill, secs(3));
        drill.on_hold_changed(true);
        assert_eq!(drill.reaction_secs(), Some(3.0));
    }

    #[test]
    fn test_invalid_config_keeps_drill_idle() {
        let clock = ManualClock::new();
        let config = TimedDrillConfig {
            hold_duration_ms: 0,
            ..TimedDrillConfig::default()
        };
        let mut drill = TimedDrill::new(clock, config);

        assert!(drill.start(&mut AvailableDevice).is_err());
        assert_eq!(drill.phase(), DrillPhase::Idle);
    }
}
