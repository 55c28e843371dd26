//! Property tests for the timer engine and controller.

use proptest::prelude::*;
use rainodoro_core::{
    Config, Controller, MemoryStore, Mode, ModeDurations, NullSink, TimerEngine, TimerState,
};

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Pomodoro), Just(Mode::Short), Just(Mode::Long)]
}

proptest! {
    #[test]
    fn switching_away_and_back_preserves_remaining(
        ticks in 0u64..400,
        other in mode_strategy(),
    ) {
        let mut engine = TimerEngine::new(ModeDurations::default());
        engine.start();
        for _ in 0..ticks {
            engine.tick();
        }
        engine.pause();
        let before = engine.snapshot();

        engine.switch_mode(other);
        engine.switch_mode(Mode::Pomodoro);

        prop_assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn tick_never_goes_below_zero(short_min in 1u64..3, extra in 0u64..120) {
        let mut engine = TimerEngine::new(ModeDurations::from_minutes(25, short_min, 15));
        engine.switch_mode(Mode::Short);
        engine.start();

        let mut finished = 0;
        for _ in 0..(short_min * 60 + extra) {
            if let Some(event) = engine.tick() {
                if event.name() == "finished" {
                    finished += 1;
                }
            }
        }
        prop_assert_eq!(engine.remaining(), 0);
        prop_assert_eq!(engine.state(), TimerState::Finished);
        prop_assert_eq!(finished, 1);
    }

    #[test]
    fn remaining_never_drops_while_not_running(
        steps in proptest::collection::vec(mode_strategy(), 1..20),
    ) {
        let mut c = Controller::load(MemoryStore::new(), NullSink, Config::default());
        let before: Vec<u64> = Mode::ALL.iter().map(|m| c.engine().remaining_of(*m)).collect();
        for mode in steps {
            c.switch_mode(mode);
            c.tick();
        }
        let after: Vec<u64> = Mode::ALL.iter().map(|m| c.engine().remaining_of(*m)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn attribution_touches_only_the_selected_task(count in 1usize..6, pick in 0usize..6) {
        let pick = pick % count;
        let mut c = Controller::load(MemoryStore::new(), NullSink, Config::default());
        let ids: Vec<String> = (0..count)
            .map(|i| c.add_task(&format!("task {i}")).unwrap().id)
            .collect();
        c.select_task(Some(&ids[pick])).unwrap();
        c.start();
        c.finish_now();

        for (i, id) in ids.iter().enumerate() {
            let expected = u32::from(i == pick);
            prop_assert_eq!(c.tasks().get(id).unwrap().completed, expected);
        }
    }
}
