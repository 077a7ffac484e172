use duration_format::state::StopwatchStore;
use duration_format::{Clock, Stopwatch, StopwatchState, TickUnit};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now(&self, _unit: TickUnit) -> i64 {
        self.0
    }
}

fn save(store: &StopwatchStore, state: StopwatchState) {
    store
        .update(|saved| {
            *saved = Some(state);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_missing_and_blank_file_mean_no_stopwatch() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());
    assert!(store.load().unwrap().is_none());

    std::fs::write(store.state_path(), "  \n").unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());
    std::fs::write(store.state_path(), "{ not json").unwrap();

    let err = store.load().unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse"));
}

#[test]
fn test_paused_stopwatch_survives_reload() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());

    let mut watch = Stopwatch::starting_at(FixedClock(10_000), TickUnit::Millis, 1_500);
    watch.pause();
    save(&store, watch.into_state());

    let saved = store.load().unwrap().unwrap();
    // Reading much later still shows the paused value
    let restored = Stopwatch::from_state(FixedClock(99_000), saved);
    assert!(restored.is_paused());
    assert_eq!(restored.elapsed(), 1_500);
}

#[test]
fn test_failed_update_is_not_saved() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());

    let result: anyhow::Result<()> = store.update(|saved| {
        *saved = Some(StopwatchState::started(TickUnit::Millis, 0, 0));
        anyhow::bail!("rejected")
    });

    assert!(result.is_err());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_clearing_removes_saved_stopwatch() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());
    save(&store, StopwatchState::started(TickUnit::Millis, 0, 0));

    let had_one = store.update(|saved| Ok(saved.take().is_some())).unwrap();
    assert!(had_one);
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_concurrent_updates_wait_for_lock() {
    let dir = tempdir().unwrap();
    let store = StopwatchStore::new(dir.path());
    save(&store, StopwatchState::started(TickUnit::Millis, 0, 0));

    // Hold the lock for 500ms in another thread while skipping ahead
    let holder = store.clone();
    let handle = thread::spawn(move || {
        holder
            .update(|saved| {
                if let Some(state) = saved.as_mut() {
                    state.skip(0, 1_000);
                }
                thread::sleep(Duration::from_millis(500));
                Ok(())
            })
            .unwrap();
    });

    thread::sleep(Duration::from_millis(100));

    let start = std::time::Instant::now();
    store
        .update(|saved| {
            let state = saved.as_mut().unwrap();
            assert_eq!(state.offset, 1_000, "should see the first update");
            state.skip(0, 2_000);
            Ok(())
        })
        .unwrap();

    assert!(
        start.elapsed().as_millis() >= 300,
        "Should have waited for lock"
    );

    handle.join().unwrap();

    let saved = store.load().unwrap().unwrap();
    assert_eq!(saved.elapsed(0), 3_000);
}
