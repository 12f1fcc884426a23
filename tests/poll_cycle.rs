//! End-to-end fetch cycle tests over the real component wiring

use std::time::Duration;
use uoa_watchlist::events::PollEvent;
use uoa_watchlist::scheduler::PollerStatus;
use uoa_watchlist::state::AppState;

#[tokio::test]
async fn one_cycle_stores_samples_and_publishes_update() {
    let state = AppState::in_memory().unwrap();
    state.watchlist.add("AAPL").await.unwrap();
    state.watchlist.add("MSFT").await.unwrap();

    let mut rx = state.events.subscribe_poll();
    let before = chrono::Utc::now().timestamp_millis();
    state.poller.run_cycle_once().await;
    let after = chrono::Utc::now().timestamp_millis();

    // The updated event carries exactly the stored samples.
    let event = rx.try_recv().expect("expected an updated event");
    let samples = match event {
        PollEvent::Updated(samples) => samples,
        other => panic!("unexpected event: {:?}", other),
    };
    assert_eq!(samples.len(), 2);
    let mut symbols: Vec<&str> = samples.iter().map(|s| s.symbol.as_str()).collect();
    symbols.sort_unstable();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    for sample in &samples {
        assert!(sample.timestamp_millis >= before && sample.timestamp_millis <= after);
    }

    // And the store holds exactly one sample per watched symbol.
    for symbol in ["AAPL", "MSFT"] {
        let stored = state.db.query_samples(symbol, 0, after + 1).unwrap();
        assert_eq!(stored.len(), 1, "expected one stored sample for {}", symbol);
        assert!(samples.contains(&stored[0]));
    }

    let completed = state.poller.last_cycle_completed().unwrap();
    assert!(completed >= before && completed <= after + 1);
}

#[tokio::test]
async fn empty_watchlist_cycle_is_a_noop() {
    let state = AppState::in_memory().unwrap();
    let mut rx = state.events.subscribe_poll();

    state.poller.run_cycle_once().await;

    assert!(rx.try_recv().is_err());
    assert!(state.poller.last_cycle_completed().is_none());
}

#[tokio::test]
async fn polling_enabled_setting_drives_the_loop() {
    let state = AppState::in_memory().unwrap();
    state.start_background_tasks();
    assert_eq!(state.poller.status(), PollerStatus::Stopped);

    state.settings.set_polling_enabled(true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.poller.status(), PollerStatus::Running);

    state.settings.set_polling_enabled(false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(state.poller.status(), PollerStatus::Stopped);
}

#[tokio::test]
async fn state_persists_across_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    {
        let state = AppState::new(dir.path())?;
        state.watchlist.add("NVDA").await?;
        state.settings.set_polling_interval_minutes(5).await?;
        state.poller.run_cycle_once().await;
    }

    let state = AppState::new(dir.path())?;
    assert_eq!(state.watchlist.list().await?, vec!["NVDA"]);
    assert_eq!(state.settings.snapshot().polling_interval_minutes, 5);

    let now = chrono::Utc::now().timestamp_millis();
    assert_eq!(state.db.query_samples("NVDA", 0, now + 1)?.len(), 1);
    Ok(())
}
