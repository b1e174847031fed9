//! Timing behaviour of the debounced search filter, run on a paused tokio
//! clock so every instant is exact.

use std::time::Duration;

use bestdish_core::Business;
use bestdish_search::{SearchHandle, SearchState, DEFAULT_DEBOUNCE};
use tokio::sync::watch;
use tokio::time::{sleep, timeout, Instant};

fn business(id: &str, name: &str) -> Business {
    Business {
        id: id.to_owned(),
        name: name.to_owned(),
        address: None,
        city: "San Francisco".to_owned(),
    }
}

fn sample() -> Vec<Business> {
    vec![
        business("1", "Burma Superstar"),
        business("2", "Burrito Bros"),
        business("3", "Zachary's Pizza"),
    ]
}

/// Spawns a filter already holding `sample()` and returns a receiver that
/// has seen that first state.
async fn primed() -> (SearchHandle, watch::Receiver<SearchState>) {
    let (handle, _task) = SearchHandle::spawn(DEFAULT_DEBOUNCE);
    let mut rx = handle.subscribe();
    handle.set_full_list(sample()).unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().revision, 1);
    (handle, rx)
}

async fn assert_quiet(rx: &mut watch::Receiver<SearchState>) {
    let waited = timeout(Duration::from_secs(5), rx.changed()).await;
    assert!(waited.is_err(), "unexpected extra recomputation");
}

#[tokio::test(start_paused = true)]
async fn burst_of_updates_collapses_into_one_recompute() {
    let (handle, mut rx) = primed().await;
    let start = Instant::now();

    handle.set_query("b").unwrap(); // t = 0
    sleep(Duration::from_millis(100)).await;
    handle.set_query("bu").unwrap(); // t = 100
    sleep(Duration::from_millis(100)).await;
    handle.set_query("bur").unwrap(); // t = 200
    sleep(Duration::from_millis(400)).await;
    handle.set_query("burr").unwrap(); // t = 600

    rx.changed().await.unwrap();
    let fired_after = start.elapsed();
    let state = rx.borrow_and_update().clone();

    // Quiet interval runs from the last update: 600 + 500.
    assert_eq!(fired_after, Duration::from_millis(1100));
    assert_eq!(state.revision, 2, "exactly one recomputation for the burst");
    assert_eq!(state.query, "burr");
    let names: Vec<&str> = state.filtered_list.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Burrito Bros"]);

    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn each_update_resets_the_quiet_interval() {
    let (handle, mut rx) = primed().await;
    let start = Instant::now();

    for text in ["z", "za", "zac", "zach"] {
        handle.set_query(text).unwrap();
        sleep(Duration::from_millis(450)).await;
    }
    // Last update at t = 1350; nothing may have fired yet.
    assert_eq!(rx.borrow().revision, 1);

    rx.changed().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(1350 + 500));
    assert_eq!(rx.borrow_and_update().query, "zach");
}

#[tokio::test(start_paused = true)]
async fn spaced_updates_each_recompute() {
    let (handle, mut rx) = primed().await;

    handle.set_query("bur").unwrap();
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().filtered_list.len(), 2);

    handle.set_query("").unwrap();
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.revision, 3);
    assert_eq!(state.filtered_list, state.full_list);
}

#[tokio::test(start_paused = true)]
async fn full_list_refresh_bypasses_debounce_with_latest_query() {
    let (handle, mut rx) = primed().await;
    let start = Instant::now();

    handle.set_query("pizza").unwrap();
    sleep(Duration::from_millis(100)).await;
    handle
        .set_full_list(vec![
            business("4", "Pizzeria Delfina"),
            business("5", "Tartine"),
        ])
        .unwrap();

    rx.changed().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(100));
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.revision, 2);
    assert_eq!(state.query, "pizza");
    assert_eq!(state.filtered_list.len(), 1);
    assert_eq!(state.filtered_list[0].id, "4");

    // The pending debounce was consumed by the refresh.
    assert_quiet(&mut rx).await;
}
