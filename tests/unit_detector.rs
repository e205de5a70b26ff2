// Unit tests for new-post detection.
//
// Exercises the watermark rules over sequences of polls: silent baseline,
// repeated polls, new posts, and empty cycles.

use tweetsentry::twitter::posts::{Post, PostId, PostMetrics};
use tweetsentry::watch::detector::{detect, WatchState};

fn post(id: &str) -> Post {
    Post {
        id: PostId::new(id),
        created_at: None,
        text: format!("tweet {id}"),
        sensitive: false,
        metrics: PostMetrics::default(),
    }
}

#[test]
fn first_observation_is_silent_and_sets_watermark() {
    let mut state = WatchState::new();
    let event = detect(&mut state, &[post("P1"), post("P2")]);
    assert!(event.is_none());
    assert_eq!(state.last_seen(), Some(&PostId::new("P1")));
}

#[test]
fn same_newest_id_twice_emits_nothing() {
    let mut state = WatchState::new();
    detect(&mut state, &[post("P1")]);
    assert!(detect(&mut state, &[post("P1")]).is_none());
    assert!(detect(&mut state, &[post("P1")]).is_none());
    assert_eq!(state.last_seen(), Some(&PostId::new("P1")));
}

#[test]
fn different_newest_id_emits_once_and_advances() {
    let mut state = WatchState::new();
    detect(&mut state, &[post("P1")]);

    let event = detect(&mut state, &[post("P2"), post("P1")]).expect("new post event");
    assert_eq!(event.post, post("P2"));
    assert_eq!(state.last_seen(), Some(&PostId::new("P2")));

    // The same result again is not a second event
    assert!(detect(&mut state, &[post("P2"), post("P1")]).is_none());
}

#[test]
fn three_poll_scenario() {
    let mut state = WatchState::new();

    // Poll 1: baseline
    assert!(detect(&mut state, &[post("P1"), post("P2")]).is_none());
    assert_eq!(state.last_seen(), Some(&PostId::new("P1")));

    // Poll 2: unchanged
    assert!(detect(&mut state, &[post("P1"), post("P2")]).is_none());
    assert_eq!(state.last_seen(), Some(&PostId::new("P1")));

    // Poll 3: P3 arrives
    let event = detect(&mut state, &[post("P3"), post("P1")]).expect("P3 should fire");
    assert_eq!(event.post.id, PostId::new("P3"));
    assert_eq!(state.last_seen(), Some(&PostId::new("P3")));
}

#[test]
fn empty_cycles_neither_fire_nor_reset() {
    let mut state = WatchState::new();
    assert!(detect(&mut state, &[]).is_none());
    assert!(state.last_seen().is_none());

    detect(&mut state, &[post("P1")]);
    assert!(detect(&mut state, &[]).is_none());
    assert_eq!(state.last_seen(), Some(&PostId::new("P1")));

    // A post after an empty cycle is still compared with the old watermark
    assert!(detect(&mut state, &[post("P1")]).is_none());
}
