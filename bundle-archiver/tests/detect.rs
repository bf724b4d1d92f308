mod common;

use bundle_archiver::{detect_changes, Detection, Repository};
use common::{host, repository, FakeVcs, Head};
use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn candidate_set(detection: &Detection) -> BTreeSet<(i64, String)> {
    detection
        .candidates
        .iter()
        .map(|c| (c.repository.id, c.new_commit_hash.clone()))
        .collect()
}

/// Twenty repositories with varied latency and outcomes.
fn fixture() -> (Vec<Repository>, FakeVcs) {
    let mut vcs = FakeVcs::new();
    let mut repositories = Vec::new();

    for id in 1..=20 {
        let repo = repository(id, &format!("repo{id}"), "abc");
        let head = match id % 4 {
            0 => Head::Commit("abc".to_string()),
            1 => Head::Commit(format!("new{id}")),
            2 => Head::Unreachable,
            _ => Head::Commit(format!("next{id}")),
        };
        // Reverse latency so later repositories tend to finish first.
        vcs = vcs
            .head(&repo, head)
            .delay(&repo, Duration::from_millis((21 - id) as u64 * 2));
        repositories.push(repo);
    }

    (repositories, vcs)
}

#[tokio::test]
async fn unchanged_repository_is_not_a_candidate() {
    let repo = repository(7, "foo", "abc");
    let vcs = FakeVcs::new().commit(&repo, "abc");

    let detection = detect_changes(&vcs, &host(), vec![repo], false, 10).await;

    assert!(detection.candidates.is_empty());
    assert!(detection.unreachable.is_empty());
    assert_eq!(detection.unchanged, 1);
}

#[tokio::test]
async fn changed_repository_is_a_candidate() {
    let repo = repository(7, "foo", "abc");
    let vcs = FakeVcs::new().commit(&repo, "def");

    let detection = detect_changes(&vcs, &host(), vec![repo.clone()], false, 10).await;

    assert_eq!(detection.candidates.len(), 1);
    assert_eq!(detection.candidates[0].repository, repo);
    assert_eq!(detection.candidates[0].new_commit_hash, "def");
}

#[tokio::test]
async fn force_makes_unchanged_repository_a_candidate() {
    let repo = repository(7, "foo", "abc");
    let vcs = FakeVcs::new().commit(&repo, "abc");

    let detection = detect_changes(&vcs, &host(), vec![repo], true, 10).await;

    assert_eq!(detection.candidates.len(), 1);
    assert_eq!(detection.candidates[0].new_commit_hash, "abc");
    assert_eq!(detection.unchanged, 0);
}

#[tokio::test]
async fn unreachable_repository_is_flagged_not_a_candidate() {
    let repo = repository(7, "foo", "abc");
    let vcs = FakeVcs::new().head(&repo, Head::Unreachable);

    let detection = detect_changes(&vcs, &host(), vec![repo.clone()], true, 10).await;

    assert!(detection.candidates.is_empty());
    assert_eq!(detection.unreachable, [repo]);
}

#[tokio::test]
async fn transient_failure_is_skipped_not_deleted() {
    let repo = repository(7, "foo", "abc");
    let vcs = FakeVcs::new().head(&repo, Head::TimedOut);

    let detection = detect_changes(&vcs, &host(), vec![repo.clone()], false, 10).await;

    assert!(detection.candidates.is_empty());
    assert!(detection.unreachable.is_empty());
    assert_eq!(detection.skipped.len(), 1);
    assert_eq!(detection.skipped[0].repository, repo);
}

#[tokio::test]
async fn candidate_set_is_independent_of_concurrency() {
    let mut results = Vec::new();

    for concurrency in [1, 5, 10] {
        let (repositories, vcs) = fixture();
        let detection = detect_changes(&vcs, &host(), repositories, false, concurrency).await;
        results.push((
            candidate_set(&detection),
            detection.unreachable.iter().map(|r| r.id).collect::<Vec<_>>(),
            detection.unchanged,
        ));
    }

    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
    assert_eq!(results[0].0.len(), 10);
    assert_eq!(results[0].1.len(), 5);
    assert_eq!(results[0].2, 5);
}

#[tokio::test]
async fn respects_concurrency_limit() {
    for concurrency in [1, 5, 10] {
        let (repositories, vcs) = fixture();
        detect_changes(&vcs, &host(), repositories, false, concurrency).await;

        assert_eq!(vcs.head_calls.load(Ordering::SeqCst), 20);
        let max = vcs.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= concurrency, "{max} head queries in flight with limit {concurrency}");
    }
}

#[tokio::test]
async fn candidates_are_ordered_by_id() {
    let (repositories, vcs) = fixture();

    let detection = detect_changes(&vcs, &host(), repositories, false, 10).await;

    let ids: Vec<i64> = detection.candidates.iter().map(|c| c.repository.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn zero_concurrency_still_queries_everything() {
    let (repositories, vcs) = fixture();

    let detection = detect_changes(&vcs, &host(), repositories, false, 0).await;

    assert_eq!(vcs.head_calls.load(Ordering::SeqCst), 20);
    assert_eq!(detection.candidates.len(), 10);
    assert_eq!(vcs.max_in_flight.load(Ordering::SeqCst), 1);
}
