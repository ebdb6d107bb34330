//! Breakpoint reconciliation through the session surface

mod common;

use chrome_dap::dap::{Source, SourceBreakpoint};
use chrome_dap::error::Error;
use chrome_dap::session::SessionConfig;
use common::{build_session, build_session_with, RecordingLauncher, StubEngine};
use std::sync::Arc;
use std::time::Duration;

const URL: &str = "http://localhost/app.js";

fn source() -> Source {
    Source::from_path(URL)
}

fn lines(lines: &[u32]) -> Vec<SourceBreakpoint> {
    lines.iter().map(|l| SourceBreakpoint::at_line(*l)).collect()
}

#[tokio::test]
async fn test_rows_match_request_positionally() {
    let engine = StubEngine::new();
    // Client line 2 is engine line 1
    engine.reject_line(1);
    let (session, _rx) = build_session(Arc::clone(&engine));

    let rows = session
        .set_breakpoints(&source(), &lines(&[1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows[0].verified);
    assert_eq!(rows[0].line, 1);
    assert!(!rows[1].verified, "rejected line must come back unverified");
    assert_eq!(rows[1].line, 2, "unverified row keeps the requested line");
    assert!(rows[2].verified);
    assert_eq!(rows[2].line, 3);
}

#[tokio::test]
async fn test_only_accepted_ids_are_committed() {
    let engine = StubEngine::new();
    engine.reject_line(1);
    let (session, _rx) = build_session(Arc::clone(&engine));

    session
        .set_breakpoints(&source(), &lines(&[1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(session.committed_breakpoints(URL).await.len(), 2);
}

#[tokio::test]
async fn test_replacement_removes_previous_commitments() {
    let engine = StubEngine::new();
    let (session, _rx) = build_session(Arc::clone(&engine));

    session
        .set_breakpoints(&source(), &lines(&[1, 2]))
        .await
        .unwrap();
    let first = session.committed_breakpoints(URL).await;
    assert_eq!(first.len(), 2);

    session
        .set_breakpoints(&source(), &lines(&[5]))
        .await
        .unwrap();

    let log = engine.logged();
    for id in &first {
        assert!(
            log.contains(&format!("remove {}", id)),
            "previous breakpoint {} was not removed",
            id
        );
    }
    let second = session.committed_breakpoints(URL).await;
    assert_eq!(second.len(), 1);
    assert!(!first.contains(&second[0]));
}

#[tokio::test]
async fn test_repeated_request_yields_identical_rows() {
    let engine = StubEngine::new();
    // Client line 2 is engine line 1
    engine.reject_line(1);
    let (session, _rx) = build_session(Arc::clone(&engine));

    let request = lines(&[1, 2, 3]);
    let first = session.set_breakpoints(&source(), &request).await.unwrap();
    let first_ids = session.committed_breakpoints(URL).await;
    let second = session.set_breakpoints(&source(), &request).await.unwrap();

    assert_eq!(first, second, "identical requests must yield identical rows");
    let second_ids = session.committed_breakpoints(URL).await;
    assert_eq!(first_ids.len(), 2, "only accepted lines are committed");
    assert_eq!(second_ids.len(), 2);
    assert!(
        first_ids.iter().all(|id| !second_ids.contains(id)),
        "the repeat re-adds: no first-round id survives"
    );
}

#[tokio::test]
async fn test_empty_request_clears_all_breakpoints() {
    let engine = StubEngine::new();
    let (session, _rx) = build_session(Arc::clone(&engine));

    session
        .set_breakpoints(&source(), &lines(&[1, 2]))
        .await
        .unwrap();
    let rows = session.set_breakpoints(&source(), &[]).await.unwrap();

    assert!(rows.is_empty());
    assert!(session.committed_breakpoints(URL).await.is_empty());
    let removes = engine
        .logged()
        .iter()
        .filter(|e| e.starts_with("remove "))
        .count();
    assert_eq!(removes, 2);
}

#[tokio::test]
async fn test_placeholder_url_addressed_by_script_id() {
    let engine = StubEngine::new();
    let (session, _rx) = build_session(Arc::clone(&engine));

    session
        .set_breakpoints(&Source::from_path("debugadapter://42"), &lines(&[3]))
        .await
        .unwrap();

    assert!(engine.logged().contains(&"add-raw 42 2".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_requests_do_not_interleave() {
    let engine = StubEngine::new();
    engine.set_breakpoint_delay(Duration::from_millis(20));
    let (session, _rx) = build_session(Arc::clone(&engine));

    let first = Source::from_path("http://localhost/a.js");
    let second = Source::from_path("http://localhost/b.js");
    let first_lines = lines(&[1, 2]);
    let second_lines = lines(&[3, 4]);
    let (ra, rb) = tokio::join!(
        session.set_breakpoints(&first, &first_lines),
        session.set_breakpoints(&second, &second_lines),
    );
    ra.unwrap();
    rb.unwrap();

    // The queue is fair: every engine call of the first operation completes
    // before any call of the second begins.
    let log = engine.logged();
    let last_a = log
        .iter()
        .rposition(|e| e.contains("a.js"))
        .expect("no calls for a.js");
    let first_b = log
        .iter()
        .position(|e| e.contains("b.js"))
        .expect("no calls for b.js");
    assert!(
        last_a < first_b,
        "operations interleaved: {:?}",
        log
    );
}

#[tokio::test]
async fn test_timeout_fails_caller_but_releases_queue() {
    let engine = StubEngine::new();
    engine.set_breakpoint_delay(Duration::from_millis(100));
    let config = SessionConfig {
        breakpoint_timeout: Duration::from_millis(30),
        ..common::test_config()
    };
    let (session, _rx) =
        build_session_with(Arc::clone(&engine), Arc::new(RecordingLauncher::default()), config);

    let result = session.set_breakpoints(&source(), &lines(&[1])).await;
    assert!(matches!(result, Err(Error::Timeout(_))));

    // The next queued operation still runs to completion.
    engine.set_breakpoint_delay(Duration::ZERO);
    let rows = session.set_breakpoints(&source(), &lines(&[2])).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].verified);
}

#[tokio::test]
async fn test_timed_out_operation_finishes_engine_edits() {
    let engine = StubEngine::new();
    let config = SessionConfig {
        breakpoint_timeout: Duration::from_millis(100),
        ..common::test_config()
    };
    let (session, _rx) =
        build_session_with(Arc::clone(&engine), Arc::new(RecordingLauncher::default()), config);

    session
        .set_breakpoints(&source(), &lines(&[1, 2]))
        .await
        .unwrap();

    // Two 60ms removals blow the 100ms bound mid-removal; the caller gives
    // up on waiting, not on the work.
    engine.set_breakpoint_delay(Duration::from_millis(60));
    let result = session.set_breakpoints(&source(), &lines(&[3])).await;
    assert!(matches!(result, Err(Error::Timeout(_))));

    // A queued empty request runs only after the timed-out operation
    // finished in the background with its commitments recorded.
    engine.set_breakpoint_delay(Duration::ZERO);
    let rows = session.set_breakpoints(&source(), &[]).await.unwrap();
    assert!(rows.is_empty());
    assert!(session.committed_breakpoints(URL).await.is_empty());

    // Every breakpoint the engine ever accepted was also removed - the
    // timed-out removal loop did not strand any.
    let log = engine.logged();
    let adds = log.iter().filter(|e| e.starts_with("add ")).count();
    let removes = log.iter().filter(|e| e.starts_with("remove ")).count();
    assert_eq!(adds, removes, "orphaned engine breakpoints: {:?}", log);
}
