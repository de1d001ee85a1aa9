use std::time::Duration;

use tokio::sync::broadcast;

use sortviz::{
    core::sink::VisualSink,
    engine::registry::{Algorithm, CompileError},
    playback::{
        scheduler::{PlaybackError, PlaybackState},
        session::SessionError,
    },
    runtime::{
        events::PlaybackEvent,
        handle::{PlayerHandle, RuntimeConfig, RuntimeError, spawn_player},
    },
    types::Delay,
};

fn config(delay_ms: u64) -> RuntimeConfig {
    RuntimeConfig {
        initial_delay: Delay::from_millis(delay_ms).expect("delay"),
        ..RuntimeConfig::default()
    }
}

async fn wait_for(
    sub: &mut broadcast::Receiver<PlaybackEvent>,
    pred: impl Fn(&PlaybackEvent) -> bool,
) -> PlaybackEvent {
    loop {
        let evt = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("event timeout")
            .expect("recv");
        if pred(&evt) {
            return evt;
        }
    }
}

async fn long_running(handle: &PlayerHandle) -> usize {
    handle
        .load_custom((1..=40).rev().collect())
        .await
        .expect("load");
    handle.sort(Algorithm::Bubble).await.expect("sort")
}

#[tokio::test]
async fn sort_plays_to_completion_and_reports_op_count() {
    let handle = spawn_player(VisualSink::new(vec![5, 3, 8, 1]), config(1));
    let mut sub = handle.subscribe();

    let total = handle.sort_by_name("Bubble Sort").await.expect("sort");
    assert_eq!(total, 14);

    assert_eq!(
        wait_for(&mut sub, |e| matches!(e, PlaybackEvent::Started { .. })).await,
        PlaybackEvent::Started {
            algorithm: Some(Algorithm::Bubble),
            total
        }
    );
    let done = wait_for(&mut sub, |e| matches!(e, PlaybackEvent::Completed { .. })).await;
    assert_eq!(done, PlaybackEvent::Completed { ops: total });

    let snap = handle.snapshot().await.expect("snapshot");
    assert_eq!(snap.values, vec![1, 3, 5, 8]);
    assert_eq!(snap.finalized, vec![0, 1, 2, 3]);

    let status = handle.status().await.expect("status");
    assert_eq!(status.state, PlaybackState::Completed);
    assert_eq!(status.applied, total);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn progress_events_are_ordered_and_bounded() {
    let handle = spawn_player(VisualSink::new(vec![9, 2, 7, 4, 1]), config(1));
    let mut sub = handle.subscribe();
    let total = handle.sort(Algorithm::Merge).await.expect("sort");

    let mut last = 0;
    loop {
        match wait_for(&mut sub, |_| true).await {
            PlaybackEvent::Progress { applied, total: t } => {
                assert_eq!(t, total);
                assert!(applied > last && applied <= total);
                last = applied;
            }
            PlaybackEvent::Completed { ops } => {
                assert_eq!(ops, total);
                break;
            }
            _ => {}
        }
    }
    assert_eq!(last, total);
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn array_replacement_is_rejected_during_playback() {
    let handle = spawn_player(VisualSink::new(vec![1]), config(200));
    long_running(&handle).await;

    let err = handle.load_custom(vec![1, 2, 3]).await.expect_err("busy");
    assert!(matches!(err, RuntimeError::Session(SessionError::PlaybackActive(_))));
    let err = handle.generate_random(10, 100).await.expect_err("busy");
    assert!(matches!(err, RuntimeError::Session(SessionError::PlaybackActive(_))));

    handle.pause().await.expect("pause");
    handle.pause().await.expect("pause twice");
    assert_eq!(handle.status().await.expect("status").state, PlaybackState::Paused);
    assert!(handle.load_custom_str("4,5,6").await.is_err());

    handle.stop().await.expect("stop");
    assert_eq!(handle.status().await.expect("status").state, PlaybackState::Idle);
    handle.load_custom_str("4,5,6").await.expect("load after stop");
    assert_eq!(handle.snapshot().await.expect("snapshot").values, vec![4, 5, 6]);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn stop_leaves_no_timer_behind() {
    let handle = spawn_player(VisualSink::new(vec![1]), config(1));
    long_running(&handle).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let applied = handle.stop().await.expect("stop");
    let frozen = handle.snapshot().await.expect("snapshot");
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(handle.snapshot().await.expect("snapshot"), frozen);
    assert_eq!(handle.status().await.expect("status").applied, applied);

    handle.reset().await.expect("reset");
    let restored: Vec<i64> = (1..=40).rev().collect();
    assert_eq!(handle.snapshot().await.expect("snapshot").values, restored);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn invalid_controls_surface_as_errors() {
    let handle = spawn_player(VisualSink::new(vec![-1, 2, 3]), config(5));

    let err = handle.sort(Algorithm::Radix).await.expect_err("negative radix");
    assert!(matches!(
        err,
        RuntimeError::Compile(CompileError::UnsupportedOperation { .. })
    ));
    assert_eq!(handle.status().await.expect("status").total, 0);

    let err = handle.resume().await.expect_err("not paused");
    assert!(matches!(
        err,
        RuntimeError::Session(SessionError::Playback(PlaybackError::InvalidStateTransition { .. }))
    ));

    let err = handle.set_rate(0).await.expect_err("zero delay");
    assert!(matches!(
        err,
        RuntimeError::Session(SessionError::Playback(PlaybackError::InvalidDelay(0)))
    ));
    handle.set_rate(120).await.expect("rate");
    assert_eq!(handle.status().await.expect("status").delay_ms, 120);

    handle.shutdown().await.expect("shutdown");
    assert!(matches!(handle.status().await, Err(RuntimeError::ChannelClosed)));
}

#[tokio::test]
async fn start_log_checks_bounds_against_current_array() {
    let handle = spawn_player(VisualSink::new(vec![3, 2, 1]), config(5));
    let log = sortviz::engine::registry::compile(Algorithm::Heap, &[3, 2, 1]).expect("compile");
    handle.load_custom(vec![9, 9, 9]).await.expect("load");

    handle.start_log(log).await.expect("start");
    handle.stop().await.expect("stop");

    handle.load_custom(vec![1]).await.expect("load");
    let wide = sortviz::engine::registry::compile(Algorithm::Heap, &[3, 2, 1]).expect("compile");
    let err = handle.start_log(wide).await.expect_err("too wide");
    assert!(matches!(
        err,
        RuntimeError::Session(SessionError::Playback(PlaybackError::LogMismatch(_)))
    ));
    handle.shutdown().await.expect("shutdown");
}
