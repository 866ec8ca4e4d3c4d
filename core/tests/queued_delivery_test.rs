use std::time::Duration;

use herald_core::{
    keys, BroadcastCenter, Envelope, NotificationCenter, NotificationDescriptor, NotificationName,
    ObserveExt, Result,
};
use serde_json::json;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

struct Progress;

impl NotificationDescriptor for Progress {
    type Payload = u8;

    fn name(&self) -> NotificationName {
        "ProgressChanged".into()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn queued_observer_runs_on_hinted_runtime() -> Result<()> {
    let center = NotificationCenter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _token = center.observe(Progress, Some(Handle::current()), move |p| {
        let _ = tx.send(p);
    });

    // Handed off, not yet necessarily run
    assert_eq!(center.post(Progress.encode(40)?)?, 1);

    let received = tokio::time::timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("channel closed");
    assert_eq!(received, 40);

    // Counted once the callback has returned
    let name = Progress.name();
    let mut delivered = 0;
    for _ in 0..50 {
        delivered = center.stats(&name).map(|s| s.total_delivered).unwrap_or(0);
        if delivered > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(delivered, 1);
    Ok(())
}

#[tokio::test]
async fn queued_observer_released_before_it_runs_is_skipped() -> Result<()> {
    // Current-thread runtime: spawned deliveries cannot run until this task yields
    let center = NotificationCenter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut token = center.observe(Progress, Some(Handle::current()), move |p| {
        let _ = tx.send(p);
    });

    center.post(Progress.encode(1)?)?;
    assert!(token.release());

    let second = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(
        second.is_err() || second.unwrap().is_none(),
        "should not receive after release"
    );

    let stats = center.stats(&Progress.name()).expect("stats exist");
    assert_eq!(stats.total_posted, 1);
    assert_eq!(stats.total_delivered, 0, "skipped delivery is not counted");
    Ok(())
}

#[tokio::test]
async fn queued_decode_failure_is_logged_not_returned() -> Result<()> {
    let center = NotificationCenter::new();
    let _token = center.observe(Progress, Some(Handle::current()), |_| {});

    let bad = Envelope::new("ProgressChanged").with_value(keys::MODEL_KEY, json!("half"));
    assert_eq!(center.post(bad)?, 1);

    let name = Progress.name();
    let mut failed = 0;
    for _ in 0..50 {
        tokio::task::yield_now().await;
        failed = center.stats(&name).map(|s| s.failed_deliveries).unwrap_or(0);
        if failed > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(failed, 1);
    Ok(())
}

#[tokio::test]
async fn inline_and_queued_observers_share_a_channel() -> Result<()> {
    let center = NotificationCenter::new();
    let (inline_tx, mut inline_rx) = mpsc::unbounded_channel();
    let (queued_tx, mut queued_rx) = mpsc::unbounded_channel();
    let _inline = center.observe(Progress, None, move |p| {
        let _ = inline_tx.send(p);
    });
    let _queued = center.observe(Progress, Some(Handle::current()), move |p| {
        let _ = queued_tx.send(p);
    });

    assert_eq!(center.post(Progress.encode(100)?)?, 2);

    // Inline delivery already happened on the posting call
    assert_eq!(inline_rx.try_recv().ok(), Some(100));

    let queued = tokio::time::timeout(Duration::from_millis(500), queued_rx.recv())
        .await
        .expect("timeout")
        .expect("channel closed");
    assert_eq!(queued, 100);
    Ok(())
}
