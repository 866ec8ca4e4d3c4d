mod notifications;

use std::sync::Arc;
use std::time::Duration;

use herald_core::telemetry::init_tracing;
use herald_core::{
    BroadcastCenter, CenterConfig, NotificationCenter, NotificationDescriptor, NotificationToken,
    ObserveExt,
};
use notifications::{CustomNotification, KeyboardDidShow, KeyboardFrames, Posted, Rect};
use tokio::runtime::Handle;
use tracing::info;

/// Holds its subscription for as long as it lives
struct Foo {
    _token: NotificationToken,
}

impl Foo {
    fn new(center: &Arc<NotificationCenter>) -> Self {
        let token = center.observe(CustomNotification, None, |output| {
            info!(target = "herald_demo", name = %output.name, kind = %output.kind, "Got the custom notification");
        });
        Self { _token: token }
    }
}

/// Observes a system-shaped notification, delivered on the runtime
struct Bar {
    _token: NotificationToken,
}

impl Bar {
    fn new(center: &Arc<NotificationCenter>, queue: Handle) -> Self {
        let token = center.observe(KeyboardDidShow, Some(queue), |output| {
            info!(
                target = "herald_demo",
                begin = ?output.begin,
                end = ?output.end,
                "Keyboard frame changed"
            );
        });
        Self { _token: token }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info,herald_core=info,herald_demo=info");

    let cfg = CenterConfig::load();
    let center = NotificationCenter::with_config(cfg);

    // Custom notification: observed while Foo is alive
    let foo = Foo::new(&center);
    let sample = Posted {
        name: "Notification".into(),
        kind: "Custom".into(),
    };
    let delivered = center.post(CustomNotification.encode(sample.clone())?)?;
    info!(target = "herald_demo", delivered, "Posted custom notification");

    drop(foo);
    let delivered = center.post(CustomNotification.encode(sample)?)?;
    info!(target = "herald_demo", delivered, "Posted again after Foo was dropped");

    // System notification: delivered on this runtime
    let bar = Bar::new(&center, Handle::current());
    let frames = KeyboardFrames {
        begin: Rect::default(),
        end: Rect {
            y: 500.0,
            width: 390.0,
            height: 300.0,
            ..Rect::default()
        },
    };
    center.post(KeyboardDidShow.encode(frames)?)?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(bar);

    for name in [CustomNotification.name(), KeyboardDidShow.name()] {
        if let Some(stats) = center.stats(&name) {
            info!(target = "herald_demo", name = %name, stats = %serde_json::to_string(&stats)?, "Final stats");
        }
    }
    Ok(())
}
