//! Basic usage of the Lumberjack facade
//!
//! Start a line-oriented collector first, for example `nc -lk 5140`, or run
//! without one to see the facade degrade to console-only output.

use lumberjack::prelude::*;
use lumberjack::{critical, info, warning};

fn main() {
    let lj = Lumberjack::builder()
        .log_level(Severity::Info)
        .print_level(Severity::All)
        .build();

    println!("{}", lj.version());
    println!("backend status: {}", lj.status());

    info!(lj, "service starting");
    warning!(lj, "cache cold, first requests will be slow");

    let id = lj.append_from(
        Severity::Error,
        "upload failed",
        Some("uploader"),
        ["network", "retryable"],
    );
    println!("appended entry {}", id);

    if lj.append_tag(&id, "retry-scheduled") {
        println!("tagged {}", id);
    }

    // Only CRITICAL goes to the backend from here on
    lj.set_log_level(Severity::Critical);
    info!(lj, "this one is printed but not delivered");
    critical!(lj, "temperature {} above limit", 93);

    if lj.status() != ConnectionStatus::Ok && lj.reconnect() == ConnectionStatus::Ok {
        println!("reconnected");
    }

    lj.flush();
    let metrics = lj.metrics();
    println!(
        "delivered={} not_connected={} printed={}",
        metrics.delivered(),
        metrics.not_connected(),
        metrics.printed()
    );
}
