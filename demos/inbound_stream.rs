//! Receiving inbound messages from the backend
//!
//! Listens on a local port, connects a facade to it, and plays the collector:
//! reads the entries the facade sends and pushes commands back.

use lumberjack::backends::TcpBackend;
use lumberjack::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lumberjack=debug")),
        )
        .init();

    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let collector = thread::spawn(move || -> std::io::Result<()> {
        let (mut stream, peer) = listener.accept()?;
        println!("collector: facade connected from {}", peer);
        // Give the facade time to turn streaming on
        thread::sleep(Duration::from_millis(100));
        stream.write_all(b"{\"command\":\"set-level\",\"level\":\"DEBUG\"}\n")?;

        let reader = BufReader::new(stream.try_clone()?);
        for line in reader.lines() {
            println!("collector: {}", line?);
        }
        Ok(())
    });

    let (tx, rx) = mpsc::channel::<Payload>();
    let lj = Lumberjack::builder()
        .backend(TcpBackend::new(addr.to_string()))
        .log_level(Severity::Info)
        .on_inbound(move |payload| {
            let _ = tx.send(payload);
        })
        .build();

    println!("facade status: {}", lj.status());

    while let Ok(payload) = rx.recv_timeout(Duration::from_millis(500)) {
        let Some(text) = payload.as_text() else { continue };
        let command: serde_json::Value = serde_json::from_str(text)?;
        if command["command"] == "set-level" {
            let level = command["level"].as_str().unwrap_or("INFO");
            if lj.set_log_level_str(level) {
                lj.append_tagged(
                    Severity::Info,
                    format!("log level changed to {}", level),
                    ["inbound", "config"],
                );
            }
        }
    }

    lj.append(Severity::Debug, "debug entries now reach the collector");
    lj.flush();
    drop(lj);

    let _ = collector.join();
    Ok(())
}
