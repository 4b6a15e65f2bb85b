//! End-to-end runs against a local TCP listener standing in for Logstash.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use log_generator::{run, ConnectPolicy, GeneratorConfig, GeneratorError, SimulatedService};
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accepts one connection and collects its lines until end of stream.
async fn logstash() -> (String, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let received = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut lines = BufReader::new(socket).lines();
        let mut documents = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            documents.push(serde_json::from_str(&line).unwrap());
        }
        documents
    });
    (addr, received)
}

fn config(addr: String, max_events: u64, services: Vec<SimulatedService>) -> GeneratorConfig {
    GeneratorConfig {
        logstash_addr: addr,
        connect: ConnectPolicy {
            attempts: 3,
            delay: Duration::from_millis(5),
        },
        pause_ms: 0..=1,
        max_events: Some(max_events),
        services,
    }
}

#[tokio::test]
async fn test_ships_bounded_run_between_notices() {
    let (addr, received) = logstash().await;

    let stats = run(config(addr, 40, vec![])).await.unwrap();
    let documents = received.await.unwrap();

    assert_eq!(stats.shipped, 40);
    assert_eq!(documents.len(), 42);
    assert_eq!(documents[0]["message"], "Log generator started");
    assert_eq!(documents[41]["message"], "Log generator finished");

    let simulated = &documents[1..41];
    for document in simulated {
        let status = document["status_code"].as_u64().unwrap();
        let expected_level = if status >= 400 { "ERROR" } else { "INFO" };
        assert_eq!(document["level"], expected_level);
        assert!(document["labels"]["action"].is_string());
        assert!((200..1000).contains(&document["duration_ms"].as_u64().unwrap()));
        assert!(document["@timestamp"].is_string());
    }
    let errors = simulated.iter().filter(|d| d["level"] == "ERROR").count() as u64;
    assert_eq!(stats.errors, errors);
}

#[tokio::test]
async fn test_only_selected_services_are_simulated() {
    let (addr, received) = logstash().await;

    run(config(addr, 15, vec![SimulatedService::Payment])).await.unwrap();
    let documents = received.await.unwrap();

    assert!(documents[1..documents.len() - 1]
        .iter()
        .all(|d| d["service"] == "payment-service"));
}

#[tokio::test]
async fn test_unreachable_logstash_fails_after_retries() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().to_string()
    };

    let err = run(config(addr, 1, vec![])).await.unwrap_err();

    assert!(matches!(err, GeneratorError::Connect { attempts: 3, .. }));
}
