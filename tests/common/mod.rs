#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use obras::http::{router, AppState};
use obras_core::{Clock, MemoryStore, ObraStore};

/// Clock the test moves by hand between requests.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn at(instant: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(instant)))
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.0.lock().expect("clock lock") = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Serves a fresh in-memory API on an ephemeral port.
pub async fn spawn_app(clock: Arc<ManualClock>) -> SocketAddr {
    spawn_app_with_store(Arc::new(MemoryStore::new()), clock).await
}

pub async fn spawn_app_with_store(
    store: Arc<dyn ObraStore>,
    clock: Arc<ManualClock>,
) -> SocketAddr {
    let state = AppState::new(
        store,
        clock,
        FixedOffset::east_opt(0).expect("utc offset"),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("serve api");
    });
    addr
}

pub async fn send_raw(addr: SocketAddr, method: &str, path: &str) -> (u16, String, String) {
    send_raw_with_body(addr, method, path, None).await
}

pub async fn send_json(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: &str,
) -> (u16, String, String) {
    send_raw_with_body(addr, method, path, Some(body)).await
}

async fn send_raw_with_body(
    addr: SocketAddr,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    match body {
        Some(body) => req.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        )),
        None => req.push_str("\r\n"),
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head.to_string(), body.to_string())
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("json body")
}
