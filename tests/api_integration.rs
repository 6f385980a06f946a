#![cfg(feature = "api")]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;

const RECORD_KEYS: &[&str] = &[
    "date",
    "site_id",
    "site_name",
    "site_type",
    "energy_produced_kwh",
    "spot_market_price",
    "revenue",
    "weather_condition",
    "downtime_hours",
    "temperature_c",
    "wind_speed_mps",
];

struct ChildGuard {
    child: Child,
    out_dir: PathBuf,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.out_dir);
    }
}

#[test]
fn api_serves_summary_sites_and_filtered_records() {
    let port = allocate_port();
    let addr = format!("127.0.0.1:{port}");
    let _child = spawn_api_process(port);

    wait_for_server(&addr, Duration::from_secs(15));

    let (status, body) = http_get(&addr, "/summary").expect("/summary request should succeed");
    assert_eq!(status, 200);
    let summary: Value = serde_json::from_str(&body).expect("summary body should be JSON");
    assert_eq!(summary["total_records"].as_u64(), Some(186));
    assert_eq!(summary["seed"].as_u64(), Some(7));

    let (status, body) = http_get(&addr, "/sites").expect("/sites request should succeed");
    assert_eq!(status, 200);
    let sites: Value = serde_json::from_str(&body).expect("sites body should be JSON");
    let sites = sites.as_array().expect("sites should be an array");
    assert_eq!(sites.len(), 6);
    assert_eq!(sites[0]["site_id"].as_str(), Some("SOLAR001"));

    let (status, body) = http_get(&addr, "/records?site_type=wind&from=2023-01-01&to=2023-01-02")
        .expect("/records request should succeed");
    assert_eq!(status, 200);
    let rows: Value = serde_json::from_str(&body).expect("records body should be JSON");
    let rows = rows.as_array().expect("records should be an array");
    assert_eq!(rows.len(), 4);
    for row in rows {
        let obj = row.as_object().expect("row should be an object");
        for key in RECORD_KEYS {
            assert!(obj.contains_key(*key), "missing key: {key}");
        }
        assert_eq!(obj["site_type"].as_str(), Some("wind"));
    }

    let (status, _) = http_get(&addr, "/records?from=2023-02-01&to=2023-01-01")
        .expect("/records request should succeed");
    assert_eq!(status, 400);
}

fn allocate_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral port bind should succeed");
    let port = listener
        .local_addr()
        .expect("local_addr should be available")
        .port();
    drop(listener);
    port
}

fn spawn_api_process(port: u16) -> ChildGuard {
    let out_dir = std::env::temp_dir().join(format!("renewables-synth-api-{}", std::process::id()));
    let child = Command::new(env!("CARGO_BIN_EXE_renewables-synth"))
        .args(["--preset", "smoke", "--serve", "--port", &port.to_string(), "--out-dir"])
        .arg(&out_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("renewables-synth process should spawn");

    ChildGuard { child, out_dir }
}

fn wait_for_server(addr: &str, timeout: Duration) {
    let start = Instant::now();
    loop {
        if let Ok((status, _)) = http_get(addr, "/sites") {
            if status == 200 {
                return;
            }
        }

        if start.elapsed() >= timeout {
            panic!("timed out waiting for API server on {addr}");
        }

        thread::sleep(Duration::from_millis(50));
    }
}

fn http_get(addr: &str, path: &str) -> Result<(u16, String), String> {
    let mut stream = TcpStream::connect(addr).map_err(|err| format!("connect: {err}"))?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .map_err(|err| format!("write: {err}"))?;

    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .map_err(|err| format!("read: {err}"))?;

    let (head, body) = raw
        .split_once("\r\n\r\n")
        .ok_or_else(|| "invalid HTTP response".to_string())?;
    let status_code = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| "missing status code".to_string())?
        .parse::<u16>()
        .map_err(|err| format!("invalid status code: {err}"))?;

    Ok((status_code, body.to_string()))
}
