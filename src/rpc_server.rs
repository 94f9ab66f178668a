//! linkvault RPC server: native-messaging bridge over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"requestId":1, "action":"saveBookmark", "bookmark":{"url":"...","title":"..."}}
//! Response: {"requestId":1, "success":true, "bookmark":{...}} or {"requestId":1, "success":false, "error":"..."}
//!
//! Requests are handled one at a time. Logs go to stderr.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use linkvault::app::App;
use linkvault::config::AppConfig;
use linkvault::logging::init_tracing;
use linkvault::rpc_handler::{handle_message, parse_error_response};
use linkvault::services::sync_mirror::spawn_periodic;

async fn write_frame(stdout: &mut io::Stdout, frame: &Value) -> io::Result<()> {
    let mut line = frame.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            init_tracing("linkvault=info");
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_filter);

    let interval = Duration::from_secs(config.sync_interval_secs.max(1));
    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to initialize linkvault");
            std::process::exit(1);
        }
    };
    let _sync_task = spawn_periodic(app.storage(), interval);
    let app = Mutex::new(app);

    let mut stdout = io::stdout();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if write_frame(&mut stdout, &ready).await.is_err() {
        return;
    }

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read request");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => handle_message(&app, &request).await,
            Err(e) => parse_error_response(&e),
        };
        if let Err(e) = write_frame(&mut stdout, &response).await {
            error!(error = %e, "failed to write response");
            break;
        }
    }
    info!("stdin closed, shutting down");
}
