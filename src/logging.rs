// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging configuration for the InvenTree driver.
//!
//! Initializes a `tracing-subscriber` with file or stderr output.
//!
//! ## Configuration priority
//!
//! 1. `loglevel` / `logfile` / `logformat` connection keys (highest)
//! 2. `RUST_LOG` environment variable
//! 3. Default: `warn`
//!
//! `loglevel` accepts `error`, `warn`, `info`, `debug` and `trace`;
//! `off`, `disabled` and `none` turn logging off and anything else is read
//! as `info`. `logformat=pretty` selects human-readable lines, otherwise
//! each event is written as one JSON object.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=inventree_odbc=debug ./my_app
//! ```
//!
//! or through the connection string:
//!
//! ```text
//! Server=https://parts.example.com;APIToken=...;LogLevel=debug;LogFile=/tmp/inventree.log
//! ```

use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{
    fmt::{self, time::SystemTime, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

const CRATE_TARGET: &str = "inventree_odbc";

/// Logging settings resolved from the connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level as written by the user, lower-cased.
    pub level: Option<String>,
    /// Log file path. If unset, logs go to stderr.
    pub file: Option<String>,
    /// `pretty` for human-readable output; anything else is JSON.
    pub format: Option<String>,
}

impl LogConfig {
    fn is_pretty(&self) -> bool {
        self.format.as_deref() == Some("pretty")
    }
}

/// Filter directive for a configured level, `None` when logging is disabled.
fn filter_directive(level: &str) -> Option<String> {
    let level = match level.to_lowercase().as_str() {
        "off" | "disabled" | "none" => return None,
        l @ ("error" | "warn" | "info" | "debug" | "trace") => l.to_string(),
        _ => "info".to_string(),
    };
    Some(format!("{}={}", CRATE_TARGET, level))
}

/// Initialize the tracing subscriber.
///
/// Uses `OnceLock` to ensure this is called at most once per process.
/// The first successful configuration resolution configures logging;
/// subsequent calls are no-ops.
pub fn init_logging(config: &LogConfig) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let filter = match config.level.as_deref() {
            Some(level) => match filter_directive(level) {
                Some(directive) => EnvFilter::new(directive),
                None => return,
            },
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}=warn", CRATE_TARGET))),
        };

        let writer = match config.file.as_deref() {
            Some(path) => match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(f) => BoxMakeWriter::new(Mutex::new(f)),
                Err(e) => {
                    eprintln!("inventree-odbc: failed to open log file {}: {}", path, e);
                    return;
                }
            },
            None => BoxMakeWriter::new(std::io::stderr),
        };

        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(false)
            .with_timer(SystemTime);

        let registry = tracing_subscriber::registry().with(filter);
        if config.is_pretty() {
            registry.with(layer).try_init().ok();
        } else {
            registry.with(layer.json()).try_init().ok();
        }
    });
}
