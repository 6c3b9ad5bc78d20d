// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the usage shipper crates
//!
//! Thin layer over `emit` so every crate logs the same way.
//!
//! Usage:
//! - Set SHIPPER_LOG=off (default) - no logs
//! - Set SHIPPER_LOG=error|warn - failures only
//! - Set SHIPPER_LOG=info - one line per run, rotation and delivered file
//! - Set SHIPPER_LOG=debug - scan and retry details

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the minimum log level.
pub const LOG_ENV: &str = "SHIPPER_LOG";

static INIT: Once = Once::new();

/// Parse a `SHIPPER_LOG` value.
///
/// Returns `None` for `off`, and `Err` with the fallback level for values
/// that are not recognised.
pub fn parse_level(value: &str) -> Result<Option<emit::Level>, emit::Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => Ok(None),
        "debug" => Ok(Some(emit::Level::Debug)),
        "info" => Ok(Some(emit::Level::Info)),
        "warn" => Ok(Some(emit::Level::Warn)),
        "error" => Ok(Some(emit::Level::Error)),
        _ => Err(emit::Level::Info),
    }
}

/// Initialize diagnostics based on the SHIPPER_LOG environment variable
///
/// Call once at startup from whatever hosts the scheduled task. Later
/// calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let (level, unknown) = match parse_level(&raw) {
            Ok(None) => return,
            Ok(Some(level)) => (level, false),
            Err(fallback) => (fallback, true),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if unknown {
            emit::warn!("Unknown {env} value {raw}, using info", env: LOG_ENV, raw: raw.as_str());
        }

        // The runtime lives for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Log basic operations (run start, rotation, delivered files)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (scan results, skipped entries, attempt counts)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable conditions that will be retried
///
/// Examples: "Upload attempt 2 failed, retrying", "Skipping non UTF-8 name"
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures of a run step
///
/// Use this for anything that leaves a file in its current state.
/// Examples: "Configuration unavailable", "Could not mark file as uploaded"
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
