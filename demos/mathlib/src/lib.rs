//! Sample handler library for lambda-emu.
//!
//! Build with `cargo build -p mathlib`, then run from the repository root:
//!
//! ```text
//! lambda-emu --handler-path target/debug mathlib.square event.json
//! ```

use lambda_handler::{export_handlers, Context};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct SquareEvent {
    pub x: f64,
}

#[derive(Debug, Deserialize)]
pub struct SleepEvent {
    pub seconds: f64,
}

pub fn square(event: SquareEvent, _ctx: Context) -> Result<serde_json::Value, String> {
    let squared = event.x * event.x;
    // Keep integral inputs integral on the way out.
    if squared.fract() == 0.0 && squared.abs() < i64::MAX as f64 {
        Ok(serde_json::json!(squared as i64))
    } else {
        Ok(serde_json::json!(squared))
    }
}

pub fn sleep(event: SleepEvent, _ctx: Context) -> Result<f64, String> {
    if !event.seconds.is_finite() || event.seconds < 0.0 {
        return Err(format!("cannot sleep for {} seconds", event.seconds));
    }
    std::thread::sleep(Duration::from_secs_f64(event.seconds));
    Ok(event.seconds)
}

pub fn fail(event: serde_json::Value, _ctx: Context) -> Result<(), String> {
    Err(format!("refusing event {}", event))
}

export_handlers! {
    square => square,
    sleep => sleep,
    fail => fail,
}
