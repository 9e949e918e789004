//! Shared output helpers

use std::fs;
use std::path::Path;

use serde::Serialize;
use wmdr_core::error::{Result, WmdrError};
use wmdr_core::report::round3;

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Write `value` as pretty JSON to `path`
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| WmdrError::io_operation("write", path.display(), e))
}

/// Points without trailing zeros, at most three decimals
pub fn points(value: f64) -> String {
    round3(value).to_string()
}

pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{}%", round3(p)),
        None => "n/a".to_string(),
    }
}
