use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::PathBuf;

/// Get a Command for wmdr
pub fn wmdr() -> Command {
    let mut cmd = cargo_bin_cmd!("wmdr");
    cmd.env_remove("WMDR_CONFIG").env_remove("WMDR_RESOURCES");
    cmd
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Resource directory with the code lists and maps the fixtures need
#[allow(dead_code)]
pub fn resources() -> PathBuf {
    fixture("resources")
}

#[allow(dead_code)]
pub const REFERENCE_TIME: &str = "2024-06-01T00:00:00Z";

/// `wmdr evaluate` against the fixture resources at a fixed reference time
#[allow(dead_code)]
pub fn evaluate() -> Command {
    let mut cmd = wmdr();
    cmd.arg("--resources")
        .arg(resources())
        .arg("evaluate")
        .arg("--reference-time")
        .arg(REFERENCE_TIME);
    cmd
}

/// Parse stdout as JSON
#[allow(dead_code)]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}
