// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub const HEADER: &str = "title,console,genre,publisher,developer,critic_score,total_sales,na_sales,jp_sales,pal_sales,other_sales,release_date,last_update";

/// Build a CSV document from data lines under the standard header
pub fn csv_with_rows(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

/// Write `content` to `raw.csv` in a fresh directory
pub fn write_source(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("raw.csv");
    fs::write(&path, content).expect("Failed to write source file");
    (dir, path)
}

/// Run the vgclean binary with given arguments
pub fn run_vgclean(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_vgclean"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to start vgclean");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Read a written file back as header plus data lines
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read output file")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Titles of the rows still in the table, in order
pub fn titles(table: &vgclean::Table) -> Vec<String> {
    let index = table
        .headers()
        .iter()
        .position(|h| h == "title")
        .expect("title column");
    table
        .rows()
        .iter()
        .map(|row| row.get(index).to_string())
        .collect()
}
