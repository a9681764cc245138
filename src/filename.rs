use std::path::{Path, PathBuf};

use crate::error::{DbError, Result};
use crate::header::PuzzleOptions;

/// File extension of solved-puzzle databases.
pub const DB_EXTENSION: &str = "db";

/// Check that a puzzle identifier can be used as a file name component.
pub fn validate_puzzle_id(puzzle: &str) -> Result<()> {
    if puzzle.is_empty() || puzzle == "." || puzzle == ".." {
        return Err(DbError::Config(format!("invalid puzzle '{puzzle}'")));
    }
    if puzzle.contains(['/', '\\']) {
        return Err(DbError::Config(format!(
            "invalid puzzle '{puzzle}': contains a path separator"
        )));
    }
    Ok(())
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derive the database file name for a puzzle and its options.
///
/// Options are appended as `_key-value` in key order; characters outside
/// `[A-Za-z0-9.-]` in option text become `_`.
pub fn database_file_name(puzzle: &str, options: &PuzzleOptions) -> Result<String> {
    validate_puzzle_id(puzzle)?;
    let mut name = puzzle.to_string();
    for (key, value) in options {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        name.push('_');
        name.push_str(&sanitize(key));
        name.push('-');
        name.push_str(&sanitize(&value));
    }
    name.push('.');
    name.push_str(DB_EXTENSION);
    Ok(name)
}

/// Full path of the database for `puzzle` inside `dir`.
pub fn database_path(dir: &Path, puzzle: &str, options: &PuzzleOptions) -> Result<PathBuf> {
    Ok(dir.join(database_file_name(puzzle, options)?))
}
