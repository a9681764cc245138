use std::fs;
use std::process::Command;

use serde_json::Value;
use solvedb::DatabaseReader;

#[test]
fn missing_puzzle_prints_usage() {
    let exe = env!("CARGO_BIN_EXE_solvedb");
    let output = Command::new(exe).output().expect("run failed");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}

#[test]
fn writes_database_from_csv() {
    let exe = env!("CARGO_BIN_EXE_solvedb");
    let dir = tempfile::tempdir().unwrap();
    let positions = dir.path().join("solved.csv");
    fs::write(&positions, "position,remoteness\n0,3\n5,1\n300,0\n").unwrap();

    let output = Command::new(exe)
        .args([
            "Wheel",
            "--positions",
            positions.to_str().unwrap(),
            "--out-dir",
            dir.path().to_str().unwrap(),
            "--option",
            "seqSize=6",
            "--quiet",
            "--json",
        ])
        .output()
        .expect("run failed");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["total_chunks"].as_u64().unwrap(), 2);
    assert_eq!(json["summary"]["written_chunks"].as_u64().unwrap(), 2);

    let path = dir.path().join("Wheel_seqSize-6.db");
    assert_eq!(json["path"].as_str().unwrap(), path.to_str().unwrap());
    let mut reader = DatabaseReader::open(&path).unwrap();
    assert_eq!(reader.header().options["seqSize"], serde_json::json!(6));
    assert_eq!(reader.remoteness(0).unwrap(), Some(3));
    assert_eq!(reader.remoteness(5).unwrap(), Some(1));

    let dump = Command::new(env!("CARGO_BIN_EXE_db_dump"))
        .args([path.to_str().unwrap(), "0", "5", "9999"])
        .output()
        .expect("dump failed");
    assert!(dump.status.success());
    let stdout = String::from_utf8_lossy(&dump.stdout);
    assert!(stdout.contains("puzzle: Wheel"));
    assert!(stdout.contains("0: 3"));
    assert!(stdout.contains("5: 1"));
    assert!(stdout.contains("9999: unwritten"));
}

#[test]
fn rejects_path_separators() {
    let exe = env!("CARGO_BIN_EXE_solvedb");
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(exe)
        .args(["a/b", "--out-dir", dir.path().to_str().unwrap()])
        .output()
        .expect("run failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid configuration"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_positions_file() {
    let exe = env!("CARGO_BIN_EXE_solvedb");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.csv");
    let output = Command::new(exe)
        .args(["Wheel", "--positions", missing.to_str().unwrap()])
        .output()
        .expect("run failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Check that the file exists"));
}

#[test]
fn dump_rejects_non_database() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.db");
    fs::write(&bogus, b"not a database").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_db_dump"))
        .arg(bogus.to_str().unwrap())
        .output()
        .expect("run failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Verify the file is a puzzle database"));
}
