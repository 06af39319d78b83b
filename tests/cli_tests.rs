// End-to-end tests for the brokerbench binary

mod utils;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use utils::{constant, consumer_log, perftest_log, producer_log, vmstat_log, write_trial};

fn brokerbench() -> Command {
    Command::cargo_bin("brokerbench").unwrap()
}

// ============================================================================
// parse
// ============================================================================

#[test]
fn test_parse_producer_text() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("producer.txt");
    fs::write(&log, producer_log(&constant(2.5, 40))).unwrap();

    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["--log-format", "kafka-producer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("40 samples parsed, 0 skipped, 9 in steady state"))
        .stdout(predicate::str::contains("mean 2.500 MB/s"));
}

#[test]
fn test_parse_warmup_and_window_flags() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("producer.txt");
    fs::write(&log, producer_log(&constant(1.0, 40))).unwrap();

    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "kafka-producer", "--warmup-secs", "5", "--window-secs", "10"])
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "timestamp,elapsed_secs,msgs_per_sec,throughput\n2019-03-01 12:00:06,0,",
        ))
        .stdout(predicate::str::contains("2019-03-01 12:00:16,10,"))
        .stdout(predicate::str::contains("12:00:17").not());
}

#[test]
fn test_parse_consumer_json() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("consumer.txt");
    fs::write(&log, consumer_log(&constant(3.0, 10))).unwrap();

    let output = brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "kafka-consumer", "--warmup-secs", "0", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"], "brokerbench-json-v1");
    assert_eq!(json["report"]["kind"], "series");
    assert_eq!(json["report"]["points"].as_array().unwrap().len(), 10);
    assert_eq!(json["report"]["summary"]["mean"], 3.0);
}

#[test]
fn test_parse_rabbitmq_record_size() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("perftest.txt");
    fs::write(&log, perftest_log(&[1000, 1000, 1000])).unwrap();

    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "rabbitmq", "--warmup-secs", "0", "--record-size", "1000"])
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",1000,1\n"));
}

#[test]
fn test_parse_strict_reports_line() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("producer.txt");
    let mut content = producer_log(&constant(1.0, 5));
    content.insert_str(0, "not a report line\n");
    fs::write(&log, content).unwrap();

    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "kafka-producer", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));

    // Lenient mode skips it
    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "kafka-producer", "--warmup-secs", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 samples parsed, 1 skipped"));
}

#[test]
fn test_parse_missing_file() {
    brokerbench()
        .args(["parse", "/nonexistent/producer.txt", "-l", "kafka-producer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_parse_requires_log_format() {
    brokerbench()
        .args(["parse", "producer.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--log-format"));
}

// ============================================================================
// trial / summarize / compare
// ============================================================================

#[test]
fn test_trial_writes_throughputs_csv() {
    let tmp = TempDir::new().unwrap();
    let trial = tmp.path().join("trial-1");
    write_trial(&trial, &constant(4.0, 60), &constant(3.5, 60));

    brokerbench()
        .arg("trial")
        .arg(tmp.path())
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::contains("4.000"))
        .stdout(predicate::str::contains("3.500"))
        .stdout(predicate::str::contains("1 trial(s)"));

    let stored = fs::read_to_string(trial.join("throughputs.csv")).unwrap();
    assert!(stored.starts_with(
        "timestamp,msgs_per_sec_producer,throughput_producer,msgs_per_sec_consumer,throughput_consumer\n"
    ));
    // 60s log, 30s warm-up: t=31..=59
    assert_eq!(stored.lines().count(), 1 + 29);

    // The experiment-level table stacks every trial
    let combined = fs::read_to_string(tmp.path().join("throughputs.csv")).unwrap();
    assert_eq!(combined, stored);
}

#[test]
fn test_trial_empty_directory_fails() {
    let tmp = TempDir::new().unwrap();
    brokerbench()
        .arg("trial")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trials found"));
}

#[test]
fn test_summarize_sweep_order_and_csv_source() {
    let tmp = TempDir::new().unwrap();
    let fast = tmp.path().join("fast");
    let slow = tmp.path().join("slow");
    write_trial(&fast.join("t1"), &constant(8.0, 50), &constant(8.0, 50));
    write_trial(&slow.join("t1"), &constant(2.0, 50), &constant(2.0, 50));

    let output = brokerbench()
        .arg("summarize")
        .arg(&fast)
        .arg(&slow)
        .args(["--iterations", "500", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let experiments = json["report"]["experiments"].as_array().unwrap();
    assert_eq!(experiments.len(), 2);
    assert!(experiments[0]["label"].as_str().unwrap().ends_with("slow"));
    assert_eq!(experiments[0]["producer"]["mean"], 2.0);
    assert_eq!(experiments[1]["producer"]["mean"], 8.0);

    // from-csv needs the stored tables first
    brokerbench()
        .arg("summarize")
        .arg(&fast)
        .arg("--from-csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No trials found"));

    brokerbench().arg("trial").arg(&fast).arg("--write").assert().success();
    brokerbench()
        .arg("summarize")
        .arg(&fast)
        .args(["--from-csv", "--iterations", "500", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("experiment,trials,column,n,mean"))
        .stdout(predicate::str::contains(",1,throughput_producer,19,8,"));
}

#[test]
fn test_summarize_text_reports_interval() {
    let tmp = TempDir::new().unwrap();
    write_trial(&tmp.path().join("t1"), &constant(5.0, 45), &constant(5.0, 45));

    brokerbench()
        .arg("summarize")
        .arg(tmp.path())
        .args(["--iterations", "200", "--method", "percentile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("producer  mean 5.000 MB/s  95% CI [5.000, 5.000]"));
}

#[test]
fn test_summarize_rejects_bad_confidence() {
    let tmp = TempDir::new().unwrap();
    write_trial(&tmp.path().join("t1"), &constant(5.0, 45), &constant(5.0, 45));

    brokerbench()
        .arg("summarize")
        .arg(tmp.path())
        .args(["--confidence", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence level"));
}

#[test]
fn test_compare_detects_difference() {
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("base");
    let cur = tmp.path().join("cur");
    let wobble = |center: f64| -> Vec<f64> {
        (0..60).map(|i| center + (i % 3) as f64 * 0.1).collect()
    };
    write_trial(&base.join("t1"), &wobble(2.0), &wobble(2.0));
    write_trial(&cur.join("t1"), &wobble(4.0), &wobble(4.0));

    brokerbench()
        .arg("compare")
        .arg(&base)
        .arg(&cur)
        .assert()
        .success()
        .stdout(predicate::str::contains("DIFFERENT: throughput_producer"));

    brokerbench()
        .arg("compare")
        .arg(&base)
        .arg(&base)
        .args(["--column", "throughput_consumer", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not_significant"));
}

#[test]
fn test_compare_unknown_column() {
    let tmp = TempDir::new().unwrap();
    write_trial(&tmp.path().join("t1"), &constant(1.0, 40), &constant(1.0, 40));

    brokerbench()
        .arg("compare")
        .arg(tmp.path())
        .arg(tmp.path())
        .args(["--column", "latency"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column 'latency'"));
}

#[test]
fn test_disk_joins_vmstat_and_producer() {
    let tmp = TempDir::new().unwrap();
    let vmstat = tmp.path().join("vmstat-broker1.txt");
    let producer = tmp.path().join("producer.txt");
    // 2048 blocks of 512 bytes = 1 MiB per second
    fs::write(&vmstat, vmstat_log(&[2048; 5])).unwrap();
    fs::write(&producer, producer_log(&constant(2.5, 3))).unwrap();

    brokerbench()
        .arg("disk")
        .arg(&vmstat)
        .arg(&producer)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 vmstat sample(s), 3 with a producer report"));

    let output = brokerbench()
        .arg("disk")
        .arg(&vmstat)
        .arg(&producer)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"]["kind"], "disk");
    let rows = json["report"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["throughput_vmstat"], 1.0);
    assert_eq!(rows[2]["throughput_producer"], 2.5);
    assert!(rows[4]["throughput_producer"].is_null());

    brokerbench()
        .arg("disk")
        .arg(&vmstat)
        .arg(&producer)
        .args(["--fill", "zero", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2019-03-01 12:00:04,4,1,0,0\n"));
}

// ============================================================================
// config / stamp
// ============================================================================

#[test]
fn test_config_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("producer.txt");
    fs::write(&log, producer_log(&constant(1.0, 20))).unwrap();
    let config = tmp.path().join("brokerbench.toml");
    fs::write(&config, "[analysis]\nwarmup = { seconds = 10 }\n").unwrap();

    brokerbench()
        .arg("parse")
        .arg(&log)
        .args(["-l", "kafka-producer"])
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("20 samples parsed, 0 skipped, 9 in steady state"));
}

#[test]
fn test_invalid_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("brokerbench.toml");
    fs::write(&config, "[bootstrap]\niterations = 0\n").unwrap();

    brokerbench()
        .args(["trial", "."])
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_stamp_prefixes_lines() {
    brokerbench()
        .arg("stamp")
        .write_stdin("100 records sent\n200 records sent\n")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}, 100 records sent\n").unwrap())
        .stdout(predicate::str::contains(", 200 records sent\n"));
}

#[test]
fn test_stamp_to_file() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("producer.txt");

    brokerbench()
        .arg("stamp")
        .arg("-o")
        .arg(&out)
        .write_stdin("line\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.ends_with(", line\n"));
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_version() {
    brokerbench()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("brokerbench"));
}
