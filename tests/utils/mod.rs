// Log fixtures for integration tests
//
// Generated in the exact shape the perf-test tools produce after stamping,
// one report per second starting at 2019-03-01 12:00:00.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

fn clock(secs: usize) -> String {
    format!(
        "2019-03-01 {:02}:{:02}:{:02}",
        12 + secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

/// Stamped kafka-producer-perf-test.sh output including the final totals line
pub fn producer_log(rates: &[f64]) -> String {
    let mut out = String::new();
    for (i, mb) in rates.iter().enumerate() {
        out.push_str(&format!(
            "{}, {} records sent, {:.1} records/sec ({:.2} MB/sec), 2.1 ms avg latency, 40.0 ms max latency.\n",
            clock(i),
            (mb * 2048.0) as u64,
            mb * 2048.0,
            mb
        ));
    }
    out.push_str(&format!(
        "{}, 99999 records sent, 1000.0 records/sec (0.49 MB/sec), 2.4 ms avg latency, 98.0 ms max latency, 2 ms 50th, 4 ms 95th, 9 ms 99th, 60 ms 99.9th.\n",
        clock(rates.len())
    ));
    out
}

/// kafka-consumer-perf-test.sh --show-detailed-stat output
pub fn consumer_log(rates: &[f64]) -> String {
    let mut out = String::from(
        "time, threadId, data.consumed.in.MB, MB.sec, data.consumed.in.nMsg, nMsg.sec\n",
    );
    let mut total = 0.0;
    for (i, mb) in rates.iter().enumerate() {
        total += mb;
        out.push_str(&format!(
            "{}:{:03}, 0, {:.4}, {:.4}, {}, {:.4}\n",
            clock(i),
            i % 1000,
            total,
            mb,
            (total * 2048.0) as u64,
            mb * 2048.0
        ));
    }
    out.push_str("2019-03-01 13:00:00:000, 2019-03-01 13:00:01:000, 100.0, 1.0, 204800, 2048.0\n");
    out
}

/// Stamped RabbitMQ PerfTest output
pub fn perftest_log(msgs: &[u64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}, id: test-120000-537, starting consumer #0\n", clock(0)));
    out.push_str(&format!("{}, id: test-120000-537, starting producer #0\n", clock(0)));
    for (i, rate) in msgs.iter().enumerate() {
        out.push_str(&format!(
            "{}, id: test-120000-537, time: {}.000s, sent: {} msg/s, received: {} msg/s, min/median/75th/95th/99th consumer latency: 1/2/3/4/5 µs\n",
            clock(i + 1),
            i + 1,
            rate,
            rate
        ));
    }
    out.push_str(&format!("{}, test stopped (Reached time limit)\n", clock(msgs.len() + 1)));
    out.push_str(&format!(
        "{}, id: test-120000-537, sending rate avg: 1000 msg/s\n",
        clock(msgs.len() + 1)
    ));
    out
}

/// `vmstat -n -t` output, one row per second with the given `bo` block counts
pub fn vmstat_log(blocks_out: &[u64]) -> String {
    let mut out = String::from(
        "procs -----------memory---------- ---swap-- -----io---- -system-- ------cpu----- -----timestamp-----\n",
    );
    out.push_str(" r  b   swpd   free   buff  cache   si   so    bi    bo   in   cs us sy id wa st                 EST\n");
    for (i, bo) in blocks_out.iter().enumerate() {
        out.push_str(&format!(
            " 1  0      0  61822      0   1405    0    0     0  {} 1204 2210  3  2 95  0  0 {}\n",
            bo,
            clock(i)
        ));
    }
    out
}

/// A trial directory with one producer and one consumer log
pub fn write_trial(dir: &Path, producer: &[f64], consumer: &[f64]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("producer.txt"), producer_log(producer)).unwrap();
    fs::write(dir.join("consumer.txt"), consumer_log(consumer)).unwrap();
}

/// `n` seconds at a constant rate
pub fn constant(rate: f64, n: usize) -> Vec<f64> {
    vec![rate; n]
}
