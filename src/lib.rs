//! brokerbench - throughput analysis for message-broker benchmarks
//!
//! This library turns the logs written by Kafka and RabbitMQ perf-test tools
//! (and `vmstat` on the brokers) into time-indexed throughput series, removes
//! the warm-up period, joins producer and consumer sides per trial and reports
//! mean throughput with bootstrap confidence intervals across experiments.
//! Broker-side `vmstat` disk writes can be lined up against producer throughput.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod disk;
pub mod error;
pub mod experiment;
pub mod json_output;
pub mod parser;
pub mod recorder;
pub mod sample;
pub mod stats;
pub mod text_output;
pub mod trial;
pub mod window;
