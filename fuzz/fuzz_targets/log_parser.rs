#![no_main]

use brokerbench::parser::{parse_line, LogFormat, LogParser, ParseOptions};
use libfuzzer_sys::fuzz_target;

const FORMATS: [LogFormat; 4] = [
    LogFormat::KafkaProducer,
    LogFormat::KafkaConsumer,
    LogFormat::Rabbitmq,
    LogFormat::Vmstat,
];

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Neither single lines nor whole logs may panic, in either mode
        for format in FORMATS {
            for strict in [false, true] {
                let options = ParseOptions {
                    strict,
                    ..ParseOptions::default()
                };
                if let Some(line) = input.lines().next() {
                    let _ = parse_line(format, options, 1, line);
                }
                if let Ok(parser) = LogParser::new(format, options) {
                    let _ = parser.parse_str(input);
                }
            }
        }
    }
});
