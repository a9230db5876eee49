//! A small suite comparing a hand-rolled integer scanner against the
//! standard-library tokenizer it must agree with.
//!
//! Run with: `cargo run --example count_ints -- -n 20`

use veribench::prelude::*;

/// Byte-at-a-time scanner, no UTF-8 validation, no allocation per token.
#[derive(Default)]
struct FastScanner {
    values: Vec<u64>,
}

impl Workload for FastScanner {
    fn run(&mut self, input: &[u8]) -> bool {
        self.values.clear();
        let mut current: Option<u64> = None;
        for &b in input {
            match b {
                b'0'..=b'9' => {
                    let digit = (b - b'0') as u64;
                    current = Some(current.unwrap_or(0) * 10 + digit);
                }
                b' ' | b'\n' | b'\t' | b'\r' => {
                    if let Some(v) = current.take() {
                        self.values.push(v);
                    }
                }
                _ => return false,
            }
        }
        if let Some(v) = current.take() {
            self.values.push(v);
        }
        true
    }

    fn result(&self) -> DocValue {
        self.values.iter().map(|&v| DocValue::Unsigned(v)).collect()
    }

    fn item_count(&self) -> u64 {
        self.values.len() as u64
    }
}

/// Reference: split on whitespace, parse each token.
#[derive(Default)]
struct StdScanner {
    values: Vec<u64>,
}

impl Workload for StdScanner {
    fn run(&mut self, input: &[u8]) -> bool {
        let Ok(text) = std::str::from_utf8(input) else {
            return false;
        };
        self.values.clear();
        for token in text.split_whitespace() {
            match token.parse::<u64>() {
                Ok(v) => self.values.push(v),
                Err(_) => return false,
            }
        }
        true
    }

    fn result(&self) -> DocValue {
        self.values.iter().map(|&v| DocValue::Unsigned(v)).collect()
    }

    fn item_count(&self) -> u64 {
        self.values.len() as u64
    }
}

fn synthetic_document(count: u64) -> Vec<u8> {
    let mut doc = String::new();
    for i in 0..count {
        doc.push_str(&(i * 7919 % 1_000_000).to_string());
        doc.push(if i % 16 == 15 { '\n' } else { ' ' });
    }
    doc.into_bytes()
}

fn main() -> anyhow::Result<()> {
    let small = synthetic_document(1_000);
    let large = synthetic_document(100_000);

    let cases = vec![
        CaseDef::new(
            "count/small",
            "count",
            small,
            || Box::new(FastScanner::default()) as Box<dyn Workload>,
            || Box::new(StdScanner::default()) as Box<dyn Workload>,
        ),
        CaseDef::new(
            "count/large",
            "count",
            large,
            || Box::new(FastScanner::default()) as Box<dyn Workload>,
            || Box::new(StdScanner::default()) as Box<dyn Workload>,
        ),
    ];

    veribench::run(cases)
}
