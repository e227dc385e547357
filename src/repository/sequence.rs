//! Named auto-increment sequences (自增序列)

use dashmap::DashMap;

/// Hands out 1, 2, 3, ... independently per sequence name
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    counters: DashMap<String, u64>,
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next value of `name`, starting at 1
    pub fn generate_sequence(&self, name: &str) -> u64 {
        let mut counter = self.counters.entry(name.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Make sure the next generated value of `name` is greater than `value`
    pub fn advance_past(&self, name: &str, value: u64) {
        let mut counter = self.counters.entry(name.to_string()).or_insert(0);
        if *counter < value {
            *counter = value;
        }
    }
}
