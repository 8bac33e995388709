//! IP list parsing for the contextual policy
//!
//! Lists are stored as newline-delimited text. Each line is either a single address
//! or a CIDR range. Lines that do not parse are dropped with a warning instead of
//! failing the request.

use ipnetwork::IpNetwork;
use std::net::IpAddr;
use tracing::warn;

/// Parsed, de-duplicated IP pattern list in entry order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpPatternList {
    patterns: Vec<IpNetwork>,
}

impl IpPatternList {
    /// Parse newline-delimited text. Blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut patterns: Vec<IpNetwork> = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match line.parse::<IpNetwork>() {
                Ok(network) => {
                    if !patterns.contains(&network) {
                        patterns.push(network);
                    }
                }
                Err(e) => {
                    warn!("Ignoring invalid IP list entry '{}': {}", line, e);
                }
            }
        }

        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn as_slice(&self) -> &[IpNetwork] {
        &self.patterns
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.patterns.iter().any(|network| network.contains(ip))
    }
}

impl From<Vec<IpNetwork>> for IpPatternList {
    fn from(patterns: Vec<IpNetwork>) -> Self {
        Self { patterns }
    }
}
