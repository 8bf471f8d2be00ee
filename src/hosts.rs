//! The static host table.
//!
//! Entries from a hosts file are seeded into the answer cache at startup
//! with an effectively permanent TTL, so they answer lookups without ever
//! touching the network. Each name keeps at most one address per family.

use crate::record::{AnswerRecord, AnswerSet, Rtype};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::str::FromStr;

/// TTL used for answer sets seeded from the hosts file.
///
/// Hosts file entries do not expire; ten years is close enough.
const SEED_TTL: u32 = 10 * 365 * 24 * 60 * 60;

//------------ Hosts ---------------------------------------------------------

/// A static host table in the format of `/etc/hosts`.
#[derive(Clone, Debug, Default)]
pub struct Hosts {
    /// Addresses per lowercased host name.
    entries: HashMap<String, HostAddrs>,
}

/// The addresses of one host, at most one per family.
#[derive(Clone, Copy, Debug, Default)]
struct HostAddrs {
    v4: Option<Ipv4Addr>,
    v6: Option<Ipv6Addr>,
}

impl Hosts {
    /// Creates a new, empty host table.
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads the hosts listed in a file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let mut file = fs::File::open(path)?;
        Self::parse(&mut file)
    }

    /// Reads hosts from a reader.
    ///
    /// The format is that of the `/etc/hosts` file. Lines that do not
    /// parse are skipped.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, io::Error> {
        use std::io::BufRead;

        let mut res = Self::new();
        for line in io::BufReader::new(reader).lines() {
            res.parse_line(&line?);
        }
        Ok(res)
    }

    /// Parses a single line.
    fn parse_line(&mut self, line: &str) {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut words = line.split_whitespace();

        let Some(addr) = words.next().and_then(|w| IpAddr::from_str(w).ok())
        else {
            return;
        };
        for name in words {
            let entry =
                self.entries.entry(name.to_ascii_lowercase()).or_default();
            // The first address of a family wins, like glibc's lookup.
            match addr {
                IpAddr::V4(addr) => {
                    entry.v4.get_or_insert(addr);
                }
                IpAddr::V6(addr) => {
                    entry.v6.get_or_insert(addr);
                }
            }
        }
    }

    /// Returns the number of names in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the answer sets to seed the cache with.
    ///
    /// One set per address family per name, with a ten year TTL.
    pub fn seed_sets(&self) -> Vec<AnswerSet> {
        let mut sets = Vec::new();
        for (name, addrs) in &self.entries {
            if let Some(addr) = addrs.v4 {
                sets.push(AnswerSet::new(
                    name,
                    Rtype::A,
                    vec![AnswerRecord::a(name.clone(), SEED_TTL, addr)],
                ));
            }
            if let Some(addr) = addrs.v6 {
                sets.push(AnswerSet::new(
                    name,
                    Rtype::Aaaa,
                    vec![AnswerRecord::aaaa(name.clone(), SEED_TTL, addr)],
                ));
            }
        }
        sets
    }
}

//============ Testing =======================================================
