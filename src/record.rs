//! Record types shared by all components.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

//------------ Rtype ---------------------------------------------------------

/// Resource record types.
///
/// Each resource record carries a 16 bit type value indicating what kind of
/// information it holds. The resolution engine gives special treatment to
/// A, AAAA, CNAME, and SRV; records of any other type are carried through
/// unchanged.
///
/// In order to avoid confusion over capitalization, the mnemonics are
/// treated as single acronyms and the variant names are spelled with an
/// initial capital letter in accordance with Rust naming guidelines.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Rtype {
    /// A host address.
    #[default]
    A,

    /// An authoritative name server.
    Ns,

    /// The canonical name for an alias.
    Cname,

    /// A domain name pointer.
    Ptr,

    /// Mail exchange.
    Mx,

    /// Text strings.
    Txt,

    /// An IPv6 host address.
    Aaaa,

    /// Server selection.
    Srv,
}

impl Rtype {
    /// Returns the IANA-assigned integer value of the type.
    pub fn to_int(self) -> u16 {
        match self {
            Rtype::A => 1,
            Rtype::Ns => 2,
            Rtype::Cname => 5,
            Rtype::Ptr => 12,
            Rtype::Mx => 15,
            Rtype::Txt => 16,
            Rtype::Aaaa => 28,
            Rtype::Srv => 33,
        }
    }

    /// Returns the type for an integer value, if it is one we know.
    pub fn from_int(value: u16) -> Option<Self> {
        match value {
            1 => Some(Rtype::A),
            2 => Some(Rtype::Ns),
            5 => Some(Rtype::Cname),
            12 => Some(Rtype::Ptr),
            15 => Some(Rtype::Mx),
            16 => Some(Rtype::Txt),
            28 => Some(Rtype::Aaaa),
            33 => Some(Rtype::Srv),
            _ => None,
        }
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Rtype::A => "A",
            Rtype::Ns => "NS",
            Rtype::Cname => "CNAME",
            Rtype::Ptr => "PTR",
            Rtype::Mx => "MX",
            Rtype::Txt => "TXT",
            Rtype::Aaaa => "AAAA",
            Rtype::Srv => "SRV",
        })
    }
}

//------------ Class ---------------------------------------------------------

/// Record classes.
///
/// Only the Internet class is in actual use.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Class {
    /// The Internet class.
    #[default]
    In,
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("IN")
    }
}

//------------ RecordData ----------------------------------------------------

/// The type-specific payload of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordData {
    /// An IPv4 host address.
    A(Ipv4Addr),

    /// An IPv6 host address.
    Aaaa(Ipv6Addr),

    /// The target name of an alias.
    Cname(String),

    /// A service location.
    Srv {
        /// The priority of this target host. Lower is preferred.
        priority: u16,

        /// A server selection weight for entries with the same priority.
        weight: u16,

        /// The port of the service on the target host.
        port: u16,

        /// The domain name of the target host.
        target: String,
    },

    /// Data of a type the engine does not interpret.
    Other(Vec<u8>),
}

//------------ AnswerRecord --------------------------------------------------

/// A single DNS resource record in an answer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AnswerRecord {
    /// The name owning the record.
    name: String,

    /// The record type.
    rtype: Rtype,

    /// The record class.
    class: Class,

    /// The time in seconds the record may be cached.
    ttl: u32,

    /// The record data.
    data: RecordData,
}

impl AnswerRecord {
    /// Creates a new record in the Internet class.
    pub fn new(
        name: impl Into<String>,
        rtype: Rtype,
        ttl: u32,
        data: RecordData,
    ) -> Self {
        AnswerRecord {
            name: name.into(),
            rtype,
            class: Class::In,
            ttl,
            data,
        }
    }

    /// Creates an A record.
    pub fn a(name: impl Into<String>, ttl: u32, addr: Ipv4Addr) -> Self {
        Self::new(name, Rtype::A, ttl, RecordData::A(addr))
    }

    /// Creates an AAAA record.
    pub fn aaaa(name: impl Into<String>, ttl: u32, addr: Ipv6Addr) -> Self {
        Self::new(name, Rtype::Aaaa, ttl, RecordData::Aaaa(addr))
    }

    /// Creates a CNAME record.
    pub fn cname(
        name: impl Into<String>,
        ttl: u32,
        target: impl Into<String>,
    ) -> Self {
        Self::new(name, Rtype::Cname, ttl, RecordData::Cname(target.into()))
    }

    /// Creates an SRV record.
    pub fn srv(
        name: impl Into<String>,
        ttl: u32,
        priority: u16,
        weight: u16,
        port: u16,
        target: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            Rtype::Srv,
            ttl,
            RecordData::Srv {
                priority,
                weight,
                port,
                target: target.into(),
            },
        )
    }

    /// Returns the name owning the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the record class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the record TTL in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Converts the record into the target name of its alias, if it is one.
    pub fn into_cname_target(self) -> Option<String> {
        match self.data {
            RecordData::Cname(target) => Some(target),
            _ => None,
        }
    }
}

//------------ AnswerSet -----------------------------------------------------

/// The unit of cache storage.
///
/// An answer set is an ordered sequence of records sharing the same name
/// and type. Its lifetime in the cache is derived from the minimum TTL over
/// its members.
#[derive(Clone, Debug)]
pub struct AnswerSet {
    /// The shared owner name, lowercased.
    name: String,

    /// The shared record type.
    rtype: Rtype,

    /// The member records.
    records: Vec<AnswerRecord>,
}

impl AnswerSet {
    /// Creates a new answer set.
    ///
    /// The name is lowercased; name comparison is case-insensitive
    /// everywhere in the engine.
    pub fn new(
        name: &str,
        rtype: Rtype,
        records: Vec<AnswerRecord>,
    ) -> Self {
        AnswerSet {
            name: name.to_ascii_lowercase(),
            rtype,
            records,
        }
    }

    /// Returns the owner name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the record type of the set.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the member records.
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    /// Converts the set into its member records.
    pub fn into_records(self) -> Vec<AnswerRecord> {
        self.records
    }

    /// Returns the minimum TTL over the member records.
    ///
    /// An empty set has a TTL of zero and is therefore never cached.
    pub fn min_ttl(&self) -> u32 {
        self.records
            .iter()
            .map(AnswerRecord::ttl)
            .min()
            .unwrap_or(0)
    }
}

//============ Testing =======================================================
