//! Resolver configuration.
//!
//! There are two parts to this module: [`ResolverConfig`] collects the
//! options a caller passes when constructing a resolver, and [`ResolvConf`]
//! is the merged configuration query handles are created from.
//!
//! The merge is modeled along the lines of glibc's resolver: values come
//! from a configuration file (normally `/etc/resolv.conf`), then from the
//! `RES_OPTIONS` environment variable, then from the explicit options, each
//! layer taking precedence over the previous one. A missing or unreadable
//! configuration file is not an error; the resolver falls back to the
//! defaults with a logged warning.

use std::default::Default;
use std::error;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::{FromStr, SplitWhitespace};
use std::time::Duration;
use tracing::warn;

//------------ ResolverConfig ------------------------------------------------

/// Options for constructing a resolver.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Name servers to query.
    ///
    /// Each entry is either `host` or `host:port`; the port defaults to 53.
    /// When non-empty, this list takes precedence over the servers from the
    /// configuration file.
    pub nameservers: Vec<String>,

    /// Number of query attempts before giving up.
    ///
    /// Overrides the configuration file when set.
    pub retransmissions: Option<usize>,

    /// Timeout to wait for a response, with millisecond precision.
    ///
    /// Overrides the configuration file when set. The file expresses the
    /// timeout in whole seconds.
    pub timeout: Option<Duration>,

    /// Soft cap on the number of live query handles.
    pub max_pool_size: usize,

    /// Path of the static hosts file.
    pub hosts_path: PathBuf,

    /// Path of the resolver configuration file.
    pub conf_path: PathBuf,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            nameservers: Vec::new(),
            retransmissions: None,
            timeout: None,
            max_pool_size: 10,
            hosts_path: PathBuf::from("/etc/hosts"),
            conf_path: PathBuf::from("/etc/resolv.conf"),
        }
    }
}

//------------ ResolvConf ----------------------------------------------------

/// The merged resolver configuration.
///
/// This type collects everything a query handle needs to know to talk to
/// the upstream servers. It can parse the `nameserver` and `options` lines
/// of a glibc-style configuration file; keywords this engine does not
/// consume (`domain`, `search`, `sortlist`) are skipped.
#[derive(Clone, Debug)]
pub struct ResolvConf {
    /// Addresses of the servers to query.
    pub servers: Vec<SocketAddr>,

    /// Timeout to wait for a response.
    pub timeout: Duration,

    /// Number of attempts before giving up.
    pub attempts: usize,
}

impl ResolvConf {
    /// Creates a new configuration with glibc's defaults and no servers.
    pub fn new() -> Self {
        ResolvConf {
            servers: Vec::new(),
            timeout: Duration::from_secs(5),
            attempts: 2,
        }
    }

    /// Finalizes the configuration for actual use.
    ///
    /// If `servers` is empty, adds `127.0.0.1:53`. This is exactly what
    /// glibc does.
    pub fn finalize(&mut self) {
        if self.servers.is_empty() {
            let addr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
            self.servers.push(SocketAddr::new(addr, 53));
        }
    }

    /// Builds the merged configuration for the given caller options.
    ///
    /// Reads the configuration file if it exists, applies environment
    /// overrides and finally the explicit options. Configuration problems
    /// are absorbed here: they are logged and replaced by defaults, never
    /// surfaced as resolution failures.
    pub fn load(config: &ResolverConfig) -> Self {
        let mut conf = ResolvConf::new();
        if let Err(err) = conf.parse_file(&config.conf_path) {
            warn!(
                path = %config.conf_path.display(),
                error = %err,
                "cannot read resolver configuration, using defaults"
            );
            conf = ResolvConf::new();
        }
        conf.apply_env();

        if !config.nameservers.is_empty() {
            let mut servers = Vec::new();
            for server in &config.nameservers {
                match parse_server(server) {
                    Ok(addr) => servers.push(addr),
                    Err(_) => warn!(
                        server = server.as_str(),
                        "ignoring unparseable nameserver entry"
                    ),
                }
            }
            if !servers.is_empty() {
                conf.servers = servers;
            }
        }
        if let Some(attempts) = config.retransmissions {
            conf.attempts = attempts;
        }
        if let Some(timeout) = config.timeout {
            conf.timeout = timeout;
        }
        conf.finalize();
        conf
    }

    /// Parses the configuration from a file.
    pub fn parse_file<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(), Error> {
        let mut file = fs::File::open(path)?;
        self.parse(&mut file)
    }

    /// Parses the configuration from a reader.
    ///
    /// The format is that of the `/etc/resolv.conf` file.
    pub fn parse<R: Read>(&mut self, reader: &mut R) -> Result<(), Error> {
        use std::io::BufRead;

        for line in io::BufReader::new(reader).lines() {
            let line = line?;
            let line = line.trim_end();

            if line.is_empty()
                || line.starts_with(';')
                || line.starts_with('#')
            {
                continue;
            }

            let mut words = line.split_whitespace();
            match words.next() {
                Some("nameserver") => self.parse_nameserver(words)?,
                Some("options") => self.parse_options(words)?,
                // Keywords not consumed by this engine.
                _ => {}
            }
        }
        Ok(())
    }

    /// Applies glibc-style overrides from the `RES_OPTIONS` environment
    /// variable.
    pub fn apply_env(&mut self) {
        let Ok(value) = std::env::var("RES_OPTIONS") else {
            return;
        };
        for word in value.split_whitespace() {
            if let Ok(arg) = split_arg(word) {
                self.apply_option(arg);
            }
        }
    }

    fn parse_nameserver(
        &mut self,
        mut words: SplitWhitespace,
    ) -> Result<(), Error> {
        let addr = parse_server(next_word(&mut words)?)?;
        self.servers.push(addr);
        no_more_words(words)
    }

    fn parse_options(
        &mut self,
        words: SplitWhitespace,
    ) -> Result<(), Error> {
        for word in words {
            self.apply_option(split_arg(word)?);
        }
        Ok(())
    }

    /// Applies a single `key` or `key:value` option.
    ///
    /// Unknown or misformatted options are ignored, like glibc does. The
    /// timeout is given in whole seconds.
    fn apply_option(&mut self, arg: (&str, Option<usize>)) {
        match arg {
            ("timeout", Some(secs)) => {
                self.timeout = Duration::from_secs(secs as u64)
            }
            ("attempts", Some(attempts)) => self.attempts = attempts,
            _ => {}
        }
    }
}

impl Default for ResolvConf {
    fn default() -> Self {
        let mut res = ResolvConf::new();
        res.finalize();
        res
    }
}

//------------ Private Helpers -----------------------------------------------
//
// These are here to wrap stuff into Results.

/// Parses a server given as either `host` or `host:port`.
///
/// A bare address gets port 53. An address with a port follows socket
/// address syntax, so an IPv6 address with a port needs brackets.
fn parse_server(s: &str) -> Result<SocketAddr, Error> {
    if let Ok(addr) = IpAddr::from_str(s) {
        return Ok(SocketAddr::new(addr, 53));
    }
    SocketAddr::from_str(s).map_err(|_| Error::Parse)
}

/// Returns a reference to the next word or an error.
fn next_word<'a>(words: &mut SplitWhitespace<'a>) -> Result<&'a str, Error> {
    words.next().ok_or(Error::Parse)
}

/// Returns nothing but errors out if there are words left.
fn no_more_words(mut words: SplitWhitespace) -> Result<(), Error> {
    match words.next() {
        Some(..) => Err(Error::Parse),
        None => Ok(()),
    }
}

/// Splits the name and argument from an option with arguments.
///
/// These options consist of a name followed by a colon followed by a
/// `usize` value.
fn split_arg(s: &str) -> Result<(&str, Option<usize>), Error> {
    match s.find(':') {
        Some(idx) => {
            let (left, right) = s.split_at(idx);
            Ok((left, Some(usize::from_str(&right[1..])?)))
        }
        None => Ok((s, None)),
    }
}

//------------ Error ---------------------------------------------------------

/// The error that can happen when parsing the configuration.
#[derive(Debug)]
pub enum Error {
    /// The file is not a proper configuration file.
    Parse,

    /// Something happened while reading.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse => write!(f, "error parsing configuration"),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Parse => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(_: std::num::ParseIntError) -> Error {
        Error::Parse
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_resolv_conf() {
        let mut conf = ResolvConf::new();
        let data = "nameserver 192.0.2.0\n\
                    nameserver 192.0.2.1\n\
                    # a comment\n\
                    search example.com\n\
                    options timeout:1 attempts:3 rotate\n"
            .to_string();
        assert!(conf.parse(&mut io::Cursor::new(data)).is_ok());
        assert_eq!(
            conf.servers,
            vec![
                "192.0.2.0:53".parse().unwrap(),
                "192.0.2.1:53".parse().unwrap()
            ]
        );
        assert_eq!(conf.timeout, Duration::from_secs(1));
        assert_eq!(conf.attempts, 3);
    }

    #[test]
    fn parse_server_splits_ports() {
        assert_eq!(
            parse_server("192.0.2.1").unwrap(),
            "192.0.2.1:53".parse().unwrap()
        );
        assert_eq!(
            parse_server("192.0.2.1:5353").unwrap(),
            "192.0.2.1:5353".parse().unwrap()
        );
        assert_eq!(
            parse_server("2001:db8::1").unwrap(),
            "[2001:db8::1]:53".parse().unwrap()
        );
        assert_eq!(
            parse_server("[2001:db8::1]:5353").unwrap(),
            "[2001:db8::1]:5353".parse().unwrap()
        );
        assert!(parse_server("not an address").is_err());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let config = ResolverConfig {
            conf_path: PathBuf::from("/nonexistent/resolv.conf"),
            ..Default::default()
        };
        let conf = ResolvConf::load(&config);
        assert_eq!(conf.servers, vec!["127.0.0.1:53".parse().unwrap()]);
        assert_eq!(conf.timeout, Duration::from_secs(5));
        assert_eq!(conf.attempts, 2);
    }

    #[test]
    fn explicit_options_take_precedence() {
        let config = ResolverConfig {
            nameservers: vec![
                "192.0.2.1".into(),
                "192.0.2.2:5353".into(),
                "bogus entry".into(),
            ],
            retransmissions: Some(4),
            timeout: Some(Duration::from_millis(2500)),
            conf_path: PathBuf::from("/nonexistent/resolv.conf"),
            ..Default::default()
        };
        let conf = ResolvConf::load(&config);
        assert_eq!(
            conf.servers,
            vec![
                "192.0.2.1:53".parse().unwrap(),
                "192.0.2.2:5353".parse().unwrap()
            ]
        );
        assert_eq!(conf.attempts, 4);
        assert_eq!(conf.timeout, Duration::from_millis(2500));
    }
}
