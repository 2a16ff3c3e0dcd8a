use core::{fmt, str::FromStr};

use crate::Error;

pub const DEFAULT_PORT: u16 = 1883;

/// Plain TCP broker address, parsed from `mqtt://host[:port]`,
/// `tcp://host[:port]` or a bare `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerAddr {
    pub host: String,
    pub port: u16,
}

impl FromStr for BrokerAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = match s.split_once("://") {
            Some(("mqtt" | "tcp", rest)) => rest,
            Some(("mqtts" | "ssl" | "tls" | "ws" | "wss", _)) => {
                return Err(Error::BadUrl("only plain tcp brokers are supported"));
            }
            Some(_) => return Err(Error::BadUrl("unknown scheme")),
            None => s,
        };

        let authority = rest.trim_end_matches('/');
        if authority.contains(['/', '@']) {
            return Err(Error::BadUrl("expected host[:port]"));
        }

        let (host, port) = match authority.strip_prefix('[') {
            // [v6 address]:port
            Some(bracketed) => match bracketed.split_once(']') {
                Some((host, "")) => (host, None),
                Some((host, port)) => match port.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None => return Err(Error::BadUrl("expected [host]:port")),
                },
                None => return Err(Error::BadUrl("unterminated [host]")),
            },
            None => match authority.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            },
        };

        if host.is_empty() {
            return Err(Error::BadUrl("missing host"));
        }

        let port = match port {
            Some(port) => port.parse().map_err(|_| Error::BadUrl("invalid port"))?,
            None => DEFAULT_PORT,
        };

        Ok(BrokerAddr { host: host.to_owned(), port })
    }
}

impl fmt::Display for BrokerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
