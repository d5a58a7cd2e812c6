use axum::http::HeaderMap;
use std::net::{AddrParseError, IpAddr};

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Which peers may speak for a client through forwarding headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ForwardedTrust {
    // Any peer. Clients can pick their own identifier unless a proxy
    // in front rewrites the headers.
    #[default]
    Any,
    // Only these reverse proxies
    Proxies(Vec<IpAddr>),
}

impl ForwardedTrust {
    // "10.0.0.1, 10.0.0.2" -> Proxies; empty input -> Any
    pub fn parse(list: &str) -> Result<Self, AddrParseError> {
        let proxies = list
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<IpAddr>().map(|ip| ip.to_canonical()))
            .collect::<Result<Vec<_>, _>>()?;

        if proxies.is_empty() {
            Ok(Self::Any)
        } else {
            Ok(Self::Proxies(proxies))
        }
    }

    fn trusts(&self, peer: Option<IpAddr>) -> bool {
        match self {
            Self::Any => true,
            Self::Proxies(list) => peer.is_some_and(|ip| list.contains(&ip)),
        }
    }
}

// first x-forwarded-for hop, then x-real-ip, then the peer, then "unknown".
// Headers only count when `trust` accepts the peer.
pub fn client_identifier(headers: &HeaderMap, peer: Option<IpAddr>, trust: &ForwardedTrust) -> String {
    // dual-stack listeners report IPv4 peers as ::ffff:a.b.c.d
    let peer = peer.map(|ip| ip.to_canonical());

    if trust.trusts(peer) {
        if let Some(ip) = forwarded_for(headers) {
            return ip;
        }
        if let Some(ip) = header_value(headers, REAL_IP) {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = header_value(headers, FORWARDED_FOR)?;
    let first = raw.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
