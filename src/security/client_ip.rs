//! Client address resolution from the configured IP source

use std::net::IpAddr;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::config::IpSource;
use crate::request::IncomingRequest;

/// Parse the first address of a comma-separated forwarding chain
pub fn parse_first_ip(value: &str) -> Option<IpAddr> {
    value
        .split(',')
        .next()
        .and_then(|ip| IpAddr::from_str(ip.trim()).ok())
}

/// Effective client address for the request.
///
/// With a header source the header wins when present and parseable; otherwise the
/// socket peer address is used.
pub fn resolve_client_ip(source: IpSource, request: &IncomingRequest) -> Option<IpAddr> {
    let Some(header) = source.header_name() else {
        return request.peer_addr;
    };

    match request.header(header).map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => match parse_first_ip(value) {
            Some(ip) => {
                debug!("Client IP {} taken from {}", ip, source.as_str());
                Some(ip)
            }
            None => {
                warn!(
                    "Unparseable {} value '{}', falling back to peer address",
                    source.as_str(),
                    value
                );
                request.peer_addr
            }
        },
        None => request.peer_addr,
    }
}
