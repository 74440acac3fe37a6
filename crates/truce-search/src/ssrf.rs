//! SSRF protection for `fetch_page`: page URLs come from a third-party search
//! API and must never be trusted to resolve to an internal address.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};

use url::Url;

/// Configuration governing which URLs `fetch_page` is allowed to request.
#[derive(Debug, Clone)]
pub struct SsrfConfig {
    /// Allow requests to private IP ranges (default: false).
    pub allow_private_ips: bool,
    /// Allow requests to localhost (default: false).
    pub allow_localhost: bool,
    /// Allow requests to non-standard ports (default: false).
    pub allow_non_standard_ports: bool,
    /// Additional blocked IP addresses.
    pub blocked_ips: Vec<IpAddr>,
}

impl Default for SsrfConfig {
    fn default() -> Self {
        Self {
            allow_private_ips: false,
            allow_localhost: false,
            allow_non_standard_ports: false,
            blocked_ips: Vec::new(),
        }
    }
}

impl SsrfConfig {
    fn is_private_ip(ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(ipv4) => {
                ipv4.is_private()
                    || ipv4.is_loopback()
                    || ipv4.is_link_local()
                    || ipv4.is_multicast()
                    || ipv4.is_unspecified()
                    || ipv4.is_broadcast()
                    || Self::is_documentation_ipv4(ipv4)
                    || Self::is_shared_address_space(ipv4)
                    || Self::is_cloud_metadata_ipv4(ipv4)
            }
            IpAddr::V6(ipv6) => {
                ipv6.is_loopback()
                    || ipv6.is_unspecified()
                    || ipv6.is_multicast()
                    || Self::is_link_local_ipv6(ipv6)
                    || Self::is_unique_local_ipv6(ipv6)
                    || Self::is_documentation_ipv6(ipv6)
                    || ipv6.to_ipv4_mapped().is_some_and(|v4| Self::is_private_ip(&IpAddr::V4(v4)))
            }
        }
    }

    fn is_documentation_ipv4(ip: &Ipv4Addr) -> bool {
        let o = ip.octets();
        (o[0] == 192 && o[1] == 0 && o[2] == 2)
            || (o[0] == 198 && o[1] == 51 && o[2] == 100)
            || (o[0] == 203 && o[1] == 0 && o[2] == 113)
    }

    fn is_shared_address_space(ip: &Ipv4Addr) -> bool {
        let o = ip.octets();
        o[0] == 100 && (o[1] & 0xC0) == 64
    }

    fn is_cloud_metadata_ipv4(ip: &Ipv4Addr) -> bool {
        let o = ip.octets();
        o[0] == 169 && o[1] == 254 && o[2] == 169 && o[3] == 254
    }

    fn is_link_local_ipv6(ip: &Ipv6Addr) -> bool {
        (ip.segments()[0] & 0xffc0) == 0xfe80
    }

    fn is_unique_local_ipv6(ip: &Ipv6Addr) -> bool {
        (ip.segments()[0] & 0xfe00) == 0xfc00
    }

    fn is_documentation_ipv6(ip: &Ipv6Addr) -> bool {
        let s = ip.segments();
        s[0] == 0x2001 && s[1] == 0x0db8
    }

    fn validate_pre_resolve<'a>(&self, url: &'a Url) -> Result<(url::Host<&'a str>, u16, &'a str), String> {
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(format!("scheme '{scheme}' not allowed (only http/https)")),
        }

        let port = url.port_or_known_default().unwrap_or(80);
        if !self.allow_non_standard_ports && port != 80 && port != 443 {
            return Err(format!("port {port} not allowed (only 80/443)"));
        }

        let host_str = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| "URL has no host".to_string())?;
        let host = url.host().ok_or_else(|| "URL has no host".to_string())?;

        Ok((host, port, host_str))
    }

    fn resolve(host: url::Host<&str>, host_str: &str, port: u16) -> Result<Vec<IpAddr>, String> {
        match host {
            url::Host::Ipv4(ip) => Ok(vec![IpAddr::V4(ip)]),
            url::Host::Ipv6(ip) => Ok(vec![IpAddr::V6(ip)]),
            url::Host::Domain(domain) => format!("{domain}:{port}")
                .to_socket_addrs()
                .map(|addrs| addrs.map(|a| a.ip()).collect())
                .map_err(|e| format!("failed to resolve '{host_str}': {e}")),
        }
    }

    fn validate_resolved(&self, ips: &[IpAddr]) -> Result<(), String> {
        for ip in ips {
            if self.blocked_ips.contains(ip) {
                return Err(format!("IP {ip} is explicitly blocked"));
            }
            if !self.allow_private_ips && Self::is_private_ip(ip) {
                return Err(format!("IP {ip} is a private/internal address"));
            }
            if !self.allow_localhost && ip.is_loopback() {
                return Err(format!("localhost/loopback addresses not allowed ({ip})"));
            }
        }
        Ok(())
    }

    /// Validate a URL for SSRF safety, resolving its host. Returns `Err` with
    /// a human-readable reason if the URL must not be fetched.
    pub fn validate_url(&self, url: &Url) -> Result<(), String> {
        let (host, port, host_str) = self.validate_pre_resolve(url)?;
        let resolved = Self::resolve(host, host_str, port)?;
        if resolved.is_empty() {
            return Err(format!("hostname '{host_str}' did not resolve to any IP"));
        }
        self.validate_resolved(&resolved)
    }
}
