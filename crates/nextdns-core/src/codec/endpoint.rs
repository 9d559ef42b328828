//! Endpoint addresses derived from a profile identifier
//!
//! NextDNS assigns every profile its own DoH URL, DoT hostname and a pair of
//! IPv6 anycast addresses. All of them are a pure function of the profile
//! id, so they are computed locally instead of being fetched.

/// Domain name of the NextDNS service
pub const NEXTDNS_DOMAIN: &str = "nextdns.io";

/// Network prefixes of the primary and secondary IPv6 resolvers
pub const IPV6_PREFIXES: [&str; 2] = ["2a07:a8c0::", "2a07:a8c1::"];

/// DNS-over-HTTPS endpoint for a profile
pub fn doh_address(profile_id: &str) -> String {
    format!("https://dns.{}/{}", NEXTDNS_DOMAIN, profile_id)
}

/// DNS-over-TLS hostname for a profile
pub fn dot_address(profile_id: &str) -> String {
    format!("{}.dns.{}", profile_id, NEXTDNS_DOMAIN)
}

/// Low-order IPv6 groups assigned to a profile
///
/// The id is read right to left and cut into quartets of lowercase hex
/// digits, so the last four characters always form the final group and a
/// short leading remainder becomes the first group (`abc123` → `ab:c123`).
/// Characters outside `[0-9a-f]` never start a quartet and are copied
/// through unchanged.
pub fn ipv6_suffix(profile_id: &str) -> String {
    let reversed: Vec<u8> = profile_id.bytes().rev().collect();

    let mut chunked = Vec::with_capacity(reversed.len() + reversed.len() / 4);
    let mut i = 0;
    while i < reversed.len() {
        let quartet = reversed.get(i..i + 4);
        match quartet {
            Some(q) if q.iter().all(is_lower_hex) => {
                chunked.extend_from_slice(q);
                chunked.push(b':');
                i += 4;
            }
            _ => {
                chunked.push(reversed[i]);
                i += 1;
            }
        }
    }

    chunked.reverse();
    let formatted = String::from_utf8_lossy(&chunked).into_owned();
    match formatted.strip_prefix(':') {
        Some(stripped) => stripped.to_string(),
        None => formatted,
    }
}

/// Both resolver addresses for a profile (primary first)
pub fn ipv6_addresses(profile_id: &str) -> Vec<String> {
    let suffix = ipv6_suffix(profile_id);
    IPV6_PREFIXES
        .iter()
        .map(|prefix| format!("{}{}", prefix, suffix))
        .collect()
}

fn is_lower_hex(b: &u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}
