//! Built-in DNSBL zone registry.
//!
//! The default list probed when the configuration does not supply its own.
//! Order matters: zones are queried in this order for every address.

const DEFAULT_BLACKLISTS: &[&str] = &[
    "access.redhawk.org",
    "b.barracudacentral.org",
    "bl.spamcop.net",
    "blackholes.mail-abuse.org",
    "bogons.cymru.com",
    "cdl.anti-spam.org.cn",
    "db.wpbl.info",
    "dnsbl-1.uceprotect.net",
    "dnsbl-2.uceprotect.net",
    "dnsbl.dronebl.org",
    "dnsbl.sorbs.net",
    "drone.abuse.ch",
    "dul.dnsbl.sorbs.net",
    "http.dnsbl.sorbs.net",
    "httpbl.abuse.ch",
    "ips.backscatterer.org",
    "ix.dnsbl.manitu.net",
    "multi.surbl.org",
    "netblock.pedantic.org",
    "psbl.surriel.com",
    "query.senderbase.org",
    "rbl-plus.mail-abuse.org",
    "rbl.efnetrbl.org",
    "rbl.spamlab.com",
    "relays.mail-abuse.org",
    "short.rbl.jp",
    "smtp.dnsbl.sorbs.net",
    "socks.dnsbl.sorbs.net",
    "spam.dnsbl.sorbs.net",
    "spamguard.leadmon.net",
    "spamrbl.imp.ch",
    "ubl.unsubscore.com",
    "web.dnsbl.sorbs.net",
    "wormrbl.imp.ch",
    "zombie.dnsbl.sorbs.net",
    "rbl.rtbh.com.tr",
];

/// Get the built-in DNSBL zones in probe order.
///
/// # Examples
///
/// ```rust
/// use dnsbl_check_lib::default_blacklists;
///
/// let zones = default_blacklists();
/// assert!(zones.contains(&"bl.spamcop.net".to_string()));
/// ```
pub fn default_blacklists() -> Vec<String> {
    DEFAULT_BLACKLISTS.iter().map(|s| s.to_string()).collect()
}

/// Check whether a zone is part of the built-in list.
pub fn is_default_blacklist(zone: &str) -> bool {
    let zone = zone.trim().trim_end_matches('.');
    DEFAULT_BLACKLISTS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(zone))
}

/// Basic syntax check for a user-supplied zone name.
///
/// Rejects empty names, whitespace, leading/trailing dots, empty labels and
/// labels longer than 63 bytes.
pub fn is_valid_zone(zone: &str) -> bool {
    if zone.is_empty() || zone.len() > 253 {
        return false;
    }
    if zone.starts_with('.') || zone.ends_with('.') {
        return false;
    }

    zone.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}
