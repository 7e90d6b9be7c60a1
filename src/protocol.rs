use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// IANA protocol numbers for the protocols that show up in flow logs.
    static ref PROTOCOL_NAMES: HashMap<u8, &'static str> = {
        let mut names = HashMap::new();
        names.insert(1, "icmp");
        names.insert(2, "igmp");
        names.insert(6, "tcp");
        names.insert(17, "udp");
        names.insert(41, "ipv6");
        names.insert(47, "gre");
        names.insert(50, "esp");
        names.insert(58, "ipv6-icmp");
        names.insert(132, "sctp");
        names
    };
}

/// Resolves a protocol number to its canonical lowercase name.
///
/// Numbers without a table entry resolve to their decimal string form
/// (`255` becomes `"255"`), so every number yields a usable name and the
/// pipeline is never blocked by an unrecognized protocol.
pub fn protocol_name(number: u8) -> String {
    match PROTOCOL_NAMES.get(&number) {
        Some(name) => (*name).to_string(),
        None => number.to_string(),
    }
}
