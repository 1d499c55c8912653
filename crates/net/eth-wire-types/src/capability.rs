//! Sub-protocol capabilities and the offset negotiation `HELLO` performs.

use alloy_rlp::{RlpDecodable, RlpEncodable};

/// A single `(name, version)` sub-protocol capability, as advertised in
/// `HELLO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, RlpEncodable, RlpDecodable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capability {
    /// Protocol name, e.g. `"eth"`.
    pub name: String,
    /// Protocol version, e.g. `66`.
    pub version: u8,
}

impl Capability {
    /// Creates a new capability.
    pub fn new(name: impl Into<String>, version: u8) -> Self {
        Self { name: name.into(), version }
    }

    /// The `eth` capability at `version`.
    pub fn eth(version: u8) -> Self {
        Self::new("eth", version)
    }
}

/// A negotiated capability: the shared name/version plus the message ID
/// offset it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCapability {
    /// The negotiated capability.
    pub capability: Capability,
    /// The first message ID this capability's messages occupy; reserved
    /// `HELLO`/`DISCONNECT`/`PING`/`PONG` codes (0-3) and the base protocol
    /// length of 16 come before every offset.
    pub offset: u8,
}

/// Intersects `local` and `remote` capability lists: for each `(name,
/// version)` pair both sides advertise exactly, keeps the highest such
/// version per name, then assigns offsets starting at 16 in lexicographic
/// order of capability name, per `spec.md` §4.B.
pub fn negotiate_capabilities(
    local: &[Capability],
    remote: &[Capability],
) -> Vec<SharedCapability> {
    let mut by_name: std::collections::BTreeMap<String, u8> = std::collections::BTreeMap::new();
    for l in local {
        for r in remote {
            if l.name == r.name && l.version == r.version {
                by_name
                    .entry(l.name.clone())
                    .and_modify(|v| *v = (*v).max(l.version))
                    .or_insert(l.version);
            }
        }
    }

    let mut offset = 16u8;
    by_name
        .into_iter()
        .map(|(name, version)| {
            let assigned = offset;
            offset += 16;
            SharedCapability { capability: Capability::new(name, version), offset: assigned }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_capability_keeps_highest_common_version_at_offset_16() {
        let local = vec![Capability::eth(66), Capability::new("les", 4)];
        let remote = vec![Capability::eth(66), Capability::new("snap", 1)];

        let shared = negotiate_capabilities(&local, &remote);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].capability, Capability::eth(66));
        assert_eq!(shared[0].offset, 16);
    }

    #[test]
    fn empty_intersection_negotiates_nothing() {
        let local = vec![Capability::eth(66)];
        let remote = vec![Capability::new("snap", 1)];
        assert!(negotiate_capabilities(&local, &remote).is_empty());
    }
}
