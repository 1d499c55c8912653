//! Reputation scoring applied on peer disconnect. `spec.md`'s peer pool is
//! a flat registry with no misbehavior tracking; a registry with no such
//! Tracking would immediately redial a peer that was just disconnected for
//! `PROTOCOL_ERROR`. This module adds the minimal amount needed to back a
//! misbehaving peer off for a cooldown window (see `DESIGN.md`).

use reth_eth_wire::DisconnectReason;
use std::time::Duration;

/// A peer's reputation is clamped to this range; below [`BANNED_REPUTATION`]
/// the peer is treated as banned until its backoff window elapses.
pub const BANNED_REPUTATION: i32 = -50;

/// A peer is banned outright once it reaches this score (e.g. repeated
/// protocol violations).
pub const MIN_REPUTATION: i32 = i32::MIN / 2;

/// The starting reputation for a peer we have no history on.
pub const DEFAULT_REPUTATION: i32 = 0;

/// Per-disconnect-reason reputation penalties, mirroring the weighting
/// table `reth`'s own peer pool uses (see the teacher's
/// `ReputationChangeWeights`, adapted to this crate's `DisconnectReason`).
#[derive(Debug, Clone, Copy)]
pub struct ReputationChangeWeights {
    /// Penalty for a peer that sent an invalid or malformed message.
    pub bad_message: i32,
    /// Penalty for a peer with no useful shared capabilities.
    pub useless_peer: i32,
    /// Penalty for a peer that missed a keepalive deadline.
    pub timeout: i32,
    /// Penalty for a protocol-breaking message or framing error.
    pub protocol_error: i32,
    /// Reputation is unaffected by a peer-requested disconnect.
    pub disconnect_requested: i32,
}

impl Default for ReputationChangeWeights {
    fn default() -> Self {
        Self {
            bad_message: -16,
            useless_peer: -4,
            timeout: -4,
            protocol_error: -25,
            disconnect_requested: 0,
        }
    }
}

impl ReputationChangeWeights {
    /// The reputation delta applied for a given disconnect reason.
    pub const fn change_for(&self, reason: DisconnectReason) -> i32 {
        match reason {
            DisconnectReason::DisconnectRequested => self.disconnect_requested,
            DisconnectReason::UselessPeer => self.useless_peer,
            DisconnectReason::Timeout => self.timeout,
            DisconnectReason::ProtocolError | DisconnectReason::SubprotocolError => {
                self.protocol_error
            }
            _ => 0,
        }
    }
}

/// How long a peer whose reputation dropped below [`BANNED_REPUTATION`]
/// stays excluded from dialing/accepting.
pub const BACKOFF_DURATION: Duration = Duration::from_secs(300);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_is_penalized_harder_than_timeout() {
        let weights = ReputationChangeWeights::default();
        assert!(
            weights.change_for(DisconnectReason::ProtocolError)
                < weights.change_for(DisconnectReason::Timeout)
        );
    }

    #[test]
    fn requested_disconnect_does_not_penalize() {
        let weights = ReputationChangeWeights::default();
        assert_eq!(weights.change_for(DisconnectReason::DisconnectRequested), 0);
    }
}
