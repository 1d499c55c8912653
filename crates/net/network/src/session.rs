//! `PeerSession`: drives one handshaken [`P2PStream`] to completion,
//! multiplexing outbound commands, inbound frames, and the `PING`/`PONG`
//! keepalive cycle, per `spec.md` §4.B/§4.C.

use std::{sync::Arc, time::Duration};

use reth_eth_wire::{
    DisconnectReason, EthMessage, IncomingMessage, P2PMessage, P2PStream, PeerId,
    SharedCapability, PING_INTERVAL, PING_TIMEOUT,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use tracing::{debug, trace};

use crate::metrics::DisconnectMetrics;

/// Capacity of a session's outbound command queue.
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Something the rest of the system asks a session to do.
#[derive(Debug)]
pub enum PeerCommand {
    /// Send an `eth` sub-protocol message to this peer.
    SendEth(EthMessage),
    /// Tear the session down, sending `DISCONNECT(reason)` first.
    Disconnect(DisconnectReason),
}

/// Something a session reports back to the rest of the system, per the
/// "channel of typed events" design note (`spec.md` §9).
#[derive(Debug)]
pub enum SessionEvent {
    /// The handshake completed and the session is ready to exchange
    /// sub-protocol messages.
    Established { peer_id: PeerId, capabilities: Vec<SharedCapability> },
    /// An `eth` sub-protocol message arrived from this peer.
    Message { peer_id: PeerId, message: EthMessage },
    /// The session ended, with the reason sent or received, if any.
    Disconnected { peer_id: PeerId, reason: Option<DisconnectReason> },
}

/// A cloneable handle to a running session's command queue.
#[derive(Debug, Clone)]
pub struct PeerSessionHandle {
    peer_id: PeerId,
    commands: mpsc::Sender<PeerCommand>,
}

impl PeerSessionHandle {
    /// This session's peer identity.
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Queues `message` for delivery. Returns `false` if the session has
    /// already ended.
    pub async fn send(&self, message: EthMessage) -> bool {
        self.commands.send(PeerCommand::SendEth(message)).await.is_ok()
    }

    /// Queues a disconnect. No-ops if the session has already ended.
    pub async fn disconnect(&self, reason: DisconnectReason) {
        let _ = self.commands.send(PeerCommand::Disconnect(reason)).await;
    }
}

/// Spawns the session driver task over an already-handshaken `stream` and
/// returns a handle to it. `events` receives [`SessionEvent`]s for the
/// lifetime of the session, ending with exactly one `Disconnected`.
pub fn spawn<S>(
    stream: P2PStream<S>,
    peer_id: PeerId,
    events: mpsc::Sender<SessionEvent>,
    disconnect_metrics: Arc<DisconnectMetrics>,
) -> PeerSessionHandle
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    tokio::spawn(run(stream, peer_id, commands_rx, events, disconnect_metrics));
    PeerSessionHandle { peer_id, commands: commands_tx }
}

async fn run<S>(
    mut stream: P2PStream<S>,
    peer_id: PeerId,
    mut commands: mpsc::Receiver<PeerCommand>,
    events: mpsc::Sender<SessionEvent>,
    disconnect_metrics: Arc<DisconnectMetrics>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let capabilities = stream.capabilities().to_vec();
    if events.send(SessionEvent::Established { peer_id, capabilities }).await.is_err() {
        return;
    }

    let mut ping_ticker = tokio::time::interval(PING_INTERVAL);
    ping_ticker.tick().await;
    let mut awaiting_pong = false;
    let mut timeout_deadline: Option<tokio::time::Instant> = None;

    let (disconnect_reason, sent_ourselves) = 'session: loop {
        let sleep_until = timeout_deadline.unwrap_or_else(|| tokio::time::Instant::now() + PING_INTERVAL);

        tokio::select! {
            _ = ping_ticker.tick() => {
                if awaiting_pong {
                    break 'session (Some(DisconnectReason::Timeout), true);
                }
                if stream.send_p2p_message(&P2PMessage::Ping).await.is_err() {
                    break 'session (Some(DisconnectReason::NetworkError), false);
                }
                awaiting_pong = true;
                timeout_deadline = Some(tokio::time::Instant::now() + PING_TIMEOUT);
            }
            _ = tokio::time::sleep_until(sleep_until), if timeout_deadline.is_some() => {
                break 'session (Some(DisconnectReason::Timeout), true);
            }
            command = commands.recv() => {
                match command {
                    Some(PeerCommand::SendEth(message)) => {
                        if stream.send_eth_message(&message).await.is_err() {
                            break 'session (Some(DisconnectReason::NetworkError), false);
                        }
                    }
                    Some(PeerCommand::Disconnect(reason)) => break 'session (Some(reason), true),
                    None => break 'session (Some(DisconnectReason::ClientQuitting), true),
                }
            }
            incoming = stream.read_message() => {
                match incoming {
                    Ok(IncomingMessage::P2P(P2PMessage::Ping)) => {
                        if stream.send_p2p_message(&P2PMessage::Pong).await.is_err() {
                            break 'session (Some(DisconnectReason::NetworkError), false);
                        }
                    }
                    Ok(IncomingMessage::P2P(P2PMessage::Pong)) => {
                        awaiting_pong = false;
                        timeout_deadline = None;
                    }
                    Ok(IncomingMessage::P2P(P2PMessage::Disconnect(reason))) => {
                        break 'session (Some(reason), false);
                    }
                    Ok(IncomingMessage::P2P(P2PMessage::Hello(_))) => {
                        debug!(target: "net::session", %peer_id, "unexpected HELLO after handshake");
                        break 'session (Some(DisconnectReason::ProtocolError), true);
                    }
                    Ok(IncomingMessage::Eth(message)) => {
                        if events.send(SessionEvent::Message { peer_id, message }).await.is_err() {
                            break 'session (None, false);
                        }
                    }
                    Err(err) => {
                        trace!(target: "net::session", %peer_id, %err, "session read error");
                        break 'session (Some(DisconnectReason::NetworkError), false);
                    }
                }
            }
        }
    };

    if let Some(reason) = disconnect_reason {
        disconnect_metrics.increment(reason);
        if sent_ourselves {
            let _ = stream.disconnect(reason).await;
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    let _ = events.send(SessionEvent::Disconnected { peer_id, reason: disconnect_reason }).await;
}

/// Test-only handle construction for other modules in this crate that need
/// to observe commands queued to a session without a live `P2PStream`.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn handle_with_commands(peer_id: PeerId) -> (PeerSessionHandle, mpsc::Receiver<PeerCommand>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        (PeerSessionHandle { peer_id, commands: tx }, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_fails_once_the_session_has_ended() {
        let (tx, rx) = mpsc::channel::<PeerCommand>(1);
        drop(rx);
        let handle = PeerSessionHandle { peer_id: PeerId::ZERO, commands: tx };
        assert_eq!(handle.peer_id(), PeerId::ZERO);
        assert!(!handle.send(EthMessage::Status(sample_status())).await);
    }

    fn sample_status() -> reth_eth_wire_types::Status {
        reth_eth_wire_types::Status {
            version: 68,
            network_id: 1,
            total_difficulty: Default::default(),
            blockhash: Default::default(),
            genesis: Default::default(),
            fork_id: Default::default(),
        }
    }
}
