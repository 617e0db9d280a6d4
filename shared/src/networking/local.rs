//! In-process group: every rank is a task and messages move over channels.

use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::protocol::MessageTag;

use super::{
    error::NetworkingError, result::NetworkingResult, Communicator, Rank, Source, Status,
};

#[derive(Debug)]
struct Packet {
    source: Rank,
    tag: MessageTag,
    body: Vec<u8>,
}

#[derive(Debug)]
pub struct LocalCommunicator {
    rank: Rank,
    // No sender to ourselves, so the inbox closes once every peer is gone.
    peers: Vec<Option<Sender<Packet>>>,
    inbox: Receiver<Packet>,
}

/// Builds a fully connected group of `size` ranks, indexed by rank.
pub fn world(size: usize) -> Vec<LocalCommunicator> {
    // Each rank holds at most one unanswered message per peer.
    let capacity = size.max(1);
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..size).map(|_| mpsc::channel(capacity)).unzip();

    receivers
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| LocalCommunicator {
            rank,
            peers: senders
                .iter()
                .enumerate()
                .map(|(peer, sender)| (peer != rank).then(|| sender.clone()))
                .collect(),
            inbox,
        })
        .collect()
}

impl Communicator for LocalCommunicator {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    async fn send(&mut self, dest: Rank, tag: MessageTag, body: &[u8]) -> NetworkingResult<()> {
        let sender = self
            .peers
            .get(dest)
            .and_then(Option::as_ref)
            .ok_or(NetworkingError::UnknownRank {
                rank: dest,
                size: self.peers.len(),
            })?;
        let packet = Packet {
            source: self.rank,
            tag,
            body: body.to_vec(),
        };
        sender
            .send(packet)
            .await
            .map_err(|_| NetworkingError::ChannelClosed(dest))
    }

    async fn recv(&mut self, source: Source, buffer: &mut [u8]) -> NetworkingResult<Status> {
        let packet = self
            .inbox
            .recv()
            .await
            .ok_or(NetworkingError::ChannelClosed(self.rank))?;

        if let Source::Rank(expected) = source {
            if expected != packet.source {
                return Err(NetworkingError::UnexpectedSource {
                    expected,
                    actual: packet.source,
                });
            }
        }
        let len = packet.body.len();
        if len > buffer.len() {
            return Err(NetworkingError::FrameTooLarge {
                len,
                capacity: buffer.len(),
            });
        }
        buffer[..len].copy_from_slice(&packet.body);

        Ok(Status {
            source: packet.source,
            tag: packet.tag,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_reach_the_addressed_rank() {
        let mut group = world(3);
        let mut second = group.pop().unwrap();
        let mut first = group.pop().unwrap();
        let mut coordinator = group.pop().unwrap();
        assert_eq!(coordinator.size(), 3);
        assert_eq!(second.rank(), 2);

        coordinator.send(2, MessageTag::Work, &[4, 2]).await.unwrap();
        first.send(0, MessageTag::Work, &[1]).await.unwrap();

        let mut buffer = [0u8; 8];
        let status = second.recv(Source::Rank(0), &mut buffer).await.unwrap();
        assert_eq!(status, Status { source: 0, tag: MessageTag::Work, len: 2 });
        assert_eq!(&buffer[..status.len], &[4, 2]);

        let status = coordinator.recv(Source::Any, &mut buffer).await.unwrap();
        assert_eq!(status.source, 1);
        assert_eq!(&buffer[..status.len], &[1]);
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let mut group = world(2);
        let mut worker = group.pop().unwrap();
        let mut coordinator = group.pop().unwrap();

        coordinator.send(1, MessageTag::Work, &[0; 12]).await.unwrap();
        let mut buffer = [0u8; 8];
        let err = worker.recv(Source::Any, &mut buffer).await.unwrap_err();
        assert!(matches!(err, NetworkingError::FrameTooLarge { len: 12, capacity: 8 }));
    }

    #[tokio::test]
    async fn sending_to_self_or_outside_the_group_fails() {
        let mut group = world(2);
        let mut coordinator = group.remove(0);
        assert!(matches!(
            coordinator.send(0, MessageTag::Terminate, &[]).await,
            Err(NetworkingError::UnknownRank { rank: 0, size: 2 })
        ));
        assert!(matches!(
            coordinator.send(5, MessageTag::Terminate, &[]).await,
            Err(NetworkingError::UnknownRank { rank: 5, size: 2 })
        ));
    }

    #[tokio::test]
    async fn inbox_closes_when_every_peer_is_dropped() {
        let mut group = world(2);
        let worker = group.pop().unwrap();
        let mut coordinator = group.pop().unwrap();
        drop(worker);

        let mut buffer = [0u8; 8];
        let err = coordinator.recv(Source::Any, &mut buffer).await.unwrap_err();
        assert!(matches!(err, NetworkingError::ChannelClosed(0)));
    }
}
