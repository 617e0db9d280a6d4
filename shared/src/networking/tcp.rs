//! Group over TCP: the coordinator accepts one connection per worker.

use std::time::Duration;

use log::{debug, error, info};
use tokio::{
    io::AsyncReadExt,
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
    time::timeout,
};

use crate::protocol::{CapacityClass, MessageCodec, MessageTag};

use super::{
    error::NetworkingError,
    handshake::{Handshake, Job, WorkerHello},
    read_frame_header, read_json_message,
    result::NetworkingResult,
    write_frame, write_json_message, Communicator, Rank, Source, Status, COORDINATOR_RANK,
};

/// How long a fresh connection has to introduce itself.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Frame {
    source: Rank,
    tag: MessageTag,
    body: Vec<u8>,
}

/// Coordinator side. Rank `r` is the `r`-th accepted connection.
pub struct TcpHub {
    writers: Vec<OwnedWriteHalf>,
    worker_names: Vec<String>,
    inbox: Receiver<NetworkingResult<Frame>>,
    readers: Vec<JoinHandle<()>>,
}

impl TcpHub {
    /// Waits for exactly `workers` connections and hands each its rank and the job.
    ///
    /// A connection that fails the handshake is logged and dropped without
    /// using up a rank.
    pub async fn accept(listener: &TcpListener, workers: usize, job: Job) -> NetworkingResult<Self> {
        let size = workers + 1;
        let capacity = MessageCodec::new(job.raster).max_encoded_size(CapacityClass::Full);
        let (tx, inbox) = mpsc::channel(size);

        let mut writers = Vec::with_capacity(workers);
        let mut worker_names = Vec::with_capacity(workers);
        let mut readers = Vec::with_capacity(workers);

        while writers.len() < workers {
            let rank = writers.len() + 1;
            let (mut socket, peer) = listener.accept().await?;
            let hello = match greet(&mut socket, rank, size, job).await {
                Ok(hello) => hello,
                Err(e) => {
                    error!("Handshake with {} failed: {}", peer, e);
                    continue;
                }
            };
            info!(
                "Worker {} connected from {} as rank {}/{}",
                hello.worker_name, peer, rank, workers
            );

            let (reader, writer) = socket.into_split();
            readers.push(tokio::spawn(pump_frames(rank, reader, tx.clone(), capacity)));
            writers.push(writer);
            worker_names.push(hello.worker_name);
        }

        Ok(Self {
            writers,
            worker_names,
            inbox,
            readers,
        })
    }

    pub fn worker_name(&self, rank: Rank) -> Option<&str> {
        rank.checked_sub(1)
            .and_then(|index| self.worker_names.get(index))
            .map(String::as_str)
    }
}

/// Reads the worker's hello and answers with its rank and the job.
async fn greet(
    socket: &mut TcpStream,
    rank: Rank,
    size: usize,
    job: Job,
) -> NetworkingResult<WorkerHello> {
    socket.set_nodelay(true)?;
    let hello: WorkerHello = timeout(HANDSHAKE_TIMEOUT, read_json_message(socket))
        .await
        .map_err(|_| NetworkingError::Handshake("no hello received in time".to_string()))??;
    write_json_message(socket, &Handshake { rank, size, job }).await?;
    Ok(hello)
}

impl Drop for TcpHub {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
    }
}

async fn pump_frames(
    source: Rank,
    mut reader: OwnedReadHalf,
    tx: Sender<NetworkingResult<Frame>>,
    capacity: usize,
) {
    loop {
        let frame = match read_frame(source, &mut reader, capacity).await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => {
                debug!("Rank {} closed its connection", source);
                return;
            }
            Err(e) => {
                error!("Failed to read a frame from rank {}: {}", source, e);
                Err(e)
            }
        };
        let failed = frame.is_err();
        if tx.send(frame).await.is_err() || failed {
            return;
        }
    }
}

async fn read_frame(
    source: Rank,
    reader: &mut OwnedReadHalf,
    capacity: usize,
) -> NetworkingResult<Option<Frame>> {
    let Some((tag, len)) = read_frame_header(reader).await? else {
        return Ok(None);
    };
    if len > capacity {
        return Err(NetworkingError::FrameTooLarge { len, capacity });
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    Ok(Some(Frame { source, tag, body }))
}

impl Communicator for TcpHub {
    fn rank(&self) -> Rank {
        COORDINATOR_RANK
    }

    fn size(&self) -> usize {
        self.writers.len() + 1
    }

    async fn send(&mut self, dest: Rank, tag: MessageTag, body: &[u8]) -> NetworkingResult<()> {
        let size = self.size();
        let writer = dest
            .checked_sub(1)
            .and_then(|index| self.writers.get_mut(index))
            .ok_or(NetworkingError::UnknownRank { rank: dest, size })?;
        write_frame(writer, tag, body).await
    }

    async fn recv(&mut self, source: Source, buffer: &mut [u8]) -> NetworkingResult<Status> {
        let frame = self
            .inbox
            .recv()
            .await
            .ok_or(NetworkingError::ChannelClosed(COORDINATOR_RANK))??;

        if let Source::Rank(expected) = source {
            if expected != frame.source {
                return Err(NetworkingError::UnexpectedSource {
                    expected,
                    actual: frame.source,
                });
            }
        }
        let len = frame.body.len();
        if len > buffer.len() {
            return Err(NetworkingError::FrameTooLarge {
                len,
                capacity: buffer.len(),
            });
        }
        buffer[..len].copy_from_slice(&frame.body);

        Ok(Status {
            source: frame.source,
            tag: frame.tag,
            len,
        })
    }
}

/// Worker side: a single connection to the coordinator.
pub struct TcpWorkerLink {
    stream: TcpStream,
    rank: Rank,
    size: usize,
}

impl TcpWorkerLink {
    /// Connects, introduces itself and returns the link with the job to run.
    pub async fn connect(addr: &str, worker_name: &str) -> NetworkingResult<(Self, Job)> {
        let mut stream = match TcpStream::connect(addr).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to connect to coordinator at {}: {}", addr, e);
                return Err(e.into());
            }
        };
        stream.set_nodelay(true)?;
        info!("Connected to coordinator at {}", addr);

        write_json_message(&mut stream, &WorkerHello::new(worker_name.to_string())).await?;
        let handshake: Handshake = read_json_message(&mut stream).await?;
        if handshake.rank == COORDINATOR_RANK || handshake.rank >= handshake.size {
            return Err(NetworkingError::Handshake(format!(
                "rank {} is invalid in a group of {}",
                handshake.rank, handshake.size
            )));
        }
        info!(
            "Joined as rank {}/{} for a {}x{} raster",
            handshake.rank,
            handshake.size - 1,
            handshake.job.raster.total_cols,
            handshake.job.raster.total_rows
        );

        Ok((
            Self {
                stream,
                rank: handshake.rank,
                size: handshake.size,
            },
            handshake.job,
        ))
    }
}

impl Communicator for TcpWorkerLink {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    async fn send(&mut self, dest: Rank, tag: MessageTag, body: &[u8]) -> NetworkingResult<()> {
        if dest != COORDINATOR_RANK {
            return Err(NetworkingError::UnknownRank {
                rank: dest,
                size: self.size,
            });
        }
        write_frame(&mut self.stream, tag, body).await
    }

    async fn recv(&mut self, source: Source, buffer: &mut [u8]) -> NetworkingResult<Status> {
        if let Source::Rank(expected) = source {
            if expected != COORDINATOR_RANK {
                return Err(NetworkingError::UnexpectedSource {
                    expected,
                    actual: COORDINATOR_RANK,
                });
            }
        }
        let (tag, len) = read_frame_header(&mut self.stream)
            .await?
            .ok_or(NetworkingError::ChannelClosed(COORDINATOR_RANK))?;
        if len > buffer.len() {
            return Err(NetworkingError::FrameTooLarge {
                len,
                capacity: buffer.len(),
            });
        }
        self.stream.read_exact(&mut buffer[..len]).await?;

        Ok(Status {
            source: COORDINATOR_RANK,
            tag,
            len,
        })
    }
}
