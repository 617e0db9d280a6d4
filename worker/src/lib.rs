pub mod error;

use log::{debug, info};
use serde::Serialize;
use shared::{
    compute::{FractalComputer, RowComputer},
    models::{chunk::Chunk, raster::RasterInfo},
    networking::{
        allocate_buffer, tcp::TcpWorkerLink, worker::WorkerConfig, Communicator, Rank, Source,
        COORDINATOR_RANK,
    },
    protocol::{CapacityClass, MessageCodec, WorkMessage},
    scheduling::allocator::max_chunk_bytes,
};

use self::error::{WorkerError, WorkerResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub rank: Rank,
    pub chunks_computed: usize,
    pub rows_computed: u64,
}

impl WorkerReport {
    fn record(&mut self, chunk: Chunk) {
        self.chunks_computed += 1;
        self.rows_computed += chunk.row_count as u64;
    }
}

/// Connects to the coordinator and computes rows until told to stop.
pub async fn run_worker(worker: &WorkerConfig) -> WorkerResult<WorkerReport> {
    info!("Worker launched: {}", worker.name);
    let (mut link, job) = TcpWorkerLink::connect(&worker.server_address(), &worker.name).await?;
    let computer = FractalComputer::from_job(&job);
    run_worker_loop(&mut link, job.raster, &computer).await
}

/// Answers each request from the coordinator with the computed rows until a
/// terminate message arrives. Never speaks first.
pub async fn run_worker_loop<C, P>(
    comm: &mut C,
    raster: RasterInfo,
    computer: &P,
) -> WorkerResult<WorkerReport>
where
    C: Communicator,
    P: RowComputer,
{
    let codec = MessageCodec::new(raster);
    let mut recv_buffer = allocate_buffer(codec.max_encoded_size(CapacityClass::Header))?;
    let mut send_buffer = allocate_buffer(codec.max_encoded_size(CapacityClass::Full))?;
    let mut pixels = allocate_buffer(max_chunk_bytes(raster.total_cols))?;

    let mut report = WorkerReport {
        rank: comm.rank(),
        ..WorkerReport::default()
    };

    loop {
        let status = comm
            .recv(Source::Rank(COORDINATOR_RANK), &mut recv_buffer)
            .await?;
        let chunk = match codec.decode(status.tag, &recv_buffer[..status.len])? {
            WorkMessage::Terminate => {
                info!(
                    "Rank {} terminated after {} chunks ({} rows)",
                    report.rank, report.chunks_computed, report.rows_computed
                );
                return Ok(report);
            }
            WorkMessage::Work {
                chunk,
                pixels: None,
            } => chunk,
            WorkMessage::Work { chunk, .. } => return Err(WorkerError::UnexpectedPayload(chunk)),
        };

        let needed = raster.chunk_len(&chunk);
        if needed > pixels.len() {
            return Err(WorkerError::ChunkTooLarge {
                chunk,
                needed,
                capacity: pixels.len(),
            });
        }
        let rows = &mut pixels[..needed];
        computer.compute(&raster, chunk, rows);
        debug!("Rank {} computed {}", report.rank, chunk);

        let encoded = codec.encode(&WorkMessage::reply(chunk, rows), &mut send_buffer)?;
        comm.send(COORDINATOR_RANK, encoded.tag, &send_buffer[..encoded.len]).await?;
        report.record(chunk);
    }
}
