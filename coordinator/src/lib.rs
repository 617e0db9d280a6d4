pub mod error;
pub mod server_state;

use log::{debug, info};
use shared::{
    graphics::{ImageSink, RowSink},
    models::{chunk::Chunk, raster::RasterInfo},
    networking::{
        allocate_buffer, coordinator::CoordinatorConfig, error::NetworkingError, handshake::Job,
        tcp::TcpHub, Communicator, Rank, Source,
    },
    protocol::{CapacityClass, MessageCodec, WorkMessage},
    scheduling::allocator::WorkAllocator,
};
use tokio::net::TcpListener;

use self::{
    error::{CoordinatorError, CoordinatorResult},
    server_state::{CoordinatorReport, ServerState},
};

/// Binds, waits for the configured number of workers, renders the raster and
/// saves it to `config.output`.
pub async fn run_server(config: &CoordinatorConfig) -> CoordinatorResult<CoordinatorReport> {
    let server_addr = config.bind_address();
    let listener = TcpListener::bind(&server_addr)
        .await
        .map_err(NetworkingError::from)?;
    info!(
        "Coordinator listening on {}, waiting for {} workers",
        server_addr, config.workers
    );
    serve(&listener, config).await
}

/// Same as [`run_server`] on an already bound listener.
pub async fn serve(
    listener: &TcpListener,
    config: &CoordinatorConfig,
) -> CoordinatorResult<CoordinatorReport> {
    let raster = RasterInfo::new(config.height, config.width);
    let job = Job {
        raster,
        fractal: config.fractal,
        max_iterations: config.max_iterations,
        range: config.fractal.default_range(),
    };

    let mut hub = TcpHub::accept(listener, config.workers, job).await?;
    let mut sink = ImageSink::new(raster);
    let report = run_coordinator(&mut hub, raster, &mut sink).await?;
    for (rank, chunks) in &report.chunks_per_worker {
        info!(
            "Rank {} ({}) answered {} chunks",
            rank,
            hub.worker_name(*rank).unwrap_or("unknown"),
            chunks
        );
    }
    drop(hub);

    debug!("{} rows reached the image", sink.rows_rendered());
    sink.save(&config.output)?;
    Ok(report)
}

/// Hands out every row of `raster` to the workers of `comm` and forwards the
/// finished rows to `sink`.
///
/// Each worker holds exactly one chunk at a time. Whoever replies first is
/// given the next chunk; once rows run out the outstanding replies are
/// collected and each worker is told to terminate.
pub async fn run_coordinator<C, S>(
    comm: &mut C,
    raster: RasterInfo,
    sink: &mut S,
) -> CoordinatorResult<CoordinatorReport>
where
    C: Communicator,
    S: RowSink,
{
    let workers = comm.size().saturating_sub(1);
    let mut state = ServerState::new(workers);
    if workers == 0 {
        if raster.total_rows == 0 {
            return Ok(state.into_report());
        }
        return Err(CoordinatorError::NoWorkers(raster.total_rows));
    }

    let codec = MessageCodec::new(raster);
    let mut allocator = WorkAllocator::new(raster.total_rows);
    let mut recv_buffer = allocate_buffer(codec.max_encoded_size(CapacityClass::Full))?;
    let mut send_buffer = allocate_buffer(codec.max_encoded_size(CapacityClass::Header))?;

    for rank in 1..=workers {
        let chunk = allocator.next_chunk();
        dispatch(comm, &codec, &mut send_buffer, &mut state, rank, chunk).await?;
    }
    info!(
        "Sent initial work to {} workers for {}x{} pixels",
        workers, raster.total_cols, raster.total_rows
    );

    while !allocator.is_exhausted() {
        let rank = collect(comm, &codec, &mut recv_buffer, &mut state, sink).await?;
        let chunk = allocator.next_chunk();
        debug!("Rank {} is free, sending {}", rank, chunk);
        dispatch(comm, &codec, &mut send_buffer, &mut state, rank, chunk).await?;
    }

    info!(
        "All {} rows assigned, draining {} replies",
        allocator.rows_allocated(),
        state.in_flight()
    );
    for _ in 0..workers {
        let rank = collect(comm, &codec, &mut recv_buffer, &mut state, sink).await?;
        let encoded = codec.encode(&WorkMessage::Terminate, &mut send_buffer)?;
        comm.send(rank, encoded.tag, &send_buffer[..encoded.len]).await?;
        debug!("Rank {} terminated", rank);
    }

    let report = state.into_report();
    info!(
        "Rendered {} rows in {} chunks",
        report.rows_rendered, report.chunks_rendered
    );
    Ok(report)
}

async fn dispatch<C: Communicator>(
    comm: &mut C,
    codec: &MessageCodec,
    send_buffer: &mut [u8],
    state: &mut ServerState,
    rank: Rank,
    chunk: Chunk,
) -> CoordinatorResult<()> {
    let encoded = codec.encode(&WorkMessage::request(chunk), send_buffer)?;
    comm.send(rank, encoded.tag, &send_buffer[..encoded.len]).await?;
    state.assign(rank, chunk);
    Ok(())
}

/// Waits for the next reply from any worker, renders it and returns who sent it.
async fn collect<C: Communicator, S: RowSink>(
    comm: &mut C,
    codec: &MessageCodec,
    recv_buffer: &mut [u8],
    state: &mut ServerState,
    sink: &mut S,
) -> CoordinatorResult<Rank> {
    let status = comm.recv(Source::Any, recv_buffer).await?;
    let rank = status.source;

    let (chunk, pixels) = match codec.decode(status.tag, &recv_buffer[..status.len])? {
        WorkMessage::Work { chunk, pixels } => (chunk, pixels),
        WorkMessage::Terminate => return Err(CoordinatorError::UnexpectedTerminate(rank)),
    };
    state.complete(rank, chunk)?;

    match pixels {
        Some(pixels) => sink.render(0, chunk.start_row, chunk.row_count, pixels),
        None if codec.raster().chunk_len(&chunk) == 0 => {}
        None => return Err(CoordinatorError::MissingPayload { rank, chunk }),
    }
    Ok(rank)
}
