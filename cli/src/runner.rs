use coordinator::{error::CoordinatorResult, run_coordinator, server_state::CoordinatorReport};
use log::{error, info};
use shared::{
    compute::FractalComputer,
    graphics::ImageSink,
    models::raster::RasterInfo,
    networking::{coordinator::CoordinatorConfig, local},
};
use worker::run_worker_loop;

/// Runs the coordinator and `config.workers` workers as tasks of this
/// process, connected by channels.
pub async fn run_local(config: &CoordinatorConfig) -> CoordinatorResult<CoordinatorReport> {
    let raster = RasterInfo::new(config.height, config.width);
    let computer = FractalComputer::new(
        config.fractal,
        config.max_iterations,
        config.fractal.default_range(),
    );

    let mut group = local::world(config.workers + 1);
    let handles: Vec<_> = group
        .drain(1..)
        .map(|mut comm| {
            tokio::spawn(async move { run_worker_loop(&mut comm, raster, &computer).await })
        })
        .collect();
    let mut comm = group.remove(0);
    info!("Started {} local workers", handles.len());

    let mut sink = ImageSink::new(raster);
    let report = run_coordinator(&mut comm, raster, &mut sink).await?;

    for handle in handles {
        match handle.await {
            Ok(Ok(report)) => info!(
                "Rank {} computed {} rows in {} chunks",
                report.rank, report.rows_computed, report.chunks_computed
            ),
            Ok(Err(e)) => error!("Worker error: {}", e),
            Err(e) => error!("Worker task failed: {}", e),
        }
    }

    sink.save(&config.output)?;
    Ok(report)
}
