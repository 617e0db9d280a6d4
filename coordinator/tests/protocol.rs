use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use coordinator::{run_coordinator, serve};
use rand::Rng;
use shared::{
    compute::{FractalComputer, RowComputer},
    graphics::{ImageSink, RowSink},
    models::{
        chunk::Chunk,
        fractal::{fractal_descriptor::FractalDescriptor, julia::Julia, mandelbrot::Mandelbrot},
        raster::RasterInfo,
    },
    networking::{coordinator::CoordinatorConfig, local, worker::WorkerConfig},
    scheduling::allocator::QUOTA,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use worker::{error::WorkerResult, run_worker, run_worker_loop, WorkerReport};

/// Wraps a computer, sleeps a random few milliseconds per chunk so replies
/// arrive out of order, and remembers every chunk it was given.
struct Jittered<P> {
    inner: P,
    seen: Arc<Mutex<Vec<Chunk>>>,
}

impl<P: RowComputer> RowComputer for Jittered<P> {
    fn compute(&self, raster: &RasterInfo, chunk: Chunk, pixels: &mut [u8]) {
        let delay = rand::thread_rng().gen_range(0..4);
        std::thread::sleep(Duration::from_millis(delay));
        self.seen.lock().unwrap().push(chunk);
        self.inner.compute(raster, chunk, pixels);
    }
}

#[derive(Default)]
struct CountingSink {
    rows: HashMap<u32, Vec<u8>>,
}

impl RowSink for CountingSink {
    fn render(&mut self, col_offset: u32, start_row: u32, row_count: u32, pixels: &[u8]) {
        assert_eq!(col_offset, 0);
        let cols = pixels.len() / row_count as usize;
        for (i, line) in pixels.chunks_exact(cols).enumerate() {
            let row = start_row + i as u32;
            assert!(
                self.rows.insert(row, line.to_vec()).is_none(),
                "row {row} rendered twice"
            );
        }
    }
}

fn mandelbrot(max_iterations: u32) -> FractalComputer {
    let fractal = FractalDescriptor::Mandelbrot(Mandelbrot::new());
    FractalComputer::new(fractal, max_iterations, fractal.default_range())
}

async fn render_locally(raster: RasterInfo, workers: usize) -> (CountingSink, Vec<Chunk>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut group = local::world(workers + 1);
    let handles: Vec<_> = group
        .drain(1..)
        .map(|mut comm| {
            let computer = Jittered {
                inner: mandelbrot(48),
                seen: Arc::clone(&seen),
            };
            tokio::spawn(async move { run_worker_loop(&mut comm, raster, &computer).await })
        })
        .collect();
    let mut comm = group.pop().unwrap();

    let mut sink = CountingSink::default();
    let report = run_coordinator(&mut comm, raster, &mut sink).await.unwrap();
    assert_eq!(report.rows_rendered, raster.total_rows as u64);

    let mut rows_computed = 0;
    for handle in handles {
        let worker_report = handle.await.unwrap().unwrap();
        rows_computed += worker_report.rows_computed;
    }
    assert_eq!(rows_computed, raster.total_rows as u64);

    let seen = seen.lock().unwrap().clone();
    (sink, seen)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dispatched_chunks_partition_the_raster() {
    for (total_rows, workers) in [(0, 1), (1, 1), (20, 2), (37, 3), (64, 5), (9, 6)] {
        let raster = RasterInfo::new(total_rows, 5);
        let (_, mut seen) = render_locally(raster, workers).await;

        seen.retain(|chunk| !chunk.is_terminal());
        seen.sort_by_key(|chunk| chunk.start_row);
        let mut next_row = 0;
        for chunk in &seen {
            assert_eq!(chunk.start_row, next_row);
            assert!(chunk.row_count <= QUOTA);
            next_row = chunk.end_row() as u32;
        }
        assert_eq!(next_row, total_rows, "{workers} workers over {total_rows} rows");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn image_matches_a_single_pass_whatever_the_reply_order() {
    let raster = RasterInfo::new(45, 24);
    let (sink, _) = render_locally(raster, 4).await;

    let mut expected = vec![0u8; 45 * 24];
    mandelbrot(48).compute(&raster, Chunk::new(0, 45), &mut expected);

    assert_eq!(sink.rows.len(), 45);
    for (row, line) in expected.chunks_exact(24).enumerate() {
        assert_eq!(sink.rows[&(row as u32)], line, "row {row} differs");
    }
}

fn tcp_config(port: u16, fractal: FractalDescriptor, output: PathBuf) -> CoordinatorConfig {
    CoordinatorConfig {
        address: "127.0.0.1".to_string(),
        port,
        workers: 2,
        width: 32,
        height: 21,
        fractal,
        max_iterations: 40,
        output,
    }
}

fn spawn_workers(port: u16, count: usize) -> Vec<JoinHandle<WorkerResult<WorkerReport>>> {
    (0..count)
        .map(|i| {
            let worker = WorkerConfig::new(format!("worker-{i}"), "127.0.0.1".to_string(), port);
            tokio::spawn(async move { run_worker(&worker).await })
        })
        .collect()
}

async fn rows_computed(workers: Vec<JoinHandle<WorkerResult<WorkerReport>>>) -> u64 {
    let mut rows = 0;
    for handle in workers {
        rows += handle.await.unwrap().unwrap().rows_computed;
    }
    rows
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn renders_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let fractal = FractalDescriptor::Julia(Julia::default());
    let config = tcp_config(port, fractal, dir.path().join("julia.png"));
    let workers = spawn_workers(port, 2);

    let report = serve(&listener, &config).await.unwrap();
    assert_eq!(report.rows_rendered, 21);
    assert_eq!(report.chunks_rendered, 3);
    assert_eq!(rows_computed(workers).await, 21);

    let image = image::open(&config.output).unwrap().to_luma8();
    let raster = RasterInfo::new(21, 32);
    let mut expected = ImageSink::new(raster);
    let mut pixels = vec![0u8; 21 * 32];
    FractalComputer::new(fractal, 40, fractal.default_range()).compute(
        &raster,
        Chunk::new(0, 21),
        &mut pixels,
    );
    expected.render(0, 0, 21, &pixels);
    assert_eq!(image.as_raw(), expected.image().as_raw());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_handshakes_do_not_use_up_a_rank() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = tcp_config(
        port,
        FractalDescriptor::Mandelbrot(Mandelbrot::new()),
        dir.path().join("mandelbrot.png"),
    );

    // Hangs up halfway through the length prefix.
    let mut truncated = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    truncated.write_all(b"GE").await.unwrap();
    drop(truncated);

    // Reads as a length prefix of about 1.2 GB.
    let mut http = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    http.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

    let workers = spawn_workers(port, 2);
    let report = serve(&listener, &config).await.unwrap();
    assert_eq!(report.rows_rendered, 21);
    assert_eq!(report.chunks_per_worker.len(), 2);
    assert_eq!(rows_computed(workers).await, 21);
    assert!(config.output.exists());
    drop(http);
}
