use crate::buffer::Buffer;
use crate::error::{PipelineError, Result};
use crate::metrics::StageMetrics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use tracing::{debug, warn};

/// A line transformation hosted by one pipeline stage.
///
/// Transforms are single-threaded: each instance is owned by exactly one
/// worker. A failure applies to that item only; the worker drops it and
/// keeps going.
pub trait Transform: Send + 'static {
    /// Transform one line, consuming the input and producing an owned output
    fn apply(&mut self, input: Vec<u8>) -> Result<Vec<u8>>;

    /// Get a human-readable name for this transform
    fn name(&self) -> &str {
        "transform"
    }
}

/// One pipeline stage: a worker thread driving a [`Transform`] between an
/// input and an output buffer.
///
/// The worker repeatedly pops, transforms, and pushes. Shutdown propagates
/// forward: when the input reports end-of-stream the worker closes its
/// output before exiting, so the signal walks down the chain stage by stage.
pub struct StageWorker;

impl StageWorker {
    /// Spawn the worker thread for `transform`.
    ///
    /// The buffers are shared handles owned by the assembler; the worker
    /// never closes its input except when its downstream has already gone
    /// away and upstream must be told to stop producing.
    pub fn spawn(
        transform: Box<dyn Transform>,
        input: Buffer<Vec<u8>>,
        output: Buffer<Vec<u8>>,
    ) -> Result<StageHandle> {
        let name = transform.name().to_string();
        let stop = Arc::new(AtomicBool::new(false));
        let metrics = StageMetrics::new();

        let thread = {
            let stop = Arc::clone(&stop);
            let metrics = metrics.clone();
            Builder::new()
                .name(format!("stage-{name}"))
                .spawn(move || run(transform, &input, &output, &stop, &metrics))
                .map_err(|source| PipelineError::Spawn {
                    thread: format!("stage-{name}"),
                    source,
                })?
        };

        Ok(StageHandle {
            name,
            stop,
            metrics,
            thread: Some(thread),
        })
    }
}

/// Worker loop. Exits only after closing a buffer: the output on input-end
/// or stop request, the input when the downstream consumer is already gone.
fn run(
    mut transform: Box<dyn Transform>,
    input: &Buffer<Vec<u8>>,
    output: &Buffer<Vec<u8>>,
    stop: &AtomicBool,
    metrics: &StageMetrics,
) {
    let name = transform.name().to_string();
    debug!(stage = %name, "worker started");
    loop {
        // Cooperative stop, checked at the pop boundary only
        if stop.load(Ordering::Relaxed) {
            output.close();
            break;
        }
        let Some(item) = input.pop() else {
            // Input is closed and drained: propagate downstream and exit
            output.close();
            break;
        };
        match transform.apply(item) {
            Ok(line) => {
                if output.push(line).is_err() {
                    // Downstream consumer died; tell upstream to stop
                    input.close();
                    break;
                }
                metrics.record_processed();
            }
            Err(err) => {
                metrics.record_dropped();
                warn!(stage = %name, %err, "dropping line");
            }
        }
    }
    debug!(
        stage = %name,
        processed = metrics.total_processed(),
        dropped = metrics.total_dropped(),
        "worker exited"
    );
}

/// Handle to a running stage worker
pub struct StageHandle {
    name: String,
    stop: Arc<AtomicBool>,
    metrics: StageMetrics,
    thread: Option<JoinHandle<()>>,
}

impl StageHandle {
    /// Name of the transform this stage hosts
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request a cooperative stop, observed at the worker's next pop
    /// checkpoint. Does not unblock a parked pop; close the stage's input
    /// buffer for that.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Per-stage item accounting
    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    /// Block until the worker thread has terminated
    pub fn join(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| PipelineError::Panic("stage")),
            None => Ok(()),
        }
    }
}
