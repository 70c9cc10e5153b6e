use crate::buffer::Buffer;
use crate::endpoint;
use crate::error::{PipelineError, Result};
use crate::stage::{StageHandle, StageWorker, Transform};
use crate::transform;
use std::io::{self, BufRead, Write};
use std::thread::{Builder, JoinHandle};
use tracing::debug;

/// Default capacity for each inter-stage buffer
pub const DEFAULT_CAPACITY: usize = 100;

/// Factory producing one transform instance at build time
pub type TransformFactory = Box<dyn FnOnce() -> Result<Box<dyn Transform>> + Send>;

struct StageSpec {
    name: String,
    factory: TransformFactory,
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    capacity: usize,
    stages: Vec<StageSpec>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            stages: Vec::new(),
        }
    }

    /// Set the capacity of every inter-stage buffer
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Append a stage backed by an arbitrary transform factory
    pub fn stage(
        mut self,
        name: impl Into<String>,
        factory: impl FnOnce() -> Result<Box<dyn Transform>> + Send + 'static,
    ) -> Self {
        self.stages.push(StageSpec {
            name: name.into(),
            factory: Box::new(factory),
        });
        self
    }

    /// Append a stage resolved from the built-in transform registry
    pub fn transform(self, name: &str, config: Option<&str>) -> Self {
        let owned_name = name.to_string();
        let owned_config = config.map(str::to_string);
        self.stage(name, move || {
            transform::create(&owned_name, owned_config.as_deref())
        })
    }

    /// Resolve every stage factory and allocate the buffer chain.
    ///
    /// No threads exist yet, so a failing factory aborts construction with
    /// nothing to unwind beyond the buffers themselves.
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages);
        }

        let mut transforms = Vec::with_capacity(self.stages.len());
        for spec in self.stages {
            transforms.push((spec.name, (spec.factory)()?));
        }

        // N stages need N+1 buffers; stage i runs between buffers i and i+1
        let buffers = (0..=transforms.len())
            .map(|_| Buffer::new(self.capacity))
            .collect();

        Ok(Pipeline {
            transforms,
            buffers,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An assembled pipeline, ready to start
pub struct Pipeline {
    transforms: Vec<(String, Box<dyn Transform>)>,
    buffers: Vec<Buffer<Vec<u8>>>,
}

impl Pipeline {
    /// Names of the assembled stages, in pipeline order
    pub fn stage_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Spawn every worker plus the reader and writer endpoints.
    ///
    /// The reader feeds the first buffer from `source` until the sentinel
    /// or EOF; the writer drains the last buffer into `sink`. If any thread
    /// fails to spawn, all buffers are closed and already-started workers
    /// are joined before the error surfaces.
    pub fn start<R, W>(self, source: R, sink: W) -> Result<RunningPipeline>
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        let buffers = self.buffers;
        let mut workers: Vec<StageHandle> = Vec::with_capacity(self.transforms.len());

        for (index, (_, transform)) in self.transforms.into_iter().enumerate() {
            let input = buffers[index].clone();
            let output = buffers[index + 1].clone();
            match StageWorker::spawn(transform, input, output) {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    rollback(&buffers, workers);
                    return Err(err);
                }
            }
        }

        let reader = {
            let input = buffers[0].clone();
            Builder::new()
                .name("pipeline-reader".into())
                .spawn(move || endpoint::read_into(source, &input))
        };
        let reader = match reader {
            Ok(handle) => handle,
            Err(source) => {
                rollback(&buffers, workers);
                return Err(PipelineError::Spawn {
                    thread: "pipeline-reader".into(),
                    source,
                });
            }
        };

        let writer = {
            let output = buffers[buffers.len() - 1].clone();
            Builder::new()
                .name("pipeline-writer".into())
                .spawn(move || endpoint::write_from(sink, &output))
        };
        let writer = match writer {
            Ok(handle) => handle,
            Err(source) => {
                rollback(&buffers, workers);
                // The reader exits once its buffer rejects a push or its
                // source ends; it cannot be interrupted mid-read, so it is
                // left to finish on its own
                return Err(PipelineError::Spawn {
                    thread: "pipeline-writer".into(),
                    source,
                });
            }
        };

        Ok(RunningPipeline {
            first_buffer: buffers[0].clone(),
            reader,
            workers,
            writer,
        })
    }
}

/// Close every buffer and join the workers started so far
fn rollback(buffers: &[Buffer<Vec<u8>>], workers: Vec<StageHandle>) {
    for buffer in buffers {
        buffer.close();
    }
    for worker in workers {
        let _ = worker.join();
    }
}

/// A started pipeline whose threads are processing lines
pub struct RunningPipeline {
    first_buffer: Buffer<Vec<u8>>,
    reader: JoinHandle<io::Result<u64>>,
    workers: Vec<StageHandle>,
    writer: JoinHandle<io::Result<u64>>,
}

impl RunningPipeline {
    /// Wait for the pipeline to drain and every thread to terminate.
    ///
    /// Join order follows the data flow: reader, each worker in pipeline
    /// order, writer. By the time this returns no thread references any
    /// buffer, so dropping the pipeline releases everything.
    pub fn wait(self) -> Result<PipelineReport> {
        let lines_read = self
            .reader
            .join()
            .map_err(|_| PipelineError::Panic("reader"))?
            .map_err(|source| PipelineError::Endpoint {
                endpoint: "input",
                source,
            })?;

        let mut lines_dropped = 0;
        for worker in self.workers {
            let metrics = worker.metrics().clone();
            worker.join()?;
            lines_dropped += metrics.total_dropped();
        }

        let lines_written = self
            .writer
            .join()
            .map_err(|_| PipelineError::Panic("writer"))?
            .map_err(|source| PipelineError::Endpoint {
                endpoint: "output",
                source,
            })?;

        let report = PipelineReport {
            lines_read,
            lines_written,
            lines_dropped,
        };
        debug!(summary = %report.summary(), "pipeline drained");
        Ok(report)
    }

    /// Stop the pipeline from outside: close the first buffer and drain.
    ///
    /// Lines already in flight are still processed and written; the close
    /// signal then walks the chain exactly as on normal end-of-input.
    pub fn abort(self) -> Result<PipelineReport> {
        self.first_buffer.close();
        self.wait()
    }
}

/// Line accounting for one complete pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    /// Lines the reader produced into the first buffer
    pub lines_read: u64,
    /// Lines the writer emitted from the last buffer
    pub lines_written: u64,
    /// Lines dropped by transform failures across all stages
    pub lines_dropped: u64,
}

impl PipelineReport {
    /// Format the report as a human-readable string
    pub fn summary(&self) -> String {
        format!(
            "read: {}, written: {}, dropped: {}",
            self.lines_read, self.lines_written, self.lines_dropped
        )
    }
}
