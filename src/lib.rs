//! A thread-per-stage line processing pipeline with bounded blocking buffers.
//!
//! Lines flow from a reader endpoint through an ordered chain of transform
//! stages to a writer endpoint. Each stage runs on its own thread; adjacent
//! stages are connected by a bounded FIFO [`Buffer`] that blocks producers
//! when full and consumers when empty, so the buffers carry all flow
//! control. Shutdown propagates forward: closing a buffer drains it, then
//! each stage closes its own output on end-of-stream until the signal
//! reaches the writer.
//!
//! # Features
//!
//! - Bounded blocking buffers with one-shot close-and-drain semantics
//! - Strict per-buffer FIFO ordering and ownership transfer on push
//! - Loss-free forward shutdown, on the `<END>` sentinel or EOF
//! - Built-in transform registry (`upper`, `lower`, `reverse`, `trim`,
//!   `prefix`, `suffix`) plus a factory hook for custom transforms
//! - Per-stage drop accounting surfaced in a final report
//!
//! # Example
//!
//! ```ignore
//! use line_pipeline::PipelineBuilder;
//! use std::io::Cursor;
//!
//! let pipeline = PipelineBuilder::new()
//!     .transform("trim", None)
//!     .transform("upper", None)
//!     .build()?;
//!
//! let running = pipeline.start(Cursor::new("  hello  \n<END>\n"), Vec::new())?;
//! let report = running.wait()?;
//! assert_eq!(report.lines_written, 1);
//! ```

pub mod buffer;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod pipeline;
pub mod stage;
pub mod transform;

// Re-exports for convenience
pub use buffer::Buffer;
pub use endpoint::END_SENTINEL;
pub use error::{PipelineError, Result};
pub use metrics::StageMetrics;
pub use monitor::{Condition, Monitor};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineReport, RunningPipeline, DEFAULT_CAPACITY};
pub use stage::{StageHandle, StageWorker, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
