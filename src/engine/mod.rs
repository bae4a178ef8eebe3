// Engine orchestration — reference registry, persistence tasks, progress.

mod fetcher;
pub mod progress;
pub mod registry;

pub use progress::{ProgressCounters, ProgressSink, SpinnerReporter};
pub use registry::{run, RunSummary, TaskFailure};
