// Dedup registry and drain loop — the fixed-point core of the engine.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::fetcher::{persist_one, TaskContext};
use super::progress::ProgressSink;
use crate::config::FilterConfig;
use crate::manifest::ManifestNode;
use crate::source::traits::DerivativeSource;
use crate::urn::DerivativeUrn;
use crate::walker;

/// Terminal accounting for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Distinct references ever registered.
    pub discovered: u64,
    /// Tasks that settled successfully (file written, continuation done).
    pub completed: u64,
    pub failures: Vec<TaskFailure>,
}

#[derive(Debug)]
pub struct TaskFailure {
    pub reference: String,
    pub reason: String,
}

impl RunSummary {
    /// First unrecoverable error, formatted for the terminal summary.
    pub fn failure_reason(&self) -> Option<String> {
        self.failures
            .first()
            .map(|f| format!("failed to save {}: {}", f.reference, f.reason))
    }
}

/// Persist every derivative reachable from the filtered tree walk plus the
/// transitive closure of nested-manifest discoveries, fetching each distinct
/// reference exactly once.
///
/// Tasks run with unbounded fan-out; a failing task is isolated and never
/// cancels its siblings. The loop only returns once the registry reaches a
/// fixed point: no task in flight and no submission left unseen.
pub async fn run(
    source: Arc<dyn DerivativeSource>,
    urn: &str,
    roots: &[ManifestNode],
    output_dir: &Path,
    filter: &FilterConfig,
    progress: Arc<dyn ProgressSink>,
) -> RunSummary {
    let (tx, mut rx) = mpsc::unbounded_channel::<DerivativeUrn>();

    let ctx = Arc::new(TaskContext {
        source,
        urn: urn.to_string(),
        output_dir: output_dir.to_path_buf(),
        submissions: tx,
        progress: progress.clone(),
    });

    // Seed the queue from the static tree; filtering applies here only.
    walker::walk(roots, filter, &mut |reference| {
        ctx.submit(reference);
    });

    // Owned by this single consumer; continuation producers reach it only
    // through the channel, so no lock is needed.
    let mut seen: HashSet<DerivativeUrn> = HashSet::new();
    let mut tasks: JoinSet<(DerivativeUrn, anyhow::Result<()>)> = JoinSet::new();
    let mut summary = RunSummary::default();

    loop {
        // Register everything submitted since the last pass. A reference
        // with a task already pending, in flight, or settled is ignored.
        while let Ok(reference) = rx.try_recv() {
            if seen.insert(reference.clone()) {
                summary.discovered += 1;
                progress.on_discovered();
                let ctx = Arc::clone(&ctx);
                tasks.spawn(async move {
                    let result = persist_one(Arc::clone(&ctx), reference.clone()).await;
                    (reference, result)
                });
            }
        }

        // Wait for one in-flight task to settle; submissions made by its
        // continuation are picked up on the next pass. With nothing in
        // flight and nothing queued, the fixed point is reached.
        match tasks.join_next().await {
            Some(Ok((_, Ok(())))) => {
                summary.completed += 1;
            }
            Some(Ok((reference, Err(e)))) => {
                warn!("error persisting {}: {:#}", reference, e);
                summary.failures.push(TaskFailure {
                    reference: reference.to_string(),
                    reason: format!("{:#}", e),
                });
            }
            Some(Err(join_error)) => {
                warn!("persistence task panicked: {}", join_error);
                summary.failures.push(TaskFailure {
                    reference: "<unknown>".to_string(),
                    reason: join_error.to_string(),
                });
            }
            None => break,
        }
    }

    info!(
        "run finished: {} of {} derivatives saved, {} failed",
        summary.completed,
        summary.discovered,
        summary.failures.len()
    );
    summary
}
