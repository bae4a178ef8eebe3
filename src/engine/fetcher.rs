// One persistence task: stream a derivative to disk, then extract any
// nested references before the task settles.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::progress::ProgressSink;
use crate::extract::container::{classify, ContainerKind};
use crate::extract::nested;
use crate::source::traits::DerivativeSource;
use crate::urn::DerivativeUrn;

/// Shared context handed to every spawned persistence task. The held sender
/// keeps the work queue open for continuation submissions until the last
/// task drops its clone.
pub(crate) struct TaskContext {
    pub source: Arc<dyn DerivativeSource>,
    pub urn: String,
    pub output_dir: PathBuf,
    pub submissions: UnboundedSender<DerivativeUrn>,
    pub progress: Arc<dyn ProgressSink>,
}

impl TaskContext {
    pub(crate) fn submit(&self, reference: DerivativeUrn) {
        // The receiver outlives every task; a send can only fail after the
        // drain loop is gone, at which point the run is already over.
        let _ = self.submissions.send(reference);
    }
}

/// Fetch one derivative to its mirrored local path, then run the container
/// continuation. Any references the continuation discovers are submitted
/// before this task settles, so the drain loop's next snapshot sees them.
pub(crate) async fn persist_one(ctx: Arc<TaskContext>, reference: DerivativeUrn) -> Result<()> {
    debug!("fetching: {}", reference);

    let path = ctx.output_dir.join(reference.local_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut stream = ctx
        .source
        .derivative_stream(&ctx.urn, reference.as_str())
        .await?;
    let mut file = fs::File::create(&path).await?;
    while let Some(chunk) = stream.try_next().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    debug!("saved to: {}", path.display());
    ctx.progress.on_completed();

    match classify(&reference) {
        ContainerKind::SvfArchive => {
            let data = fs::read(&path).await?;
            let manifest = nested::manifest_from_archive(&data)?;
            nested::submit_assets(&manifest, &reference, &mut |r| ctx.submit(r));
        }
        ContainerKind::SheetGraphics => {
            // Fetched directly as a stream; never enters the registry and
            // does not count toward discovery/completion.
            let sibling = reference.resolve(nested::SIBLING_MANIFEST_NAME);
            let mut stream = ctx
                .source
                .derivative_stream(&ctx.urn, sibling.as_str())
                .await?;
            let mut compressed = Vec::new();
            while let Some(chunk) = stream.try_next().await? {
                compressed.extend_from_slice(&chunk);
            }
            let manifest = nested::manifest_from_gzip(&compressed)?;
            nested::submit_assets(&manifest, &reference, &mut |r| ctx.submit(r));
        }
        ContainerKind::Opaque => {}
    }

    Ok(())
}
