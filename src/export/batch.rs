//! Concurrent export of several resource kinds
//!
//! Each kind runs its blocking provider calls on the blocking pool, with at
//! most `parallelism` kinds in flight. One kind failing never cancels the
//! others.

use std::sync::Arc;
use tokio::sync::Semaphore;

use super::error::{ExportError, ExportResult};
use super::kind::ResourceKind;

/// Outcome of exporting a single kind
#[derive(Debug)]
pub struct KindResult<T> {
    pub kind: ResourceKind,
    pub outcome: ExportResult<T>,
}

/// Run `export_fn` for every kind, returning results in input order
pub async fn export_parallel<T, F>(
    kinds: Vec<ResourceKind>,
    parallelism: usize,
    export_fn: F,
) -> Vec<KindResult<T>>
where
    T: Send + 'static,
    F: Fn(ResourceKind) -> ExportResult<T> + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let export_fn = Arc::new(export_fn);

    let mut handles = Vec::new();

    for kind in kinds {
        let semaphore = semaphore.clone();
        let export_fn = export_fn.clone();

        let handle = tokio::spawn(export_one(semaphore, export_fn, kind));
        handles.push((kind, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (kind, handle) in handles {
        let outcome = handle.await.unwrap_or_else(|e| {
            Err(ExportError::ProviderApi(format!("Export task failed: {}", e)))
        });
        results.push(KindResult { kind, outcome });
    }

    results
}

/// Wait for a permit, then run one export on the blocking pool
async fn export_one<T, F>(
    semaphore: Arc<Semaphore>,
    export_fn: Arc<F>,
    kind: ResourceKind,
) -> ExportResult<T>
where
    T: Send + 'static,
    F: Fn(ResourceKind) -> ExportResult<T> + Send + Sync + 'static,
{
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| ExportError::ProviderApi(format!("Scheduler closed: {}", e)))?;

    tokio::task::spawn_blocking(move || export_fn(kind))
        .await
        .unwrap_or_else(|e| Err(ExportError::ProviderApi(format!("Export task panicked: {}", e))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let results = export_parallel(ResourceKind::ALL.to_vec(), 4, |kind| {
            if kind == ResourceKind::Ec2Instance {
                std::thread::sleep(Duration::from_millis(30));
            }
            Ok(kind.info().tf_type.to_string())
        })
        .await;

        let kinds: Vec<ResourceKind> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
        assert_eq!(results[0].outcome.as_ref().unwrap(), "aws_instance");
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_other_kinds() {
        let results = export_parallel(ResourceKind::ALL.to_vec(), 2, |kind| match kind {
            ResourceKind::Ec2Instance => Err(ExportError::Authentication("no creds".to_string())),
            ResourceKind::CacheCluster => Ok(3usize),
        })
        .await;

        assert!(!results[0].outcome.is_ok());
        assert!(results[1].outcome.is_ok());
        assert_eq!(*results[1].outcome.as_ref().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (r, p) = (running.clone(), peak.clone());
        let kinds = vec![ResourceKind::Ec2Instance; 6];

        export_parallel(kinds, 2, move |_| {
            let now = r.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            r.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_zero_parallelism_still_runs() {
        let results = export_parallel(vec![ResourceKind::CacheCluster], 0, |_| Ok(1)).await;
        assert!(results[0].outcome.is_ok());
    }
}
