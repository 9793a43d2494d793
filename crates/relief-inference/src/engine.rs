//! Bounds how many inference calls run concurrently against a backend,
//! coalesces duplicate in-flight requests, and keeps the blocking ONNX
//! Runtime call off the async executor's worker threads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{OnceCell, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::backend::InferenceBackend;
use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::Result;

type CachedResult = Arc<Vec<(String, OutputTensor)>>;

/// Wraps an [`InferenceBackend`] with bounded concurrency, single-flight
/// request coalescing, and `spawn_blocking` dispatch.
///
/// Cloning is cheap: the backend, semaphore, and cache are all held behind
/// `Arc`, so a single engine can be shared across every caller that wants a
/// slice of its worker budget.
pub struct InferenceEngine<B> {
    backend: Arc<B>,
    semaphore: Arc<Semaphore>,
    cache_first: bool,
    cache: Mutex<HashMap<Vec<Vec<usize>>, Arc<OnceCell<Result<CachedResult>>>>>,
}

impl<B> Clone for InferenceEngine<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            semaphore: self.semaphore.clone(),
            cache_first: self.cache_first,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl<B> InferenceEngine<B>
where
    B: InferenceBackend + 'static,
{
    /// `max_parallelism` bounds how many calls to `backend.run` may be in
    /// flight at once. `cache_first` enables single-flight de-duplication:
    /// when two callers submit bit-identical inputs while the first is
    /// still running, the second awaits the first's result instead of
    /// entering the semaphore itself.
    pub fn new(backend: B, max_parallelism: usize, cache_first: bool) -> Self {
        Self {
            backend: Arc::new(backend),
            semaphore: Arc::new(Semaphore::new(max_parallelism.max(1))),
            cache_first,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Runs inference on `inputs`, respecting `cancel`: if `cancel` fires
    /// before a worker permit is acquired, the call returns
    /// [`InferenceError::Cancelled`] without ever touching the backend. Once
    /// a permit is held, the blocking call always runs to completion and the
    /// permit is released on every exit path, including cache hits (which
    /// never acquire a permit at all) and panics inside the backend (caught
    /// via `spawn_blocking`'s `JoinError`).
    ///
    /// With `cache_first` enabled, the *first* successful result for a given
    /// input shape is memoized for the engine's lifetime and returned
    /// verbatim to every later caller whose input matches that shape; a
    /// shape the cache hasn't seen falls through to a live call.
    pub async fn run(&self, inputs: Vec<(String, InputTensor)>, cancel: &CancellationToken) -> Result<Arc<Vec<(String, OutputTensor)>>> {
        if self.cache_first {
            let key: Vec<Vec<usize>> = inputs.iter().map(|(_, t)| t.shape().to_vec()).collect();
            let (cell, is_initiator) = {
                let mut cache = self.cache.lock().expect("inference cache lock poisoned");
                match cache.entry(key) {
                    std::collections::hash_map::Entry::Occupied(e) => (e.get().clone(), false),
                    std::collections::hash_map::Entry::Vacant(e) => {
                        let cell = Arc::new(OnceCell::new());
                        e.insert(cell.clone());
                        (cell, true)
                    }
                }
            };

            if is_initiator {
                // This call owns the fill: cancellation is only honored
                // up to the point `dispatch` hands off to the backend,
                // which `dispatch` itself already enforces.
                return cell.get_or_try_init(|| self.dispatch(inputs, cancel)).await.cloned();
            }

            // A follower waiting on someone else's in-flight fill still
            // owns its own `cancel` token: race it against the shared
            // init so the follower's cancellation doesn't hang on an
            // unrelated call it has no say over.
            return tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(InferenceError::Cancelled),
                result = cell.get_or_try_init(|| self.dispatch(inputs, cancel)) => result.cloned(),
            };
        }

        self.dispatch(inputs, cancel).await
    }

    async fn dispatch(&self, inputs: Vec<(String, InputTensor)>, cancel: &CancellationToken) -> Result<CachedResult> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(InferenceError::Cancelled),
            permit = self.semaphore.clone().acquire_owned() => permit.expect("inference semaphore closed"),
        };

        let backend = self.backend.clone();
        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            let borrowed: Vec<(&str, InputTensor)> = inputs.iter().map(|(name, t)| (name.as_str(), t.clone())).collect();
            backend.run(&borrowed)
        })
        .await;
        drop(permit);

        match result {
            Ok(Ok(outputs)) => {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "inference completed");
                Ok(Arc::new(outputs))
            }
            Ok(Err(err)) => Err(err),
            Err(join_err) => {
                trace!(?join_err, "inference worker panicked");
                Err(InferenceError::InferenceFailed(join_err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    struct CountingBackend {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl InferenceBackend for CountingBackend {
        fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let shape = inputs[0].1.shape().to_vec();
            let arr = ArrayD::from_elem(ndarray::IxDyn(&shape), 1.0f32);
            Ok(vec![("out".to_string(), OutputTensor::Float32(arr))])
        }

        fn input_names(&self) -> &[String] {
            &[]
        }

        fn output_names(&self) -> &[String] {
            &[]
        }
    }

    fn sample_input() -> Vec<(String, InputTensor)> {
        vec![("x".to_string(), InputTensor::from_f32(vec![1.0, 2.0, 3.0], vec![3]))]
    }

    #[tokio::test]
    async fn runs_and_returns_backend_output() {
        let engine = InferenceEngine::new(CountingBackend { calls: 0.into() }, 2, false);
        let out = engine.run(sample_input(), &CancellationToken::new()).await.unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn cache_first_coalesces_identical_inputs() {
        let engine = Arc::new(InferenceEngine::new(CountingBackend { calls: 0.into() }, 4, true));
        let a = engine.clone();
        let b = engine.clone();
        let (r1, r2) = tokio::join!(
            a.run(sample_input(), &CancellationToken::new()),
            b.run(sample_input(), &CancellationToken::new()),
        );
        r1.unwrap();
        r2.unwrap();
        assert_eq!(engine.backend.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cache_first_keys_on_shape_not_content() {
        let engine = InferenceEngine::new(CountingBackend { calls: 0.into() }, 4, true);
        let cancel = CancellationToken::new();

        let first = InputTensor::from_f32(vec![1.0, 2.0, 3.0], vec![3]);
        let same_shape_different_values = InputTensor::from_f32(vec![9.0, 9.0, 9.0], vec![3]);
        let different_shape = InputTensor::from_f32(vec![1.0, 2.0, 3.0, 4.0], vec![4]);

        engine.run(vec![("x".to_string(), first)], &cancel).await.unwrap();
        engine
            .run(vec![("x".to_string(), same_shape_different_values)], &cancel)
            .await
            .unwrap();
        assert_eq!(engine.backend.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        engine.run(vec![("x".to_string(), different_shape)], &cancel).await.unwrap();
        assert_eq!(engine.backend.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    struct SlowBackend {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl InferenceBackend for SlowBackend {
        fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(100));
            let shape = inputs[0].1.shape().to_vec();
            let arr = ArrayD::from_elem(ndarray::IxDyn(&shape), 1.0f32);
            Ok(vec![("out".to_string(), OutputTensor::Float32(arr))])
        }

        fn input_names(&self) -> &[String] {
            &[]
        }

        fn output_names(&self) -> &[String] {
            &[]
        }
    }

    #[tokio::test]
    async fn follower_cancellation_does_not_wait_on_unrelated_initiator() {
        let engine = Arc::new(InferenceEngine::new(SlowBackend { calls: 0.into() }, 2, true));

        let initiator = engine.clone();
        let initiator_handle = tokio::spawn(async move { initiator.run(sample_input(), &CancellationToken::new()).await });

        // Give the initiator a head start so it's the one filling the cell.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let follower_cancel = CancellationToken::new();
        follower_cancel.cancel();
        let follower_result = engine.run(sample_input(), &follower_cancel).await;
        assert!(matches!(follower_result, Err(InferenceError::Cancelled)));

        // The initiator is unaffected by the follower's cancellation and
        // still completes successfully.
        let initiator_result = initiator_handle.await.unwrap();
        assert!(initiator_result.is_ok());
    }

    #[tokio::test]
    async fn cancel_before_permit_short_circuits() {
        let engine = InferenceEngine::new(CountingBackend { calls: 0.into() }, 1, false);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine.run(sample_input(), &cancel).await;
        assert!(matches!(result, Err(InferenceError::Cancelled)));
        assert_eq!(engine.backend.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
