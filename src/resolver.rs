//! Asynchronous truncation resolution.
//!
//! Measurement runs on worker threads; results come back as tagged events in
//! a queue that the owner drains on its own thread. Only the event matching
//! the most recent request is published; a superseded measurement still
//! lands in the width cache (it is valid for its own width) but can no
//! longer regress the displayed state.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::cache::TruncationCache;
use crate::measure::{MeasureError, MeasureId, MeasureRequest, TextMeasurer};

/// Callback that wakes the host to drain queued measurement results. May be
/// invoked from a worker thread.
pub type RenderRequester = Arc<dyn Fn() + Send + Sync>;

/// Tagged result of one worker-thread measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureEvent {
    Resolved {
        id: MeasureId,
        width: usize,
        offset: usize,
    },
    Failed {
        id: MeasureId,
        width: usize,
        error: MeasureError,
    },
}

impl MeasureEvent {
    fn id(&self) -> MeasureId {
        match self {
            Self::Resolved { id, .. } | Self::Failed { id, .. } => *id,
        }
    }
}

/// How a resolve call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Cache hit; the offset is available without suspension.
    Cached(usize),
    /// Measurement in flight; the result arrives through
    /// [`TruncationResolver::drain`].
    Pending(MeasureId),
}

/// Publishable outcome filtered out of the event queue by
/// [`TruncationResolver::drain`].
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureOutcome {
    Offset { width: usize, offset: usize },
    Error(MeasureError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LatestRequest {
    id: MeasureId,
    width: usize,
}

/// Orchestrates measurement calls against the width cache.
pub struct TruncationResolver {
    measurer: Arc<dyn TextMeasurer>,
    cache: TruncationCache,
    pending_events: Arc<Mutex<VecDeque<MeasureEvent>>>,
    render_requester: Option<RenderRequester>,
    next_measure_id: MeasureId,
    latest_request: Option<LatestRequest>,
    workers: Vec<JoinHandle<()>>,
}

impl TruncationResolver {
    pub fn new(measurer: Arc<dyn TextMeasurer>, render_requester: Option<RenderRequester>) -> Self {
        Self {
            measurer,
            cache: TruncationCache::new(),
            pending_events: Arc::new(Mutex::new(VecDeque::new())),
            render_requester,
            next_measure_id: 1,
            latest_request: None,
            workers: Vec::new(),
        }
    }

    /// Cached offset for `width`, without issuing a request.
    pub fn cached(&self, width: usize) -> Option<usize> {
        self.cache.lookup(width)
    }

    /// Width of the most recent request still awaiting its result.
    pub fn awaiting_width(&self) -> Option<usize> {
        self.latest_request.map(|latest| latest.width)
    }

    /// Resolves the truncation offset for `request.width`.
    ///
    /// A cache hit returns immediately and supersedes any in-flight request
    /// (the hit is now the most recent answer). A miss spawns one worker per
    /// call. Concurrent misses for the same width are not de-duplicated:
    /// the measurer contract makes repeats safe, and the cache ends up with
    /// whichever result lands last.
    pub fn resolve(&mut self, request: MeasureRequest) -> Result<Resolution, MeasureError> {
        let width = request.width;
        if let Some(offset) = self.cache.lookup(width) {
            trace!(width, offset, "truncation offset served from cache");
            self.latest_request = None;
            return Ok(Resolution::Cached(offset));
        }

        let id = self.next_measure_id;
        self.next_measure_id += 1;
        self.latest_request = Some(LatestRequest { id, width });

        let measurer = Arc::clone(&self.measurer);
        let queue = Arc::clone(&self.pending_events);
        let requester = self.render_requester.clone();
        let handle = thread::Builder::new()
            .name(format!("see-more-measure-{id}"))
            .spawn(move || {
                let outcome = catch_unwind(AssertUnwindSafe(|| measurer.truncation_offset(&request)));
                let event = match outcome {
                    Ok(Ok(offset)) => MeasureEvent::Resolved { id, width, offset },
                    Ok(Err(error)) => MeasureEvent::Failed { id, width, error },
                    Err(_) => MeasureEvent::Failed {
                        id,
                        width,
                        error: MeasureError::new("measurement backend panicked"),
                    },
                };
                enqueue(&queue, requester.as_ref(), event);
            })
            .map_err(|error| MeasureError::new(format!("failed to spawn measure worker: {error}")))?;

        self.workers.push(handle);
        debug!(id, width, "measurement requested");
        Ok(Resolution::Pending(id))
    }

    /// Drains queued measurement events on the owner's thread and returns
    /// the outcomes that may be published.
    ///
    /// Events tagged with a superseded [`MeasureId`] are not returned:
    /// successful ones still populate the cache under their own width key,
    /// failed ones are dropped.
    pub fn drain(&mut self) -> Vec<MeasureOutcome> {
        let mut outcomes = Vec::new();

        loop {
            let event = {
                let mut pending_events = lock_unpoisoned(&self.pending_events);
                pending_events.pop_front()
            };
            let Some(event) = event else {
                break;
            };

            let current = self.latest_request.map(|latest| latest.id) == Some(event.id());
            match event {
                MeasureEvent::Resolved { id, width, offset } => {
                    self.cache.store(width, offset);
                    if current {
                        self.latest_request = None;
                        outcomes.push(MeasureOutcome::Offset { width, offset });
                    } else {
                        debug!(id, width, "stale measurement cached without publishing");
                    }
                }
                MeasureEvent::Failed { id, width, error } => {
                    if current {
                        self.latest_request = None;
                        warn!(id, width, %error, "measurement failed");
                        outcomes.push(MeasureOutcome::Error(error));
                    } else {
                        debug!(id, width, "stale measurement failure dropped");
                    }
                }
            }
        }

        self.reap_finished_workers();
        outcomes
    }

    fn reap_finished_workers(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        for handle in workers {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                self.workers.push(handle);
            }
        }
    }
}

fn enqueue(
    queue: &Mutex<VecDeque<MeasureEvent>>,
    requester: Option<&RenderRequester>,
    event: MeasureEvent,
) {
    let should_wake = {
        let mut queue = lock_unpoisoned(queue);
        let was_empty = queue.is_empty();
        queue.push_back(event);
        was_empty
    };

    if should_wake {
        if let Some(requester) = requester {
            requester();
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::{MeasureOutcome, Resolution, TruncationResolver};
    use crate::measure::{MeasureError, MeasureRequest, TextMeasurer};
    use crate::options::TextStyle;

    struct CountingMeasurer {
        offset: usize,
        calls: AtomicUsize,
    }

    impl CountingMeasurer {
        fn new(offset: usize) -> Arc<Self> {
            Arc::new(Self {
                offset,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TextMeasurer for CountingMeasurer {
        fn truncation_offset(&self, _request: &MeasureRequest) -> Result<usize, MeasureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.offset)
        }
    }

    fn request(width: usize) -> MeasureRequest {
        MeasureRequest {
            text: "a long enough sample sentence".to_string(),
            line_limit: 1,
            style: TextStyle::default(),
            width,
            link_text: "\u{2026} see more".to_string(),
        }
    }

    fn drain_one(resolver: &mut TruncationResolver) -> Vec<MeasureOutcome> {
        for _ in 0..400 {
            let outcomes = resolver.drain();
            if !outcomes.is_empty() {
                return outcomes;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("measurement result never arrived");
    }

    #[test]
    fn second_resolve_for_the_same_width_is_a_cache_hit() {
        let measurer = CountingMeasurer::new(12);
        let backend: Arc<dyn TextMeasurer> = measurer.clone();
        let mut resolver = TruncationResolver::new(backend, None);

        let first = resolver.resolve(request(100)).expect("resolve starts");
        assert!(matches!(first, Resolution::Pending(_)));
        assert_eq!(resolver.awaiting_width(), Some(100));

        let outcomes = drain_one(&mut resolver);
        assert_eq!(
            outcomes,
            vec![MeasureOutcome::Offset {
                width: 100,
                offset: 12
            }]
        );
        assert_eq!(resolver.awaiting_width(), None);

        let second = resolver.resolve(request(100)).expect("resolve repeats");
        assert_eq!(second, Resolution::Cached(12));
        assert_eq!(measurer.calls(), 1);
    }

    #[test]
    fn cache_hit_supersedes_an_in_flight_request() {
        let measurer = CountingMeasurer::new(12);
        let backend: Arc<dyn TextMeasurer> = measurer.clone();
        let mut resolver = TruncationResolver::new(backend, None);

        let _ = resolver.resolve(request(100)).expect("first resolve");
        let _ = drain_one(&mut resolver);

        let _ = resolver.resolve(request(60)).expect("second resolve");
        assert_eq!(resolver.awaiting_width(), Some(60));

        // The cached 100-wide answer becomes the most recent one; whatever the
        // 60-wide worker returns later must not be published.
        let hit = resolver.resolve(request(100)).expect("cache hit");
        assert_eq!(hit, Resolution::Cached(12));
        assert_eq!(resolver.awaiting_width(), None);

        for _ in 0..400 {
            assert!(resolver.drain().is_empty());
            if resolver.cached(60).is_some() {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("superseded measurement never landed in the cache");
    }

    #[test]
    fn failing_measurements_are_not_cached() {
        struct FailingMeasurer;

        impl TextMeasurer for FailingMeasurer {
            fn truncation_offset(&self, _request: &MeasureRequest) -> Result<usize, MeasureError> {
                Err(MeasureError::new("no layout context"))
            }
        }

        let backend: Arc<dyn TextMeasurer> = Arc::new(FailingMeasurer);
        let mut resolver = TruncationResolver::new(backend, None);

        let _ = resolver.resolve(request(100)).expect("resolve starts");
        let outcomes = drain_one(&mut resolver);
        assert_eq!(
            outcomes,
            vec![MeasureOutcome::Error(MeasureError::new("no layout context"))]
        );
        assert_eq!(resolver.cached(100), None);
    }

    #[test]
    fn panicking_backends_surface_as_failures() {
        struct PanickingMeasurer;

        impl TextMeasurer for PanickingMeasurer {
            fn truncation_offset(&self, _request: &MeasureRequest) -> Result<usize, MeasureError> {
                panic!("measurement backend exploded");
            }
        }

        let backend: Arc<dyn TextMeasurer> = Arc::new(PanickingMeasurer);
        let mut resolver = TruncationResolver::new(backend, None);

        let _ = resolver.resolve(request(100)).expect("resolve starts");
        let outcomes = drain_one(&mut resolver);
        assert_eq!(
            outcomes,
            vec![MeasureOutcome::Error(MeasureError::new(
                "measurement backend panicked"
            ))]
        );
    }

    #[test]
    fn the_requester_wakes_once_per_queue_fill() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let wakes_clone = Arc::clone(&wakes);
        let requester: super::RenderRequester = Arc::new(move || {
            wakes_clone.fetch_add(1, Ordering::SeqCst);
        });

        let measurer = CountingMeasurer::new(7);
        let backend: Arc<dyn TextMeasurer> = measurer.clone();
        let mut resolver = TruncationResolver::new(backend, Some(requester));

        let _ = resolver.resolve(request(100)).expect("resolve starts");
        let _ = drain_one(&mut resolver);
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }
}
