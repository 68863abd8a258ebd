//! Sinks that record what they receive.

use std::{
    sync::{Arc, Mutex, PoisonError},
    thread::{self, ThreadId},
};

use reframe::{Frame, SinkResult};

/// A delivered frame together with the thread that received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// The frame passed to the sink.
    pub frame: Frame,
    /// Thread the sink ran on.
    pub thread: ThreadId,
}

/// Cloneable, thread-safe collector for frames passed to a sink.
///
/// ```
/// use reframe::Frame;
/// use reframe_testing::FrameRecorder;
///
/// let recorder = FrameRecorder::new();
/// let sink = recorder.sink();
/// sink(Frame::from_static(b"x")).unwrap();
/// assert_eq!(recorder.payloads(), vec![b"x".to_vec()]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl FrameRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self { Self::default() }

    /// Sink that records every frame and succeeds.
    pub fn sink(&self) -> impl Fn(Frame) -> SinkResult + Send + Sync + 'static {
        let deliveries = Arc::clone(&self.deliveries);
        move |frame| {
            deliveries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Delivery {
                    frame,
                    thread: thread::current().id(),
                });
            Ok(())
        }
    }

    /// Sink that records every frame, then fails when `fail` returns true
    /// for the frame's zero-based position.
    pub fn failing_sink<P>(&self, fail: P) -> impl FnMut(Frame) -> SinkResult + Send + 'static
    where
        P: Fn(usize) -> bool + Send + 'static,
    {
        let record = self.sink();
        let mut index = 0;
        move |frame| {
            let position = index;
            index += 1;
            if fail(position) {
                return Err(format!("sink rejected frame {position}").into());
            }
            record(frame)
        }
    }

    /// Sink that panics on the frame at `position` and records the rest.
    pub fn panicking_sink(&self, position: usize) -> impl FnMut(Frame) -> SinkResult + Send + 'static {
        let record = self.sink();
        let mut index = 0;
        move |frame| {
            let current = index;
            index += 1;
            assert_ne!(current, position, "sink panicked on frame {current}");
            record(frame)
        }
    }

    /// Snapshot of all deliveries so far.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recorded frames in delivery order.
    pub fn frames(&self) -> Vec<Frame> {
        self.deliveries().into_iter().map(|d| d.frame).collect()
    }

    /// Recorded frame contents as owned vectors.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.deliveries()
            .into_iter()
            .map(|d| d.frame.as_bytes().to_vec())
            .collect()
    }

    /// Number of frames recorded.
    pub fn len(&self) -> usize {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
