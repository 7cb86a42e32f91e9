use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use framequeue_frame::{Frame, FrameError};

use crate::error::{BufferError, Result};

/// Why a reader thread stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The stream returned an I/O error.
    Io,
    /// The bytes on the stream did not form an acceptable frame.
    InvalidData,
    /// The framing code panicked.
    Panicked,
}

impl From<&FrameError> for FailureKind {
    fn from(err: &FrameError) -> Self {
        match err {
            FrameError::Io(_) | FrameError::StreamClosed => Self::Io,
            FrameError::InvalidConfig(_)
            | FrameError::InvalidLength(_)
            | FrameError::FrameTooLarge { .. } => Self::InvalidData,
        }
    }
}

/// Lifecycle of the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
    /// The reader is blocked on the stream or framing a frame.
    Running,
    /// The stream reported end-of-stream.
    Finished,
    /// Reading or framing failed.
    Failed { kind: FailureKind, reason: String },
}

impl ReaderState {
    /// Failure state recording a framing error.
    pub fn failed(err: &FrameError) -> Self {
        Self::Failed {
            kind: err.into(),
            reason: err.to_string(),
        }
    }

    /// Returns true while the reader may still produce frames.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// The failure kind, if the reader failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    fn closed_reason(&self) -> String {
        match self {
            Self::Running => "reader running".to_string(),
            Self::Finished => "stream closed".to_string(),
            Self::Failed { reason, .. } => reason.clone(),
        }
    }
}

struct Inner {
    queue: VecDeque<Frame>,
    reader: ReaderState,
}

/// The monitor shared by the reader thread and the buffer handles.
///
/// The queue and reader state only change under the mutex, and every change
/// is followed by a condvar notification.
pub(crate) struct Shared {
    inner: Mutex<Inner>,
    ready: Condvar,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                reader: ReaderState::Running,
            }),
            ready: Condvar::new(),
        }
    }

    // Every critical section leaves the queue consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a frame and wake one waiting consumer. Returns the queue depth.
    pub(crate) fn push(&self, frame: Frame) -> usize {
        let mut inner = self.lock();
        inner.queue.push_back(frame);
        self.ready.notify_one();
        inner.queue.len()
    }

    /// Record reader termination and wake every waiter.
    pub(crate) fn terminate(&self, state: ReaderState) {
        let mut inner = self.lock();
        inner.reader = state;
        self.ready.notify_all();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub(crate) fn reader_state(&self) -> ReaderState {
        self.lock().reader.clone()
    }

    pub(crate) fn try_pop(&self) -> Option<Frame> {
        self.lock().queue.pop_front()
    }

    /// Take the oldest frame, waiting up to `timeout` for one to arrive.
    ///
    /// Frames queued before the reader stopped are still returned; `Closed`
    /// is reported only once the queue is empty.
    pub(crate) fn pop_timeout(&self, timeout: Duration) -> Result<Frame> {
        let guard = self.lock();
        let (mut inner, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |inner| {
                inner.queue.is_empty() && inner.reader.is_running()
            })
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(frame) = inner.queue.pop_front() {
            return Ok(frame);
        }
        if inner.reader.is_running() {
            Err(BufferError::Timeout(timeout))
        } else {
            Err(BufferError::Closed(inner.reader.closed_reason()))
        }
    }
}
