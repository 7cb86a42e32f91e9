use std::io::Read;
use std::sync::Weak;
use std::thread;

use framequeue_frame::{FrameError, Framing};
use tracing::{debug, trace, warn};

use crate::state::{FailureKind, ReaderState, Shared};

/// Producer side of a frame buffer.
///
/// Owns the only reference to the stream. Holds the monitor weakly so that
/// dropping every buffer handle lets the thread exit after its next frame.
struct ReaderTask<R, F> {
    stream: R,
    framing: F,
    shared: Weak<Shared>,
}

/// Start a detached reader thread.
///
/// The join handle is dropped on purpose: the thread never blocks process
/// exit and stops on its own when the stream fails or closes.
pub(crate) fn spawn<R, F>(
    stream: R,
    framing: F,
    shared: Weak<Shared>,
    thread_name: &str,
) -> std::io::Result<()>
where
    R: Read + Send + 'static,
    F: Framing,
{
    let task = ReaderTask {
        stream,
        framing,
        shared,
    };
    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || task.run())?;
    Ok(())
}

/// Records a failed reader when the thread unwinds out of `run`.
struct PanicGuard(Weak<Shared>);

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        warn!("reader panicked");
        if let Some(shared) = self.0.upgrade() {
            shared.terminate(ReaderState::Failed {
                kind: FailureKind::Panicked,
                reason: "reader thread panicked".to_string(),
            });
        }
    }
}

impl<R: Read, F: Framing> ReaderTask<R, F> {
    fn run(mut self) {
        let _guard = PanicGuard(self.shared.clone());
        debug!(framing = self.framing.name(), "reader started");

        loop {
            let result = self.framing.read_frame(&mut self.stream);

            let Some(shared) = self.shared.upgrade() else {
                debug!("frame buffer dropped; reader exiting");
                return;
            };

            match result {
                Ok(frame) => {
                    let frame_len = frame.len();
                    let queued = shared.push(frame);
                    trace!(frame_len, queued, "frame queued");
                }
                Err(FrameError::StreamClosed) => {
                    debug!("stream closed; reader exiting");
                    shared.terminate(ReaderState::Finished);
                    return;
                }
                Err(err) => {
                    warn!(error = %err, "reader stopped");
                    shared.terminate(ReaderState::failed(&err));
                    return;
                }
            }
        }
    }
}
