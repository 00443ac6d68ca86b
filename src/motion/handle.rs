//! Completion handles for motions.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// How a motion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionOutcome {
    /// Ran to completion.
    Finished,
    /// Replaced by a newer motion on the same element.
    Superseded,
    /// Cancelled, or its element (or runner) went away.
    Cancelled,
}

/// Resolves once the motion it was returned for ends.
///
/// Await it from async code, or poll it synchronously with
/// [`MotionHandle::try_outcome`].
#[derive(Debug)]
pub struct MotionHandle {
    rx: oneshot::Receiver<MotionOutcome>,
    outcome: Option<MotionOutcome>,
}

impl MotionHandle {
    /// A connected (handle, completion sender) pair.
    pub(crate) fn channel() -> (Self, oneshot::Sender<MotionOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { rx, outcome: None }, tx)
    }

    /// A handle that is already resolved.
    pub(crate) fn resolved(outcome: MotionOutcome) -> Self {
        let (handle, tx) = Self::channel();
        let _ = tx.send(outcome);
        handle
    }

    /// The outcome, if the motion has ended.
    pub fn try_outcome(&mut self) -> Option<MotionOutcome> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(MotionOutcome::Cancelled),
            };
        }
        self.outcome
    }

    /// Whether the motion has ended.
    pub fn is_done(&mut self) -> bool {
        self.try_outcome().is_some()
    }
}

impl Future for MotionHandle {
    type Output = MotionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<MotionOutcome> {
        if let Some(outcome) = self.outcome {
            return Poll::Ready(outcome);
        }
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(result) => {
                let outcome = result.unwrap_or(MotionOutcome::Cancelled);
                this.outcome = Some(outcome);
                Poll::Ready(outcome)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
