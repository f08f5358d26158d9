//! # Subscriptions
//!
//! Cold, cancellable live channel over a store [`Listener`].
//!
//! Lifecycle:
//! - Created pending. No store work happens until the first poll.
//! - First poll opens the registration and yields snapshots in the store's
//!   commit order, one per change.
//! - Any error ends the channel: it is yielded once, then the stream is
//!   exhausted. A store hang-up without an error is reported as a terminal
//!   `Unavailable`.
//! - `unsubscribe` (or drop) releases the registration. Nothing is yielded
//!   afterwards.

use std::fmt;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::Listener;
use crate::errors::{StoreError, StoreResult};
use crate::observability::{log_store_failure, Event};

type Opener<T> = Box<dyn FnOnce() -> StoreResult<Listener<T>> + Send>;

enum State<T> {
    Pending(Opener<T>),
    Live(Listener<T>),
    Closed,
}

/// A live stream of snapshots for one query or document
pub struct Subscription<T> {
    id: Uuid,
    project: String,
    target: String,
    state: State<T>,
}

impl<T> Subscription<T> {
    /// Creates a pending subscription. `open` runs on first poll.
    pub fn new<F>(project: impl Into<String>, target: impl Into<String>, open: F) -> Self
    where
        F: FnOnce() -> StoreResult<Listener<T>> + Send + 'static,
    {
        Self {
            id: Uuid::new_v4(),
            project: project.into(),
            target: target.into(),
            state: State::Pending(Box::new(open)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// What this subscription observes, e.g. a collection path
    pub fn target(&self) -> &str {
        &self.target
    }

    /// True once the store registration is open
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Live(_))
    }

    /// True after unsubscribe or a terminal error
    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Releases the store registration. Idempotent.
    pub fn unsubscribe(&mut self) {
        match mem::replace(&mut self.state, State::Closed) {
            State::Live(mut listener) => {
                listener.release();
                info!(
                    event = %Event::SubscriptionReleased,
                    subscription_id = %self.id,
                    project = %self.project,
                    target = %self.target
                );
            }
            State::Pending(_) | State::Closed => {}
        }
    }

    fn fail(&mut self, err: StoreError) -> Poll<Option<StoreResult<T>>> {
        if let State::Live(mut listener) = mem::replace(&mut self.state, State::Closed) {
            listener.release();
        }
        log_store_failure(Event::SubscriptionFailed, &self.project, &self.target, &err);
        Poll::Ready(Some(Err(err)))
    }
}

impl<T> Stream for Subscription<T> {
    type Item = StoreResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match mem::replace(&mut this.state, State::Closed) {
                State::Closed => return Poll::Ready(None),
                State::Pending(open) => match open() {
                    Ok(listener) => {
                        this.state = State::Live(listener);
                        info!(
                            event = %Event::SubscriptionOpened,
                            subscription_id = %this.id,
                            project = %this.project,
                            target = %this.target
                        );
                    }
                    Err(err) => return this.fail(err),
                },
                State::Live(mut listener) => {
                    let polled = listener.poll_recv(cx);
                    this.state = State::Live(listener);
                    return match polled {
                        Poll::Pending => Poll::Pending,
                        Poll::Ready(Some(Ok(snapshot))) => {
                            debug!(
                                event = %Event::SubscriptionEmitted,
                                subscription_id = %this.id,
                                target = %this.target
                            );
                            Poll::Ready(Some(Ok(snapshot)))
                        }
                        Poll::Ready(Some(Err(err))) => this.fail(err),
                        Poll::Ready(None) => this.fail(StoreError::unavailable(format!(
                            "live channel for '{}' closed by the store",
                            this.target
                        ))),
                    };
                }
            }
        }
    }
}

// No field is structurally pinned.
impl<T> Unpin for Subscription<T> {}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Pending(_) => "pending",
            State::Live(_) => "live",
            State::Closed => "closed",
        };
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("project", &self.project)
            .field("target", &self.target)
            .field("state", &state)
            .finish()
    }
}
