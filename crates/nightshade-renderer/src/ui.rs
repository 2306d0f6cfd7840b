use std::sync::mpsc;
use std::time::{Duration, Instant};

/// A unit of work that must run on the UI context, with access to the UI state.
pub type UiJob<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// The UI execution context: a FIFO of jobs that only the thread owning the UI
/// state `S` drains. Workers post into it through a [`UiSender`].
pub struct UiQueue<S: 'static> {
    sender: mpsc::Sender<UiJob<S>>,
    receiver: mpsc::Receiver<UiJob<S>>,
}

/// Cloneable, `Send` handle for posting jobs onto a [`UiQueue`].
pub struct UiSender<S: 'static> {
    sender: mpsc::Sender<UiJob<S>>,
}

impl<S: 'static> Clone for UiSender<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: 'static> UiSender<S> {
    /// Returns false if the UI queue has been dropped.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.sender.send(Box::new(job)).is_ok()
    }
}

impl<S: 'static> UiQueue<S> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> UiSender<S> {
        UiSender {
            sender: self.sender.clone(),
        }
    }

    /// Run every job already queued, without blocking. Returns how many ran.
    pub fn run_pending(&self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job(state);
            ran += 1;
        }
        ran
    }

    /// Block up to `timeout` for one job and run it.
    pub fn run_next_timeout(&self, state: &mut S, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job(state);
                true
            }
            Err(_) => false,
        }
    }

    /// Run jobs until `done` holds or `timeout` elapses. Returns whether
    /// `done` was reached.
    pub fn run_until<F>(&self, state: &mut S, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(&S) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(state) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.run_next_timeout(state, deadline - now);
        }
    }
}

impl<S: 'static> Default for UiQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}
