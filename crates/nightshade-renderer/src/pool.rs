use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use nightshade_core::RenderError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of named worker threads pulling jobs from one shared queue.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads.max(1) {
            let rx = Arc::clone(&rx);
            let handle = thread::Builder::new()
                .name(format!("nightshade-render-{index}"))
                .spawn(move || worker_loop(index, rx))?;
            workers.push(handle);
        }
        log::info!("Started render worker pool with {} threads", workers.len());
        Ok(Self {
            sender: Some(tx),
            workers,
        })
    }

    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue `job` for the next idle worker.
    pub fn execute<F>(&self, job: F) -> Result<(), RenderError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| RenderError::failed("worker pool is shut down"))?;
        sender
            .send(Box::new(job))
            .map_err(|_| RenderError::failed("worker pool is shut down"))
    }

    /// Stop accepting jobs, let queued jobs drain, and join every worker.
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        log::info!("Render worker pool stopped");
    }

    pub fn is_shut_down(&self) -> bool {
        self.sender.is_none()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(index: usize, rx: Arc<Mutex<mpsc::Receiver<Job>>>) {
    loop {
        // The lock is released before the job runs.
        let job = {
            let guard = rx.lock().unwrap_or_else(|e| e.into_inner());
            guard.recv()
        };
        match job {
            Ok(job) => job(),
            Err(_) => {
                log::debug!("Render worker {index} exiting");
                return;
            }
        }
    }
}
