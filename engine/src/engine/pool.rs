use crossbeam::channel::{self, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

/// Tracks in-flight tasks for one batch and wakes `wait` once the count
/// reaches zero. This replaces the "compare queue length against total
/// submitted" approach, which races: a task can be popped off the queue
/// by a worker but not yet finished, so the queue-length approach can
/// observe completion one task early.
#[derive(Default)]
struct Barrier {
    pending: Mutex<usize>,
    done: Condvar,
}

impl Barrier {
    fn add(&self, n: usize) {
        let mut pending = self.pending.lock().expect("barrier poisoned");
        *pending += n;
    }

    fn complete_one(&self) {
        let mut pending = self.pending.lock().expect("barrier poisoned");
        *pending -= 1;
        if *pending == 0 {
            self.done.notify_all();
        }
    }

    fn wait(&self) {
        let mut pending = self.pending.lock().expect("barrier poisoned");
        while *pending > 0 {
            pending = self.done.wait(pending).expect("barrier poisoned");
        }
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Task {
    Run(Job),
    Shutdown,
}

/// A fixed set of long-lived OS threads. Jobs are dispatched through a
/// `crossbeam::channel`; completion of a batch of jobs is tracked by an
/// explicit pending counter rather than by polling the channel's length.
pub struct WorkerPool {
    sender: Sender<Task>,
    barrier: Arc<Barrier>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        tracing::info!(num_threads, "worker pool started");
        let (sender, receiver): (Sender<Task>, Receiver<Task>) = channel::unbounded();
        let barrier = Arc::new(Barrier::default());

        let handles = (0..num_threads)
            .map(|_| {
                let receiver = receiver.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        match task {
                            Task::Run(job) => {
                                let _ = panic::catch_unwind(AssertUnwindSafe(job));
                                barrier.complete_one();
                            }
                            Task::Shutdown => break,
                        }
                    }
                })
            })
            .collect();

        Self {
            sender,
            barrier,
            handles,
        }
    }

    /// Submits `jobs`, blocking until every one of them has run (or
    /// panicked — a panicking job still counts as complete so the batch
    /// can never wedge).
    pub fn run_batch<I>(&self, jobs: I)
    where
        I: IntoIterator<Item = Job>,
    {
        let jobs: Vec<Job> = jobs.into_iter().collect();
        if jobs.is_empty() {
            return;
        }
        let start = std::time::Instant::now();
        let size = jobs.len();
        tracing::info!(size, "batch started");
        self.barrier.add(jobs.len());
        for job in jobs {
            self.sender
                .send(Task::Run(job))
                .expect("worker pool channel closed while submitting a batch");
        }
        self.barrier.wait();
        tracing::info!(size, elapsed_ms = start.elapsed().as_millis() as u64, "batch completed");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        tracing::info!("worker pool shutting down");
        for _ in &self.handles {
            let _ = self.sender.send(Task::Shutdown);
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
