use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Progress reported by a running job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobEvent {
    /// Percent complete, 0–100.
    Progress(f64),
    Finished,
    Cancelled,
}

/// A simulated long-running operation on a background thread.
///
/// The UI thread polls for events once per frame; it never blocks on the job.
pub struct Job {
    rx: mpsc::Receiver<JobEvent>,
    cancel: Arc<AtomicBool>,
    done: bool,
}

impl Job {
    pub fn start(duration: Duration, steps: u32) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<JobEvent>();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let steps = steps.max(1);
        let step_time = duration / steps;

        thread::Builder::new()
            .name("busy-job".into())
            .spawn(move || {
                log::info!("Job started ({} steps, {:?})", steps, duration);
                for step in 1..=steps {
                    thread::sleep(step_time);
                    if flag.load(Ordering::Relaxed) {
                        let _ = tx.send(JobEvent::Cancelled);
                        log::info!("Job cancelled at step {}", step);
                        return;
                    }
                    let pct = step as f64 * 100.0 / steps as f64;
                    if tx.send(JobEvent::Progress(pct)).is_err() {
                        return; // main thread dropped its receiver
                    }
                }
                let _ = tx.send(JobEvent::Finished);
                log::info!("Job finished");
            })?;

        Ok(Self {
            rx,
            cancel,
            done: false,
        })
    }

    /// Ask the worker to stop at its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Non-blocking poll for events produced since the last call.
    pub fn poll(&mut self) -> Vec<JobEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if matches!(event, JobEvent::Finished | JobEvent::Cancelled) {
                        self.done = true;
                    }
                    events.push(event);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.done = true;
                    break;
                }
            }
        }
        events
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        self.cancel();
    }
}
