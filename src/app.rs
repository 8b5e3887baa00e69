use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::IfstatError;
use crate::record::RecordSink;
use crate::system::collector::CounterSource;
use crate::system::interface::InterfaceHandle;
use crate::system::network::{self, CounterSnapshot};

/// Longest single nap between cancellation checks while waiting for the next tick
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Lifecycle of the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Running,
    Draining,
    Stopped,
}

/// The sampling loop: read, compute, write, sleep, until cancelled
pub struct App<S: CounterSource, W: Write> {
    pub state: LoopState,
    handle: InterfaceHandle,
    interval: Duration,
    source: S,
    sink: RecordSink<W>,
    prev: Option<CounterSnapshot>,
}

impl<S: CounterSource, W: Write> App<S, W> {
    /// Build the loop around an already resolved interface and an open sink.
    /// Writes the CSV header.
    pub fn new(
        handle: InterfaceHandle,
        interval: Duration,
        source: S,
        mut sink: RecordSink<W>,
    ) -> Result<Self, IfstatError> {
        sink.write_header()?;
        Ok(Self {
            state: LoopState::Starting,
            handle,
            interval,
            source,
            sink,
            prev: None,
        })
    }

    /// Run until `cancel` is set, then flush the sink and hand it back.
    ///
    /// At least one sample is always written before the first sleep. Any
    /// error is returned immediately without draining.
    pub fn run(mut self, cancel: &AtomicBool) -> Result<RecordSink<W>, IfstatError> {
        self.state = LoopState::Running;

        while self.state == LoopState::Running {
            self.tick()?;

            if cancel.load(Ordering::Relaxed) || self.sleep(cancel) {
                self.state = LoopState::Draining;
            }
        }

        log::info!("shutdown requested, flushing {} row(s)", self.sink.rows());
        self.sink.flush()?;
        self.state = LoopState::Stopped;
        Ok(self.sink)
    }

    /// One sample-compute-write cycle
    fn tick(&mut self) -> Result<(), IfstatError> {
        let curr = self.source.read(self.handle)?;
        let sample = network::compute(self.prev.as_ref(), &curr);
        log::debug!(
            "in={} out={} -> {} B/s in, {} B/s out",
            curr.inbound_bytes,
            curr.outbound_bytes,
            sample.in_rate,
            sample.out_rate
        );
        self.sink.append(&sample)?;
        self.prev = Some(curr);
        Ok(())
    }

    /// Sleep for the full interval in short slices. Returns true if
    /// cancellation was observed.
    ///
    /// An interval too long to put a deadline on waits for cancellation only.
    fn sleep(&self, cancel: &AtomicBool) -> bool {
        let deadline = Instant::now().checked_add(self.interval);
        loop {
            if cancel.load(Ordering::Relaxed) {
                return true;
            }
            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    (deadline - now).min(CANCEL_POLL)
                }
                None => CANCEL_POLL,
            };
            thread::sleep(nap);
        }
        cancel.load(Ordering::Relaxed)
    }
}
