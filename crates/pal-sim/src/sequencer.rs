//! # Simulated Sequencer Bank
//!
//! One worker thread per channel. Words pushed before the commit are only
//! queued. The commit spawns the workers, each of which parks on a shared
//! one-shot start signal; raising that signal through the primary channel
//! releases them all at once. Each worker then shifts its queue into the
//! [`ShiftSink`] least significant bit first and exits.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pal_core::{ConfigWord, LoaderError, PalSettings};
use pal_loader::SequencerBank;
use parking_lot::{Condvar, Mutex};

use crate::device::ShiftSink;

#[derive(Debug, Default)]
struct StartSignal {
    fired: Mutex<bool>,
    cv: Condvar,
}

impl StartSignal {
    fn wait(&self) {
        let mut fired = self.fired.lock();
        while !*fired {
            self.cv.wait(&mut fired);
        }
    }

    fn fire(&self) {
        *self.fired.lock() = true;
        self.cv.notify_all();
    }
}

/// Threaded stand-in for the hardware sequencer bank.
#[derive(Debug)]
pub struct SimulatedSequencers<S: ShiftSink + Clone + 'static> {
    sink: S,
    quota: usize,
    queues: Vec<Vec<ConfigWord>>,
    workers: Vec<JoinHandle<()>>,
    bit_period: Option<Duration>,
    commits: Vec<usize>,
    last_pass: Vec<Vec<ConfigWord>>,
}

impl<S: ShiftSink + Clone + 'static> SimulatedSequencers<S> {
    /// `channels` sequencers of `quota` words each, shifting into `sink`
    /// as fast as the host allows.
    pub fn new(sink: S, channels: usize, quota: usize) -> Self {
        Self {
            sink,
            quota,
            queues: vec![Vec::new(); channels],
            workers: Vec::new(),
            bit_period: None,
            commits: Vec::new(),
            last_pass: Vec::new(),
        }
    }

    /// A bank shaped by `settings`.
    pub fn from_settings(sink: S, settings: &PalSettings) -> Self {
        Self::new(sink, settings.channels, settings.quota)
    }

    /// Pace the shift-out at `hz` bits per second per channel.
    pub fn with_serial_rate(mut self, hz: u32) -> Self {
        self.bit_period = (hz > 0).then(|| Duration::from_nanos(1_000_000_000 / u64::from(hz)));
        self
    }

    /// Primary channel of every commit so far.
    pub fn commits(&self) -> &[usize] {
        &self.commits
    }

    /// Per-channel words of the most recent commit.
    pub fn last_pass(&self) -> &[Vec<ConfigWord>] {
        &self.last_pass
    }

    fn spawn_worker(
        &self,
        channel: usize,
        words: Vec<ConfigWord>,
        start: Arc<StartSignal>,
    ) -> Result<JoinHandle<()>, LoaderError> {
        let sink = self.sink.clone();
        let period = self.bit_period;
        thread::Builder::new()
            .name(format!("sequencer-{channel}"))
            .spawn(move || {
                start.wait();
                for word in words {
                    for k in 0..8 {
                        sink.shift_bit(channel, (word >> k) & 1 == 1);
                        if let Some(period) = period {
                            thread::sleep(period);
                        }
                    }
                    tracing::trace!(channel, word, "shifted word");
                }
            })
            .map_err(|e| LoaderError::Sequencer(format!("cannot start sequencer {channel}: {e}")))
    }
}

impl<S: ShiftSink + Clone + 'static> SequencerBank for SimulatedSequencers<S> {
    fn channel_count(&self) -> usize {
        self.queues.len()
    }

    fn quota(&self) -> usize {
        self.quota
    }

    fn push(&mut self, channel: usize, word: ConfigWord) -> Result<(), LoaderError> {
        if self.is_busy() {
            return Err(LoaderError::PassInProgress);
        }
        let quota = self.quota;
        let queue = self
            .queues
            .get_mut(channel)
            .ok_or_else(|| LoaderError::Sequencer(format!("no sequencer for channel {channel}")))?;
        if queue.len() >= quota {
            return Err(LoaderError::Sequencer(format!(
                "channel {channel} already holds its quota of {quota} words"
            )));
        }
        queue.push(word);
        Ok(())
    }

    fn discard(&mut self) {
        let dropped: usize = self.queues.iter().map(Vec::len).sum();
        if dropped > 0 {
            tracing::debug!(dropped, "discarding queued words");
        }
        self.queues.iter_mut().for_each(Vec::clear);
    }

    fn commit(&mut self, primary: usize) -> Result<(), LoaderError> {
        if self.is_busy() {
            return Err(LoaderError::PassInProgress);
        }
        if primary >= self.queues.len() {
            return Err(LoaderError::NoSuchChannel {
                primary,
                channels: self.queues.len(),
            });
        }
        self.wait_idle()?;

        let start = Arc::new(StartSignal::default());
        let channels = self.queues.len();
        let queues: Vec<Vec<ConfigWord>> = self.queues.iter_mut().map(std::mem::take).collect();
        self.last_pass = queues.clone();

        for (channel, words) in queues.into_iter().enumerate() {
            match self.spawn_worker(channel, words, Arc::clone(&start)) {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    // Release the workers already parked so they can exit.
                    start.fire();
                    return Err(e);
                }
            }
        }

        self.commits.push(primary);
        tracing::debug!(primary, channels, "start signal raised");
        start.fire();
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.workers.iter().any(|w| !w.is_finished())
    }

    fn wait_idle(&mut self) -> Result<(), LoaderError> {
        let mut panicked = 0;
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                panicked += 1;
            }
        }
        if panicked > 0 {
            return Err(LoaderError::Sequencer(format!("{panicked} sequencer thread(s) panicked")));
        }
        Ok(())
    }
}
