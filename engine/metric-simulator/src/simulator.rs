//! Core MetricSimulator implementation

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::SimulatorConfig;
use crate::error::SimulatorError;
use crate::stats::{SimulatorStats, StatsCollector};
use crate::source::UniformSource;
use crate::walk::{MetricSet, WalkRules};

/// Mutable simulator state. Every read and write goes through one lock, so a tick is atomic
/// with respect to snapshots and to `stop()`.
struct SimState {
    metrics: MetricSet,
    source: Box<dyn UniformSource>,
    running: bool,
    // Bumped on every start; a scheduled task only ticks while its epoch is current
    epoch: u64,
}

/// State shared between the simulator handle and its scheduled task
struct Shared {
    state: Mutex<SimState>,
    rules: WalkRules,
    stats: StatsCollector,
    publisher: watch::Sender<MetricSet>,
}

impl Shared {
    fn apply_tick(&self, state: &mut SimState) {
        let SimState { metrics, source, .. } = state;
        self.rules.advance(metrics, &mut **source);

        self.publisher.send_replace(*metrics);
        self.stats.record_tick(metrics);

        tracing::debug!(
            active_patients = metrics.active_patients,
            bed_occupancy = metrics.bed_occupancy,
            wait_time_minutes = metrics.wait_time_minutes,
            "Tick applied"
        );
    }

    /// Tick on behalf of the scheduled task. Returns false once the task is stale.
    fn scheduled_tick(&self, epoch: u64) -> bool {
        let mut state = self.state.lock();
        if !state.running || state.epoch != epoch {
            return false;
        }
        self.apply_tick(&mut state);
        true
    }
}

/// The MetricSimulator - keeps the dashboard metrics moving on a fixed cadence
pub struct MetricSimulator {
    shared: Arc<Shared>,
    config: SimulatorConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MetricSimulator {
    /// Create a simulator drawing from an entropy-seeded generator
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        Self::with_source(config, StdRng::from_entropy())
    }

    /// Create a simulator whose tick sequence is reproducible from `seed`
    pub fn with_seed(config: SimulatorConfig, seed: u64) -> Result<Self, SimulatorError> {
        Self::with_source(config, StdRng::seed_from_u64(seed))
    }

    /// Create a simulator with an injected uniform source
    pub fn with_source(
        config: SimulatorConfig,
        source: impl UniformSource + 'static,
    ) -> Result<Self, SimulatorError> {
        config.validate()?;

        tracing::info!(
            interval_ms = config.interval_ms,
            active_patients = config.initial.active_patients,
            bed_occupancy = config.initial.bed_occupancy,
            wait_time_minutes = config.initial.wait_time_minutes,
            "Creating MetricSimulator"
        );

        let (publisher, _) = watch::channel(config.initial);
        let shared = Arc::new(Shared {
            state: Mutex::new(SimState {
                metrics: config.initial,
                source: Box::new(source),
                running: false,
                epoch: 0,
            }),
            rules: config.rules,
            stats: StatsCollector::new(),
            publisher,
        });

        Ok(Self { shared, config, task: Mutex::new(None) })
    }

    /// Start periodic ticking. A no-op when already running.
    ///
    /// The first tick fires one full interval after the call. Requires a tokio runtime.
    pub fn start(&self) -> Result<(), SimulatorError> {
        let handle = Handle::try_current().map_err(|_| SimulatorError::RuntimeUnavailable)?;

        let mut task = self.task.lock();
        let epoch = {
            let mut state = self.shared.state.lock();
            if state.running {
                tracing::debug!("MetricSimulator already running, ignoring start");
                return Ok(());
            }
            state.running = true;
            state.epoch += 1;
            state.epoch
        };
        self.shared.stats.record_start();

        let shared = Arc::clone(&self.shared);
        let period = self.config.interval();
        *task = Some(handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !shared.scheduled_tick(epoch) {
                    break;
                }
            }
        }));

        tracing::info!(interval_ms = self.config.interval_ms, "MetricSimulator started");
        Ok(())
    }

    /// Stop periodic ticking. Safe to call repeatedly.
    ///
    /// Once this returns no tick, pending or in flight, can change the metrics.
    pub fn stop(&self) {
        let mut task = self.task.lock();
        let was_running = {
            let mut state = self.shared.state.lock();
            std::mem::replace(&mut state.running, false)
        };

        if let Some(handle) = task.take() {
            handle.abort();
        }

        if was_running {
            self.shared.stats.record_stop();
            tracing::info!(
                ticks_applied = self.shared.stats.ticks_applied(),
                "MetricSimulator stopped"
            );
        }
    }

    /// Apply one update to every metric, regardless of whether the clock is running
    pub fn tick(&self) -> MetricSet {
        let mut state = self.shared.state.lock();
        self.shared.apply_tick(&mut state);
        state.metrics
    }

    /// Current readings, by value
    pub fn snapshot(&self) -> MetricSet {
        self.shared.state.lock().metrics
    }

    /// Receive every new reading as it is published
    pub fn subscribe(&self) -> watch::Receiver<MetricSet> {
        self.shared.publisher.subscribe()
    }

    /// Check if the periodic clock is running
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Get current stats
    pub fn stats(&self) -> SimulatorStats {
        self.shared.stats.get_stats(self.is_running())
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

/// Dropping a simulator cancels its timer; a running clock never outlives its owner.
impl Drop for MetricSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MetricSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSimulator")
            .field("metrics", &self.snapshot())
            .field("running", &self.is_running())
            .field("interval_ms", &self.config.interval_ms)
            .finish()
    }
}
