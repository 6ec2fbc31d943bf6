//! Service state management and the view-layer loops

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::config::ServiceConfig;
use metric_simulator::{MetricSet, MetricSimulator};
use panel_selector::{DemoPanelSelector, HeadlineMetric, PanelKey, PanelError};

/// How the command loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The user asked to quit
    Quit,
    /// Input closed
    EndOfInput,
    /// The service is shutting down
    Shutdown,
}

/// Service state: the simulator, the panel selector and a shutdown flag
pub struct DemoService {
    /// Service configuration
    pub config: ServiceConfig,

    simulator: MetricSimulator,
    selector: Mutex<DemoPanelSelector>,
    shutdown: watch::Sender<bool>,
}

impl DemoService {
    /// Create the service with its simulator and selector
    pub fn new(config: ServiceConfig) -> Result<Self> {
        info!("Initializing MetricSimulator...");
        let simulator = match config.service.seed {
            Some(seed) => MetricSimulator::with_seed(config.simulator.clone(), seed),
            None => MetricSimulator::new(config.simulator.clone()),
        }
        .context("Failed to create MetricSimulator")?;

        info!(panel = %config.service.initial_panel, "Initializing DemoPanelSelector...");
        let selector = DemoPanelSelector::with_initial(config.service.initial_panel);
        let (shutdown, _) = watch::channel(false);

        Ok(Self { config, simulator, selector: Mutex::new(selector), shutdown })
    }

    /// Start the periodic metric updates
    pub fn start(&self) -> Result<()> {
        self.simulator.start().context("Failed to start MetricSimulator")
    }

    /// Stop the simulator and tell every loop to finish
    pub fn stop(&self) {
        self.simulator.stop();
        self.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn snapshot(&self) -> MetricSet {
        self.simulator.snapshot()
    }

    pub fn simulator(&self) -> &MetricSimulator {
        &self.simulator
    }

    pub async fn current_panel(&self) -> PanelKey {
        self.selector.lock().await.current()
    }

    /// Validate and apply a panel selection
    pub async fn select_panel(&self, raw: &str) -> Result<PanelKey, PanelError> {
        let mut selector = self.selector.lock().await;
        let previous = selector.current();
        let key = selector.select_str(raw)?;
        if key != previous {
            info!(from = %previous, to = %key, "Panel selected");
        }
        Ok(key)
    }

    /// Headline line for `panel`, as its header cards would show it
    pub fn headline(&self, panel: PanelKey, metrics: &MetricSet) -> String {
        format_headline(panel, metrics, self.config.simulator.bed_capacity())
    }

    /// Log the active panel's headline whenever the metrics or the panel change
    pub async fn run_snapshot_logger(self: Arc<Self>) {
        let mut metric_updates = self.simulator.subscribe();
        let mut panel_updates = self.selector.lock().await.subscribe();
        let mut shutdown = self.shutdown.subscribe();

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = metric_updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = panel_updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = shutdown.changed() => continue,
            }

            let metrics = *metric_updates.borrow_and_update();
            let panel = *panel_updates.borrow_and_update();
            info!(
                panel = %panel,
                active_patients = metrics.active_patients,
                bed_occupancy = metrics.bed_occupancy,
                wait_time_minutes = metrics.wait_time_rounded(),
                "{}",
                self.headline(panel, &metrics)
            );
        }

        info!("Snapshot logger stopped");
    }

    /// Read commands line by line: a panel key, `status` or `quit`
    pub async fn run_commands<R>(&self, reader: R) -> Result<CommandOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut shutdown = self.shutdown.subscribe();

        loop {
            if *shutdown.borrow_and_update() {
                return Ok(CommandOutcome::Shutdown);
            }

            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read command")?,
                _ = shutdown.changed() => continue,
            };

            let Some(line) = line else {
                return Ok(CommandOutcome::EndOfInput);
            };

            match line.trim() {
                "" => {}
                "quit" | "exit" => return Ok(CommandOutcome::Quit),
                "status" => {
                    let metrics = self.snapshot();
                    let panel = self.current_panel().await;
                    let stats = self.simulator.stats();
                    info!(
                        panel = %panel,
                        ticks_applied = stats.ticks_applied,
                        running = stats.is_running,
                        "{}",
                        self.headline(panel, &metrics)
                    );
                }
                command => {
                    if let Err(e) = self.select_panel(command).await {
                        warn!("Ignoring command: {}", e);
                    }
                }
            }
        }
    }
}

/// Render the headline metrics of `panel`, e.g. `active patients 247 | beds 23/30`
pub fn format_headline(panel: PanelKey, metrics: &MetricSet, bed_capacity: Option<i64>) -> String {
    let parts: Vec<String> = panel
        .headline_metrics()
        .iter()
        .map(|metric| match metric {
            HeadlineMetric::ActivePatients => {
                format!("active patients {}", metrics.active_patients)
            }
            HeadlineMetric::BedOccupancy => match bed_capacity {
                Some(capacity) => format!("beds {}/{}", metrics.bed_occupancy, capacity),
                None => format!("beds {}", metrics.bed_occupancy),
            },
            HeadlineMetric::WaitTimeMinutes => {
                format!("avg wait {:.1} min", metrics.wait_time_rounded())
            }
        })
        .collect();

    if parts.is_empty() {
        format!("{panel}: static dataset")
    } else {
        format!("{panel}: {}", parts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.service.seed = Some(11);
        config
    }

    #[test]
    fn test_format_headline() {
        let metrics = MetricSet::default();
        assert_eq!(
            format_headline(PanelKey::Rtls, &metrics, Some(30)),
            "rtls: active patients 247 | beds 23/30"
        );
        assert_eq!(
            format_headline(PanelKey::Scheduling, &metrics, Some(30)),
            "scheduling: avg wait 8.2 min"
        );
        assert_eq!(format_headline(PanelKey::Mapping, &metrics, None), "mapping: static dataset");
        assert_eq!(
            format_headline(PanelKey::Rtls, &metrics, None),
            "rtls: active patients 247 | beds 23"
        );
    }

    #[test]
    fn test_headline_wait_time_matches_rounded_field() {
        // 8.25 is exact in binary, so the two rounding rules would disagree on it
        let metrics = MetricSet { wait_time_minutes: 8.25, ..Default::default() };
        assert_eq!(metrics.wait_time_rounded(), 8.3);
        assert_eq!(
            format_headline(PanelKey::Scheduling, &metrics, Some(30)),
            "scheduling: avg wait 8.3 min"
        );
    }

    #[tokio::test]
    async fn test_commands_select_panels() {
        let service = DemoService::new(test_config()).unwrap();
        let input: &[u8] = b"analytics\n\nbogus\nstatus\nscheduling\nquit\nmapping\n";

        let outcome = service.run_commands(input).await.unwrap();

        assert_eq!(outcome, CommandOutcome::Quit);
        assert_eq!(service.current_panel().await, PanelKey::Scheduling);
    }

    #[tokio::test]
    async fn test_commands_end_of_input() {
        let service = DemoService::new(test_config()).unwrap();
        let outcome = service.run_commands(&b"mapping"[..]).await.unwrap();

        assert_eq!(outcome, CommandOutcome::EndOfInput);
        assert_eq!(service.current_panel().await, PanelKey::Mapping);
    }

    #[tokio::test]
    async fn test_commands_stop_on_shutdown() {
        let service = Arc::new(DemoService::new(test_config()).unwrap());
        let (_writer, reader) = tokio::io::duplex(64);

        let commands = {
            let service = service.clone();
            tokio::spawn(async move {
                service.run_commands(tokio::io::BufReader::new(reader)).await
            })
        };

        service.stop();
        let outcome = tokio::time::timeout(Duration::from_secs(5), commands)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_lifecycle() {
        let service = Arc::new(DemoService::new(test_config()).unwrap());
        let logger = tokio::spawn(service.clone().run_snapshot_logger());

        service.start().unwrap();
        tokio::time::sleep(Duration::from_millis(8001)).await;
        assert_eq!(service.simulator().stats().ticks_applied, 2);

        service.stop();
        assert!(service.is_shutting_down());
        tokio::time::timeout(Duration::from_secs(5), logger).await.unwrap().unwrap();

        let frozen = service.snapshot();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.snapshot(), frozen);
    }
}
