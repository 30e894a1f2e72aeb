//! Main application orchestration.
//!
//! Wires the venue and reference clients into the detector, the execution
//! orchestrator, the ladder maintainer and the close recorder, then drives
//! them from a single `tokio::select!` loop until ctrl-c.

use crate::close_recorder::{CloseRecord, CloseRecorder};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use arb_detector::DivergenceDetector;
use arb_executor::{ExecutionOrchestrator, ExecutorError, SessionRegistry, SessionReport};
use arb_mm::{LadderMaintainer, LadderTickOutcome};
use arb_telemetry::{Metrics, StatsReporter};
use arb_venue::{PriceSource, ReferenceFeedClient, VenueRestClient};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Close-capture scheduler granularity.
const CLOSE_CAPTURE_POLL: Duration = Duration::from_secs(1);

/// Main application state.
pub struct Application {
    config: AppConfig,
    venue: Arc<VenueRestClient>,
    reference: Arc<ReferenceFeedClient>,
    detector: DivergenceDetector,
    ladder: Arc<Mutex<LadderMaintainer>>,
    orchestrator: ExecutionOrchestrator,
    close_recorder: CloseRecorder,
    stats: StatsReporter,
    sessions: Vec<JoinHandle<SessionReport>>,
}

impl Application {
    /// Create a new application instance.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let venue = Arc::new(VenueRestClient::new(config.venue.clone())?);
        let reference = Arc::new(ReferenceFeedClient::new(config.reference.clone())?);
        let detector = DivergenceDetector::new(config.detector.clone().validated()?);

        let ladder = Arc::new(Mutex::new(LadderMaintainer::new(
            config.symbols.venue.clone(),
            config.ladder.clone(),
            venue.clone(),
            venue.clone(),
            venue.clone(),
        )));

        let orchestrator = ExecutionOrchestrator::new(
            config.symbols.venue.clone(),
            config.execution.clone(),
            config.session.clone(),
            venue.clone(),
            venue.clone(),
            venue.clone(),
            ladder.clone(),
            SessionRegistry::new(),
        );

        let close_recorder = CloseRecorder::new(config.close_capture.clone())?;

        Ok(Self {
            config,
            venue,
            reference,
            detector,
            ladder,
            orchestrator,
            close_recorder,
            stats: StatsReporter::new(),
            sessions: Vec::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Confirm the venue knows the symbol before any order is sent.
    pub async fn run_preflight(&self) -> AppResult<()> {
        let symbol = &self.config.symbols.venue;
        let info = self.venue.symbol_info(symbol).await.map_err(|e| {
            AppError::Preflight(format!("symbol info for {symbol} unavailable: {e}"))
        })?;
        debug!(symbol = %symbol, ?info, "Venue symbol info");

        match self.reference.last_price(&self.config.symbols.reference).await {
            Ok(quote) => info!(
                symbol = %self.config.symbols.reference,
                price = %quote.value,
                "Reference feed reachable"
            ),
            Err(e) => warn!(
                symbol = %self.config.symbols.reference,
                error = %e,
                "Reference feed not reachable at start-up"
            ),
        }

        info!(symbol = %symbol, "Preflight passed");
        Ok(())
    }

    /// Capture the reference close immediately, independent of the schedule.
    pub async fn capture_close_once(&self) -> AppResult<CloseRecord> {
        self.close_recorder
            .capture(&self.reference, &self.config.symbols.reference)
            .await
    }

    /// Run the main loop until ctrl-c.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            venue_symbol = %self.config.symbols.venue,
            reference_symbol = %self.config.symbols.reference,
            threshold = %self.config.detector.threshold,
            close_capture = self.config.close_capture.enabled,
            "Starting application"
        );

        let mut divergence_interval =
            tokio::time::interval(Duration::from_secs(self.config.execution.tick_interval_secs));
        divergence_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ladder_interval =
            tokio::time::interval(Duration::from_secs(self.config.ladder.tick_interval_secs));
        ladder_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut close_interval = tokio::time::interval(CLOSE_CAPTURE_POLL);
        close_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats_interval =
            tokio::time::interval(Duration::from_secs(self.config.stats_interval_secs));
        // The first stats tick fires immediately; nothing to report yet.
        stats_interval.tick().await;

        info!("Entering main event loop");
        loop {
            tokio::select! {
                _ = divergence_interval.tick() => {
                    self.check_divergence().await;
                }

                _ = ladder_interval.tick() => {
                    let report = self.ladder.lock().await.tick(false).await;
                    if report.outcome != LadderTickOutcome::Unchanged {
                        debug!(?report, "Ladder tick");
                    }
                }

                _ = close_interval.tick(), if self.config.close_capture.enabled => {
                    if self.close_recorder.poll_due(Utc::now()) {
                        if let Err(e) = self.capture_close_once().await {
                            error!(error = %e, "Close capture failed");
                        }
                    }
                }

                _ = stats_interval.tick() => {
                    self.reap_sessions();
                    self.stats.log_summary();
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown().await
    }

    /// One divergence evaluation. Failures are logged, never propagated.
    async fn check_divergence(&mut self) {
        let venue_symbol = &self.config.symbols.venue;
        let reference_symbol = &self.config.symbols.reference;

        let (reference, venue) = tokio::join!(
            self.reference.last_price(reference_symbol),
            self.venue.last_price(venue_symbol),
        );

        let reference = match reference {
            Ok(quote) => quote.value,
            Err(e) => {
                warn!(symbol = %reference_symbol, error = %e, "Reference price unavailable, skipping tick");
                Metrics::data_unavailable("reference");
                return;
            }
        };
        let venue = match venue {
            Ok(quote) => quote.value,
            Err(e) => {
                warn!(symbol = %venue_symbol, error = %e, "Venue price unavailable, skipping tick");
                Metrics::data_unavailable("venue");
                return;
            }
        };

        let Some(signal) = self.detector.check(venue, reference) else {
            debug!(venue = %venue, reference = %reference, "No divergence");
            return;
        };

        info!(
            direction = %signal.direction,
            venue = %signal.venue_px,
            reference = %signal.reference_px,
            divergence = %signal.divergence,
            target = %signal.target_px,
            "Divergence signal"
        );

        match self.orchestrator.execute(&signal).await {
            Ok(Some(handle)) => self.sessions.push(handle),
            Ok(None) => {}
            Err(ExecutorError::SessionActive(symbol)) => {
                info!(symbol = %symbol, "Buy-back session still running, signal skipped");
            }
            Err(e) => warn!(direction = %signal.direction, error = %e, "Execution failed"),
        }
    }

    /// Drop handles of finished sessions.
    fn reap_sessions(&mut self) {
        self.sessions.retain(|handle| !handle.is_finished());
    }

    async fn shutdown(mut self) -> AppResult<()> {
        let cancelled = self.orchestrator.sessions().cancel_all();
        info!(cancelled, "Cancelling monitoring sessions");

        for handle in self.sessions.drain(..) {
            match handle.await {
                Ok(report) => info!(
                    symbol = %report.symbol,
                    outcome = report.outcome.as_label(),
                    checks = report.checks_performed,
                    "Session closed"
                ),
                Err(e) => error!(error = %e, "Session task failed"),
            }
        }

        self.stats.log_summary();
        match Metrics::gather_text() {
            Ok(text) => info!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Metrics unavailable"),
        }

        info!("Shutdown complete");
        Ok(())
    }
}
