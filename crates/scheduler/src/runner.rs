//! Scheduler - run lifecycle and tick loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{
    hz_to_period_ns, seconds_to_ns, Event, EventKind, EventSink, Frame, FrameSource, NodeConfig,
    NodeError, Result, RunInfo,
};
use fingerprint::{compute_calibration_hash, compute_config_hash};
use tracing::{debug, error, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::state::{RunState, StopReason};
use crate::summary::{RunCounters, RunSummary};

/// Loop parameters resolved once per run
#[derive(Debug, Clone, Copy)]
struct LoopPlan {
    period: Duration,
    heartbeat_every: Duration,
    max_run: Option<Duration>,
    max_ticks: u64,
    frame_stats_every: u64,
    loops: bool,
}

impl LoopPlan {
    fn from_config(cfg: &NodeConfig) -> Self {
        let input = &cfg.input;
        let max_run = (input.max_run_s > 0.0)
            .then(|| Duration::from_nanos(seconds_to_ns(input.max_run_s).max(0) as u64));
        Self {
            period: Duration::from_nanos(hz_to_period_ns(input.tick_hz).max(1) as u64),
            heartbeat_every: Duration::from_secs(input.heartbeat_every_s.max(0) as u64),
            max_run,
            max_ticks: u64::try_from(input.max_ticks).unwrap_or(0),
            frame_stats_every: u64::from(input.frame_stats_every.max(1)),
            loops: input.loops(),
        }
    }
}

/// Run lifecycle scheduler
///
/// Owns the frame source and the event sink for the duration of a run and
/// closes both on every exit path, including drop.
///
/// Lifecycle: `Idle -> Started -> Running -> Stopped`.
pub struct Scheduler<C: Clock = SystemClock> {
    config: NodeConfig,
    config_path: String,
    source: Box<dyn FrameSource>,
    sink: Box<dyn EventSink>,
    clock: C,
    shutdown: Option<Arc<AtomicBool>>,
    state: RunState,
    run: Option<RunInfo>,
    started_at: Option<Instant>,
    last_heartbeat: Option<Instant>,
    seen_rewinds: u64,
    counters: RunCounters,
}

impl Scheduler<SystemClock> {
    /// Create a scheduler on the system clock
    pub fn new(
        config: NodeConfig,
        config_path: impl Into<String>,
        source: Box<dyn FrameSource>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self::with_clock(config, config_path, source, sink, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Create a scheduler on an explicit clock
    pub fn with_clock(
        config: NodeConfig,
        config_path: impl Into<String>,
        source: Box<dyn FrameSource>,
        sink: Box<dyn EventSink>,
        clock: C,
    ) -> Self {
        Self {
            config,
            config_path: config_path.into(),
            source,
            sink,
            clock,
            shutdown: None,
            state: RunState::Idle,
            run: None,
            started_at: None,
            last_heartbeat: None,
            seen_rewinds: 0,
            counters: RunCounters::default(),
        }
    }

    /// Stop at the next iteration boundary once `flag` is set
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run metadata, available after a successful `start`
    pub fn run_info(&self) -> Option<&RunInfo> {
        self.run.as_ref()
    }

    /// Counters so far; final once the run has stopped
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }

    /// Anchor clocks, fingerprint the config, open the event log and then the
    /// frame source
    ///
    /// # Errors
    /// Internal error unless `Idle`. Any open failure stops the scheduler and
    /// is returned unchanged.
    #[instrument(name = "scheduler_start", skip(self), fields(node_id = %self.config.node_id))]
    pub fn start(&mut self) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(NodeError::internal(format!(
                "scheduler: start called in state {}",
                self.state
            )));
        }

        let started_at = self.clock.now();
        let run = RunInfo {
            node_id: self.config.node_id.clone(),
            config_path: self.config_path.clone(),
            out_dir: self.config.output.out_dir.clone(),
            config_hash: compute_config_hash(&self.config),
            calibration_hash: compute_calibration_hash(&self.config.calibration),
            start_time_ns: 0,
            wall_start_time_ns: self.clock.wall_now_ns(),
        };
        self.started_at = Some(started_at);

        if let Err(e) = self.sink.open(&run) {
            error!(sink = self.sink.name(), error = %e, "event log open failed");
            self.stop();
            return Err(e);
        }
        if let Err(e) = self.source.open() {
            error!(source = self.source.name(), error = %e, "frame source open failed");
            self.stop();
            return Err(e);
        }

        self.seen_rewinds = self.source.rewind_count();
        info!(
            config_hash = %run.config_hash,
            calibration_hash = %run.calibration_hash,
            source = self.source.name(),
            sink = self.sink.name(),
            "run started"
        );
        self.run = Some(run);
        self.state = RunState::Started;
        Ok(())
    }

    /// Drive ticks until a limit, end of input, a shutdown request or an error
    ///
    /// The scheduler is stopped when this returns, whatever the outcome.
    ///
    /// # Errors
    /// Internal error unless `Started`. Any source or sink failure other than
    /// end of input is fatal and returned without retry.
    pub fn run_loop(&mut self) -> Result<RunSummary> {
        if self.state != RunState::Started {
            return Err(NodeError::internal(format!(
                "scheduler: run_loop called in state {}",
                self.state
            )));
        }
        let (Some(started_at), Some(run)) = (self.started_at, self.run.clone()) else {
            return Err(NodeError::internal("scheduler: missing run anchor"));
        };

        self.state = RunState::Running;
        let plan = LoopPlan::from_config(&self.config);
        debug!(?plan, "run loop entered");

        match self.drive(started_at, plan) {
            Ok(stop_reason) => {
                let duration = self.clock.now().saturating_duration_since(started_at);
                self.stop();
                let summary = RunSummary {
                    stop_reason,
                    run,
                    counters: self.counters.clone(),
                    duration,
                };
                info!(
                    reason = %stop_reason,
                    ticks = summary.counters.ticks,
                    frames = summary.counters.frames,
                    overruns = summary.counters.overruns,
                    "run finished"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, kind = %e.kind(), ticks = self.counters.ticks, "run loop failed");
                self.stop();
                Err(e)
            }
        }
    }

    /// `start` followed by `run_loop`
    pub fn run(&mut self) -> Result<RunSummary> {
        self.start()?;
        self.run_loop()
    }

    /// Flush and close the event log, close the frame source
    ///
    /// Idempotent and never fails; flush errors are logged.
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        if let Err(e) = self.sink.flush() {
            warn!(sink = self.sink.name(), error = %e, "flush on stop failed");
        }
        self.sink.close();
        self.source.close();

        debug!(previous = %self.state, "scheduler stopped");
        self.state = RunState::Stopped;
    }

    fn drive(&mut self, started_at: Instant, plan: LoopPlan) -> Result<StopReason> {
        let mut deadline = started_at + plan.period;

        loop {
            let now = self.clock.now();
            let elapsed = now.saturating_duration_since(started_at);

            if self.shutdown_requested() {
                return self.finish(StopReason::Signal, elapsed);
            }
            if plan.max_run.is_some_and(|limit| elapsed >= limit) {
                return self.finish(StopReason::MaxRuntime, elapsed);
            }
            if plan.max_ticks > 0 && self.counters.ticks >= plan.max_ticks {
                return self.finish(StopReason::MaxTicks, elapsed);
            }

            if self.heartbeat_due(now, plan.heartbeat_every) {
                let message = format!(
                    "alive tick={} frames={}",
                    self.counters.ticks, self.counters.frames
                );
                let event =
                    Event::new(EventKind::Heartbeat, as_ns(elapsed), self.clock.wall_now_ns());
                self.emit(event.with_message(message))?;
                self.sink.flush()?;
                self.last_heartbeat = Some(now);
                self.counters.heartbeats += 1;
            }

            match self.source.next() {
                Ok(frame) => self.on_frame(frame, plan.frame_stats_every, started_at)?,
                Err(e) if e.is_eof() => {
                    if !plan.loops {
                        let event = self.event_since(EventKind::InputEof, started_at);
                        self.emit(event.with_message(StopReason::InputEof.message()))?;
                        self.sink.flush()?;
                        info!(ticks = self.counters.ticks, "input source reached end");
                        return Ok(StopReason::InputEof);
                    }
                    self.source.reset()?;
                    self.on_reset("replay restarted after end of input", started_at)?;
                }
                Err(e) => return Err(e),
            }

            self.sink.flush()?;
            self.counters.ticks += 1;
            observability::record_tick();

            // Fixed-rate pacing; a late tick resynchronises instead of bursting.
            let after = self.clock.now();
            if after < deadline {
                self.clock.sleep_until(deadline);
                deadline += plan.period;
            } else {
                let lag = after - deadline;
                self.counters.overruns += 1;
                observability::record_tick_overrun();
                observability::record_tick_lag_ms(lag.as_secs_f64() * 1e3);
                debug!(
                    tick = self.counters.ticks,
                    lag_ms = lag.as_secs_f64() * 1e3,
                    "tick overrun"
                );
                deadline = after + plan.period;
            }
        }
    }

    fn on_frame(&mut self, frame: Frame, frame_stats_every: u64, started_at: Instant) -> Result<()> {
        let rewinds = self.source.rewind_count();
        if rewinds > self.seen_rewinds {
            self.seen_rewinds = rewinds;
            self.on_reset("replay looped to first frame", started_at)?;
        }

        let num_points = frame.len();
        self.counters.frames += 1;
        self.counters.points += num_points as u64;
        self.counters.frame_points.push(num_points as f64);
        observability::record_frame(self.source.name(), num_points);

        if self.counters.ticks % frame_stats_every == 0 {
            let message = format!("frame_id={} num_points={}", frame.frame_id, num_points);
            let event = Event::new(EventKind::FrameStats, frame.t_ns, self.clock.wall_now_ns());
            self.emit(event.with_message(message))?;
            self.counters.frame_events += 1;
        }

        debug!(
            tick = self.counters.ticks,
            frame_id = %frame.frame_id,
            t_ns = frame.t_ns,
            num_points,
            "frame pulled"
        );
        Ok(())
    }

    fn on_reset(&mut self, message: &str, started_at: Instant) -> Result<()> {
        self.counters.resets += 1;
        observability::record_replay_reset();
        let event = self.event_since(EventKind::ReplayReset, started_at);
        self.emit(event.with_message(message))?;
        info!(resets = self.counters.resets, source = self.source.name(), "replay reset");
        Ok(())
    }

    fn finish(&mut self, reason: StopReason, elapsed: Duration) -> Result<StopReason> {
        let event = Event::new(EventKind::Shutdown, as_ns(elapsed), self.clock.wall_now_ns());
        self.emit(event.with_message(reason.message()))?;
        self.sink.flush()?;
        info!(reason = %reason, ticks = self.counters.ticks, "shutdown");
        Ok(reason)
    }

    fn heartbeat_due(&self, now: Instant, every: Duration) -> bool {
        if every.is_zero() {
            return false;
        }
        match self.last_heartbeat {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= every,
        }
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn event_since(&self, kind: EventKind, started_at: Instant) -> Event {
        let elapsed = self.clock.now().saturating_duration_since(started_at);
        Event::new(kind, as_ns(elapsed), self.clock.wall_now_ns())
    }

    fn emit(&mut self, event: Event) -> Result<()> {
        self.sink.emit(&event)
    }
}

impl<C: Clock> Drop for Scheduler<C> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn as_ns(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}
