/// The checkout simulation engine
///
/// Drives one run from configuration to final statistics:
///
/// ```text
/// Configured --seed()--> Seeded --step()--> Running --step() on empty schedule--> Completed
///                                              |
///                                              +--invariant violation--> Faulted
/// ```
///
/// Each `step()` processes exactly one event and hands back a `Snapshot`.
/// The engine never sleeps or paces itself; whoever drives it decides how
/// fast to call `step()`.
use serde::Serialize;

use crate::config::{CustomerCount, SimulationConfig};
use crate::error::SimulationError;
use crate::logger::{LogLevel, Logger};
use crate::model::customer::{Customer, CustomerId};
use crate::model::random::{RandomVariates, SeededUniforms, UniformSource};
use crate::model::register::RegisterBank;
use crate::model::schedule::{Event, EventKind, EventSchedule};
use crate::model::statistics::{FinalStatistics, StatisticsAccumulator};
use crate::model::time::{SimDuration, SimulationTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    /// Parameters validated, no customers generated yet
    Configured,
    /// Arrivals scheduled, nothing processed yet
    Seeded,
    Running,
    /// Schedule drained; final statistics are available
    Completed,
    /// Schedule and register lines disagreed; the run is dead
    Faulted,
}

impl EngineState {
    fn name(&self) -> &'static str {
        match self {
            EngineState::Configured => "configured",
            EngineState::Seeded => "seeded",
            EngineState::Running => "running",
            EngineState::Completed => "completed",
            EngineState::Faulted => "faulted",
        }
    }
}

/// Read-only view of the run right after one event was processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// The event that was just processed
    pub event: Event,
    pub clock: SimulationTime,
    /// Customer ids per register, head (being served) first
    pub lines: Vec<Vec<CustomerId>>,
    pub arrivals: u32,
    pub departures: u32,
    pub events_processed: u32,
    pub longest_queue_seen: usize,
    pub pending_arrivals: usize,
    pub pending_departures: usize,
    pub customer_count: u32,
}

impl Snapshot {
    /// Customers standing in any line, including those being served
    pub fn queued(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

pub struct SimulationEngine<U = SeededUniforms> {
    config: SimulationConfig,
    state: EngineState,
    variates: RandomVariates<U>,
    schedule: EventSchedule,
    registers: RegisterBank,
    /// Customer `id` lives at index `id - 1`
    customers: Vec<Customer>,
    stats: StatisticsAccumulator,
    clock: SimulationTime,
    logger: Logger,
}

impl SimulationEngine<SeededUniforms> {
    /// Validate `config` and build an engine on a seeded ChaCha stream
    ///
    /// Without a configured seed one is drawn from system entropy; it can be
    /// read back with [`SimulationEngine::rng_seed`].
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let source = match config.seed {
            Some(seed) => SeededUniforms::new(seed),
            None => SeededUniforms::from_entropy(),
        };
        Self::with_source(config, source)
    }

    /// Seed actually used for this run's random stream
    pub fn rng_seed(&self) -> u64 {
        self.variates.source().seed()
    }
}

impl<U: UniformSource> SimulationEngine<U> {
    /// Validate `config` and build an engine drawing uniforms from `source`
    pub fn with_source(config: SimulationConfig, source: U) -> Result<Self, SimulationError> {
        config.validate()?;
        let registers = RegisterBank::new(config.registers);
        Ok(SimulationEngine {
            config,
            state: EngineState::Configured,
            variates: RandomVariates::new(source),
            schedule: EventSchedule::new(),
            registers,
            customers: Vec::new(),
            stats: StatisticsAccumulator::new(),
            clock: SimulationTime::OPENING,
            logger: Logger::silent(),
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn clock(&self) -> SimulationTime {
        self.clock
    }

    pub fn schedule(&self) -> &EventSchedule {
        &self.schedule
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn statistics(&self) -> &StatisticsAccumulator {
        &self.stats
    }

    /// Number of customers generated by `seed()`; zero before that
    pub fn customer_count(&self) -> u32 {
        self.customers.len() as u32
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get((id as usize).checked_sub(1)?)
    }

    fn customer_mut(&mut self, id: CustomerId) -> Option<&mut Customer> {
        self.customers.get_mut((id as usize).checked_sub(1)?)
    }

    pub fn is_complete(&self) -> bool {
        self.state == EngineState::Completed
    }

    /// Generate the customers and schedule one arrival for each
    ///
    /// Arrival times are uniform whole seconds within the operating period.
    /// A run with no customers goes straight to `Completed`.
    pub fn seed(&mut self) -> Result<(), SimulationError> {
        if self.state != EngineState::Configured {
            return Err(self.invalid_transition("seed"));
        }

        let count = match self.config.customers {
            CustomerCount::Exact(count) => count,
            CustomerCount::PoissonMean(mean) => self.variates.poisson(mean),
        };

        let period = self.config.operating_period.as_seconds();
        self.customers.reserve(count as usize);
        for id in 1..=count {
            let arrival = SimulationTime::new(self.variates.uniform_below(period));
            self.customers.push(Customer::new(id, arrival));
            self.schedule.push(Event::arrive(id, arrival));
        }

        self.logger.info(&format!(
            "Seeded {} customers over {} across {} registers",
            count, self.config.operating_period, self.config.registers
        ));

        self.state = if count == 0 {
            EngineState::Completed
        } else {
            EngineState::Seeded
        };
        Ok(())
    }

    /// Process the next event
    ///
    /// Returns `Ok(None)` once the schedule is drained; the engine is then
    /// `Completed` and further calls keep returning `Ok(None)`.
    pub fn step(&mut self) -> Result<Option<Snapshot>, SimulationError> {
        match self.state {
            EngineState::Seeded | EngineState::Running => {}
            EngineState::Completed => return Ok(None),
            EngineState::Configured | EngineState::Faulted => {
                return Err(self.invalid_transition("step"))
            }
        }

        if self.schedule.is_empty() {
            self.state = EngineState::Completed;
            self.logger.info(&format!(
                "Simulation complete at {} after {} events",
                self.clock, self.stats.events_processed
            ));
            return Ok(None);
        }

        self.state = EngineState::Running;
        let event = self.schedule.pop()?;
        self.clock = event.time;

        match event.kind {
            EventKind::Arrive => self.handle_arrival(&event)?,
            EventKind::Depart => self.handle_departure(&event)?,
        }

        self.stats.record_event();
        self.stats.observe_longest_line(self.registers.longest_line_len());

        debug_assert_eq!(
            self.registers.total_queued() + self.schedule.pending_arrivals(),
            (self.customer_count() - self.stats.departures) as usize,
            "customers went missing between schedule and registers"
        );
        debug_assert_eq!(
            self.schedule.pending_departures(),
            self.registers.busy_registers(),
            "every busy register needs exactly one pending departure"
        );

        Ok(Some(self.snapshot(event)))
    }

    /// Drain the schedule and return the final statistics
    ///
    /// Seeds first if that has not happened yet.
    pub fn run(&mut self) -> Result<FinalStatistics, SimulationError> {
        self.run_with(|_| {})
    }

    /// Like `run`, handing every snapshot to `on_snapshot` as it is produced
    pub fn run_with(
        &mut self,
        mut on_snapshot: impl FnMut(&Snapshot),
    ) -> Result<FinalStatistics, SimulationError> {
        if self.state == EngineState::Configured {
            self.seed()?;
        }
        while let Some(snapshot) = self.step()? {
            on_snapshot(&snapshot);
        }
        self.final_statistics()
            .ok_or_else(|| self.invalid_transition("report final statistics"))
    }

    /// Final statistics, available once the run is `Completed`
    pub fn final_statistics(&self) -> Option<FinalStatistics> {
        if self.state != EngineState::Completed {
            return None;
        }
        Some(self.stats.finalize(self.customer_count(), self.clock))
    }

    fn handle_arrival(&mut self, event: &Event) -> Result<(), SimulationError> {
        let line = self.registers.shortest_line();
        let at_register = self.registers.enqueue(line, event.customer);

        if self.logger.enabled(LogLevel::Debug) {
            self.logger.debug(&format!(
                "[{}] customer {} joins register {} (line length {})",
                event.time,
                event.customer,
                line,
                self.registers.line(line).map_or(0, |l| l.len())
            ));
        }

        if at_register {
            self.start_service(event.customer, event.time)?;
        }
        self.stats.record_arrival();
        Ok(())
    }

    fn handle_departure(&mut self, event: &Event) -> Result<(), SimulationError> {
        let Some(removal) = self.registers.remove_if_head(event.customer) else {
            return Err(self.violation(
                event.customer,
                event.time,
                "departing customer is not at the head of any line",
            ));
        };

        if self.logger.enabled(LogLevel::Debug) {
            self.logger.debug(&format!(
                "[{}] customer {} leaves register {}",
                event.time, event.customer, removal.line
            ));
        }

        if let Some(next) = removal.next_head {
            let awaiting = self
                .customer(next)
                .map_or(false, Customer::is_awaiting_service);
            if awaiting {
                self.start_service(next, event.time)?;
            }
        }
        self.stats.record_departure();
        Ok(())
    }

    /// Customer `id` reached a register at `now`: draw their service time and
    /// schedule their departure
    ///
    /// Service starts at `now`, not at the customer's arrival, so the
    /// departure is never earlier than the current clock and the clock never
    /// moves backwards.
    fn start_service(&mut self, id: CustomerId, now: SimulationTime) -> Result<(), SimulationError> {
        let time_to_serve = self.draw_service_time();
        let started = self.customer_mut(id).and_then(|customer| {
            let departure = customer.begin_service(now, time_to_serve)?;
            Some((departure, customer.arrival_time.duration_until(now)))
        });
        let Some((departure, wait)) = started else {
            return Err(self.violation(id, now, "service was already assigned or customer is unknown"));
        };

        self.stats.record_service(time_to_serve);
        self.stats.record_wait(wait);
        self.schedule.push(Event::depart(id, departure));

        if self.logger.enabled(LogLevel::Debug) {
            self.logger.debug(&format!(
                "[{}] customer {} served for {} after waiting {}, departs at {}",
                now, id, time_to_serve, wait, departure
            ));
        }
        Ok(())
    }

    /// minimum + NegExp(expected - minimum), truncated to whole seconds
    fn draw_service_time(&mut self) -> SimDuration {
        let spread = self.config.service_time_spread().as_secs_f64();
        let extra = self.variates.negative_exponential(spread);
        self.config.minimum_service_time + SimDuration::from_seconds(extra as u64)
    }

    fn snapshot(&self, event: Event) -> Snapshot {
        Snapshot {
            event,
            clock: self.clock,
            lines: self.registers.contents(),
            arrivals: self.stats.arrivals,
            departures: self.stats.departures,
            events_processed: self.stats.events_processed,
            longest_queue_seen: self.stats.longest_queue_seen,
            pending_arrivals: self.schedule.pending_arrivals(),
            pending_departures: self.schedule.pending_departures(),
            customer_count: self.customer_count(),
        }
    }

    fn invalid_transition(&self, operation: &'static str) -> SimulationError {
        SimulationError::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }

    /// Mark the run dead and build the error describing why
    fn violation(&mut self, customer: CustomerId, time: SimulationTime, reason: &str) -> SimulationError {
        self.state = EngineState::Faulted;
        let err = SimulationError::InvariantViolation {
            customer,
            time,
            reason: reason.to_string(),
            lines: self.registers.contents(),
        };
        self.logger.error(&err.to_string());
        err
    }
}
