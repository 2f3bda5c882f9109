use crate::model::time::{SimDuration, SimulationTime};

/// Customer ids run 1..=N in arrival-generation order
pub type CustomerId = u32;

/// A shopper heading for the registers
///
/// The service time stays unset until the customer reaches the head of a
/// line, and is set exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub arrival_time: SimulationTime,
    service_start: Option<SimulationTime>,
    time_to_serve: Option<SimDuration>,
}

impl Customer {
    pub fn new(id: CustomerId, arrival_time: SimulationTime) -> Self {
        Customer {
            id,
            arrival_time,
            service_start: None,
            time_to_serve: None,
        }
    }

    pub fn time_to_serve(&self) -> Option<SimDuration> {
        self.time_to_serve
    }

    pub fn service_start(&self) -> Option<SimulationTime> {
        self.service_start
    }

    /// Still waiting for a cashier to pick them up
    pub fn is_awaiting_service(&self) -> bool {
        self.time_to_serve.is_none()
    }

    /// Start checking this customer out at `start`
    ///
    /// Returns the departure time, or `None` if service was already assigned
    /// (the customer is left untouched in that case).
    pub fn begin_service(
        &mut self,
        start: SimulationTime,
        time_to_serve: SimDuration,
    ) -> Option<SimulationTime> {
        if self.time_to_serve.is_some() {
            return None;
        }
        self.service_start = Some(start);
        self.time_to_serve = Some(time_to_serve);
        Some(start.after(time_to_serve))
    }

    /// Scheduled departure, once service has started
    pub fn departure_time(&self) -> Option<SimulationTime> {
        Some(self.service_start?.after(self.time_to_serve?))
    }

    /// Time spent in line before reaching the register
    pub fn wait(&self) -> Option<SimDuration> {
        self.service_start
            .map(|start| self.arrival_time.duration_until(start))
    }
}
