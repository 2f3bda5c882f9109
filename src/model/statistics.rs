/// Running statistics for a checkout run
///
/// Everything here is an aggregate updated as events are processed; nothing is
/// recomputed from scratch. Averages are only taken once, at the end of a run.
use serde::Serialize;

use crate::model::time::{SimDuration, SimulationTime};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsAccumulator {
    pub arrivals: u32,
    pub departures: u32,
    pub events_processed: u32,
    pub longest_queue_seen: usize,
    shortest_service_time: Option<SimDuration>,
    longest_service_time: Option<SimDuration>,
    total_service_time: SimDuration,
    longest_wait: Option<SimDuration>,
    total_wait: SimDuration,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self) {
        self.arrivals += 1;
    }

    pub fn record_departure(&mut self) {
        self.departures += 1;
    }

    pub fn record_event(&mut self) {
        self.events_processed += 1;
    }

    /// Fold in one freshly assigned service time
    pub fn record_service(&mut self, time_to_serve: SimDuration) {
        self.shortest_service_time = Some(match self.shortest_service_time {
            Some(shortest) => shortest.min(time_to_serve),
            None => time_to_serve,
        });
        self.longest_service_time = Some(match self.longest_service_time {
            Some(longest) => longest.max(time_to_serve),
            None => time_to_serve,
        });
        self.total_service_time += time_to_serve;
    }

    /// Fold in how long a customer stood in line before reaching a register
    pub fn record_wait(&mut self, wait: SimDuration) {
        self.longest_wait = Some(self.longest_wait.map_or(wait, |longest| longest.max(wait)));
        self.total_wait += wait;
    }

    /// Compare the current longest line against the longest seen so far
    pub fn observe_longest_line(&mut self, longest: usize) {
        self.longest_queue_seen = self.longest_queue_seen.max(longest);
    }

    pub fn shortest_service_time(&self) -> Option<SimDuration> {
        self.shortest_service_time
    }

    pub fn longest_service_time(&self) -> Option<SimDuration> {
        self.longest_service_time
    }

    pub fn total_service_time(&self) -> SimDuration {
        self.total_service_time
    }

    /// Close out the run. Averages divide by `customer_count` and are `None`
    /// for an empty run.
    pub fn finalize(&self, customer_count: u32, closed_at: SimulationTime) -> FinalStatistics {
        FinalStatistics {
            customer_count,
            arrivals: self.arrivals,
            departures: self.departures,
            events_processed: self.events_processed,
            longest_queue_seen: self.longest_queue_seen,
            shortest_service_time: self.shortest_service_time,
            longest_service_time: self.longest_service_time,
            average_service_time: self.total_service_time.checked_mean(customer_count as u64),
            longest_wait: self.longest_wait,
            average_wait: self.total_wait.checked_mean(customer_count as u64),
            last_event_time: closed_at,
        }
    }
}

/// What a completed run reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalStatistics {
    pub customer_count: u32,
    pub arrivals: u32,
    pub departures: u32,
    pub events_processed: u32,
    pub longest_queue_seen: usize,
    pub shortest_service_time: Option<SimDuration>,
    pub longest_service_time: Option<SimDuration>,
    pub average_service_time: Option<SimDuration>,
    pub longest_wait: Option<SimDuration>,
    pub average_wait: Option<SimDuration>,
    /// Simulated time of the last processed event
    pub last_event_time: SimulationTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = StatisticsAccumulator::new();
        assert_eq!(stats.arrivals, 0);
        assert_eq!(stats.departures, 0);
        assert_eq!(stats.events_processed, 0);
        assert_eq!(stats.longest_queue_seen, 0);
        assert_eq!(stats.shortest_service_time(), None);
    }

    #[test]
    fn service_times_track_min_max_and_total() {
        let mut stats = StatisticsAccumulator::new();
        for seconds in [300, 90, 420, 150] {
            stats.record_service(SimDuration::from_seconds(seconds));
        }
        assert_eq!(stats.shortest_service_time(), Some(SimDuration::from_seconds(90)));
        assert_eq!(stats.longest_service_time(), Some(SimDuration::from_seconds(420)));
        assert_eq!(stats.total_service_time(), SimDuration::from_seconds(960));

        let summary = stats.finalize(4, SimulationTime::new(1000));
        assert_eq!(summary.average_service_time, Some(SimDuration::from_seconds(240)));
    }

    #[test]
    fn longest_queue_only_grows() {
        let mut stats = StatisticsAccumulator::new();
        stats.observe_longest_line(3);
        stats.observe_longest_line(1);
        stats.observe_longest_line(0);
        assert_eq!(stats.longest_queue_seen, 3);
    }

    #[test]
    fn waits_are_aggregated() {
        let mut stats = StatisticsAccumulator::new();
        stats.record_wait(SimDuration::ZERO);
        stats.record_wait(SimDuration::from_seconds(40));
        let summary = stats.finalize(2, SimulationTime::new(0));
        assert_eq!(summary.longest_wait, Some(SimDuration::from_seconds(40)));
        assert_eq!(summary.average_wait, Some(SimDuration::from_seconds(20)));
    }

    #[test]
    fn empty_run_has_undefined_averages() {
        let summary = StatisticsAccumulator::new().finalize(0, SimulationTime::OPENING);
        assert_eq!(summary.average_service_time, None);
        assert_eq!(summary.average_wait, None);
        assert_eq!(summary.shortest_service_time, None);
        assert_eq!(summary.events_processed, 0);
    }

    #[test]
    fn final_statistics_serialize() {
        let mut stats = StatisticsAccumulator::new();
        stats.record_service(SimDuration::from_min_sec(2, 5));
        let json = serde_json::to_value(stats.finalize(1, SimulationTime::new(125))).unwrap();
        assert_eq!(json["shortest_service_time"], serde_json::json!({"minutes": 2, "seconds": 5}));
        assert_eq!(json["average_wait"], serde_json::Value::Null);
        assert_eq!(json["last_event_time"], serde_json::json!(125));
    }
}
