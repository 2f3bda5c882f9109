/// The event schedule: every pending arrival and departure, ordered by time
///
/// Key concepts:
/// - Event: a customer arriving at, or departing from, the registers at a given time
/// - EventSchedule: a min-heap of events; equal times pop in insertion order
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use serde::Serialize;

use crate::error::SimulationError;
use crate::model::customer::CustomerId;
use crate::model::time::SimulationTime;

/// What happens to the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// Customer walks up to the registers and picks a line
    Arrive,
    /// Customer finishes checking out and leaves their line
    Depart,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Arrive => write!(f, "ARRIVE"),
            EventKind::Depart => write!(f, "DEPART"),
        }
    }
}

/// Something that happens to one customer at a specific time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub customer: CustomerId,
    pub time: SimulationTime,
}

impl Event {
    pub fn arrive(customer: CustomerId, time: SimulationTime) -> Self {
        Event {
            kind: EventKind::Arrive,
            customer,
            time,
        }
    }

    pub fn depart(customer: CustomerId, time: SimulationTime) -> Self {
        Event {
            kind: EventKind::Depart,
            customer,
            time,
        }
    }
}

/// Heap entry: the event plus the order it was pushed in
#[derive(Debug)]
struct Scheduled {
    event: Event,
    seq: u64,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.event.time == other.event.time && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so BinaryHeap pops the earliest time first, and among equal
/// times the entry pushed first
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .time
            .cmp(&self.event.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending events in time order
#[derive(Debug, Default)]
pub struct EventSchedule {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
    pending_arrivals: usize,
    pending_departures: usize,
}

impl EventSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event, O(log n)
    pub fn push(&mut self, event: Event) {
        match event.kind {
            EventKind::Arrive => self.pending_arrivals += 1,
            EventKind::Depart => self.pending_departures += 1,
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { event, seq });
    }

    /// The next event due, without removing it
    pub fn peek(&self) -> Result<&Event, SimulationError> {
        self.heap
            .peek()
            .map(|scheduled| &scheduled.event)
            .ok_or(SimulationError::EmptySchedule)
    }

    /// Remove and return the next event due
    pub fn pop(&mut self) -> Result<Event, SimulationError> {
        let Scheduled { event, .. } = self.heap.pop().ok_or(SimulationError::EmptySchedule)?;
        match event.kind {
            EventKind::Arrive => self.pending_arrivals -= 1,
            EventKind::Depart => self.pending_departures -= 1,
        }
        Ok(event)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn pending_arrivals(&self) -> usize {
        self.pending_arrivals
    }

    pub fn pending_departures(&self) -> usize {
        self.pending_departures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_schedule_is_empty() {
        let schedule = EventSchedule::new();
        assert!(schedule.is_empty());
        assert_eq!(schedule.len(), 0);
    }

    #[test]
    fn test_earliest_event_pops_first() {
        let mut schedule = EventSchedule::new();
        schedule.push(Event::arrive(1, SimulationTime::new(10)));
        schedule.push(Event::depart(2, SimulationTime::new(5)));
        schedule.push(Event::arrive(3, SimulationTime::new(7)));

        assert_eq!(schedule.peek().unwrap().customer, 2);
        let order: Vec<CustomerId> = (0..3).map(|_| schedule.pop().unwrap().customer).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_equal_times_pop_in_insertion_order() {
        let mut schedule = EventSchedule::new();
        for id in [4, 9, 1, 6] {
            schedule.push(Event::arrive(id, SimulationTime::new(30)));
        }
        schedule.push(Event::depart(2, SimulationTime::new(30)));

        let order: Vec<CustomerId> = (0..5).map(|_| schedule.pop().unwrap().customer).collect();
        assert_eq!(order, vec![4, 9, 1, 6, 2]);
    }

    #[test]
    fn test_empty_schedule_errors() {
        let mut schedule = EventSchedule::new();
        assert!(matches!(schedule.peek(), Err(SimulationError::EmptySchedule)));
        assert!(matches!(schedule.pop(), Err(SimulationError::EmptySchedule)));
    }

    #[test]
    fn test_pending_counts_track_kinds() {
        let mut schedule = EventSchedule::new();
        schedule.push(Event::arrive(1, SimulationTime::new(1)));
        schedule.push(Event::arrive(2, SimulationTime::new(2)));
        schedule.push(Event::depart(1, SimulationTime::new(3)));
        assert_eq!(schedule.pending_arrivals(), 2);
        assert_eq!(schedule.pending_departures(), 1);

        schedule.pop().unwrap();
        assert_eq!(schedule.pending_arrivals(), 1);
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut schedule = EventSchedule::new();
        schedule.push(Event::arrive(1, SimulationTime::new(1)));
        assert_eq!(schedule.peek().unwrap().kind, EventKind::Arrive);
        assert_eq!(schedule.len(), 1);
    }
}
