/// The bank of checkout registers
///
/// Each register has one FIFO line. The customer at the head of a line is the
/// one being checked out; everyone behind them waits.
use std::collections::VecDeque;

use crate::model::customer::CustomerId;

/// Result of taking a departing customer off the head of their line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadRemoval {
    /// Register the customer left from
    pub line: usize,
    /// Who moved up to the register, if anyone was waiting
    pub next_head: Option<CustomerId>,
}

#[derive(Debug, Clone)]
pub struct RegisterBank {
    lines: Vec<VecDeque<CustomerId>>,
}

impl RegisterBank {
    pub fn new(register_count: usize) -> Self {
        RegisterBank {
            lines: vec![VecDeque::new(); register_count],
        }
    }

    pub fn register_count(&self) -> usize {
        self.lines.len()
    }

    /// Index of the line with the fewest customers
    ///
    /// Scans left to right and only moves on for a strictly shorter line, so
    /// ties go to the lowest index.
    pub fn shortest_line(&self) -> usize {
        let mut shortest = 0;
        for (index, line) in self.lines.iter().enumerate().skip(1) {
            if line.len() < self.lines[shortest].len() {
                shortest = index;
            }
        }
        shortest
    }

    /// Append a customer to the tail of line `index`
    ///
    /// Returns true if the customer went straight to the register (the line
    /// was empty), meaning their service starts now.
    ///
    /// # Panics
    /// Panics if `index` is not a register of this bank
    pub fn enqueue(&mut self, index: usize, customer: CustomerId) -> bool {
        debug_assert!(
            self.line_of(customer).is_none(),
            "customer {} is already queued",
            customer
        );
        let line = &mut self.lines[index];
        line.push_back(customer);
        line.len() == 1
    }

    /// Take `customer` off the head of whichever line they are at
    ///
    /// `None` if no line has this customer at its head.
    pub fn remove_if_head(&mut self, customer: CustomerId) -> Option<HeadRemoval> {
        let index = self
            .lines
            .iter()
            .position(|line| line.front() == Some(&customer))?;
        let line = &mut self.lines[index];
        line.pop_front();
        Some(HeadRemoval {
            line: index,
            next_head: line.front().copied(),
        })
    }

    /// Which line a customer is standing in
    pub fn line_of(&self, customer: CustomerId) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(&customer))
    }

    pub fn line(&self, index: usize) -> Option<&VecDeque<CustomerId>> {
        self.lines.get(index)
    }

    pub fn line_lengths(&self) -> Vec<usize> {
        self.lines.iter().map(VecDeque::len).collect()
    }

    pub fn longest_line_len(&self) -> usize {
        self.lines.iter().map(VecDeque::len).max().unwrap_or(0)
    }

    /// Customers currently in any line, including those being served
    pub fn total_queued(&self) -> usize {
        self.lines.iter().map(VecDeque::len).sum()
    }

    /// Registers with a customer being served
    pub fn busy_registers(&self) -> usize {
        self.lines.iter().filter(|line| !line.is_empty()).count()
    }

    /// Owned copy of every line, head first
    pub fn contents(&self) -> Vec<Vec<CustomerId>> {
        self.lines
            .iter()
            .map(|line| line.iter().copied().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bank_routes_to_first_register() {
        let bank = RegisterBank::new(3);
        assert_eq!(bank.register_count(), 3);
        assert_eq!(bank.shortest_line(), 0);
    }

    #[test]
    fn shortest_line_prefers_lowest_index_on_ties() {
        let mut bank = RegisterBank::new(4);
        bank.enqueue(0, 1);
        bank.enqueue(1, 2);
        // lines: [1], [1], [0], [0]
        assert_eq!(bank.shortest_line(), 2);
        bank.enqueue(2, 3);
        bank.enqueue(3, 4);
        // all length 1
        assert_eq!(bank.shortest_line(), 0);
        bank.enqueue(0, 5);
        assert_eq!(bank.shortest_line(), 1);
    }

    #[test]
    fn enqueue_reports_new_head() {
        let mut bank = RegisterBank::new(2);
        assert!(bank.enqueue(1, 10));
        assert!(!bank.enqueue(1, 11));
        assert_eq!(bank.line_lengths(), vec![0, 2]);
    }

    #[test]
    fn remove_if_head_promotes_next_customer() {
        let mut bank = RegisterBank::new(2);
        bank.enqueue(0, 1);
        bank.enqueue(0, 2);
        bank.enqueue(1, 3);

        assert_eq!(
            bank.remove_if_head(1),
            Some(HeadRemoval { line: 0, next_head: Some(2) })
        );
        assert_eq!(
            bank.remove_if_head(3),
            Some(HeadRemoval { line: 1, next_head: None })
        );
        assert_eq!(bank.contents(), vec![vec![2], vec![]]);
    }

    #[test]
    fn remove_if_head_ignores_customers_behind_the_head() {
        let mut bank = RegisterBank::new(1);
        bank.enqueue(0, 1);
        bank.enqueue(0, 2);
        assert_eq!(bank.remove_if_head(2), None);
        assert_eq!(bank.remove_if_head(99), None);
        assert_eq!(bank.total_queued(), 2);
    }

    #[test]
    fn summaries_reflect_lines() {
        let mut bank = RegisterBank::new(3);
        bank.enqueue(0, 1);
        bank.enqueue(0, 2);
        bank.enqueue(2, 3);
        assert_eq!(bank.longest_line_len(), 2);
        assert_eq!(bank.total_queued(), 3);
        assert_eq!(bank.busy_registers(), 2);
        assert_eq!(bank.line_of(3), Some(2));
        assert_eq!(bank.line_of(4), None);
        assert_eq!(bank.line(0).map(|line| line.len()), Some(2));
    }
}
