/// The model module contains all core simulation structures
pub mod customer;
pub mod engine;
pub mod random;
pub mod register;
pub mod schedule;
pub mod statistics;
pub mod time;
