//! Salary structures: storage, breakdown computation and the access-checked workflows.

pub mod calculator;
#[cfg(test)]
pub mod memory;
pub mod repository;
pub mod service;
