pub mod admission;
pub mod error;
pub mod heuristic;
pub mod service;
pub mod sla;
pub mod solver;
pub mod substrate;

#[cfg(test)]
mod test;
