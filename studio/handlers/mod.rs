pub mod classify;
pub mod graphs;
