//! Integration flows across the dispatcher, transport, delivery loop and
//! simulated script engine.

#[cfg(test)]
mod harness;

pub mod dynamic_interfaces;
pub mod out_of_order;
