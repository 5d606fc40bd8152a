//! # Script Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── bridge_benchmarks.rs   # Dispatch/complete throughput
//! └── src/integration/
//!     ├── harness.rs             # Bridge + simulated engine fixture
//!     ├── bridge_flows.rs        # Success, error, conversion, fault, timeout
//!     ├── out_of_order.rs        # Concurrent calls, shuffled completions
//!     └── dynamic_interfaces.rs  # DynamicStub end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sb-tests integration::
//! cargo bench -p sb-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
