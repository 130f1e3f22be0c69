//! Test doubles shared by unit tests, integration tests and benchmarks.
//!
//! Compiled for `cfg(test)` and behind the `test-util` feature so the
//! `tests/` and `benches/` targets can use the same stubs as the unit tests.

mod collecting_handler;
mod collecting_side_channel;
mod counting_publisher;
mod stub_client;

pub use collecting_handler::CollectingHandler;
pub use collecting_side_channel::CollectingSideChannel;
pub use counting_publisher::CountingPublisher;
pub use stub_client::StubClient;
