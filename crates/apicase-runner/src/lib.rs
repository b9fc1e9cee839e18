//! apicase-runner: HTTP transport and test case execution

pub mod clock;
mod runner;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runner::{RunError, Runner};
pub use transport::{
    BlockingTransport, HttpRequest, HttpResponse, PartialResponse, Transport, TransportError,
};
