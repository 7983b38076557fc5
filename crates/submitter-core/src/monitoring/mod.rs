//! Asynchronous observation of running workers.
//!
//! Every worker gets one observer task awaiting its termination. Observers
//! never block the supervisor; they report through a channel the supervisor
//! drains at its own pace.

pub mod worker;

pub use worker::{WorkerEvent, WorkerMonitor};
