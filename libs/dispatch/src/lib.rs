//! Orchestration layer of the SMS gateway.
//!
//! [`MessageDispatcher`] drives the outbound path (resolve bridge, get or
//! create a client, invoke the provider, record the outcome) and
//! [`CallbackCorrelator`] drives the inbound path (match a delivery report
//! to its message and apply the status monotonically). The two run on
//! independent request handlers with no ordering between them beyond the
//! message state machine.

pub mod correlator;
pub mod dispatcher;
pub mod host;

pub use correlator::CallbackCorrelator;
pub use dispatcher::{DispatchReceipt, DispatchRequest, MessageDispatcher};
pub use host::CallbackHost;
