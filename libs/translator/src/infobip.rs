//! InfoBip delivery status groups.
//!
//! InfoBip reports a numeric `groupId` both in the synchronous send response
//! and in delivery-report callbacks:
//!
//! | group | meaning        | canonical  |
//! |-------|----------------|------------|
//! | 1     | pending        | SENT       |
//! | 2     | undeliverable  | FAILED     |
//! | 3     | delivered      | DELIVERED  |
//! | 4     | expired        | FAILED     |
//! | 5     | rejected       | FAILED     |
//!
//! Group 1 means the provider accepted the message and a delivery report is
//! still outstanding, which is exactly what the canonical `SENT` expresses.

use smsgw_core::DeliveryStatus;

use crate::NativeStatus;

/// Maps an InfoBip status group to the canonical set. Total: unknown groups
/// and textual codes map to [`DeliveryStatus::Unknown`].
pub fn translate(native: &NativeStatus) -> DeliveryStatus {
    match native {
        NativeStatus::Group(1) => DeliveryStatus::Sent,
        NativeStatus::Group(2) | NativeStatus::Group(4) | NativeStatus::Group(5) => {
            DeliveryStatus::Failed
        }
        NativeStatus::Group(3) => DeliveryStatus::Delivered,
        _ => DeliveryStatus::Unknown,
    }
}
