//! Telerivet message statuses.
//!
//! Telerivet reports textual statuses, case-insensitively matched here:
//! `queued`/`sending`/`sent` mean the message is on its way, `delivered`
//! confirms handset delivery, and `failed`/`failed_queued`/`cancelled`/
//! `not_delivered` are failure endpoints.

use smsgw_core::DeliveryStatus;

use crate::NativeStatus;

/// Maps a Telerivet status code to the canonical set. Total: unknown codes
/// and numeric groups map to [`DeliveryStatus::Unknown`].
pub fn translate(native: &NativeStatus) -> DeliveryStatus {
    let code = match native {
        NativeStatus::Code(code) => code.trim().to_ascii_lowercase(),
        NativeStatus::Group(_) => return DeliveryStatus::Unknown,
    };
    match code.as_str() {
        "queued" | "sending" | "sent" => DeliveryStatus::Sent,
        "delivered" => DeliveryStatus::Delivered,
        "failed" | "failed_queued" | "cancelled" | "not_delivered" => DeliveryStatus::Failed,
        _ => DeliveryStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes_map_exhaustively() {
        let table = [
            ("queued", DeliveryStatus::Sent),
            ("sending", DeliveryStatus::Sent),
            ("sent", DeliveryStatus::Sent),
            ("delivered", DeliveryStatus::Delivered),
            ("failed", DeliveryStatus::Failed),
            ("failed_queued", DeliveryStatus::Failed),
            ("cancelled", DeliveryStatus::Failed),
            ("not_delivered", DeliveryStatus::Failed),
        ];
        for (code, expected) in table {
            assert_eq!(translate(&NativeStatus::code(code)), expected, "code {code}");
        }
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        assert_eq!(
            translate(&NativeStatus::code(" Delivered ")),
            DeliveryStatus::Delivered
        );
        assert_eq!(
            translate(&NativeStatus::code("FAILED")),
            DeliveryStatus::Failed
        );
    }

    #[test]
    fn undocumented_input_maps_to_unknown() {
        assert_eq!(
            translate(&NativeStatus::code("teleported")),
            DeliveryStatus::Unknown
        );
        assert_eq!(translate(&NativeStatus::code("")), DeliveryStatus::Unknown);
        assert_eq!(translate(&NativeStatus::group(3)), DeliveryStatus::Unknown);
    }
}
