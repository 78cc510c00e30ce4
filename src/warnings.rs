//! Human-readable warning text derived from availability reports.

use crate::availability::DetailedAvailability;

/// Builds the warning lines a booking form shows before blocking or
/// confirming a request. Empty when the request fits cleanly.
pub fn availability_warnings(
    info: &DetailedAvailability,
    requested_primary: u32,
    requested_accessory: u32,
) -> Vec<String> {
    let mut warnings = Vec::new();

    let free_primary = info.available_primary.max(0);
    if free_primary < i64::from(requested_primary) {
        warnings.push(format!(
            "Only {free_primary} of {requested_primary} requested units available in this window."
        ));
    }

    let free_accessory = info.available_accessory.max(0);
    if free_accessory < i64::from(requested_accessory) {
        warnings.push(format!(
            "Only {free_accessory} of {requested_accessory} requested accessories available in this window."
        ));
    }

    if warnings.is_empty() {
        return warnings;
    }

    if let Some(worst) = &info.worst_period {
        warnings.push(format!(
            "Tightest moment is {}: {} unit(s) and {} accessory(ies) left.",
            worst.at.format("%H:%M"),
            worst.remaining_primary.max(0),
            worst.remaining_accessory.max(0),
        ));
    }

    for conflict in &info.conflicts {
        warnings.push(format!(
            "{} holds {} unit(s) over {}.",
            conflict.client, conflict.primary_units, conflict.interval
        ));
    }

    warnings
}
