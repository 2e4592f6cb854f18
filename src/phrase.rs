//! Maps event-type tags to the phrase announced for them.

/// Phrase used for any tag without an entry, including an absent tag.
pub const FALLBACK_PHRASE: &str = "No idea what happened";

/// Resolves an event-type tag to its human phrase.
///
/// Matching is exact and case-sensitive.
pub fn resolve(type_tag: Option<&str>) -> &'static str {
    match type_tag.unwrap_or_default() {
        "ignition:on" => "Ignition on",
        "ignition:off" => "Ignition off",
        "parking:changed" => "Parking has changed",
        "region:changed" => "Region has changed",
        "trip:finished" => "Trip has finished",
        "notification:speeding" => "Speeding",
        "notification:hard_accel" => "Hard acceleration",
        "notification:hard_brake" => "Hard brake",
        "mil:on" => "Check engine light on",
        "mil:off" => "Check engine light off",
        _ => FALLBACK_PHRASE,
    }
}
