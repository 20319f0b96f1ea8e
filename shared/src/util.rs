/// Current UTC timestamp in Unix milliseconds
///
/// All event timestamps in the trail use this clock.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
