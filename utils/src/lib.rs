use std::time::SystemTime;

/// Milliseconds since the Unix epoch. Used for upload timestamps and for
/// generating collision-free storage filenames.
pub fn get_epoch_time_in_ms() -> u64 {
    let start = SystemTime::now();
    let since_the_epoch = start
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("SystemTime before UNIX EPOCH");
    since_the_epoch.as_millis() as u64
}
