use crate::errors::ToolError;
use chrono::DateTime;

/// Renders an upstream epoch-milliseconds timestamp as a UTC display
/// string, second precision, no timezone suffix.
pub fn epoch_millis_to_utc(millis: i64) -> Result<String, ToolError> {
    let instant = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        ToolError::mapping(format!("timestamp {} is out of range", millis))
    })?;
    Ok(instant.format("%Y-%m-%d %H:%M:%S").to_string())
}
