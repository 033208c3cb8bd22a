//! Content size ceiling and human-readable byte formatting.

use crate::error::SyncError;

/// Largest markdown payload accepted in either direction (10 MiB).
pub const MAX_CONTENT_SIZE_BYTES: usize = 10 * 1024 * 1024;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Format a byte count as a short human-readable string.
///
/// Uses powers of 1024, rounds to the nearest whole unit and caps at TB.
///
/// # Example
///
/// ```
/// use velvet::limits::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 Bytes");
/// assert_eq!(format_bytes(1536), "2 KB");
/// assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    // Byte counts stay well inside f64's exact integer range
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let rounded = (bytes as f64 / scale as f64).round() as u64;
    format!("{rounded} {}", UNITS[unit])
}

/// Reject `text` if it is larger than `limit` bytes.
///
/// # Errors
///
/// Returns [`SyncError::Oversized`] naming the limit.
pub fn check_content_size(text: &str, limit: usize) -> Result<(), SyncError> {
    if text.len() > limit {
        return Err(SyncError::Oversized {
            size: text.len(),
            limit: format_bytes(limit as u64),
        });
    }
    Ok(())
}
