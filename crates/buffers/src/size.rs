const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;
const TB: u64 = 1 << 40;
const PB: u64 = 1 << 50;
const EB: u64 = 1 << 60;

/// Formats a byte count with binary units and one decimal place, dropping a
/// trailing `.0`.
///
/// ```
/// use dynrec_buffers::byte_size;
///
/// assert_eq!(byte_size(0), "0B");
/// assert_eq!(byte_size(512), "512B");
/// assert_eq!(byte_size(1536), "1.5KB");
/// assert_eq!(byte_size(1 << 20), "1MB");
/// ```
pub fn byte_size(bytes: u64) -> String {
    let (unit, divisor) = match bytes {
        0 => return "0B".to_string(),
        b if b >= EB => ("EB", EB),
        b if b >= PB => ("PB", PB),
        b if b >= TB => ("TB", TB),
        b if b >= GB => ("GB", GB),
        b if b >= MB => ("MB", MB),
        b if b >= KB => ("KB", KB),
        _ => ("B", 1),
    };
    let value = bytes as f64 / divisor as f64;
    let formatted = format!("{value:.1}");
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{trimmed}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units() {
        assert_eq!(byte_size(1), "1B");
        assert_eq!(byte_size(1023), "1023B");
        assert_eq!(byte_size(1024), "1KB");
        assert_eq!(byte_size(5 * GB + GB / 2), "5.5GB");
        assert_eq!(byte_size(u64::MAX), "16EB");
    }
}
