//! File limits for mod bundles

/// Maximum files attached to one mod
pub const MAX_FILE_COUNT: usize = 10;

/// Maximum app-created text files attached to one mod
pub const MAX_TEXT_FILE_COUNT: usize = 5;

/// Maximum bytes per file (2MB)
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// Content type of text files created inside the wizard
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// Content type used when an upload carries none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Human-readable size: `512 B`, `1.5 KB`, `2.0 MB`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_unit() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(MAX_FILE_SIZE), "2.0 MB");
    }
}
