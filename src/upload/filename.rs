// Upload file name handling

/// Names Windows reserves for devices; a sanitized name using one gets a `_` prefix
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Check the text after the last `.` (case-insensitive) against the allow-list
pub fn has_allowed_extension(file_name: &str, allowed: &[String]) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| {
            let ext = ext.to_lowercase();
            allowed.iter().any(|a| *a == ext)
        })
}

/// Reduce a client-supplied name to a safe flat file name.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing `.`/`_` are trimmed. May return an empty string.
pub fn secure_filename(file_name: &str) -> String {
    let spaced: String = file_name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_ascii_whitespace().collect::<Vec<_>>().join("_");

    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}
