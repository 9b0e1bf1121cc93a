//! Result keys and plot file names derived from display names

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SPECIAL_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Snake-case a display name
///
/// Punctuation is dropped, runs of spaces and hyphens become one underscore.
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::naming::snake_case;
/// assert_eq!(snake_case("Overload! Interrupts"), "overload_interrupts");
/// assert_eq!(snake_case("Screw Up's"), "screw_ups");
/// assert_eq!(snake_case(" High - Roller  Uptime "), "high_roller_uptime");
/// ```
pub fn snake_case(name: &str) -> String {
    let cleaned = SPECIAL_CHARS.replace_all(name, "");
    let joined = SEPARATORS.replace_all(&cleaned, "_");
    joined.trim_matches('_').to_lowercase()
}

/// `<YYYY-MM-DD>_<snake_title>.<ext>`
pub fn plot_filename(iso_date: &str, title: &str, extension: &str) -> String {
    format!("{}_{}.{}", iso_date, snake_case(title), extension)
}

/// `<first>_to_<last>_<snake_title>_progress.<ext>`
pub fn progress_filename(first_date: &str, last_date: &str, title: &str, extension: &str) -> String {
    format!(
        "{}_to_{}_{}_progress.{}",
        first_date,
        last_date,
        snake_case(title),
        extension
    )
}
