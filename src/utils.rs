//! # Utility Functions Module
//!
//! Small helpers shared by the encoder invocation and the report.

use std::time::Duration;

/// Collects any iterable of displayable items into owned command arguments.
///
/// # Example
/// ```rust
/// use tif2webp::utils::to_string_vec;
///
/// let method = 6;
/// let args = to_string_vec(["-m", &method.to_string(), "-lossless"]);
/// assert_eq!(args, vec!["-m", "6", "-lossless"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds a `Vec<String>` of command arguments from mixed expressions.
///
/// # Example
/// ```rust
/// use tif2webp::args;
///
/// let effort = 9;
/// let args = args!["-z", effort, "-quiet"];
/// assert_eq!(args, vec!["-z", "9", "-quiet"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item.to_string()),*])
    };
}

/// Whole milliseconds, rounded to nearest
fn rounded_millis(duration: Duration) -> u128 {
    (duration.as_nanos() + 500_000) / 1_000_000
}

/// Formats a duration as `HH:MM:SS.sss`
pub fn format_duration(duration: Duration) -> String {
    let millis = rounded_millis(duration);
    let hours = millis / 3_600_000;
    let minutes = millis / 60_000 % 60;
    let seconds = millis / 1000 % 60;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis % 1000)
}

/// Formats a per-file average: `X.XXX s` under a minute, `M min S.SSS s` above
pub fn format_average(duration: Duration) -> String {
    let millis = rounded_millis(duration);
    let (minutes, rest) = (millis / 60_000, millis % 60_000);
    if minutes == 0 {
        return format!("{}.{:03} s", rest / 1000, rest % 1000);
    }
    format!("{} min {}.{:03} s", minutes, rest / 1000, rest % 1000)
}
