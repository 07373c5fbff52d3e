/* 📖 # What does a time format look like?

A format string uses repeated letters as fields: `y` year, `M` month, `d` day,
`h` hour (24h), `m` minute, `s` second, `q` quarter and `S` millisecond. Only the
first run of each letter is replaced. A run longer than one letter is zero padded
to its length; a year run keeps that many trailing digits. Any other character is
copied through, so `"yyyy-MM-dd hh:mm:ss.SSS"` gives `"2025-03-07 09:05:02.045"`.
*/

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};

/// Finds the first run of `token` and returns its byte range.
fn find_run(fmt: &str, token: char) -> Option<(usize, usize)> {
    let start = fmt.find(token)?;
    let len = fmt[start..].chars().take_while(|c| *c == token).count();
    Some((start, start + len * token.len_utf8()))
}

/// Formats `time` with the field letters described above.
pub fn format<Tz: TimeZone>(time: &DateTime<Tz>, fmt: &str) -> String {
    let mut result = fmt.to_string();
    if result.is_empty() {
        return result;
    }

    if let Some((start, end)) = find_run(&result, 'y') {
        let year = time.year().to_string();
        let keep = (end - start).min(year.len());
        let year = &year[year.len() - keep..];
        result.replace_range(start..end, year);
    }

    let fields = [
        ('M', time.month()),
        ('d', time.day()),
        ('h', time.hour()),
        ('m', time.minute()),
        ('s', time.second()),
        ('q', (time.month() + 2) / 3),
        ('S', time.timestamp_subsec_millis()),
    ];
    for (token, value) in fields {
        if let Some((start, end)) = find_run(&result, token) {
            let width = end - start;
            let text = if width > 1 {
                format!("{:0width$}", value, width = width)
            } else {
                value.to_string()
            };
            result.replace_range(start..end, &text);
        }
    }
    result
}

/// Formats the current local time.
pub fn format_now(fmt: &str) -> String {
    format(&Local::now(), fmt)
}

/// Seconds since the Unix epoch.
pub fn timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Milliseconds since the Unix epoch.
pub fn millis() -> i64 {
    Utc::now().timestamp_millis()
}
