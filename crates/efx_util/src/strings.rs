/* 📖 # Why do string indices count characters?

Callers treat strings as text, not as UTF-8 buffers. Every position taken or
returned here is a character index, so `index_of("héllo", "l")` is 2 and `sub`
never splits a multi-byte character. Lookups that find nothing, or that are
given an empty argument, return `None` instead of a sentinel.
*/

use std::fmt::Display;

use regex::Regex;

pub const EMPTY: &str = "";

pub fn is_null_or_empty(s: Option<&str>) -> bool {
    s.is_none_or(str::is_empty)
}

fn char_index(s: &str, byte_index: usize) -> usize {
    s[..byte_index].chars().count()
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

/// Character index of the first occurrence of `sub`.
pub fn index_of(s: &str, sub: &str) -> Option<usize> {
    if s.is_empty() || sub.is_empty() {
        return None;
    }
    s.find(sub).map(|idx| char_index(s, idx))
}

/// Character index of the last occurrence of `sub`.
pub fn last_index_of(s: &str, sub: &str) -> Option<usize> {
    if s.is_empty() || sub.is_empty() {
        return None;
    }
    s.rfind(sub).map(|idx| char_index(s, idx))
}

/// Characters from `from` up to, not including, `to`.
///
/// Bounds are clamped to the string and swapped when reversed.
pub fn sub(s: &str, from: usize, to: usize) -> String {
    let (from, to) = if from <= to { (from, to) } else { (to, from) };
    let start = byte_index(s, from);
    let end = byte_index(s, to);
    s[start..end].to_string()
}

/// Replaces every match of the pattern `from` with `to`.
///
/// `from` is a regular expression. A pattern that does not compile is
/// replaced literally instead.
pub fn replace(s: &str, from: &str, to: &str) -> String {
    if s.is_empty() || from.is_empty() {
        return s.to_string();
    }
    match Regex::new(&format!("(?m){}", from)) {
        Ok(re) => re.replace_all(s, to).into_owned(),
        Err(_) => s.replace(from, to),
    }
}

pub fn trim(s: &str) -> &str {
    s.trim()
}

/// Splits on `sep`. An empty string or separator yields `None`.
pub fn split(s: &str, sep: &str) -> Option<Vec<String>> {
    if s.is_empty() || sep.is_empty() {
        return None;
    }
    Some(s.split(sep).map(str::to_string).collect())
}

pub fn contains(s: &str, sub: &str) -> bool {
    index_of(s, sub).is_some()
}

pub fn starts_with(s: &str, prefix: &str) -> bool {
    index_of(s, prefix) == Some(0)
}

pub fn ends_with(s: &str, suffix: &str) -> bool {
    !s.is_empty() && !suffix.is_empty() && s.ends_with(suffix)
}

/// Fills `{0}`, `{1}`, ... placeholders with the given arguments.
///
/// ```
/// use efx_util::strings::format;
///
/// assert_eq!(format("{0} + {0} = {1}", &[&1, &2]), "1 + 1 = 2");
/// ```
pub fn format(fmt: &str, args: &[&dyn Display]) -> String {
    let mut result = fmt.to_string();
    for (index, arg) in args.iter().enumerate() {
        let placeholder = format!("{{{}}}", index);
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &arg.to_string());
        }
    }
    result
}

fn leading_number(part: &str) -> i64 {
    let digits: String = part
        .trim()
        .trim_start_matches(['v', 'V'])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Packs a dotted version into a number, two decimal digits per component
/// after the first.
///
/// ```
/// use efx_util::strings::to_version;
///
/// assert_eq!(to_version("1.10.0"), Some(11000));
/// assert_eq!(to_version("2.3"), Some(203));
/// ```
pub fn to_version(version: &str) -> Option<i64> {
    if version.is_empty() {
        return None;
    }
    let parts: Vec<&str> = version.split('.').collect();
    let last = parts.len() - 1;
    parts.iter().enumerate().try_fold(0_i64, |total, (i, part)| {
        let scale = u32::try_from((last - i) * 2).ok()?;
        let value = leading_number(part).checked_mul(10_i64.checked_pow(scale)?)?;
        total.checked_add(value)
    })
}

/// Unpacks a number produced by [`to_version`].
///
/// Negative numbers are not versions and give an empty string.
pub fn from_version(version: i64) -> String {
    if version < 0 {
        return String::new();
    }
    let digits = version.to_string();
    let mut parts = Vec::new();
    let mut end = digits.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        let value: i64 = digits[start..end].parse().unwrap_or(0);
        parts.push(value.to_string());
        end = start;
    }
    parts.reverse();
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_or_empty() {
        assert!(is_null_or_empty(None));
        assert!(is_null_or_empty(Some("")));
        assert!(!is_null_or_empty(Some(" ")));
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of("hello world", "o"), Some(4));
        assert_eq!(last_index_of("hello world", "o"), Some(7));
        assert_eq!(index_of("héllo", "l"), Some(2));
        assert_eq!(index_of("hello", "x"), None);
        assert_eq!(index_of("", "x"), None);
        assert_eq!(index_of("hello", ""), None);
    }

    #[test]
    fn test_sub() {
        assert_eq!(sub("hello world", 0, 5), "hello");
        assert_eq!(sub("hello world", 6, 100), "world");
        assert_eq!(sub("hello", 3, 1), "el");
        assert_eq!(sub("日本語テキスト", 1, 3), "本語");
    }

    #[test]
    fn test_replace() {
        assert_eq!(replace("a-b-c", "-", "+"), "a+b+c");
        assert_eq!(replace("v1 v22 v333", r"\d+", "N"), "vN vN vN");
        assert_eq!(replace("cost: (5", "(", "["), "cost: [5");
        assert_eq!(replace("", "a", "b"), "");
        assert_eq!(replace("abc", "", "x"), "abc");
    }

    #[test]
    fn test_split_and_trim() {
        assert_eq!(
            split("a,b,,c", ","),
            Some(vec!["a".into(), "b".into(), "".into(), "c".into()])
        );
        assert_eq!(split("", ","), None);
        assert_eq!(split("abc", ""), None);
        assert_eq!(trim("  padded \n"), "padded");
    }

    #[test]
    fn test_contains_starts_ends() {
        assert!(contains("hello world", "lo w"));
        assert!(!contains("hello", ""));
        assert!(starts_with("hello", "he"));
        assert!(!starts_with("hello", "lo"));
        assert!(ends_with("hello", "lo"));
        assert!(!ends_with("hello", ""));
    }

    #[test]
    fn test_format() {
        assert_eq!(format("{0} is {1} years old", &[&"Tom", &42]), "Tom is 42 years old");
        assert_eq!(format("{1}{0}{1}", &[&"b", &"a"]), "aba");
        assert_eq!(format("no placeholders", &[&1]), "no placeholders");
        assert_eq!(format("{0} {1}", &[&"only"]), "only {1}");
    }

    #[test]
    fn test_versions() {
        assert_eq!(to_version("1.10.0"), Some(11000));
        assert_eq!(to_version("v1.2"), Some(102));
        assert_eq!(to_version("7"), Some(7));
        assert_eq!(to_version(""), None);

        assert_eq!(from_version(11000), "1.10.0");
        assert_eq!(from_version(10203), "1.2.3");
        assert_eq!(from_version(7), "7");
    }

    #[test]
    fn test_version_overflow_is_none() {
        assert_eq!(to_version("1.2.3.4.5.6.7.8.9.10.11"), None);
        assert_eq!(to_version("9223372036854775807.1"), None);
        assert_eq!(to_version("1.2.3.4.5.6.7.8.9.10"), Some(1_020_304_050_607_080_910));
    }

    #[test]
    fn test_negative_version_is_empty() {
        assert_eq!(from_version(-105), "");
        assert_eq!(from_version(0), "0");
    }
}
