use std::fmt;

/// The test a rule applies to its source field's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Show when the value is one of the listed strings.
    OneOf(Vec<String>),
    /// Show when the value starts with an integer greater than or equal to
    /// the threshold.
    AtLeast(i64),
    /// No condition was given; the targets are always hidden.
    Never,
}

impl Condition {
    /// Decide whether the targets should be visible for `value`.
    ///
    /// `None` means the source has no current value (no radio checked, or the
    /// field is absent), which never matches.
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Condition::OneOf(values) => values.iter().any(|v| v == value),
            Condition::AtLeast(min) => leading_int(value).is_some_and(|n| n >= *min),
            Condition::Never => false,
        }
    }
}

/// Parse the integer prefix of `s`: optional leading whitespace, an optional
/// sign, then at least one ASCII digit. Trailing characters are ignored, so
/// `"3.7"` yields 3 and `"12 places"` yields 12. Out-of-range values saturate.
pub(crate) fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = &digits[..end];
    let parsed = if negative {
        format!("-{magnitude}").parse::<i64>()
    } else {
        magnitude.parse::<i64>()
    };
    Some(parsed.unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::OneOf(values) => {
                write!(f, "in [")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\"", escape(v))?;
                }
                write!(f, "]")
            }
            Condition::AtLeast(min) => write!(f, ">= {min}"),
            Condition::Never => Ok(()),
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
