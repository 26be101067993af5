//! Date display for experience and education periods.
//!
//! Dates are free text. Recognised shapes are reformatted, anything else is
//! shown as typed.

/// Shown instead of the end date for ongoing positions.
pub const PRESENT_LABEL: &str = "Present";

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// "YYYY-MM" (or "YYYY-MM-DD") → "MM/YYYY"; "YYYY" → "YYYY".
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [year] if year.len() == 4 && all_digits(year) => year.to_string(),
        [year, month] | [year, month, _] if year.len() == 4
            && month.len() == 2
            && all_digits(year)
            && all_digits(month) =>
        {
            format!("{month}/{year}")
        }
        _ => raw.to_string(),
    }
}

/// "start - end", collapsing whichever side is blank. `current` overrides `end`.
pub fn format_period(start: &str, end: &str, current: bool) -> String {
    let start = format_date(start);
    let end = if current {
        PRESENT_LABEL.to_string()
    } else {
        format_date(end)
    };
    match (start.is_empty(), end.is_empty()) {
        (false, false) => format!("{start} - {end}"),
        (false, true) => start,
        (true, false) => end,
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_becomes_month_slash_year() {
        assert_eq!(format_date("2021-03"), "03/2021");
        assert_eq!(format_date("2021-03-15"), "03/2021");
    }

    #[test]
    fn test_year_only_is_kept() {
        assert_eq!(format_date("2019"), "2019");
    }

    #[test]
    fn test_unrecognised_text_is_shown_as_typed() {
        assert_eq!(format_date("março de 2020"), "março de 2020");
        assert_eq!(format_date("2020-3"), "2020-3");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn test_current_overrides_end_date() {
        assert_eq!(format_period("2020-01", "2022-05", true), "01/2020 - Present");
        assert_eq!(format_period("2020-01", "2022-05", false), "01/2020 - 05/2022");
    }

    #[test]
    fn test_period_collapses_blank_sides() {
        assert_eq!(format_period("2020", "", false), "2020");
        assert_eq!(format_period("", "2021", false), "2021");
        assert_eq!(format_period("", "", false), "");
        assert_eq!(format_period("", "", true), "Present");
    }
}
