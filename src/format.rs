use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// "May 25, 1977" for an ISO date; anything unparseable is shown as-is.
pub fn format_date(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => iso.to_owned(),
    }
}

fn is_unknown(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("unknown") || value.eq_ignore_ascii_case("n/a")
}

fn format_measure(value: &str, unit: &str) -> String {
    if is_unknown(value) {
        "Unknown".to_owned()
    } else {
        format!("{value} {unit}")
    }
}

pub fn format_height(height: &str) -> String {
    format_measure(height, "cm")
}

pub fn format_mass(mass: &str) -> String {
    format_measure(mass, "kg")
}

/// Capitalize a free-text attribute; sentinel values read "Unknown".
pub fn format_attribute(attr: &str) -> String {
    if is_unknown(attr) {
        return "Unknown".to_owned();
    }
    let mut chars = attr.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Cut `text` to at most `max_width` terminal columns, ending in an ellipsis
/// when shortened.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('\u{2026}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_release_dates() {
        assert_eq!(format_date("1977-05-25"), "May 25, 1977");
        assert_eq!(format_date("2005-05-19"), "May 19, 2005");
        assert_eq!(format_date("someday"), "someday");
    }

    #[test]
    fn formats_measurements() {
        assert_eq!(format_height("172"), "172 cm");
        assert_eq!(format_height("unknown"), "Unknown");
        assert_eq!(format_mass("77"), "77 kg");
        assert_eq!(format_mass("unknown"), "Unknown");
    }

    #[test]
    fn formats_attributes() {
        assert_eq!(format_attribute("blond"), "Blond");
        assert_eq!(format_attribute("n/a"), "Unknown");
        assert_eq!(format_attribute("unknown"), "Unknown");
        assert_eq!(format_attribute("white, blue"), "White, blue");
    }

    #[test]
    fn pluralizes() {
        assert_eq!(pluralize(1, "film", "films"), "1 film");
        assert_eq!(pluralize(0, "film", "films"), "0 films");
        assert_eq!(pluralize(3, "person", "people"), "3 people");
    }

    #[test]
    fn truncates_to_width() {
        assert_eq!(truncate("Skywalker", 20), "Skywalker");
        assert_eq!(truncate("Skywalker", 5), "Skyw\u{2026}");
        assert_eq!(truncate("Skywalker", 0), "");
    }
}
