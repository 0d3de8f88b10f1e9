use chrono::prelude::*;

/// Calendar days are compared in UTC
pub fn is_same_day(dt1: &DateTime<Utc>, dt2: &DateTime<Utc>) -> bool {
    dt1.date_naive() == dt2.date_naive()
}

/// Formats a date the way it is shown to users, e.g. `Jan 10, 2025`
pub fn format_display_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}
