//! Table and age formatting

use chrono::{DateTime, Utc};

/// Format the time since `timestamp` as a short age (e.g. "2d", "5h", "30m", "15s")
pub fn format_age(timestamp: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(*timestamp);

    let total_secs = duration.num_seconds();
    if total_secs < 0 {
        return "0s".to_string();
    }

    let days = duration.num_days();
    if days > 0 {
        return format!("{}d", days);
    }

    let hours = duration.num_hours();
    if hours > 0 {
        return format!("{}h", hours);
    }

    let minutes = duration.num_minutes();
    if minutes > 0 {
        return format!("{}m", minutes);
    }

    format!("{}s", total_secs)
}

/// Render rows as a column-aligned table under `headers`
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.len());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", cell, width = w)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// Print rows as a column-aligned table under `headers`
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", format_table(headers, rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_age_seconds() {
        let now = Utc::now();
        assert_eq!(format_age(&(now - Duration::seconds(45)), now), "45s");
    }

    #[test]
    fn test_format_age_minutes() {
        let now = Utc::now();
        assert_eq!(format_age(&(now - Duration::minutes(12)), now), "12m");
    }

    #[test]
    fn test_format_age_hours() {
        let now = Utc::now();
        assert_eq!(format_age(&(now - Duration::hours(3)), now), "3h");
    }

    #[test]
    fn test_format_age_days() {
        let now = Utc::now();
        assert_eq!(format_age(&(now - Duration::days(7)), now), "7d");
    }

    #[test]
    fn test_format_age_future_timestamp() {
        let now = Utc::now();
        assert_eq!(format_age(&(now + Duration::hours(1)), now), "0s");
    }

    #[test]
    fn table_columns_are_aligned() {
        let table = format_table(
            &["NAME", "STATUS"],
            &[
                vec!["release-build-1".to_string(), "True".to_string()],
                vec!["b".to_string(), "False".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "NAME             STATUS");
        assert_eq!(lines[1], "release-build-1  True");
        assert_eq!(lines[2], "b                False");
    }

    #[test]
    fn table_without_rows_prints_headers() {
        assert_eq!(format_table(&["A", "B"], &[]), "A  B");
    }
}
