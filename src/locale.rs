use chrono::{Datelike, Local, NaiveDate};

pub const MONTHS_LONG: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

pub const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Long month name for a 1-based month.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| MONTHS_LONG.get(index as usize))
        .copied()
}

pub fn short_month_label(year: i32, month: u32) -> String {
    let name = month
        .checked_sub(1)
        .and_then(|index| MONTHS_SHORT.get(index as usize))
        .copied()
        .unwrap_or("?");
    format!("{} {}", name, year)
}

/// `15 Januari 2024`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        month_name(date.month()).unwrap_or_default(),
        date.year()
    )
}

/// `15/1/2024`
pub fn numeric_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Rupiah with dot grouping and no fraction: `Rp 1.500.000`.
pub fn format_rupiah(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_rupiah, long_date, month_name, numeric_date, short_month_label};
    use chrono::NaiveDate;

    #[test]
    fn formats_rupiah_groups() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(950), "Rp 950");
        assert_eq!(format_rupiah(1_500_000), "Rp 1.500.000");
        assert_eq!(format_rupiah(-25_000), "-Rp 25.000");
    }

    #[test]
    fn formats_indonesian_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 8, 17).expect("date");
        assert_eq!(long_date(date), "17 Agustus 2024");
        assert_eq!(numeric_date(date), "17/8/2024");
        assert_eq!(short_month_label(2024, 10), "Okt 2024");
    }

    #[test]
    fn month_names_are_one_based() {
        assert_eq!(month_name(1), Some("Januari"));
        assert_eq!(month_name(12), Some("Desember"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }
}
