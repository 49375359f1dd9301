//! Parsing of user-typed prices, dates, and one-line subscriptions, plus
//! the billing-calendar arithmetic built on top of them.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::SubtrackError;

/// A subscription typed on one line as `Name - Price - Day`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickAdd {
    pub name: String,
    pub price: f64,
    pub charge_day: u32,
}

/// Parse a positive price.
///
/// `,` is accepted as the decimal separator and every character other than
/// digits and `.` is dropped first, so `"599 ₽"` and `"4,99"` both parse.
pub fn parse_price(text: &str) -> Result<f64, SubtrackError> {
    let normalized: String = text
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let price: f64 = normalized
        .parse()
        .map_err(|_| SubtrackError::Validation(format!("not a price: {text:?}")))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(SubtrackError::Validation(format!(
            "price must be positive: {text:?}"
        )));
    }
    Ok(price)
}

/// Parse a charge date typed as `DD.MM` or `DD.MM.YY`.
///
/// `DD.MM` resolves to this year, or next year when that day is not after
/// `today`. `DD.MM.YY` means year `2000 + YY`. The result is always
/// strictly after `today`.
pub fn parse_date(text: &str, today: NaiveDate) -> Result<NaiveDate, SubtrackError> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    match parts.as_slice() {
        [day, month] => {
            let (day, month) = (date_part(day, text)?, date_part(month, text)?);
            [today.year(), today.year() + 1]
                .into_iter()
                .filter_map(|year| NaiveDate::from_ymd_opt(year, month, day))
                .find(|date| *date > today)
                .ok_or_else(|| SubtrackError::Validation(format!("no such date: {text:?}")))
        }
        [day, month, year] if year.trim().len() == 2 => {
            let (day, month) = (date_part(day, text)?, date_part(month, text)?);
            let year = 2000 + date_part(year, text)? as i32;
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| SubtrackError::Validation(format!("no such date: {text:?}")))?;
            if date <= today {
                return Err(SubtrackError::Validation(format!(
                    "date is not in the future: {text:?}"
                )));
            }
            Ok(date)
        }
        _ => Err(SubtrackError::Validation(format!(
            "expected DD.MM or DD.MM.YY: {text:?}"
        ))),
    }
}

fn date_part(part: &str, text: &str) -> Result<u32, SubtrackError> {
    let part = part.trim();
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(SubtrackError::Validation(format!(
            "expected DD.MM or DD.MM.YY: {text:?}"
        )));
    }
    part.parse()
        .map_err(|_| SubtrackError::Validation(format!("bad date number in {text:?}")))
}

/// Recognize `Name - Price - Day`.
///
/// Returns `None` when the text does not have that shape at all, and
/// `Some(Err(_))` when it does but a value is out of range.
pub fn parse_quick_add(text: &str) -> Option<Result<QuickAdd, SubtrackError>> {
    let parts: Vec<&str> = text.split(" - ").map(str::trim).collect();
    let [name, price, day] = parts.as_slice() else {
        return None;
    };

    let price_shaped = !price.is_empty()
        && price
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',');
    let day_shaped = !day.is_empty() && day.chars().all(|c| c.is_ascii_digit());
    if name.is_empty() || !price_shaped || !day_shaped {
        return None;
    }

    Some(quick_add_values(name, price, day))
}

fn quick_add_values(name: &str, price: &str, day: &str) -> Result<QuickAdd, SubtrackError> {
    let price = parse_price(price)?;
    let charge_day: u32 = day
        .parse()
        .map_err(|_| SubtrackError::Validation(format!("bad billing day: {day:?}")))?;
    if !(1..=31).contains(&charge_day) {
        return Err(SubtrackError::Validation(format!(
            "billing day must be within 1..=31, got {charge_day}"
        )));
    }
    Ok(QuickAdd {
        name: name.to_string(),
        price,
        charge_day,
    })
}

/// Day `day` of the month starting at `month_start`, clamped to its last day.
fn day_of_month(month_start: NaiveDate, day: u32) -> Option<NaiveDate> {
    let last = month_start.checked_add_months(Months::new(1))?.pred_opt()?;
    month_start.with_day(day.clamp(1, last.day()))
}

/// First charge date for a catalog quick add: the 1st of next month, or
/// today when today already is the 1st.
pub fn quick_add_charge_date(today: NaiveDate) -> Option<NaiveDate> {
    let month_start = today.with_day(1)?;
    if today.day() > 1 {
        month_start.checked_add_months(Months::new(1))
    } else {
        Some(month_start)
    }
}

/// Next date strictly after `today` that falls on `charge_day`, clamped to
/// short months (day 31 in April is April 30).
pub fn next_charge_on_day(charge_day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let month_start = today.with_day(1)?;
    let this_month = day_of_month(month_start, charge_day)?;
    if this_month > today {
        return Some(this_month);
    }
    day_of_month(month_start.checked_add_months(Months::new(1))?, charge_day)
}

/// Advance a past charge date month by month until it is not before `today`.
pub fn roll_forward(date: NaiveDate, charge_day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let mut next = date;
    while next < today {
        let month_start = next.with_day(1)?.checked_add_months(Months::new(1))?;
        next = day_of_month(month_start, charge_day)?;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_price_plain_and_decorated() {
        assert_eq!(parse_price("599").unwrap(), 599.0);
        assert_eq!(parse_price("4,99").unwrap(), 4.99);
        assert_eq!(parse_price("  199.50 ").unwrap(), 199.5);
        assert_eq!(parse_price("599 RUB").unwrap(), 599.0);
        assert_eq!(parse_price("$12").unwrap(), 12.0);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("0").is_err());
        assert!(parse_price("0,00").is_err());
        assert!(parse_price("1.2.3").is_err());
        assert!(parse_price(".").is_err());
    }

    #[test]
    fn test_parse_date_day_month_before_this_years_date() {
        let today = date(2025, 3, 10);
        assert_eq!(parse_date("15.06", today).unwrap(), date(2025, 6, 15));
    }

    #[test]
    fn test_parse_date_day_month_after_this_years_date() {
        let today = date(2025, 7, 1);
        assert_eq!(parse_date("15.06", today).unwrap(), date(2026, 6, 15));
    }

    #[test]
    fn test_parse_date_today_rolls_to_next_year() {
        let today = date(2025, 6, 15);
        assert_eq!(parse_date("15.06", today).unwrap(), date(2026, 6, 15));
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        let today = date(2025, 3, 10);
        assert_eq!(parse_date("01.02.27", today).unwrap(), date(2027, 2, 1));
        assert!(parse_date("01.02.24", today).is_err(), "past date");
        assert!(parse_date("10.03.25", today).is_err(), "today is not future");
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        let today = date(2025, 3, 10);
        assert!(parse_date("32.01", today).is_err());
        assert!(parse_date("10.13", today).is_err());
        assert!(parse_date("tomorrow", today).is_err());
        assert!(parse_date("15/06", today).is_err());
        assert!(parse_date("15.06.2026", today).is_err());
        assert!(parse_date("", today).is_err());
    }

    #[test]
    fn test_parse_date_leap_day() {
        assert_eq!(
            parse_date("29.02", date(2027, 5, 1)).unwrap(),
            date(2028, 2, 29)
        );
        assert!(parse_date("29.02", date(2025, 5, 1)).is_err());
    }

    #[test]
    fn test_parse_quick_add() {
        let q = parse_quick_add("Netflix - 599 - 15").unwrap().unwrap();
        assert_eq!(q.name, "Netflix");
        assert_eq!(q.price, 599.0);
        assert_eq!(q.charge_day, 15);

        let q = parse_quick_add("Gym membership - 2500,50 - 1").unwrap().unwrap();
        assert_eq!(q.name, "Gym membership");
        assert_eq!(q.price, 2500.5);
    }

    #[test]
    fn test_parse_quick_add_shape_mismatch_is_none() {
        assert!(parse_quick_add("Netflix").is_none());
        assert!(parse_quick_add("Netflix - 599").is_none());
        assert!(parse_quick_add("Netflix - cheap - 15").is_none());
        assert!(parse_quick_add(" - 599 - 15").is_none());
    }

    #[test]
    fn test_parse_quick_add_out_of_range_day() {
        assert!(parse_quick_add("Netflix - 599 - 32").unwrap().is_err());
        assert!(parse_quick_add("Netflix - 599 - 0").unwrap().is_err());
        assert!(parse_quick_add("Netflix - 0 - 10").unwrap().is_err());
    }

    #[test]
    fn test_quick_add_charge_date() {
        assert_eq!(
            quick_add_charge_date(date(2025, 3, 10)),
            Some(date(2025, 4, 1))
        );
        assert_eq!(
            quick_add_charge_date(date(2025, 12, 31)),
            Some(date(2026, 1, 1))
        );
        assert_eq!(
            quick_add_charge_date(date(2025, 3, 1)),
            Some(date(2025, 3, 1))
        );
    }

    #[test]
    fn test_next_charge_on_day() {
        assert_eq!(
            next_charge_on_day(15, date(2025, 3, 10)),
            Some(date(2025, 3, 15))
        );
        assert_eq!(
            next_charge_on_day(10, date(2025, 3, 10)),
            Some(date(2025, 4, 10))
        );
        assert_eq!(
            next_charge_on_day(31, date(2025, 4, 5)),
            Some(date(2025, 4, 30))
        );
        assert_eq!(
            next_charge_on_day(31, date(2025, 2, 28)),
            Some(date(2025, 3, 31))
        );
        assert_eq!(
            next_charge_on_day(5, date(2025, 12, 20)),
            Some(date(2026, 1, 5))
        );
    }

    #[test]
    fn test_roll_forward() {
        let today = date(2025, 5, 20);
        assert_eq!(
            roll_forward(date(2025, 2, 28), 31, today),
            Some(date(2025, 5, 31))
        );
        assert_eq!(
            roll_forward(date(2025, 5, 10), 10, today),
            Some(date(2025, 6, 10))
        );
        assert_eq!(
            roll_forward(date(2025, 6, 1), 1, today),
            Some(date(2025, 6, 1)),
            "future dates are left alone"
        );
        assert_eq!(roll_forward(today, 20, today), Some(today));
    }
}
