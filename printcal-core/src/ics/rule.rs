//! RRULE value text.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::parse::parse_time_value;
use crate::error::CalendarParseError;
use crate::event::{Frequency, RecurrenceRule, WeekdayNum, weekday_code, weekday_from_code};

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FREQ={}", self.frequency.as_ics_str())?;

        if let Some(interval) = self.interval {
            write!(f, ";INTERVAL={}", interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={}", until.to_ics_string())?;
        }
        if !self.by_day.is_empty() {
            let days: Vec<String> = self.by_day.iter().map(weekday_num_to_string).collect();
            write!(f, ";BYDAY={}", days.join(","))?;
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(i8::to_string).collect();
            write!(f, ";BYMONTHDAY={}", days.join(","))?;
        }
        if !self.by_month.is_empty() {
            let months: Vec<String> = self.by_month.iter().map(u8::to_string).collect();
            write!(f, ";BYMONTH={}", months.join(","))?;
        }

        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = CalendarParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarParseError::invalid("RRULE", s);

        let mut frequency = None;
        let mut rule = RecurrenceRule::new(Frequency::Daily);

        for part in s.split(';').filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(invalid)?;

            match key.to_ascii_uppercase().as_str() {
                "FREQ" => {
                    frequency = Some(
                        Frequency::from_ics_str(&value.to_ascii_uppercase()).ok_or_else(invalid)?,
                    );
                }
                "INTERVAL" => rule.interval = Some(value.parse().map_err(|_| invalid())?),
                "COUNT" => rule.count = Some(value.parse().map_err(|_| invalid())?),
                "UNTIL" => rule.until = Some(parse_time_value(value).ok_or_else(invalid)?),
                "BYDAY" => {
                    rule.by_day = value
                        .split(',')
                        .map(parse_weekday_num)
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(invalid)?;
                }
                "BYMONTHDAY" => {
                    rule.by_month_day = value
                        .split(',')
                        .map(|d| d.trim().parse::<i8>().ok())
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(invalid)?;
                }
                "BYMONTH" => {
                    rule.by_month = value
                        .split(',')
                        .map(|m| m.trim().parse::<u8>().ok().filter(|m| (1..=12).contains(m)))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(invalid)?;
                }
                other => warn!(part = other, rule = s, "Ignoring unsupported RRULE part"),
            }
        }

        rule.frequency = frequency.ok_or_else(invalid)?;
        Ok(rule)
    }
}

fn weekday_num_to_string(weekday: &WeekdayNum) -> String {
    match weekday.occurrence {
        Some(n) => format!("{}{}", n, weekday_code(weekday.day)),
        None => weekday_code(weekday.day).to_string(),
    }
}

/// Parse `MO`, `2TU`, `+3WE` or `-1SA`.
fn parse_weekday_num(s: &str) -> Option<WeekdayNum> {
    let s = s.trim().to_ascii_uppercase();
    let split = s.len().checked_sub(2)?;
    let (ordinal, code) = s.split_at_checked(split)?;
    let day = weekday_from_code(code)?;

    if ordinal.is_empty() {
        return Some(WeekdayNum::every(day));
    }
    Some(WeekdayNum::nth(ordinal.parse().ok()?, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{NaiveDate, TimeZone, Utc, Weekday};

    #[test]
    fn test_parse_monthly_by_weekday() {
        let rule: RecurrenceRule = "FREQ=MONTHLY;BYDAY=-1SA,4SU".parse().unwrap();

        assert_eq!(rule.frequency, Frequency::Monthly);
        assert_eq!(
            rule.by_day,
            vec![WeekdayNum::nth(-1, Weekday::Sat), WeekdayNum::nth(4, Weekday::Sun)]
        );
        assert_eq!(rule.to_string(), "FREQ=MONTHLY;BYDAY=-1SA,4SU");
    }

    #[test]
    fn test_parse_bounds_and_refinements() {
        let rule: RecurrenceRule = "FREQ=WEEKLY;INTERVAL=2;COUNT=10;BYDAY=MO,+2WE"
            .parse()
            .unwrap();

        assert_eq!(rule.interval, Some(2));
        assert_eq!(rule.count, Some(10));
        assert_eq!(
            rule.by_day,
            vec![WeekdayNum::every(Weekday::Mon), WeekdayNum::nth(2, Weekday::Wed)]
        );

        let rule: RecurrenceRule = "FREQ=YEARLY;UNTIL=20300101".parse().unwrap();
        assert_eq!(
            rule.until,
            Some(EventTime::Date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()))
        );

        let rule: RecurrenceRule = "FREQ=DAILY;UNTIL=20250610T120000Z;BYMONTHDAY=1,-1"
            .parse()
            .unwrap();
        assert_eq!(
            rule.until,
            Some(EventTime::DateTime(Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()))
        );
        assert_eq!(rule.by_month_day, vec![1, -1]);
    }

    #[test]
    fn test_parse_by_month() {
        let rule: RecurrenceRule = "FREQ=YEARLY;BYMONTH=5;BYDAY=2SU".parse().unwrap();

        assert_eq!(rule.by_month, vec![5]);
        assert_eq!(rule.by_day, vec![WeekdayNum::nth(2, Weekday::Sun)]);
        assert_eq!(rule.to_string(), "FREQ=YEARLY;BYDAY=2SU;BYMONTH=5");

        assert!("FREQ=YEARLY;BYMONTH=13".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=YEARLY;BYMONTH=0".parse::<RecurrenceRule>().is_err());
    }

    #[test]
    fn test_unknown_parts_are_ignored() {
        let rule: RecurrenceRule = "FREQ=YEARLY;WKST=MO".parse().unwrap();
        assert_eq!(rule, RecurrenceRule::new(Frequency::Yearly));
    }

    #[test]
    fn test_rejects_invalid_rules() {
        assert!("BYDAY=MO".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=HOURLY".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=WEEKLY;BYDAY=XX".parse::<RecurrenceRule>().is_err());
        assert!("FREQ=WEEKLY;COUNT=many".parse::<RecurrenceRule>().is_err());
        assert!("FREQ".parse::<RecurrenceRule>().is_err());
    }

    #[test]
    fn test_display_orders_parts() {
        let mut rule = RecurrenceRule::new(Frequency::Monthly);
        rule.count = Some(3);
        rule.interval = Some(2);
        rule.by_month_day = vec![15];

        assert_eq!(rule.to_string(), "FREQ=MONTHLY;INTERVAL=2;COUNT=3;BYMONTHDAY=15");
    }
}
