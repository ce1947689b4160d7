//! Upcoming-celebration lookups
//!
//! Works over the canonical zero-padded `MM-DD` strings the import
//! pipeline stores for birthdays and wedding anniversaries. Because the
//! canonical form is month-first, any change to the import formatter's
//! ordering heuristic would silently shift celebration dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Landlord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelebrationType {
    Birthday,
    Anniversary,
}

/// One upcoming celebration for the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingCelebration {
    pub landlord: Landlord,
    pub celebration_type: CelebrationType,
    pub month_day: String,
    pub days_until: i64,
}

/// Request payload for the upcoming-celebrations subject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingCelebrationsRequest {
    #[serde(default)]
    pub days: Option<i64>,
}

/// Days from `today` until the next occurrence of a canonical `MM-DD`
/// date. `None` for unparseable input. Feb 29 falls on Mar 1 in
/// non-leap years.
pub fn days_until_month_day(month_day: &str, today: NaiveDate) -> Option<i64> {
    let (month, day) = parse_month_day(month_day)?;

    for year in [today.year(), today.year() + 1] {
        let candidate = NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
            if month == 2 && day == 29 {
                NaiveDate::from_ymd_opt(year, 3, 1)
            } else {
                None
            }
        })?;
        if candidate >= today {
            return Some((candidate - today).num_days());
        }
    }

    None
}

fn parse_month_day(raw: &str) -> Option<(u32, u32)> {
    let (m, d) = raw.split_once('-')?;
    let month = m.parse::<u32>().ok()?;
    let day = d.parse::<u32>().ok()?;
    if (1..=12).contains(&month) && (1..=31).contains(&day) {
        Some((month, day))
    } else {
        None
    }
}

/// Collect celebrations falling within the window, soonest first.
pub fn collect_upcoming(
    landlords: Vec<Landlord>,
    today: NaiveDate,
    window_days: i64,
) -> Vec<UpcomingCelebration> {
    let mut upcoming = Vec::new();

    for landlord in landlords {
        let dates = [
            (CelebrationType::Birthday, landlord.date_of_birth.clone()),
            (
                CelebrationType::Anniversary,
                landlord.wedding_anniversary.clone(),
            ),
        ];
        for (celebration_type, month_day) in dates {
            let Some(month_day) = month_day else { continue };
            let Some(days_until) = days_until_month_day(&month_day, today) else {
                continue;
            };
            if days_until <= window_days {
                upcoming.push(UpcomingCelebration {
                    landlord: landlord.clone(),
                    celebration_type,
                    month_day,
                    days_until,
                });
            }
        }
    }

    upcoming.sort_by_key(|c| c.days_until);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LandlordStatus, OccupancyType, OnboardingStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn landlord(dob: Option<&str>, anniversary: Option<&str>) -> Landlord {
        Landlord {
            id: Uuid::new_v4(),
            full_name: "Ada Obi".to_string(),
            phone: "+2348012345678".to_string(),
            occupancy_type: OccupancyType::Owner,
            road: "Road 1".to_string(),
            email: None,
            house_address: None,
            zone: "Zone D".to_string(),
            date_of_birth: dob.map(str::to_string),
            wedding_anniversary: anniversary.map(str::to_string),
            celebrate_opt_in: true,
            onboarding_status: OnboardingStatus::Pending,
            status: LandlordStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_days_until_same_day_is_zero() {
        assert_eq!(days_until_month_day("08-29", date(2026, 8, 29)), Some(0));
    }

    #[test]
    fn test_days_until_later_this_year() {
        assert_eq!(days_until_month_day("09-01", date(2026, 8, 29)), Some(3));
    }

    #[test]
    fn test_days_until_wraps_to_next_year() {
        // Jan 2 from Dec 31 is two days away, across the year boundary.
        assert_eq!(days_until_month_day("01-02", date(2026, 12, 31)), Some(2));
    }

    #[test]
    fn test_feb_29_falls_on_mar_1_in_non_leap_years() {
        // 2026 is not a leap year.
        assert_eq!(days_until_month_day("02-29", date(2026, 2, 27)), Some(2));
    }

    #[test]
    fn test_unparseable_month_day_is_none() {
        assert_eq!(days_until_month_day("13-01", date(2026, 8, 29)), None);
        assert_eq!(days_until_month_day("garbage", date(2026, 8, 29)), None);
    }

    #[test]
    fn test_collect_upcoming_filters_and_sorts() {
        let today = date(2026, 8, 29);
        let landlords = vec![
            landlord(Some("09-03"), None),
            landlord(Some("09-01"), Some("12-25")),
            landlord(None, Some("08-30")),
        ];

        let upcoming = collect_upcoming(landlords, today, 7);
        let days: Vec<i64> = upcoming.iter().map(|c| c.days_until).collect();
        assert_eq!(days, vec![1, 3, 5]);
        assert_eq!(upcoming[0].celebration_type, CelebrationType::Anniversary);
    }
}
