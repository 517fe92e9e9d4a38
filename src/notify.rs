use chrono::{Duration, NaiveDate};

use crate::models::{CyclePrediction, NotificationKind, NotificationSetting, NotificationTrigger};

/// Reminders due on `today`.
///
/// A setting fires only when `today + lead_days` is exactly its target date.
/// A lead time that runs past the last representable date never fires.
/// Repeated calls on the same day return the same triggers; callers dedupe.
pub fn evaluate(
    prediction: Option<&CyclePrediction>,
    settings: &[NotificationSetting],
    today: NaiveDate,
) -> Vec<NotificationTrigger> {
    let Some(prediction) = prediction else {
        return Vec::new();
    };

    settings
        .iter()
        .filter(|s| s.enabled)
        .filter(|s| {
            today.checked_add_signed(Duration::days(i64::from(s.lead_days)))
                == Some(target_date(prediction, s.kind))
        })
        .map(|s| NotificationTrigger {
            kind: s.kind,
            message: message(s.kind, s.lead_days),
        })
        .collect()
}

pub fn target_date(prediction: &CyclePrediction, kind: NotificationKind) -> NaiveDate {
    match kind {
        NotificationKind::Period => prediction.next_period_start,
        NotificationKind::Fertile => prediction.fertile_window_start,
        NotificationKind::Ovulation => prediction.ovulation_day,
    }
}

fn message(kind: NotificationKind, lead_days: u32) -> String {
    let when = match lead_days {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        n => format!("in {n} days"),
    };
    match kind {
        NotificationKind::Period => format!("Your period will probably start {when}"),
        NotificationKind::Fertile => format!("Your fertile window will begin {when}"),
        NotificationKind::Ovulation => format!("Your ovulation day will be {when}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationSettings;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn prediction() -> CyclePrediction {
        CyclePrediction {
            next_period_start: date("2024-03-01"),
            ovulation_day: date("2024-02-16"),
            fertile_window_start: date("2024-02-11"),
            fertile_window_end: date("2024-02-17"),
            confidence: 90,
        }
    }

    fn period_setting(lead_days: u32, enabled: bool) -> NotificationSetting {
        NotificationSetting {
            kind: NotificationKind::Period,
            lead_days,
            enabled,
        }
    }

    #[test]
    fn fires_on_exact_lead_day() {
        let settings = [period_setting(2, true)];
        let triggers = evaluate(Some(&prediction()), &settings, date("2024-02-27"));
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].kind, NotificationKind::Period);
        assert_eq!(triggers[0].message, "Your period will probably start in 2 days");
    }

    #[test]
    fn silent_before_and_after_lead_day() {
        let settings = [period_setting(2, true)];
        for today in ["2024-02-26", "2024-02-28"] {
            assert!(evaluate(Some(&prediction()), &settings, date(today)).is_empty());
        }
    }

    #[test]
    fn disabled_settings_never_fire() {
        let settings = [period_setting(2, false)];
        assert!(evaluate(Some(&prediction()), &settings, date("2024-02-27")).is_empty());
    }

    #[test]
    fn no_prediction_no_triggers() {
        let settings = NotificationSettings::default();
        assert!(evaluate(None, settings.as_slice(), date("2024-02-27")).is_empty());
    }

    #[test]
    fn each_kind_maps_to_its_date() {
        let settings = NotificationSettings::default();
        let fertile = evaluate(Some(&prediction()), settings.as_slice(), date("2024-02-10"));
        assert_eq!(fertile.len(), 1);
        assert_eq!(fertile[0].kind, NotificationKind::Fertile);
        assert_eq!(fertile[0].message, "Your fertile window will begin in 1 day");

        let ovulation = evaluate(Some(&prediction()), settings.as_slice(), date("2024-02-15"));
        assert_eq!(ovulation.len(), 1);
        assert_eq!(ovulation[0].kind, NotificationKind::Ovulation);
    }

    #[test]
    fn zero_lead_fires_on_the_day() {
        let settings = [NotificationSetting {
            kind: NotificationKind::Ovulation,
            lead_days: 0,
            enabled: true,
        }];
        let triggers = evaluate(Some(&prediction()), &settings, date("2024-02-16"));
        assert_eq!(triggers[0].message, "Your ovulation day will be today");
    }

    #[test]
    fn huge_lead_time_is_silent() {
        let settings = [period_setting(u32::MAX, true)];
        assert!(evaluate(Some(&prediction()), &settings, date("2024-02-27")).is_empty());
        assert!(evaluate(Some(&prediction()), &settings, NaiveDate::MAX).is_empty());
    }

    #[test]
    fn evaluation_is_repeatable() {
        let settings = NotificationSettings::default();
        let today = date("2024-02-27");
        let first = evaluate(Some(&prediction()), settings.as_slice(), today);
        let second = evaluate(Some(&prediction()), settings.as_slice(), today);
        assert_eq!(first, second);
    }
}
