//! Daily forecast aggregation
//!
//! The provider publishes samples every three hours for about five days.
//! They are bucketed into calendar days in a fixed reference zone and reduced
//! to one summary per day, at most seven of them.

use chrono::{DateTime, NaiveDate, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::WeatherSample;
use crate::types::{round_dp, Language};

/// Upper bound on the number of days a forecast summary covers
pub const MAX_FORECAST_DAYS: usize = 7;

/// Summary of one calendar day of samples
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub temp_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub temp_max: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub temp_avg: Decimal,
    pub humidity_avg: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub rainfall_total: Decimal,
    pub dominant_description: String,
    pub dominant_icon: String,
}

/// Occurrence counter that remembers first-seen order
#[derive(Debug, Default)]
struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    fn add(&mut self, value: &str) {
        match self.entries.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((value.to_string(), 1)),
        }
    }

    /// Highest count wins; on a tie the value seen first is kept
    fn dominant(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.entries {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.clone()).unwrap_or_default()
    }
}

#[derive(Debug)]
struct DayAccumulator {
    temp_min: Decimal,
    temp_max: Decimal,
    temp_sum: Decimal,
    humidity_sum: i64,
    rainfall: Decimal,
    count: u32,
    descriptions: Tally,
    icons: Tally,
}

impl DayAccumulator {
    fn new(first: &WeatherSample) -> Self {
        Self {
            temp_min: first.temperature_celsius,
            temp_max: first.temperature_celsius,
            temp_sum: Decimal::ZERO,
            humidity_sum: 0,
            rainfall: Decimal::ZERO,
            count: 0,
            descriptions: Tally::default(),
            icons: Tally::default(),
        }
    }

    fn add(&mut self, sample: &WeatherSample) {
        self.temp_min = self.temp_min.min(sample.temperature_celsius);
        self.temp_max = self.temp_max.max(sample.temperature_celsius);
        self.temp_sum += sample.temperature_celsius;
        self.humidity_sum += i64::from(sample.humidity_percent);
        self.rainfall += sample.rainfall_mm;
        self.count += 1;
        self.descriptions.add(&sample.description);
        self.icons.add(&sample.icon);
    }

    fn finish(self, date: NaiveDate) -> DailyForecast {
        let count = Decimal::from(self.count.max(1));
        let humidity_avg = round_dp(Decimal::from(self.humidity_sum) / count, 0);

        DailyForecast {
            date,
            day_name: date.format("%A").to_string(),
            temp_min: round_dp(self.temp_min, 1),
            temp_max: round_dp(self.temp_max, 1),
            temp_avg: round_dp(self.temp_sum / count, 1),
            humidity_avg: humidity_avg.to_i32().unwrap_or_default(),
            rainfall_total: round_dp(self.rainfall, 1),
            dominant_description: self.descriptions.dominant(),
            dominant_icon: self.icons.dominant(),
        }
    }
}

/// Reduce provider samples to at most seven daily summaries.
///
/// Samples are bucketed by the calendar date of their timestamp in `zone`.
/// Days come out in ascending order; days without samples are not emitted.
/// Samples whose timestamp chrono cannot represent are skipped, so malformed
/// or empty input yields an empty list.
pub fn aggregate_forecast<Tz: TimeZone>(samples: &[WeatherSample], zone: &Tz) -> Vec<DailyForecast> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for sample in samples {
        let Some(utc) = DateTime::from_timestamp(sample.timestamp, 0) else {
            continue;
        };
        let date = utc.with_timezone(zone).date_naive();
        days.entry(date)
            .or_insert_with(|| DayAccumulator::new(sample))
            .add(sample);
    }

    days.into_iter()
        .take(MAX_FORECAST_DAYS)
        .map(|(date, day)| day.finish(date))
        .collect()
}

/// Irrigation hint derived from the shape of a forecast
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastTip {
    RainExpected,
    DrySpell,
    HighTemperatures,
    CoolWeather,
    Monitor,
}

impl ForecastTip {
    pub fn message(&self, language: Language) -> &'static str {
        match (self, language) {
            (ForecastTip::RainExpected, Language::English) => {
                "Rain expected for multiple days. Reduce irrigation."
            }
            (ForecastTip::RainExpected, Language::Swahili) => {
                "Mvua inatarajiwa kwa siku nyingi. Punguza umwagiliaji."
            }
            (ForecastTip::DrySpell, Language::English) => {
                "Dry spell expected. Plan adequate irrigation."
            }
            (ForecastTip::DrySpell, Language::Swahili) => {
                "Ukame unatarajiwa. Panga umwagiliaji wa kutosha."
            }
            (ForecastTip::HighTemperatures, Language::English) => {
                "High temperatures expected. Increase irrigation and water morning/evening."
            }
            (ForecastTip::HighTemperatures, Language::Swahili) => {
                "Joto kali linatarajiwa. Ongeza umwagiliaji na fanya asubuhi na jioni."
            }
            (ForecastTip::CoolWeather, Language::English) => {
                "Cool weather expected. Reduce irrigation frequency."
            }
            (ForecastTip::CoolWeather, Language::Swahili) => {
                "Hali ya hewa ya baridi inatarajiwa. Punguza umwagiliaji."
            }
            (ForecastTip::Monitor, Language::English) => {
                "Monitor daily weather and adjust irrigation accordingly."
            }
            (ForecastTip::Monitor, Language::Swahili) => {
                "Fuatilia hali ya hewa kila siku na urekebishe umwagiliaji kulingana na hali."
            }
        }
    }
}

/// Pick the tip for a set of daily summaries; the first matching rule wins
pub fn forecast_tip(days: &[DailyForecast]) -> ForecastTip {
    let count = |predicate: fn(&DailyForecast) -> bool| days.iter().filter(|d| predicate(d)).count();

    if count(|d| d.rainfall_total > Decimal::from(2)) >= 3 {
        ForecastTip::RainExpected
    } else if count(|d| d.rainfall_total.is_zero()) >= 5 {
        ForecastTip::DrySpell
    } else if count(|d| d.temp_max > Decimal::from(30)) >= 4 {
        ForecastTip::HighTemperatures
    } else if count(|d| d.temp_max < Decimal::from(20)) >= 4 {
        ForecastTip::CoolWeather
    } else {
        ForecastTip::Monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_reference_zone;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // 2024-03-04 00:00:00 UTC, a Monday
    const MONDAY_UTC: i64 = 1_709_510_400;
    const HOUR: i64 = 3600;
    const DAY: i64 = 24 * HOUR;

    fn sample(timestamp: i64, temp: &str, humidity: i32, rain: &str, desc: &str, icon: &str) -> WeatherSample {
        WeatherSample {
            timestamp,
            temperature_celsius: dec(temp),
            humidity_percent: humidity,
            rainfall_mm: dec(rain),
            description: desc.to_string(),
            icon: icon.to_string(),
        }
    }

    fn day(rain: &str, temp_max: &str) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            day_name: "Monday".to_string(),
            temp_min: dec("15"),
            temp_max: dec(temp_max),
            temp_avg: dec("20"),
            humidity_avg: 60,
            rainfall_total: dec(rain),
            dominant_description: "clear sky".to_string(),
            dominant_icon: "01d".to_string(),
        }
    }

    #[test]
    fn test_empty_input_yields_no_days() {
        assert!(aggregate_forecast(&[], &Utc).is_empty());
    }

    #[test]
    fn test_three_days_of_samples() {
        let mut samples = Vec::new();
        for d in 0..3 {
            let rains = ["0", "1", "0"];
            for (slot, rain) in rains.iter().enumerate() {
                let ts = MONDAY_UTC + d * DAY + 6 * HOUR + slot as i64 * 3 * HOUR;
                samples.push(sample(ts, "20", 60, if d == 0 { rain } else { "0" }, "clear sky", "01d"));
            }
        }

        let days = aggregate_forecast(&samples, &Utc);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].rainfall_total, dec("1.0"));
        assert_eq!(days[1].rainfall_total, Decimal::ZERO);
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(days[0].day_name, "Monday");
        assert_eq!(days[2].day_name, "Wednesday");
    }

    #[test]
    fn test_day_statistics_and_rounding() {
        let samples = vec![
            sample(MONDAY_UTC + 3 * HOUR, "18.24", 55, "0.26", "light rain", "10d"),
            sample(MONDAY_UTC + 6 * HOUR, "24.36", 60, "0.1", "light rain", "10d"),
            sample(MONDAY_UTC + 9 * HOUR, "26.5", 66, "0", "few clouds", "02d"),
        ];

        let days = aggregate_forecast(&samples, &Utc);
        assert_eq!(days.len(), 1);
        let monday = &days[0];
        assert_eq!(monday.temp_min, dec("18.2"));
        assert_eq!(monday.temp_max, dec("26.5"));
        // (18.24 + 24.36 + 26.5) / 3 = 23.0333..
        assert_eq!(monday.temp_avg, dec("23.0"));
        // (55 + 60 + 66) / 3 = 60.333..
        assert_eq!(monday.humidity_avg, 60);
        // 0.36 rounds once, at the end
        assert_eq!(monday.rainfall_total, dec("0.4"));
        assert_eq!(monday.dominant_description, "light rain");
        assert_eq!(monday.dominant_icon, "10d");
    }

    #[test]
    fn test_humidity_rounds_half_up() {
        let samples = vec![
            sample(MONDAY_UTC + 3 * HOUR, "20", 60, "0", "clear sky", "01d"),
            sample(MONDAY_UTC + 6 * HOUR, "20", 61, "0", "clear sky", "01d"),
        ];
        assert_eq!(aggregate_forecast(&samples, &Utc)[0].humidity_avg, 61);
    }

    #[test]
    fn test_dominant_tie_keeps_first_seen() {
        let samples = vec![
            sample(MONDAY_UTC + 3 * HOUR, "20", 60, "0", "overcast clouds", "04d"),
            sample(MONDAY_UTC + 6 * HOUR, "20", 60, "0", "light rain", "10d"),
            sample(MONDAY_UTC + 9 * HOUR, "20", 60, "0", "light rain", "04d"),
            sample(MONDAY_UTC + 12 * HOUR, "20", 60, "0", "overcast clouds", "10d"),
        ];

        let monday = &aggregate_forecast(&samples, &Utc)[0];
        assert_eq!(monday.dominant_description, "overcast clouds");
        assert_eq!(monday.dominant_icon, "04d");
    }

    #[test]
    fn test_unordered_input_is_sorted_by_date() {
        let samples = vec![
            sample(MONDAY_UTC + 2 * DAY, "22", 60, "0", "clear sky", "01d"),
            sample(MONDAY_UTC, "20", 60, "0", "clear sky", "01d"),
            sample(MONDAY_UTC + DAY, "21", 60, "0", "clear sky", "01d"),
        ];

        let days = aggregate_forecast(&samples, &Utc);
        let temps: Vec<Decimal> = days.iter().map(|d| d.temp_max).collect();
        assert_eq!(temps, vec![dec("20"), dec("21"), dec("22")]);
    }

    #[test]
    fn test_truncates_to_seven_earliest_days() {
        let samples: Vec<WeatherSample> = (0..10)
            .map(|d| sample(MONDAY_UTC + d * DAY + 12 * HOUR, "20", 60, "0", "clear sky", "01d"))
            .collect();

        let days = aggregate_forecast(&samples, &Utc);
        assert_eq!(days.len(), MAX_FORECAST_DAYS);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(days[6].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_reference_zone_moves_day_boundary() {
        // 22:00 UTC on Monday is 01:00 Tuesday at UTC+3
        let samples = vec![
            sample(MONDAY_UTC + 12 * HOUR, "20", 60, "0", "clear sky", "01d"),
            sample(MONDAY_UTC + 22 * HOUR, "18", 60, "0", "clear sky", "01n"),
        ];

        assert_eq!(aggregate_forecast(&samples, &Utc).len(), 1);

        let local = aggregate_forecast(&samples, &default_reference_zone());
        assert_eq!(local.len(), 2);
        assert_eq!(local[1].day_name, "Tuesday");
        assert_eq!(local[1].temp_max, dec("18"));
    }

    #[test]
    fn test_unrepresentable_timestamps_are_skipped() {
        let samples = vec![
            sample(i64::MAX, "20", 60, "0", "clear sky", "01d"),
            sample(MONDAY_UTC, "21", 60, "0", "clear sky", "01d"),
        ];
        let days = aggregate_forecast(&samples, &Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_max, dec("21"));
    }

    #[test]
    fn test_tip_rules_in_priority_order() {
        let rainy: Vec<_> = (0..3).map(|_| day("2.5", "32")).collect();
        assert_eq!(forecast_tip(&rainy), ForecastTip::RainExpected);

        let dry: Vec<_> = (0..5).map(|_| day("0", "32")).collect();
        assert_eq!(forecast_tip(&dry), ForecastTip::DrySpell);

        let mut hot: Vec<_> = (0..4).map(|_| day("0.5", "31")).collect();
        hot.push(day("0", "25"));
        assert_eq!(forecast_tip(&hot), ForecastTip::HighTemperatures);

        let cool: Vec<_> = (0..4).map(|_| day("1", "19")).collect();
        assert_eq!(forecast_tip(&cool), ForecastTip::CoolWeather);

        assert_eq!(forecast_tip(&[]), ForecastTip::Monitor);
    }

    #[test]
    fn test_tip_rain_threshold_is_strict() {
        let days: Vec<_> = (0..3).map(|_| day("2", "25")).collect();
        assert_eq!(forecast_tip(&days), ForecastTip::Monitor);
    }

    #[test]
    fn test_tip_messages_are_bilingual() {
        assert_eq!(
            ForecastTip::DrySpell.message(Language::English),
            "Dry spell expected. Plan adequate irrigation."
        );
        assert!(ForecastTip::DrySpell.message(Language::Swahili).starts_with("Ukame"));
    }
}
