//! Daily horoscopes by zodiac sign

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::Result;

use super::{fetch_json, title_case, value_text};

const SERVICE: &str = "aistrology";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }

    /// Every sign with its emoji, for usage hints.
    pub fn listing() -> String {
        Self::ALL
            .iter()
            .map(|sign| format!("{} {}", sign.emoji(), sign.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a zodiac sign")]
pub struct UnknownSign(pub String);

impl FromStr for ZodiacSign {
    type Err = UnknownSign;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sign| sign.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSign(wanted.to_string()))
    }
}

/// Offset from UTC in whole minutes, between UTC-12 and UTC+14 in
/// quarter-hour steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UtcOffset {
    minutes: i32,
}

const MIN_OFFSET_MINUTES: i32 = -12 * 60;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a UTC offset between UTC-12 and UTC+14")]
pub struct InvalidOffset(pub String);

impl UtcOffset {
    pub const UTC: Self = Self { minutes: 0 };

    pub fn from_minutes(minutes: i32) -> Option<Self> {
        ((MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) && minutes % 15 == 0)
            .then_some(Self { minutes })
    }

    pub fn minutes(self) -> i32 {
        self.minutes
    }

    /// The calendar date at this offset when UTC reads `now`.
    pub fn date_at(self, now: DateTime<Utc>) -> NaiveDate {
        match FixedOffset::east_opt(self.minutes * 60) {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.date_naive(),
        }
    }

    pub fn today(self) -> NaiveDate {
        self.date_at(Utc::now())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let hours = self.minutes.abs() / 60;
        let minutes = self.minutes.abs() % 60;
        if minutes == 0 {
            write!(f, "UTC{sign}{hours}")
        } else {
            write!(f, "UTC{sign}{hours}:{minutes:02}")
        }
    }
}

impl FromStr for UtcOffset {
    type Err = InvalidOffset;

    /// Accepts `8`, `+8`, `-3.5`, `5:30`, `UTC+5:45` and `utc`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || InvalidOffset(s.trim().to_string());

        let text = s.trim();
        let text = match text.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("utc") => &text[3..],
            _ => text,
        };
        if text.is_empty() {
            return Ok(Self::UTC);
        }

        let (negative, magnitude) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let minutes = match magnitude.split_once(':') {
            Some((hours, minutes)) => {
                let hours: u32 = hours.parse().map_err(|_| invalid())?;
                let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
                if minutes >= 60 {
                    return Err(invalid());
                }
                let total = hours
                    .checked_mul(60)
                    .and_then(|h| h.checked_add(minutes))
                    .ok_or_else(invalid)?;
                i32::try_from(total).map_err(|_| invalid())?
            }
            None => {
                let hours: f64 = magnitude.parse().map_err(|_| invalid())?;
                let minutes = hours * 60.0;
                if !minutes.is_finite() || minutes < 0.0 || minutes.fract() != 0.0 {
                    return Err(invalid());
                }
                minutes as i32
            }
        };

        Self::from_minutes(if negative { -minutes } else { minutes }).ok_or_else(invalid)
    }
}

/// One day's reading. The service is loose about types, so every field is
/// optional and the lucky number may be a string or a number.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Horoscope {
    pub current_date: Option<String>,
    pub description: Option<String>,
    pub compatibility: Option<String>,
    pub mood: Option<String>,
    pub color: Option<String>,
    pub lucky_number: serde_json::Value,
    pub lucky_time: Option<String>,
    pub date_range: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HoroscopeClient {
    http: reqwest::Client,
    url: String,
}

impl HoroscopeClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    fn query(sign: ZodiacSign, date: NaiveDate) -> [(&'static str, String); 2] {
        [
            ("sign", sign.name().to_lowercase()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ]
    }

    /// The reading for `sign` on `date`, or `None` when the service has none.
    pub async fn daily(&self, sign: ZodiacSign, date: NaiveDate) -> Result<Option<Horoscope>> {
        let request = self.http.get(&self.url).query(&Self::query(sign, date));
        let readings: Vec<Horoscope> = fetch_json(SERVICE, &self.url, request).await?;
        Ok(readings.into_iter().next())
    }
}

pub const UNAVAILABLE: &str = "Sorry, I couldn't retrieve the horoscope right now.";
pub const LOOKUP_FAILED: &str = "An unexpected error occurred while fetching your horoscope.";

pub fn fetching(mention: &str, sign: ZodiacSign) -> String {
    format!("{mention}, fetching today's horoscope for **{sign}**...")
}

pub fn render(sign: ZodiacSign, reading: &Horoscope, request_date: NaiveDate) -> Vec<String> {
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .map(title_case)
            .unwrap_or_else(|| "N/A".to_string())
    };

    let description = reading
        .description
        .as_deref()
        .unwrap_or("No horoscope data found for today.");

    vec![
        format!("✨ **Daily Horoscope for {sign}** {} ✨", sign.emoji()),
        format!("_{description}_"),
        format!(
            "**Mood:** {} | **Compatibility:** {} | **Lucky Color:** {}",
            field(&reading.mood),
            field(&reading.compatibility),
            field(&reading.color)
        ),
        format!(
            "**Lucky Number:** {} | **Lucky Time:** {}",
            value_text(&reading.lucky_number).unwrap_or_else(|| "N/A".to_string()),
            reading.lucky_time.as_deref().unwrap_or("N/A")
        ),
        format!(
            "Horoscope For: {} | Your Date: {} | Range: {}",
            reading.current_date.as_deref().unwrap_or("N/A"),
            request_date.format("%Y-%m-%d"),
            reading.date_range.as_deref().unwrap_or("")
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sign_parsing() {
        assert_eq!("leo".parse::<ZodiacSign>(), Ok(ZodiacSign::Leo));
        assert_eq!(" SAGITTARIUS ".parse::<ZodiacSign>(), Ok(ZodiacSign::Sagittarius));
        assert_eq!(
            "ophiuchus".parse::<ZodiacSign>(),
            Err(UnknownSign("ophiuchus".to_string()))
        );
    }

    #[test]
    fn test_offset_parsing() {
        let minutes = |text: &str| text.parse::<UtcOffset>().map(UtcOffset::minutes);

        assert_eq!(minutes("8"), Ok(480));
        assert_eq!(minutes("+8"), Ok(480));
        assert_eq!(minutes("UTC+5:30"), Ok(330));
        assert_eq!(minutes("utc-9.5"), Ok(-570));
        assert_eq!(minutes("5.75"), Ok(345));
        assert_eq!(minutes("-12"), Ok(-720));
        assert_eq!(minutes("UTC"), Ok(0));

        assert!(minutes("+15").is_err());
        assert!(minutes("-13").is_err());
        assert!(minutes("5:20").is_err());
        assert!(minutes("5:60").is_err());
        assert!(minutes("east").is_err());
        assert!(minutes("--3").is_err());
        assert!(minutes("99999999:00").is_err());
    }

    #[test]
    fn test_offset_display() {
        let display = |minutes| UtcOffset::from_minutes(minutes).unwrap().to_string();
        assert_eq!(display(0), "UTC+0");
        assert_eq!(display(480), "UTC+8");
        assert_eq!(display(-570), "UTC-9:30");
        assert_eq!(display(345), "UTC+5:45");
    }

    #[test]
    fn test_date_at_offset() {
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 20, 0, 0).unwrap();
        let plus_eight = UtcOffset::from_minutes(480).unwrap();
        let minus_ten = UtcOffset::from_minutes(-600).unwrap();

        assert_eq!(plus_eight.date_at(now).to_string(), "2024-05-18");
        assert_eq!(UtcOffset::UTC.date_at(now).to_string(), "2024-05-17");
        assert_eq!(minus_ten.date_at(now).to_string(), "2024-05-17");
    }

    #[test]
    fn test_query() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(
            HoroscopeClient::query(ZodiacSign::Leo, date),
            [
                ("sign", "leo".to_string()),
                ("date", "2024-05-17".to_string())
            ]
        );
    }

    #[test]
    fn test_render_reading() {
        let json = r#"[{
            "current_date": "2024-05-17",
            "description": "A good day to sort your receipts.",
            "compatibility": "aries",
            "mood": "focused",
            "color": "navy blue",
            "lucky_number": 7,
            "lucky_time": "9am",
            "date_range": "Jul 23 - Aug 22"
        }]"#;
        let readings: Vec<Horoscope> = serde_json::from_str(json).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 18).unwrap();

        assert_eq!(
            render(ZodiacSign::Leo, &readings[0], date),
            vec![
                "✨ **Daily Horoscope for Leo** ♌ ✨".to_string(),
                "_A good day to sort your receipts._".to_string(),
                "**Mood:** Focused | **Compatibility:** Aries | **Lucky Color:** Navy Blue"
                    .to_string(),
                "**Lucky Number:** 7 | **Lucky Time:** 9am".to_string(),
                "Horoscope For: 2024-05-17 | Your Date: 2024-05-18 | Range: Jul 23 - Aug 22"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_render_sparse_reading() {
        let reading: Horoscope = serde_json::from_str(r#"{"lucky_number": "12"}"#).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 18).unwrap();
        let lines = render(ZodiacSign::Pisces, &reading, date);

        assert_eq!(lines[1], "_No horoscope data found for today._");
        assert_eq!(
            lines[2],
            "**Mood:** N/A | **Compatibility:** N/A | **Lucky Color:** N/A"
        );
        assert_eq!(lines[3], "**Lucky Number:** 12 | **Lucky Time:** N/A");
    }
}
