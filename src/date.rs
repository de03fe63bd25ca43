//! Date coercion shared by every date-bearing frontmatter field.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};

/// A coerced frontmatter date. Date-only values are midnight UTC of that day, so posts
/// compare chronologically whatever form their dates were written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostDate(pub DateTime<Utc>);

/// Naive date-times are read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// `%Y-%m-%d` is what the posts use. The month-name forms come from the site starter
/// template (`pubDate: 'Jul 08 2022'`).
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

impl PostDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<PostDate> {
        NaiveDate::from_ymd_opt(year, month, day).map(PostDate::from)
    }

    /// Parses a date string, trying full timestamps first and then date-only forms.
    pub fn parse(s: &str) -> Option<PostDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Some(PostDate(t.with_timezone(&Utc)));
        }

        if let Ok(t) = DateTime::parse_from_rfc2822(s) {
            return Some(PostDate(t.with_timezone(&Utc)));
        }

        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|t| PostDate(Utc.from_utc_datetime(&t)))
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                    .map(PostDate::from)
            })
    }

    /// The calendar day, in UTC.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn is_date_only(&self) -> bool {
        self.0.time() == NaiveTime::default()
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<NaiveDate> for PostDate {
    fn from(date: NaiveDate) -> Self {
        PostDate(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
    }
}

impl From<DateTime<Utc>> for PostDate {
    fn from(t: DateTime<Utc>) -> Self {
        PostDate(t)
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date_only() {
            write!(f, "{}", self.date().format("%Y-%m-%d"))
        } else {
            f.write_str(&self.to_rfc3339())
        }
    }
}
