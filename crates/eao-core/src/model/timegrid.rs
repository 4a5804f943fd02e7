use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Step length of a [`Timegrid`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "15min")]
    QuarterHour,
    #[serde(rename = "30min")]
    HalfHour,
    #[default]
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
}

impl Frequency {
    pub fn minutes(self) -> i64 {
        match self {
            Frequency::QuarterHour => 15,
            Frequency::HalfHour => 30,
            Frequency::Hour => 60,
            Frequency::Day => 24 * 60,
            Frequency::Week => 7 * 24 * 60,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

/// Discretisation of the optimisation horizon: every step starts at
/// `start + k * freq` and lies strictly before `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timegrid {
    #[serde(with = "datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "datetime")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub freq: Frequency,
}

impl Timegrid {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, freq: Frequency) -> Self {
        Self { start, end, freq }
    }

    /// Number of time steps in the grid.
    pub fn step_count(&self) -> usize {
        let span = (self.end - self.start).num_seconds();
        if span <= 0 {
            return 0;
        }
        let step = self.freq.minutes() * 60;
        ((span + step - 1) / step) as usize
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        let step = self.freq.duration();
        (0..self.step_count())
            .map(|k| self.start + step * k as i32)
            .collect()
    }

    pub(crate) fn validate(&self) -> CodecResult<()> {
        if self.end <= self.start {
            return Err(CodecError::Invalid(format!(
                "timegrid end {} is not after start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// Serde adapter accepting `YYYY-MM-DD` as well as full ISO date-times.
pub mod datetime {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    const DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, DATE_TIME)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(DATE_TIME).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date '{raw}'")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid date '{raw}'"))),
                None => Ok(None),
            }
        }
    }
}
