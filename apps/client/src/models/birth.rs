use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    /// Also covers an unanswered select.
    Other,
}

impl Gender {
    /// Maps a raw select value to a gender. The empty value means "not specified".
    pub fn from_form_value(value: &str) -> Option<Gender> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "" | "other" | "unspecified" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Birth details as sent to the prediction endpoint.
///
/// Wire form: `{"name","gender","birthDate":"YYYY-MM-DD","birthTime":"HH:MM","birthPlace"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthDetails {
    pub name: String,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub birth_time: NaiveTime,
    pub birth_place: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("'{0}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("'{0}' is not a valid time (expected HH:MM)")]
    InvalidTime(String),

    #[error("'{0}' is not a recognised gender")]
    InvalidGender(String),
}

/// The live birth-detail form. Values stay raw strings until submission so the
/// exporter can re-read exactly what the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthForm {
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub birth_time: String,
    pub birth_place: String,
}

impl BirthForm {
    /// Applies the same checks a browser enforces on a `required` date/time form.
    pub fn to_details(&self) -> Result<BirthDetails, FormError> {
        let name = required(&self.name, "Name")?;
        let gender = Gender::from_form_value(&self.gender)
            .ok_or_else(|| FormError::InvalidGender(self.gender.clone()))?;
        let raw_date = required(&self.birth_date, "Date of Birth")?;
        let birth_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(raw_date.to_string()))?;
        let raw_time = required(&self.birth_time, "Time of Birth")?;
        let birth_time =
            hh_mm::parse(raw_time).ok_or_else(|| FormError::InvalidTime(raw_time.to_string()))?;
        let birth_place = required(&self.birth_place, "Place of Birth")?;

        Ok(BirthDetails {
            name: name.to_string(),
            gender,
            birth_date,
            birth_time,
            birth_place: birth_place.to_string(),
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(trimmed)
    }
}

/// `HH:MM` on the wire, `HH:MM:SS` only when seconds are set.
mod hh_mm {
    use chrono::{NaiveTime, Timelike};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid time of day '{raw}'")))
    }
}
