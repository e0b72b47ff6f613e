//! Patient details entered on the form.
//!
//! A record lives for one request only and is never persisted.

use crate::error::{Result, ScreenError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient age in whole years, always within `[Age::MIN, Age::MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Age(u8);

impl Age {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    pub const DEFAULT: u8 = 30;

    /// Clamp any integer into the accepted range
    pub fn clamped(years: i64) -> Self {
        Self(years.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn years(self) -> u8 {
        self.0
    }
}

impl Default for Age {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for Age {
    fn from(years: i64) -> Self {
        Self::clamped(years)
    }
}

impl From<Age> for u8 {
    fn from(age: Age) -> Self {
        age.0
    }
}

impl FromStr for Age {
    type Err = ScreenError;

    /// Parses form input. Blank falls back to the default age.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        if let Ok(years) = s.parse::<i64>() {
            return Ok(Self::clamped(years));
        }
        // Digit strings too long for i64 still clamp to the nearest bound
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(if negative { Self::MIN } else { Self::MAX }));
        }
        Err(ScreenError::ValidationError(format!("Age must be a whole number, got '{}'", s)))
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ScreenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ScreenError::ValidationError(format!(
                "Gender must be one of Male, Female, Other, got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient record built from form input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Age,
    #[serde(default)]
    pub gender: Gender,
}

impl PatientRecord {
    pub fn new(name: impl Into<String>, age: Age, gender: Gender) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
        }
    }

    /// Build a record from raw form field values
    pub fn from_form(name: &str, age: &str, gender: &str) -> Result<Self> {
        Ok(Self::new(name, age.parse()?, gender.parse()?))
    }
}
