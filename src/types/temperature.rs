use serde::{Deserialize, Serialize};

use crate::Error;

/// A sampling temperature, guaranteed to lie in `[0.0, 1.0]`.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Temperature(f32);

impl Temperature {
    /// Lowest accepted temperature.
    pub const MIN: f32 = 0.0;

    /// Highest accepted temperature.
    pub const MAX: f32 = 1.0;

    /// Temperature used when none is configured.
    pub const DEFAULT: Temperature = Temperature(0.7);

    /// Validates `value` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for NaN, infinities, and anything outside
    /// `[MIN, MAX]`.
    pub fn new(value: f32) -> Result<Self, Error> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Self::out_of_range())
        }
    }

    fn out_of_range() -> Error {
        Error::validation(
            format!(
                "temperature must be between {:.1} and {:.1}",
                Self::MIN,
                Self::MAX
            ),
            Some("temperature".to_string()),
        )
    }

    /// The raw value.
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Temperature {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f32 {
    fn from(temperature: Temperature) -> Self {
        temperature.0
    }
}

impl std::str::FromStr for Temperature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| {
            Error::validation(
                format!("invalid temperature value: {s:?}"),
                Some("temperature".to_string()),
            )
        })?;
        // Range-check before narrowing; f32 rounds 1.00000001 down to 1.0.
        if !(f64::from(Self::MIN)..=f64::from(Self::MAX)).contains(&value) {
            return Err(Self::out_of_range());
        }
        Self::new(value as f32)
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Temperature::new(0.0).unwrap().value(), 0.0);
        assert_eq!(Temperature::new(1.0).unwrap().value(), 1.0);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Temperature::new(1.5).unwrap_err().is_validation());
        assert!(Temperature::new(-0.1).is_err());
        assert!(Temperature::new(f32::NAN).is_err());
        assert!(Temperature::new(f32::INFINITY).is_err());
    }

    #[test]
    fn parse() {
        assert_eq!("0.3".parse::<Temperature>().unwrap().value(), 0.3);
        assert_eq!(" 1 ".parse::<Temperature>().unwrap().value(), 1.0);
        assert!("warm".parse::<Temperature>().unwrap_err().is_validation());
        assert!("1.5".parse::<Temperature>().is_err());
    }

    #[test]
    fn parse_rejects_values_that_round_into_range() {
        for text in ["1.00000001", "-0.00000001", "NaN", "inf"] {
            let err = text.parse::<Temperature>().unwrap_err();
            assert!(err.is_validation(), "{text}: {err}");
        }
        assert_eq!("1.0".parse::<Temperature>().unwrap().value(), 1.0);
        assert_eq!("0".parse::<Temperature>().unwrap().value(), 0.0);
    }

    #[test]
    fn default_is_point_seven() {
        assert_eq!(Temperature::default().value(), 0.7);
        assert_eq!(Temperature::default().to_string(), "0.7");
    }

    #[test]
    fn serde_round_trip_validates() {
        let json = serde_json::to_value(Temperature::new(0.5).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!(0.5));
        assert!(serde_json::from_value::<Temperature>(serde_json::json!(2.0)).is_err());
    }
}
