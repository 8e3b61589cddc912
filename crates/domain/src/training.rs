use std::ops::Mul;

use derive_more::{Display, Into};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

impl Mul<Reps> for Weight {
    type Output = f32;

    #[allow(clippy::cast_precision_loss)]
    fn mul(self, rhs: Reps) -> Self::Output {
        self.0 * rhs.0 as f32
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must not be negative")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Ok(Reps::new(parsed_value)),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be an integer")]
    ParseError,
}

/// Inclusive target range of repetitions for a strength exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepRange {
    min: Reps,
    max: Reps,
}

impl RepRange {
    pub const FIVE_TO_EIGHT: RepRange = RepRange {
        min: Reps(5),
        max: Reps(8),
    };

    pub fn new(min: Reps, max: Reps) -> Result<Self, RepRangeError> {
        if min > max {
            return Err(RepRangeError::Inverted(min, max));
        }

        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> Reps {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Reps {
        self.max
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepRangeError {
    #[error("Minimum reps must not exceed maximum reps ({0} > {1})")]
    Inverted(Reps, Reps),
}

/// Duration in minutes.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Minutes(f32);

impl Minutes {
    pub const HALF_HOUR: Minutes = Minutes(30.0);

    pub fn new(value: f32) -> Result<Self, MinutesError> {
        if !value.is_finite() || value < 0.0 {
            return Err(MinutesError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<&str> for Minutes {
    type Error = MinutesError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Minutes::new(parsed_value),
            Err(_) => Err(MinutesError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MinutesError {
    #[error("Duration must not be negative")]
    OutOfRange,
    #[error("Duration must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Distance(f32);

impl Distance {
    pub fn new(value: f32) -> Result<Self, DistanceError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DistanceError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Distance {
    type Error = DistanceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Distance::new(parsed_value),
            Err(_) => Err(DistanceError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DistanceError {
    #[error("Distance must not be negative")]
    OutOfRange,
    #[error("Distance must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Resistance(f32);

impl Resistance {
    pub const FIVE: Resistance = Resistance(5.0);

    pub fn new(value: f32) -> Result<Self, ResistanceError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ResistanceError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Resistance {
    type Error = ResistanceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Resistance::new(parsed_value),
            Err(_) => Err(ResistanceError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResistanceError {
    #[error("Resistance must not be negative")]
    OutOfRange,
    #[error("Resistance must be a decimal")]
    ParseError,
}
