use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{Distance, Minutes, Name, NameError, RepRange, RepRangeError, Reps, Resistance, Weight};

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub kind: ExerciseKind,
    pub notes: Option<String>,
}

impl Exercise {
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.kind.num_sets()
    }

    #[must_use]
    pub fn is_strength(&self) -> bool {
        matches!(self.kind, ExerciseKind::Strength { .. })
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl ExerciseID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseKind {
    Strength {
        sets: u32,
        reps: RepRange,
    },
    Cardio {
        duration: Minutes,
        distance: Option<Distance>,
        resistance: Option<Resistance>,
    },
}

impl ExerciseKind {
    pub fn strength(sets: u32, reps: RepRange) -> Result<Self, ExerciseError> {
        if sets == 0 {
            return Err(ExerciseError::NoSets);
        }
        Ok(ExerciseKind::Strength { sets, reps })
    }

    /// Two sets of five to eight reps.
    #[must_use]
    pub fn default_strength() -> Self {
        ExerciseKind::Strength {
            sets: 2,
            reps: RepRange::FIVE_TO_EIGHT,
        }
    }

    /// Thirty minutes at resistance level five.
    #[must_use]
    pub fn default_cardio() -> Self {
        ExerciseKind::Cardio {
            duration: Minutes::HALF_HOUR,
            distance: None,
            resistance: Some(Resistance::FIVE),
        }
    }

    #[must_use]
    pub fn num_sets(&self) -> u32 {
        match self {
            ExerciseKind::Strength { sets, .. } => *sets,
            ExerciseKind::Cardio { .. } => 1,
        }
    }
}

/// Target of the set currently being executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Reps(RepRange),
    Cardio {
        duration: Minutes,
        distance: Option<Distance>,
        resistance: Option<Resistance>,
    },
}

impl From<&ExerciseKind> for Target {
    fn from(value: &ExerciseKind) -> Self {
        match value {
            ExerciseKind::Strength { reps, .. } => Target::Reps(*reps),
            ExerciseKind::Cardio {
                duration,
                distance,
                resistance,
            } => Target::Cardio {
                duration: *duration,
                distance: *distance,
                resistance: *resistance,
            },
        }
    }
}

/// Values entered for a single set before they are validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetInput {
    Strength {
        weight: Weight,
        reps: Reps,
    },
    Cardio {
        duration: Minutes,
        distance: Option<Distance>,
        resistance: Option<Resistance>,
    },
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error(transparent)]
    InvalidReps(#[from] RepRangeError),
    #[error("Exercise must have at least one set")]
    NoSets,
}
