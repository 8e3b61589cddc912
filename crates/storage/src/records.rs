//! Persisted record format
//!
//! The JSON shape of workouts and sessions is shared with data written by
//! earlier versions of the application. Fields that do not apply to the kind
//! of an exercise or set are omitted.

use chrono::{DateTime, SecondsFormat, Utc};
use minigym_domain as domain;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl From<&domain::Workout> for Workout {
    fn from(value: &domain::Workout) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            exercises: value.exercises.iter().map(Exercise::from).collect(),
        }
    }
}

impl TryFrom<Workout> for domain::Workout {
    type Error = RecordError;

    fn try_from(value: Workout) -> Result<Self, Self::Error> {
        let exercises = value
            .exercises
            .into_iter()
            .map(domain::Exercise::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(domain::Workout::new(
            value.id.into(),
            domain::Name::new(&value.name)?,
            exercises,
        )?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Cardio,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        let mut exercise = Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            exercise_type: ExerciseType::Strength,
            sets: None,
            reps_min: None,
            reps_max: None,
            duration: None,
            distance: None,
            resistance: None,
            notes: value.notes.clone(),
        };
        match &value.kind {
            domain::ExerciseKind::Strength { sets, reps } => {
                exercise.sets = Some(*sets);
                exercise.reps_min = Some(reps.min().into());
                exercise.reps_max = Some(reps.max().into());
            }
            domain::ExerciseKind::Cardio {
                duration,
                distance,
                resistance,
            } => {
                exercise.exercise_type = ExerciseType::Cardio;
                exercise.duration = Some((*duration).into());
                exercise.distance = distance.map(f32::from);
                exercise.resistance = resistance.map(f32::from);
            }
        }
        exercise
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = RecordError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        let kind = match value.exercise_type {
            ExerciseType::Strength => {
                let reps_min = reps(value.reps_min, "repsMin")?;
                let reps_max = reps(value.reps_max, "repsMax")?;
                domain::ExerciseKind::strength(
                    value.sets.ok_or(RecordError::MissingField("sets"))?,
                    domain::RepRange::new(reps_min, reps_max)
                        .map_err(domain::ExerciseError::from)?,
                )?
            }
            ExerciseType::Cardio => domain::ExerciseKind::Cardio {
                duration: minutes(value.duration)?,
                distance: value.distance.map(distance).transpose()?,
                resistance: value.resistance.map(resistance).transpose()?,
            },
        };
        Ok(Self {
            id: value.id.into(),
            name: domain::Name::new(&value.name)?,
            kind,
            notes: value.notes,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub workout_id: String,
    pub workout_name: String,
    pub date: String,
    pub exercises: Vec<ExerciseResult>,
}

impl From<&domain::WorkoutSession> for WorkoutSession {
    fn from(value: &domain::WorkoutSession) -> Self {
        Self {
            id: value.id.to_string(),
            workout_id: value.workout_id.to_string(),
            workout_name: value.workout_name.clone(),
            date: format_timestamp(value.date),
            exercises: value.exercises.iter().map(ExerciseResult::from).collect(),
        }
    }
}

impl TryFrom<WorkoutSession> for domain::WorkoutSession {
    type Error = RecordError;

    fn try_from(value: WorkoutSession) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            workout_id: value.workout_id.into(),
            workout_name: value.workout_name,
            date: parse_timestamp(&value.date)?,
            exercises: value
                .exercises
                .into_iter()
                .map(domain::ExerciseResult::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResult {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<Set>,
}

impl From<&domain::ExerciseResult> for ExerciseResult {
    fn from(value: &domain::ExerciseResult) -> Self {
        Self {
            exercise_id: value.exercise_id.to_string(),
            exercise_name: value.exercise_name.clone(),
            sets: value.sets.iter().map(Set::from).collect(),
        }
    }
}

impl TryFrom<ExerciseResult> for domain::ExerciseResult {
    type Error = RecordError;

    fn try_from(value: ExerciseResult) -> Result<Self, Self::Error> {
        Ok(Self {
            exercise_id: value.exercise_id.into(),
            exercise_name: value.exercise_name,
            sets: value
                .sets
                .into_iter()
                .map(domain::RecordedSet::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// A set is a cardio set if it has a duration. Cardio sets carry zero weight
/// and reps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub weight: f32,
    pub reps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f32>,
}

impl From<&domain::RecordedSet> for Set {
    fn from(value: &domain::RecordedSet) -> Self {
        match value {
            domain::RecordedSet::Strength { weight, reps } => Self {
                weight: (*weight).into(),
                reps: (*reps).into(),
                duration: None,
                distance: None,
                resistance: None,
            },
            domain::RecordedSet::Cardio {
                duration,
                distance,
                resistance,
            } => Self {
                weight: 0.0,
                reps: 0,
                duration: Some((*duration).into()),
                distance: distance.map(f32::from),
                resistance: resistance.map(f32::from),
            },
        }
    }
}

impl TryFrom<Set> for domain::RecordedSet {
    type Error = RecordError;

    fn try_from(value: Set) -> Result<Self, Self::Error> {
        if value.duration.is_some() {
            return Ok(Self::Cardio {
                duration: minutes(value.duration)?,
                distance: value.distance.map(distance).transpose()?,
                resistance: value.resistance.map(resistance).transpose()?,
            });
        }
        Ok(Self::Strength {
            weight: domain::Weight::new(value.weight)
                .map_err(|_| RecordError::InvalidValue("weight"))?,
            reps: domain::Reps::new(value.reps),
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid value of field {0}")]
    InvalidValue(&'static str),
    #[error("invalid date {0}")]
    InvalidDate(String),
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    InvalidExercise(#[from] domain::ExerciseError),
    #[error(transparent)]
    InvalidWorkout(#[from] domain::WorkoutError),
}

/// Format a timestamp as ISO 8601 with milliseconds in UTC, e.g.
/// `2024-03-01T18:00:00.000Z`.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| RecordError::InvalidDate(value.to_string()))
}

fn reps(value: Option<u32>, field: &'static str) -> Result<domain::Reps, RecordError> {
    value
        .map(domain::Reps::new)
        .ok_or(RecordError::MissingField(field))
}

fn minutes(value: Option<f32>) -> Result<domain::Minutes, RecordError> {
    domain::Minutes::new(value.ok_or(RecordError::MissingField("duration"))?)
        .map_err(|_| RecordError::InvalidValue("duration"))
}

fn distance(value: f32) -> Result<domain::Distance, RecordError> {
    domain::Distance::new(value).map_err(|_| RecordError::InvalidValue("distance"))
}

fn resistance(value: f32) -> Result<domain::Resistance, RecordError> {
    domain::Resistance::new(value).map_err(|_| RecordError::InvalidValue("resistance"))
}
