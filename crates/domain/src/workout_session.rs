use chrono::{DateTime, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    Distance, ExerciseID, Minutes, NameKey, ReadError, Reps, Resistance, Subscription, Weight,
    WorkoutID, WriteError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutSessionService {
    async fn get_workout_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn set_workout_sessions(&self, sessions: &[WorkoutSession]) -> Result<(), WriteError>;
    fn watch_workout_sessions(&self) -> Subscription<Vec<WorkoutSession>>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutSessionRepository {
    async fn read_workout_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError>;
    async fn write_workout_sessions(&self, sessions: &[WorkoutSession])
    -> Result<(), WriteError>;
    fn subscribe_workout_sessions(&self) -> Subscription<Vec<WorkoutSession>>;
}

/// Log entry of one executed workout.
///
/// Names of the workout and its exercises are copied at the time of
/// execution, so the history stays readable after templates are renamed or
/// deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub id: WorkoutSessionID,
    pub workout_id: WorkoutID,
    pub workout_name: String,
    pub date: DateTime<Utc>,
    pub exercises: Vec<ExerciseResult>,
}

impl WorkoutSession {
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.exercises.iter().map(ExerciseResult::volume).sum()
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.exercises.iter().map(ExerciseResult::distance).sum()
    }

    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Result of the first exercise whose name matches the given key.
    #[must_use]
    pub fn exercise(&self, key: &NameKey) -> Option<&ExerciseResult> {
        self.exercises.iter().find(|e| e.key() == *key)
    }
}

/// Most recent session by date that contains sets of an exercise with the
/// given name.
///
/// A newer session in which the exercise was skipped does not hide an older
/// performance. Such a session is passed over and the search continues with
/// the sessions before it.
///
/// Names are compared by their [`NameKey`], so `"Squat"` and `"squat "` refer
/// to the same exercise.
#[must_use]
pub fn last_performance<'a>(
    sessions: &'a [WorkoutSession],
    key: &NameKey,
) -> Option<(&'a WorkoutSession, &'a ExerciseResult)> {
    sessions
        .iter()
        .filter_map(|s| {
            s.exercises
                .iter()
                .find(|e| e.key() == *key && !e.sets.is_empty())
                .map(|e| (s, e))
        })
        .max_by_key(|(s, _)| s.date)
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutSessionID(String);

impl WorkoutSessionID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for WorkoutSessionID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutSessionID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseResult {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
    pub sets: Vec<RecordedSet>,
}

impl ExerciseResult {
    #[must_use]
    pub fn key(&self) -> NameKey {
        NameKey::from(self.exercise_name.as_str())
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.sets.iter().map(RecordedSet::volume).sum()
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        self.sets.iter().map(RecordedSet::distance).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedSet {
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

impl RecordedSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        match self {
            RecordedSet::Strength { weight, reps } => *weight * *reps,
            RecordedSet::Cardio { .. } => 0.0,
        }
    }

    #[must_use]
    pub fn distance(&self) -> f32 {
        match self {
            RecordedSet::Strength { .. } => 0.0,
            RecordedSet::Cardio { distance, .. } => distance.map(f32::from).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn weight(&self) -> Option<Weight> {
        match self {
            RecordedSet::Strength { weight, .. } => Some(*weight),
            RecordedSet::Cardio { .. } => None,
        }
    }
}
