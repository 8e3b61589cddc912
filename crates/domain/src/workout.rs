use std::collections::BTreeSet;

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    Exercise, ExerciseError, ExerciseID, ExerciseKind, Name, NameError, ReadError, Subscription,
    WriteError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    async fn set_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError>;
    fn watch_workouts(&self) -> Subscription<Vec<Workout>>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self) -> Result<Vec<Workout>, ReadError>;
    async fn write_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError>;
    fn subscribe_workouts(&self) -> Subscription<Vec<Workout>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Name,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(id: WorkoutID, name: Name, exercises: Vec<Exercise>) -> Result<Self, WorkoutError> {
        if exercises.is_empty() {
            return Err(WorkoutError::NoExercises);
        }

        Ok(Self {
            id,
            name,
            exercises,
        })
    }

    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.exercises.iter().map(Exercise::num_sets).sum()
    }
}

#[derive(Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(String);

impl WorkoutID {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<&str> for WorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("Workout must contain at least one exercise")]
    NoExercises,
    #[error("Exercise {} is invalid: {error}", .index + 1)]
    InvalidExercise { index: usize, error: ExerciseError },
    #[error("Workout not found")]
    NotFound,
}

/// Unique names of all exercises in the catalog, sorted alphabetically.
#[must_use]
pub fn exercise_names(workouts: &[Workout]) -> Vec<String> {
    workouts
        .iter()
        .flat_map(|w| w.exercises.iter().map(|e| e.name.to_string()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseType {
    Strength,
    Cardio,
}

/// Editable, not yet validated form of a workout.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub name: String,
    pub exercises: Vec<ExerciseDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub id: ExerciseID,
    pub name: String,
    pub kind: ExerciseKind,
    pub notes: Option<String>,
}

impl WorkoutDraft {
    pub fn add_exercise(&mut self) -> ExerciseID {
        let id = ExerciseID::new();
        self.exercises.push(ExerciseDraft {
            id: id.clone(),
            name: String::new(),
            kind: ExerciseKind::default_strength(),
            notes: Some(String::new()),
        });
        id
    }

    pub fn update_exercise_name(&mut self, index: usize, name: &str) {
        if let Some(exercise) = self.exercises.get_mut(index) {
            exercise.name = name.to_string();
        }
    }

    pub fn update_exercise_notes(&mut self, index: usize, notes: &str) {
        if let Some(exercise) = self.exercises.get_mut(index) {
            exercise.notes = Some(notes.to_string());
        }
    }

    /// Replace the parameters of an exercise. The kind is validated by
    /// [`WorkoutDraft::into_workout`].
    pub fn update_exercise_kind(&mut self, index: usize, kind: ExerciseKind) {
        if let Some(exercise) = self.exercises.get_mut(index) {
            exercise.kind = kind;
        }
    }

    /// Switch an exercise between strength and cardio.
    ///
    /// The parameters of the new type are reset to their defaults, the
    /// parameters of the previous type are discarded.
    pub fn set_exercise_kind(&mut self, index: usize, exercise_type: ExerciseType) {
        if let Some(exercise) = self.exercises.get_mut(index) {
            exercise.kind = match exercise_type {
                ExerciseType::Strength => ExerciseKind::default_strength(),
                ExerciseType::Cardio => ExerciseKind::default_cardio(),
            };
        }
    }

    pub fn remove_exercise(&mut self, index: usize) {
        if index < self.exercises.len() {
            self.exercises.remove(index);
        }
    }

    pub fn move_exercise_up(&mut self, index: usize) {
        if index > 0 && index < self.exercises.len() {
            self.exercises.swap(index - 1, index);
        }
    }

    pub fn move_exercise_down(&mut self, index: usize) {
        if index + 1 < self.exercises.len() {
            self.exercises.swap(index, index + 1);
        }
    }

    pub fn into_workout(self, id: WorkoutID) -> Result<Workout, WorkoutError> {
        let name = Name::new(&self.name)?;
        let exercises = self
            .exercises
            .into_iter()
            .enumerate()
            .map(|(index, e)| {
                let invalid = |error: ExerciseError| WorkoutError::InvalidExercise { index, error };
                Ok(Exercise {
                    id: e.id,
                    name: Name::new(&e.name).map_err(|err| invalid(err.into()))?,
                    kind: validate_kind(e.kind).map_err(invalid)?,
                    notes: e.notes,
                })
            })
            .collect::<Result<Vec<_>, WorkoutError>>()?;
        Workout::new(id, name, exercises)
    }
}

fn validate_kind(kind: ExerciseKind) -> Result<ExerciseKind, ExerciseError> {
    match kind {
        ExerciseKind::Strength { sets, reps } => ExerciseKind::strength(sets, reps),
        cardio @ ExerciseKind::Cardio { .. } => Ok(cardio),
    }
}

impl From<&Workout> for WorkoutDraft {
    fn from(value: &Workout) -> Self {
        Self {
            name: value.name.to_string(),
            exercises: value
                .exercises
                .iter()
                .map(|e| ExerciseDraft {
                    id: e.id.clone(),
                    name: e.name.to_string(),
                    kind: e.kind.clone(),
                    notes: e.notes.clone(),
                })
                .collect(),
        }
    }
}
