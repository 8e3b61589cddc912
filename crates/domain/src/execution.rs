use std::collections::BTreeMap;

use chrono::{SubsecRound, Utc};

use crate::{
    Exercise, ExerciseID, ExerciseKind, ExerciseResult, RecordedSet, SetInput, Target, Weight,
    Workout, WorkoutSession, WorkoutSessionID, last_performance,
};

/// State machine that walks through a workout set by set.
///
/// ```text
/// Idle --start--> InProgress --record last set--> Complete
///  ^                  |                              |
///  +------reset-------+-------------reset------------+
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Execution {
    workout: Option<Workout>,
    exercise_idx: usize,
    set_idx: usize,
    recorded: BTreeMap<ExerciseID, Vec<RecordedSet>>,
    completed: Option<WorkoutSession>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Advanced,
    Completed(WorkoutSession),
}

impl Execution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, workout: Workout) {
        *self = Self {
            workout: Some(workout),
            ..Self::default()
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (&self.workout, &self.completed) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::InProgress,
            (Some(_), Some(_)) => Phase::Complete,
        }
    }

    #[must_use]
    pub fn workout(&self) -> Option<&Workout> {
        self.workout.as_ref()
    }

    #[must_use]
    pub fn exercise_idx(&self) -> usize {
        self.exercise_idx
    }

    #[must_use]
    pub fn set_idx(&self) -> usize {
        self.set_idx
    }

    #[must_use]
    pub fn completed_session(&self) -> Option<&WorkoutSession> {
        self.completed.as_ref()
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<&Exercise> {
        if self.phase() != Phase::InProgress {
            return None;
        }
        self.workout
            .as_ref()
            .and_then(|w| w.exercises.get(self.exercise_idx))
    }

    #[must_use]
    pub fn current_target(&self) -> Option<Target> {
        self.current_exercise().map(|e| Target::from(&e.kind))
    }

    /// One-based number of the current set.
    #[must_use]
    pub fn set_number(&self) -> usize {
        self.set_idx + 1
    }

    /// Target number of sets of the current exercise.
    #[must_use]
    pub fn num_sets(&self) -> usize {
        self.current_exercise()
            .map_or(0, |e| e.num_sets() as usize)
    }

    #[must_use]
    pub fn recorded_sets(&self, exercise_idx: usize) -> &[RecordedSet] {
        self.workout
            .as_ref()
            .and_then(|w| w.exercises.get(exercise_idx))
            .and_then(|e| self.recorded.get(&e.id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Fraction of all target sets of the workout that have been recorded.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        let Some(workout) = &self.workout else {
            return 0.0;
        };
        if self.completed.is_some() {
            return 1.0;
        }
        let total = workout.num_sets();
        if total == 0 {
            return 0.0;
        }
        let done = workout
            .exercises
            .iter()
            .map(|e| {
                let recorded = self.recorded.get(&e.id).map_or(0, Vec::len);
                recorded.min(e.num_sets() as usize)
            })
            .sum::<usize>();
        done as f32 / total as f32
    }

    pub fn record_set(&mut self, input: SetInput) -> Result<Progress, ExecutionError> {
        let Some(exercise) = self.current_exercise() else {
            return Err(ExecutionError::NotInProgress);
        };
        let set = validate(&exercise.kind, input)?;
        let id = exercise.id.clone();
        let num_sets = exercise.num_sets() as usize;

        self.recorded.entry(id).or_default().push(set);

        let num_exercises = self.workout.as_ref().map_or(0, |w| w.exercises.len());
        if self.set_idx + 1 < num_sets {
            self.set_idx += 1;
        } else if self.exercise_idx + 1 < num_exercises {
            self.exercise_idx += 1;
            self.set_idx = 0;
        } else {
            let session = self.finish();
            self.completed = Some(session.clone());
            return Ok(Progress::Completed(session));
        }

        Ok(Progress::Advanced)
    }

    /// Step back one set and discard the set recorded there.
    ///
    /// Returns `false` if there is no previous set.
    pub fn go_to_previous_set(&mut self) -> bool {
        if self.phase() != Phase::InProgress {
            return false;
        }
        let Some(workout) = &self.workout else {
            return false;
        };

        if self.set_idx > 0 {
            self.set_idx -= 1;
        } else if self.exercise_idx > 0 {
            self.exercise_idx -= 1;
            self.set_idx = workout.exercises[self.exercise_idx]
                .num_sets()
                .saturating_sub(1) as usize;
        } else {
            return false;
        }

        let id = &workout.exercises[self.exercise_idx].id;
        if let Some(sets) = self.recorded.get_mut(id) {
            sets.pop();
            if sets.is_empty() {
                self.recorded.remove(id);
            }
        }

        true
    }

    /// Exercises may be reached directly if they are adjacent to the current
    /// exercise or already have recorded sets.
    #[must_use]
    pub fn can_jump_to_exercise(&self, index: usize) -> bool {
        if self.phase() != Phase::InProgress {
            return false;
        }
        let Some(workout) = &self.workout else {
            return false;
        };
        let Some(target) = workout.exercises.get(index) else {
            return false;
        };
        index.abs_diff(self.exercise_idx) <= 1
            || self.recorded.get(&target.id).is_some_and(|s| !s.is_empty())
    }

    pub fn jump_to_exercise(&mut self, index: usize) -> Result<(), ExecutionError> {
        if self.phase() != Phase::InProgress {
            return Err(ExecutionError::NotInProgress);
        }
        if !self.can_jump_to_exercise(index) {
            return Err(ExecutionError::NavigationRefused);
        }
        self.exercise_idx = index;
        self.set_idx = 0;
        Ok(())
    }

    /// Most recent earlier result of an exercise with the same name as the
    /// current exercise.
    #[must_use]
    pub fn last_performance<'a>(
        &self,
        history: &'a [WorkoutSession],
    ) -> Option<(&'a WorkoutSession, &'a ExerciseResult)> {
        self.current_exercise()
            .and_then(|e| last_performance(history, &e.name.key()))
    }

    /// Weight to prefill for the current set.
    ///
    /// The weight of the previous set of the current exercise is carried
    /// over. Before the first set, the weight of the first set of the last
    /// performance is used.
    #[must_use]
    pub fn suggested_weight(&self, history: &[WorkoutSession]) -> Option<Weight> {
        let exercise = self.current_exercise()?;
        if !exercise.is_strength() {
            return None;
        }
        if let Some(weight) = self
            .recorded
            .get(&exercise.id)
            .and_then(|sets| sets.last())
            .and_then(RecordedSet::weight)
        {
            return Some(weight);
        }
        self.last_performance(history)
            .and_then(|(_, result)| result.sets.first())
            .and_then(RecordedSet::weight)
    }

    fn finish(&self) -> WorkoutSession {
        let (workout_id, workout_name, exercises) = match &self.workout {
            Some(workout) => (
                workout.id.clone(),
                workout.name.to_string(),
                workout
                    .exercises
                    .iter()
                    .map(|e| ExerciseResult {
                        exercise_id: e.id.clone(),
                        exercise_name: e.name.to_string(),
                        sets: self.recorded.get(&e.id).cloned().unwrap_or_default(),
                    })
                    .collect(),
            ),
            None => (Default::default(), String::new(), vec![]),
        };
        WorkoutSession {
            id: WorkoutSessionID::new(),
            workout_id,
            workout_name,
            date: Utc::now().trunc_subsecs(3),
            exercises,
        }
    }
}

fn validate(kind: &ExerciseKind, input: SetInput) -> Result<RecordedSet, SetError> {
    match (kind, input) {
        (ExerciseKind::Strength { .. }, SetInput::Strength { weight, reps }) => {
            if !weight.is_positive() {
                return Err(SetError::NonPositiveWeight);
            }
            if !reps.is_positive() {
                return Err(SetError::NonPositiveReps);
            }
            Ok(RecordedSet::Strength { weight, reps })
        }
        (
            ExerciseKind::Cardio { .. },
            SetInput::Cardio {
                duration,
                distance,
                resistance,
            },
        ) => {
            if !duration.is_positive() {
                return Err(SetError::NonPositiveDuration);
            }
            Ok(RecordedSet::Cardio {
                duration,
                distance,
                resistance,
            })
        }
        _ => Err(SetError::WrongKind),
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExecutionError {
    #[error("No workout in progress")]
    NotInProgress,
    #[error(transparent)]
    InvalidSet(#[from] SetError),
    #[error("Exercise cannot be reached from the current exercise")]
    NavigationRefused,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetError {
    #[error("Weight must be greater than 0")]
    NonPositiveWeight,
    #[error("Reps must be greater than 0")]
    NonPositiveReps,
    #[error("Duration must be greater than 0")]
    NonPositiveDuration,
    #[error("Values do not match the type of the exercise")]
    WrongKind,
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Distance, Minutes, Name, RepRange, Reps, Resistance, WorkoutID};

    use super::*;

    fn strength_exercise(id: &str, name: &str, sets: u32) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            kind: ExerciseKind::strength(sets, RepRange::FIVE_TO_EIGHT).unwrap(),
            notes: None,
        }
    }

    fn cardio_exercise(id: &str, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            kind: ExerciseKind::default_cardio(),
            notes: None,
        }
    }

    fn workout() -> Workout {
        Workout::new(
            "w".into(),
            Name::new("Full Body").unwrap(),
            vec![
                strength_exercise("1", "Squat", 2),
                strength_exercise("2", "Bench Press", 3),
                cardio_exercise("3", "Bike"),
                strength_exercise("4", "Row", 1),
            ],
        )
        .unwrap()
    }

    fn lift(weight: f32, reps: u32) -> SetInput {
        SetInput::Strength {
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps),
        }
    }

    fn ride(duration: f32) -> SetInput {
        SetInput::Cardio {
            duration: Minutes::new(duration).unwrap(),
            distance: Some(Distance::new(8.0).unwrap()),
            resistance: None,
        }
    }

    fn input_for(execution: &Execution) -> SetInput {
        if execution.current_exercise().unwrap().is_strength() {
            lift(50.0, 5)
        } else {
            ride(20.0)
        }
    }

    fn started() -> Execution {
        let mut execution = Execution::new();
        execution.start(workout());
        execution
    }

    fn session(day: u32, name: &str, sets: Vec<RecordedSet>) -> WorkoutSession {
        WorkoutSession {
            id: format!("s{day}").into(),
            workout_id: "w".into(),
            workout_name: String::from("Full Body"),
            date: Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).unwrap(),
            exercises: vec![ExerciseResult {
                exercise_id: "x".into(),
                exercise_name: name.to_string(),
                sets,
            }],
        }
    }

    fn strength_set(weight: f32, reps: u32) -> RecordedSet {
        RecordedSet::Strength {
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps),
        }
    }

    #[test]
    fn test_start() {
        let mut execution = Execution::new();
        assert_eq!(execution.phase(), Phase::Idle);
        assert_eq!(execution.current_exercise(), None);

        execution.start(workout());

        assert_eq!(execution.phase(), Phase::InProgress);
        assert_eq!(execution.current_exercise().unwrap().id, ExerciseID::from("1"));
        assert_eq!(execution.set_number(), 1);
        assert_eq!(execution.num_sets(), 2);
        assert_eq!(
            execution.current_target(),
            Some(Target::Reps(RepRange::FIVE_TO_EIGHT))
        );
    }

    #[test]
    fn test_start_discards_previous_run() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.start(workout());
        assert_eq!(execution, started());
    }

    #[test]
    fn test_record_set_advances_lexicographically() {
        let mut execution = started();
        let mut position = (execution.exercise_idx(), execution.set_idx());
        let mut calls = 0;

        loop {
            let input = input_for(&execution);
            calls += 1;
            match execution.record_set(input).unwrap() {
                Progress::Advanced => {
                    let next = (execution.exercise_idx(), execution.set_idx());
                    assert!(next > position);
                    position = next;
                }
                Progress::Completed(_) => break,
            }
        }

        assert_eq!(calls, workout().num_sets());
        assert_eq!(execution.phase(), Phase::Complete);
        assert!((execution.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_record_set_completes_session() {
        let mut execution = started();
        let mut result = Progress::Advanced;
        while result == Progress::Advanced {
            let input = input_for(&execution);
            result = execution.record_set(input).unwrap();
        }

        let Progress::Completed(session) = result else {
            panic!("workout not completed");
        };
        assert_eq!(session.workout_id, WorkoutID::from("w"));
        assert_eq!(session.workout_name, "Full Body");
        assert_eq!(
            session
                .exercises
                .iter()
                .map(|e| (e.exercise_name.as_str(), e.sets.len()))
                .collect::<Vec<_>>(),
            vec![("Squat", 2), ("Bench Press", 3), ("Bike", 1), ("Row", 1)]
        );
        assert_eq!(execution.completed_session(), Some(&session));
    }

    #[test]
    fn test_record_set_keeps_exercises_without_sets() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        execution.jump_to_exercise(3).unwrap();

        let Ok(Progress::Completed(session)) = execution.record_set(lift(40.0, 8)) else {
            panic!("workout not completed");
        };
        assert_eq!(
            session
                .exercises
                .iter()
                .map(|e| e.sets.len())
                .collect::<Vec<_>>(),
            vec![1, 0, 0, 1]
        );
    }

    #[rstest]
    #[case(lift(0.0, 5), SetError::NonPositiveWeight)]
    #[case(lift(50.0, 0), SetError::NonPositiveReps)]
    #[case(ride(20.0), SetError::WrongKind)]
    fn test_record_set_invalid_strength(#[case] input: SetInput, #[case] error: SetError) {
        let mut execution = started();
        let before = execution.clone();
        assert_eq!(
            execution.record_set(input),
            Err(ExecutionError::InvalidSet(error))
        );
        assert_eq!(execution, before);
    }

    #[rstest]
    #[case(ride(0.0), SetError::NonPositiveDuration)]
    #[case(lift(50.0, 5), SetError::WrongKind)]
    fn test_record_set_invalid_cardio(#[case] input: SetInput, #[case] error: SetError) {
        let mut execution = started();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        let before = execution.clone();
        assert_eq!(
            execution.record_set(input),
            Err(ExecutionError::InvalidSet(error))
        );
        assert_eq!(execution, before);
    }

    #[test]
    fn test_record_set_cardio_without_optional_values() {
        let mut execution = started();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        execution
            .record_set(SetInput::Cardio {
                duration: Minutes::new(15.0).unwrap(),
                distance: None,
                resistance: Some(Resistance::new(3.0).unwrap()),
            })
            .unwrap();
        assert_eq!(
            execution.recorded_sets(2),
            &[RecordedSet::Cardio {
                duration: Minutes::new(15.0).unwrap(),
                distance: None,
                resistance: Some(Resistance::new(3.0).unwrap()),
            }]
        );
        assert_eq!(execution.exercise_idx(), 3);
    }

    #[test]
    fn test_record_set_not_in_progress() {
        let mut execution = Execution::new();
        assert_eq!(
            execution.record_set(lift(50.0, 5)),
            Err(ExecutionError::NotInProgress)
        );

        let mut execution = started();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        execution.jump_to_exercise(3).unwrap();
        execution.record_set(lift(50.0, 5)).unwrap();
        assert_eq!(execution.phase(), Phase::Complete);
        assert_eq!(
            execution.record_set(lift(50.0, 5)),
            Err(ExecutionError::NotInProgress)
        );
    }

    #[test]
    fn test_go_to_previous_set_round_trip() {
        let mut execution = started();
        let mut states = vec![execution.clone()];
        for _ in 0..5 {
            let input = input_for(&execution);
            execution.record_set(input).unwrap();
            states.push(execution.clone());
        }

        for i in (1..states.len()).rev() {
            assert!(execution.go_to_previous_set());
            assert_eq!(execution, states[i - 1]);

            let input = input_for(&execution);
            execution.record_set(input).unwrap();
            assert_eq!(execution, states[i]);

            assert!(execution.go_to_previous_set());
        }

        assert!(!execution.go_to_previous_set());
        assert_eq!(execution, states[0]);
    }

    #[test]
    fn test_go_to_previous_set_crosses_exercise_boundary() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.record_set(lift(55.0, 5)).unwrap();
        assert_eq!((execution.exercise_idx(), execution.set_idx()), (1, 0));

        assert!(execution.go_to_previous_set());

        assert_eq!((execution.exercise_idx(), execution.set_idx()), (0, 1));
        assert_eq!(execution.recorded_sets(0), &[strength_set(50.0, 5)]);
    }

    #[test]
    fn test_go_to_previous_set_idle() {
        assert!(!Execution::new().go_to_previous_set());
    }

    #[rstest]
    #[case(0, true)]
    #[case(1, true)]
    #[case(2, false)]
    #[case(3, false)]
    #[case(4, false)]
    fn test_can_jump_to_exercise_from_first(#[case] index: usize, #[case] expected: bool) {
        assert_eq!(started().can_jump_to_exercise(index), expected);
    }

    #[test]
    fn test_jump_to_exercise_refused() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        let before = execution.clone();

        assert_eq!(
            execution.jump_to_exercise(2),
            Err(ExecutionError::NavigationRefused)
        );
        assert_eq!(execution, before);
        assert_eq!(
            Execution::new().jump_to_exercise(0),
            Err(ExecutionError::NotInProgress)
        );
    }

    #[test]
    fn test_jump_to_exercise_with_recorded_sets() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        assert!(execution.can_jump_to_exercise(0));

        execution.jump_to_exercise(0).unwrap();

        assert_eq!((execution.exercise_idx(), execution.set_idx()), (0, 0));
        assert_eq!(execution.recorded_sets(0), &[strength_set(50.0, 5)]);
    }

    #[test]
    fn test_progress() {
        let mut execution = Execution::new();
        assert!(execution.progress().abs() < f32::EPSILON);
        execution.start(workout());
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.record_set(lift(50.0, 5)).unwrap();
        assert!((execution.progress() - 2.0 / 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut execution = started();
        execution.record_set(lift(50.0, 5)).unwrap();
        execution.reset();
        assert_eq!(execution, Execution::new());
        assert_eq!(execution.phase(), Phase::Idle);
    }

    #[test]
    fn test_last_performance() {
        let history = vec![
            session(1, "squat", vec![strength_set(80.0, 5)]),
            session(5, "SQUAT ", vec![strength_set(90.0, 5)]),
            session(7, "Squat", vec![]),
            session(6, "Deadlift", vec![strength_set(120.0, 5)]),
        ];
        let execution = started();

        let (session, result) = execution.last_performance(&history).unwrap();

        assert_eq!(session.id, WorkoutSessionID::from("s5"));
        assert_eq!(result.sets, vec![strength_set(90.0, 5)]);
        assert_eq!(Execution::new().last_performance(&history), None);
    }

    #[test]
    fn test_suggested_weight() {
        let history = vec![session(
            3,
            "Squat",
            vec![strength_set(70.0, 5), strength_set(75.0, 5)],
        )];
        let mut execution = started();
        assert_eq!(execution.suggested_weight(&[]), None);
        assert_eq!(execution.suggested_weight(&history), Weight::new(70.0).ok());

        execution.record_set(lift(72.5, 5)).unwrap();

        assert_eq!(execution.suggested_weight(&history), Weight::new(72.5).ok());
    }

    #[test]
    fn test_suggested_weight_cardio() {
        let mut execution = started();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        assert_eq!(execution.suggested_weight(&[]), None);
    }

    #[test]
    fn test_completed_session_date() {
        let before: DateTime<Utc> = Utc::now().trunc_subsecs(3);
        let mut execution = started();
        execution.jump_to_exercise(1).unwrap();
        execution.jump_to_exercise(2).unwrap();
        execution.jump_to_exercise(3).unwrap();
        execution.record_set(lift(50.0, 5)).unwrap();
        let date = execution.completed_session().unwrap().date;
        assert!(date >= before);
        assert_eq!(date.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
