use chrono::{DateTime, Local};
use log::warn;
use minigym_domain::{
    Dashboard, Execution, ExecutionError, ExerciseResult, Progress, ReadError, SetInput, Store,
    Weight, WorkoutError, WorkoutID, WorkoutRepository, WorkoutSession, WorkoutSessionRepository,
};

use crate::Settings;

/// Top-level state of the application.
pub struct App<R> {
    store: Store<R>,
    execution: Execution,
    settings: Settings,
}

impl<R> App<R>
where
    R: WorkoutRepository + WorkoutSessionRepository,
{
    pub fn new(repository: R, settings: Settings) -> Self {
        Self {
            store: Store::new(repository),
            execution: Execution::new(),
            settings,
        }
    }

    pub async fn load(&mut self) -> Result<(), ReadError> {
        self.store.load().await
    }

    pub fn store(&self) -> &Store<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<R> {
        &mut self.store
    }

    pub fn execution(&self) -> &Execution {
        &self.execution
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub fn start_workout(&mut self, id: &WorkoutID) -> Result<(), WorkoutError> {
        let Some(workout) = self.store.workout(id) else {
            return Err(WorkoutError::NotFound);
        };
        self.execution.start(workout.clone());
        Ok(())
    }

    /// Record the current set. A completed session is added to the store.
    ///
    /// Failing to persist the session does not fail the operation, as the
    /// session is kept in memory.
    pub async fn record_set(&mut self, input: SetInput) -> Result<Progress, ExecutionError> {
        let progress = self.execution.record_set(input)?;
        if let Progress::Completed(session) = &progress {
            if let Err(err) = self.store.add_session(session.clone()).await {
                warn!("workout session kept in memory only: {err}");
            }
        }
        Ok(progress)
    }

    pub fn go_to_previous_set(&mut self) -> bool {
        self.execution.go_to_previous_set()
    }

    pub fn jump_to_exercise(&mut self, index: usize) -> Result<(), ExecutionError> {
        self.execution.jump_to_exercise(index)
    }

    pub fn reset_workout(&mut self) {
        self.execution.reset();
    }

    pub fn last_performance(&self) -> Option<(&WorkoutSession, &ExerciseResult)> {
        self.execution.last_performance(self.store.sessions())
    }

    pub fn suggested_weight(&self) -> Option<Weight> {
        self.execution.suggested_weight(self.store.sessions())
    }

    pub fn dashboard(&self, now: DateTime<Local>) -> Dashboard {
        self.store.dashboard(now, self.settings.week_start)
    }
}
