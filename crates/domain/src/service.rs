use log::{debug, error};

use crate::{
    ReadError, Subscription, Workout, WorkoutRepository, WorkoutService, WorkoutSession,
    WorkoutSessionRepository, WorkoutSessionService, WriteError,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workouts(&self) -> Result<Vec<Workout>, ReadError> {
        log_on_error!(self.repository.read_workouts(), ReadError, "get", "workouts")
    }

    async fn set_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError> {
        log_on_error!(
            self.repository.write_workouts(workouts),
            WriteError,
            "set",
            "workouts"
        )
    }

    fn watch_workouts(&self) -> Subscription<Vec<Workout>> {
        self.repository.subscribe_workouts()
    }
}

impl<R: WorkoutSessionRepository> WorkoutSessionService for Service<R> {
    async fn get_workout_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError> {
        log_on_error!(
            self.repository.read_workout_sessions(),
            ReadError,
            "get",
            "workout sessions"
        )
    }

    async fn set_workout_sessions(&self, sessions: &[WorkoutSession]) -> Result<(), WriteError> {
        log_on_error!(
            self.repository.write_workout_sessions(sessions),
            WriteError,
            "set",
            "workout sessions"
        )
    }

    fn watch_workout_sessions(&self) -> Subscription<Vec<WorkoutSession>> {
        self.repository.subscribe_workout_sessions()
    }
}
