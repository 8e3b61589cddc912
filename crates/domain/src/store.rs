use chrono::{DateTime, Local, Weekday};

use crate::{
    Dashboard, ReadError, Service, Subscription, Workout, WorkoutDraft, WorkoutError, WorkoutID,
    WorkoutRepository, WorkoutService, WorkoutSession, WorkoutSessionRepository,
    WorkoutSessionService, WriteError, exercise_names,
};

/// In-memory state of the application, mirrored to the repository.
///
/// Every committed mutation is followed by a single write of the affected
/// collection. If the write fails, the mutation stays applied and the error is
/// returned to the caller.
pub struct Store<R> {
    service: Service<R>,
    workouts: Vec<Workout>,
    sessions: Vec<WorkoutSession>,
}

impl<R> Store<R>
where
    R: WorkoutRepository + WorkoutSessionRepository,
{
    pub fn new(repository: R) -> Self {
        Self {
            service: Service::new(repository),
            workouts: vec![],
            sessions: vec![],
        }
    }

    pub fn service(&self) -> &Service<R> {
        &self.service
    }

    /// Replace the in-memory state by the content of the repository.
    ///
    /// A collection that cannot be read keeps its previous state.
    pub async fn load(&mut self) -> Result<(), ReadError> {
        let mut result = Ok(());

        match self.service.get_workouts().await {
            Ok(workouts) => self.workouts = workouts,
            Err(err) => result = Err(err),
        }

        match self.service.get_workout_sessions().await {
            Ok(sessions) => self.sessions = sessions,
            Err(err) => {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn workout(&self, id: &WorkoutID) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == *id)
    }

    pub fn sessions(&self) -> &[WorkoutSession] {
        &self.sessions
    }

    pub fn exercise_names(&self) -> Vec<String> {
        exercise_names(&self.workouts)
    }

    pub fn dashboard(&self, now: DateTime<Local>, week_start: Weekday) -> Dashboard {
        Dashboard::new(&self.sessions, now, week_start)
    }

    pub fn subscribe_workouts(&self) -> Subscription<Vec<Workout>> {
        self.service.watch_workouts()
    }

    pub fn subscribe_sessions(&self) -> Subscription<Vec<WorkoutSession>> {
        self.service.watch_workout_sessions()
    }

    pub async fn create_workout(&mut self, draft: WorkoutDraft) -> Result<WorkoutID, StoreError> {
        let workout = draft.into_workout(WorkoutID::new())?;
        let id = workout.id.clone();
        self.workouts.push(workout);
        self.service.set_workouts(&self.workouts).await?;
        Ok(id)
    }

    pub async fn replace_workout(
        &mut self,
        id: &WorkoutID,
        draft: WorkoutDraft,
    ) -> Result<(), StoreError> {
        let Some(index) = self.workouts.iter().position(|w| w.id == *id) else {
            return Err(WorkoutError::NotFound.into());
        };
        self.workouts[index] = draft.into_workout(id.clone())?;
        self.service.set_workouts(&self.workouts).await?;
        Ok(())
    }

    pub async fn delete_workout(&mut self, id: &WorkoutID) -> Result<(), StoreError> {
        let Some(index) = self.workouts.iter().position(|w| w.id == *id) else {
            return Err(WorkoutError::NotFound.into());
        };
        self.workouts.remove(index);
        self.service.set_workouts(&self.workouts).await?;
        Ok(())
    }

    pub async fn add_session(&mut self, session: WorkoutSession) -> Result<(), WriteError> {
        self.sessions.push(session);
        self.service.set_workout_sessions(&self.sessions).await
    }

    /// Replace all workouts by a snapshot received from the repository.
    pub fn apply_workouts_snapshot(&mut self, workouts: Vec<Workout>) {
        self.workouts = workouts;
    }

    /// Replace all sessions by a snapshot received from the repository.
    pub fn apply_sessions_snapshot(&mut self, sessions: Vec<WorkoutSession>) {
        self.sessions = sessions;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    InvalidWorkout(#[from] WorkoutError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::{TimeZone, Utc};
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;

    use crate::{ExerciseResult, Name, NameError, Publisher, StorageError, WorkoutSessionID};

    use super::*;

    #[derive(Default)]
    struct FakeRepository {
        workouts: RefCell<Vec<Workout>>,
        sessions: RefCell<Vec<WorkoutSession>>,
        workout_writes: Cell<u32>,
        session_writes: Cell<u32>,
        offline: Cell<bool>,
        workouts_publisher: Publisher<Vec<Workout>>,
    }

    impl WorkoutRepository for FakeRepository {
        async fn read_workouts(&self) -> Result<Vec<Workout>, ReadError> {
            if self.offline.get() {
                return Err(StorageError::NoConnection.into());
            }
            Ok(self.workouts.borrow().clone())
        }

        async fn write_workouts(&self, workouts: &[Workout]) -> Result<(), WriteError> {
            self.workout_writes.set(self.workout_writes.get() + 1);
            if self.offline.get() {
                return Err(StorageError::NoConnection.into());
            }
            *self.workouts.borrow_mut() = workouts.to_vec();
            self.workouts_publisher.publish(workouts.to_vec());
            Ok(())
        }

        fn subscribe_workouts(&self) -> Subscription<Vec<Workout>> {
            self.workouts_publisher.subscribe()
        }
    }

    impl WorkoutSessionRepository for FakeRepository {
        async fn read_workout_sessions(&self) -> Result<Vec<WorkoutSession>, ReadError> {
            Ok(self.sessions.borrow().clone())
        }

        async fn write_workout_sessions(
            &self,
            sessions: &[WorkoutSession],
        ) -> Result<(), WriteError> {
            self.session_writes.set(self.session_writes.get() + 1);
            if self.offline.get() {
                return Err(StorageError::NoConnection.into());
            }
            *self.sessions.borrow_mut() = sessions.to_vec();
            Ok(())
        }

        fn subscribe_workout_sessions(&self) -> Subscription<Vec<WorkoutSession>> {
            Subscription::closed()
        }
    }

    fn draft(name: &str, exercises: &[&str]) -> WorkoutDraft {
        let mut draft = WorkoutDraft {
            name: name.to_string(),
            exercises: vec![],
        };
        for (i, exercise) in exercises.iter().enumerate() {
            draft.add_exercise();
            draft.update_exercise_name(i, exercise);
        }
        draft
    }

    fn workout_session(day: u32) -> WorkoutSession {
        WorkoutSession {
            id: WorkoutSessionID::from(format!("s{day}")),
            workout_id: "w".into(),
            workout_name: String::from("Legs"),
            date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            exercises: vec![ExerciseResult {
                exercise_id: "e".into(),
                exercise_name: String::from("Squat"),
                sets: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_load() {
        let repository = FakeRepository::default();
        let workout = draft("Legs", &["Squat"]).into_workout("1".into()).unwrap();
        repository.workouts.borrow_mut().push(workout.clone());
        repository.sessions.borrow_mut().push(workout_session(1));
        let mut store = Store::new(repository);

        store.load().await.unwrap();

        assert_eq!(store.workouts(), &[workout]);
        assert_eq!(store.sessions(), &[workout_session(1)]);
    }

    #[tokio::test]
    async fn test_load_keeps_state_of_unreadable_collection() {
        let repository = FakeRepository::default();
        repository.sessions.borrow_mut().push(workout_session(1));
        let mut store = Store::new(repository);
        store.apply_workouts_snapshot(vec![
            draft("Legs", &["Squat"]).into_workout("1".into()).unwrap(),
        ]);
        store.service().repository().offline.set(true);

        assert!(matches!(
            store.load().await,
            Err(ReadError::Storage(StorageError::NoConnection))
        ));
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.sessions(), &[workout_session(1)]);
    }

    #[tokio::test]
    async fn test_create_workout() {
        let mut store = Store::new(FakeRepository::default());

        let id = store.create_workout(draft("Legs", &["Squat"])).await.unwrap();

        let workout = store.workout(&id).unwrap();
        assert_eq!(workout.name, Name::new("Legs").unwrap());
        let repository = store.service().repository();
        assert_eq!(repository.workout_writes.get(), 1);
        assert_eq!(*repository.workouts.borrow(), store.workouts());
    }

    #[tokio::test]
    async fn test_create_workout_invalid() {
        let mut store = Store::new(FakeRepository::default());

        assert!(matches!(
            store.create_workout(draft("", &["Squat"])).await,
            Err(StoreError::InvalidWorkout(WorkoutError::InvalidName(
                NameError::Empty
            )))
        ));
        assert!(matches!(
            store.create_workout(draft("Legs", &[])).await,
            Err(StoreError::InvalidWorkout(WorkoutError::NoExercises))
        ));
        assert!(store.workouts().is_empty());
        assert_eq!(store.service().repository().workout_writes.get(), 0);
    }

    #[tokio::test]
    async fn test_create_workout_write_failure_keeps_workout() {
        let mut store = Store::new(FakeRepository::default());
        store.service().repository().offline.set(true);

        assert!(matches!(
            store.create_workout(draft("Legs", &["Squat"])).await,
            Err(StoreError::Write(WriteError::Storage(
                StorageError::NoConnection
            )))
        ));
        assert_eq!(store.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_workout() {
        let mut store = Store::new(FakeRepository::default());
        let id = store.create_workout(draft("Legs", &["Squat"])).await.unwrap();

        store
            .replace_workout(&id, draft("Lower Body", &["Squat", "Lunge"]))
            .await
            .unwrap();

        let workout = store.workout(&id).unwrap();
        assert_eq!(workout.name, Name::new("Lower Body").unwrap());
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(store.workouts().len(), 1);
        assert_eq!(store.service().repository().workout_writes.get(), 2);
        assert!(matches!(
            store
                .replace_workout(&WorkoutID::from("unknown"), draft("A", &["B"]))
                .await,
            Err(StoreError::InvalidWorkout(WorkoutError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_delete_workout() {
        let mut store = Store::new(FakeRepository::default());
        let id = store.create_workout(draft("Legs", &["Squat"])).await.unwrap();

        store.delete_workout(&id).await.unwrap();

        assert!(store.workouts().is_empty());
        assert!(store.service().repository().workouts.borrow().is_empty());
        assert!(matches!(
            store.delete_workout(&id).await,
            Err(StoreError::InvalidWorkout(WorkoutError::NotFound))
        ));
        assert_eq!(store.service().repository().workout_writes.get(), 2);
    }

    #[tokio::test]
    async fn test_add_session() {
        let mut store = Store::new(FakeRepository::default());

        store.add_session(workout_session(1)).await.unwrap();
        store.add_session(workout_session(2)).await.unwrap();

        let repository = store.service().repository();
        assert_eq!(repository.session_writes.get(), 2);
        assert_eq!(
            *repository.sessions.borrow(),
            vec![workout_session(1), workout_session(2)]
        );
    }

    #[tokio::test]
    async fn test_apply_snapshots() {
        let mut store = Store::new(FakeRepository::default());
        store.add_session(workout_session(1)).await.unwrap();

        store.apply_sessions_snapshot(vec![workout_session(3)]);
        store.apply_workouts_snapshot(vec![
            draft("Legs", &["Squat"]).into_workout("1".into()).unwrap(),
        ]);

        assert_eq!(store.sessions(), &[workout_session(3)]);
        assert_eq!(store.exercise_names(), vec![String::from("Squat")]);
        assert_eq!(store.service().repository().session_writes.get(), 1);
        assert_eq!(store.service().repository().workout_writes.get(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_workouts() {
        let mut store = Store::new(FakeRepository::default());
        let mut subscription = store.subscribe_workouts();

        store.create_workout(draft("Legs", &["Squat"])).await.unwrap();

        assert_eq!(subscription.next().await.as_deref(), Some(store.workouts()));
    }

    #[test]
    fn test_dashboard() {
        let mut store = Store::new(FakeRepository::default());
        store.apply_sessions_snapshot(vec![workout_session(1), workout_session(2)]);
        let dashboard = store.dashboard(
            Local.with_ymd_and_hms(2024, 3, 2, 20, 0, 0).unwrap(),
            Weekday::Mon,
        );
        assert_eq!(dashboard.total_workouts, 2);
    }
}
