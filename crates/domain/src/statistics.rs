use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, DateTime, Duration, Local, NaiveDate, Utc, Weekday};

use crate::{NameKey, RecordedSet, Reps, Weight, WorkoutSession};

const STREAK_DAYS: u32 = 30;
const PERSONAL_RECORD_DAYS: i64 = 14;
const MAX_PERSONAL_RECORDS: usize = 3;
const CONSISTENCY_WEEKS: i64 = 4;
const FREQUENCY_DAYS: usize = 14;
const PROGRESSION_SESSIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Interval {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }
}

impl From<std::ops::RangeInclusive<NaiveDate>> for Interval {
    fn from(value: std::ops::RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonalRecord {
    pub exercise_name: String,
    pub weight: Weight,
    pub reps: Reps,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub interval: Interval,
    pub workouts: u32,
    pub distance: f32,
}

/// All metrics shown on the dashboard, computed from the complete history.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub total_workouts: usize,
    pub workouts_this_week: usize,
    pub streak: u32,
    pub weekly_volume: f32,
    pub weekly_distance: f32,
    pub personal_records: Vec<PersonalRecord>,
    pub weekly_consistency: Vec<WeekSummary>,
    pub workout_frequency: Vec<(NaiveDate, u32)>,
    pub volume_progression: Vec<(NaiveDate, f32)>,
}

impl Dashboard {
    #[must_use]
    pub fn new(sessions: &[WorkoutSession], now: DateTime<Local>, week_start: Weekday) -> Self {
        let today = now.date_naive();
        Self {
            total_workouts: total_workouts(sessions),
            workouts_this_week: this_week(sessions, now).len(),
            streak: streak(sessions, today),
            weekly_volume: weekly_volume(sessions, now),
            weekly_distance: weekly_distance(sessions, now),
            personal_records: personal_records(sessions, now),
            weekly_consistency: weekly_consistency(sessions, today, week_start),
            workout_frequency: workout_frequency(sessions),
            volume_progression: volume_progression(sessions),
        }
    }
}

#[must_use]
pub fn total_workouts(sessions: &[WorkoutSession]) -> usize {
    sessions.len()
}

/// Sessions of the last seven days.
#[must_use]
pub fn this_week(sessions: &[WorkoutSession], now: DateTime<Local>) -> Vec<&WorkoutSession> {
    let start = (now - Duration::days(7)).with_timezone(&Utc);
    sessions.iter().filter(|s| s.date >= start).collect()
}

/// Number of consecutive days with at least one session.
///
/// A missing session today does not break the streak, as the day is not over
/// yet.
#[must_use]
pub fn streak(sessions: &[WorkoutSession], today: NaiveDate) -> u32 {
    let dates = sessions.iter().map(local_date).collect::<BTreeSet<_>>();
    let start = if dates.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    std::iter::successors(start, NaiveDate::pred_opt)
        .take(STREAK_DAYS as usize)
        .take_while(|d| dates.contains(d))
        .count()
        .try_into()
        .unwrap_or(STREAK_DAYS)
}

#[must_use]
pub fn weekly_volume(sessions: &[WorkoutSession], now: DateTime<Local>) -> f32 {
    this_week(sessions, now)
        .into_iter()
        .map(WorkoutSession::volume)
        .sum()
}

#[must_use]
pub fn weekly_distance(sessions: &[WorkoutSession], now: DateTime<Local>) -> f32 {
    this_week(sessions, now)
        .into_iter()
        .map(WorkoutSession::distance)
        .sum()
}

/// Recent improvements of the maximum weight lifted in an exercise, newest
/// first.
///
/// The first weight recorded for an exercise sets the baseline. Later sessions
/// create a record only if they exceed the previous maximum. Exercises are
/// identified by their [`NameKey`].
#[must_use]
pub fn personal_records(sessions: &[WorkoutSession], now: DateTime<Local>) -> Vec<PersonalRecord> {
    let cutoff = (now - Duration::days(PERSONAL_RECORD_DAYS)).with_timezone(&Utc);
    let mut sorted = sessions.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|s| s.date);

    let mut best: HashMap<NameKey, Weight> = HashMap::new();
    let mut records = vec![];

    for session in sorted {
        for exercise in &session.exercises {
            let Some((weight, reps)) = heaviest_set(&exercise.sets) else {
                continue;
            };
            let key = exercise.key();
            match best.get(&key) {
                Some(previous) if weight > *previous => {
                    if session.date >= cutoff {
                        records.push(PersonalRecord {
                            exercise_name: exercise.exercise_name.clone(),
                            weight,
                            reps,
                            date: session.date,
                        });
                    }
                    best.insert(key, weight);
                }
                Some(_) => {}
                None => {
                    best.insert(key, weight);
                }
            }
        }
    }

    records.into_iter().rev().take(MAX_PERSONAL_RECORDS).collect()
}

/// Session count and distance of the last four weeks, oldest first.
///
/// The last week is the week containing `today`.
#[must_use]
pub fn weekly_consistency(
    sessions: &[WorkoutSession],
    today: NaiveDate,
    week_start: Weekday,
) -> Vec<WeekSummary> {
    let offset = (7 + today.weekday().num_days_from_monday()
        - week_start.num_days_from_monday())
        % 7;
    let current = today - Duration::days(i64::from(offset));

    (0..CONSISTENCY_WEEKS)
        .rev()
        .map(|i| {
            let first = current - Duration::weeks(i);
            let interval = Interval::from(first..=first + Duration::days(6));
            let week = sessions
                .iter()
                .filter(|s| interval.contains(local_date(s)))
                .collect::<Vec<_>>();
            WeekSummary {
                interval,
                workouts: u32::try_from(week.len()).unwrap_or(u32::MAX),
                distance: week.iter().map(|s| s.distance()).sum(),
            }
        })
        .collect()
}

/// Number of sessions per day for the last days with any session.
#[must_use]
pub fn workout_frequency(sessions: &[WorkoutSession]) -> Vec<(NaiveDate, u32)> {
    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for session in sessions {
        *days.entry(local_date(session)).or_default() += 1;
    }
    let skip = days.len().saturating_sub(FREQUENCY_DAYS);
    days.into_iter().skip(skip).collect()
}

/// Volume of the last sessions in chronological order.
#[must_use]
pub fn volume_progression(sessions: &[WorkoutSession]) -> Vec<(NaiveDate, f32)> {
    let mut sorted = sessions.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|s| s.date);
    let skip = sorted.len().saturating_sub(PROGRESSION_SESSIONS);
    sorted
        .into_iter()
        .skip(skip)
        .map(|s| (local_date(s), s.volume()))
        .collect()
}

fn local_date(session: &WorkoutSession) -> NaiveDate {
    session.date.with_timezone(&Local).date_naive()
}

fn heaviest_set(sets: &[RecordedSet]) -> Option<(Weight, Reps)> {
    sets.iter()
        .filter_map(|set| match set {
            RecordedSet::Strength { weight, reps } if weight.is_positive() && reps.is_positive() => {
                Some((*weight, *reps))
            }
            _ => None,
        })
        .fold(None, |heaviest: Option<(Weight, Reps)>, (weight, reps)| {
            match heaviest {
                Some((w, _)) if w >= weight => heaviest,
                _ => Some((weight, reps)),
            }
        })
}
