use chrono::{NaiveDate, Weekday};
use log::{debug, error};

use crate::{
    Dashboard, Exercise, ExerciseAssignment, ReadError, Settings, WorkoutRecord, dashboard,
    day_plan,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_assignments(&self) -> Result<Vec<ExerciseAssignment>, ReadError>;
    async fn read_workout_records(&self) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn read_settings(&self) -> Result<Settings, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait AnalyticsService {
    async fn get_dashboard(&self, today: NaiveDate) -> Result<Dashboard, ReadError>;
    async fn get_day_plan(&self, weekday: Weekday) -> Result<Vec<Exercise>, ReadError>;
}

pub struct Service<R> {
    repository: R,
}

impl<R: WorkoutRepository> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        if let Err(ref err) = result {
            match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            }
        }
        result
    }};
}

impl<R: WorkoutRepository> AnalyticsService for Service<R> {
    async fn get_dashboard(&self, today: NaiveDate) -> Result<Dashboard, ReadError> {
        let exercises = log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "read",
            "exercises"
        )?;
        let records = log_on_error!(
            self.repository.read_workout_records(),
            ReadError,
            "read",
            "workout records"
        )?;
        let settings = log_on_error!(
            self.repository.read_settings(),
            ReadError,
            "read",
            "settings"
        )?;

        Ok(dashboard(
            &records.iter().collect::<Vec<_>>(),
            &exercises,
            &settings,
            today,
        ))
    }

    async fn get_day_plan(&self, weekday: Weekday) -> Result<Vec<Exercise>, ReadError> {
        let exercises = log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "read",
            "exercises"
        )?;
        let assignments = log_on_error!(
            self.repository.read_assignments(),
            ReadError,
            "read",
            "assignments"
        )?;

        Ok(day_plan(&assignments, &exercises, weekday)
            .into_iter()
            .map(|p| p.exercise.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        pin::pin,
        task::{Context, Poll, Waker},
    };

    use pretty_assertions::assert_eq;

    use crate::{
        StorageError,
        tests::data::{BENCH_PRESS, EXERCISES, SQUAT, date, record},
    };

    use super::*;

    struct FakeRepository {
        connected: bool,
        records: Vec<WorkoutRecord>,
        assignments: Vec<ExerciseAssignment>,
    }

    impl FakeRepository {
        fn check_connection(&self) -> Result<(), ReadError> {
            if self.connected {
                Ok(())
            } else {
                Err(StorageError::NoConnection.into())
            }
        }
    }

    impl WorkoutRepository for FakeRepository {
        async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            self.check_connection()?;
            Ok(EXERCISES.clone())
        }

        async fn read_assignments(&self) -> Result<Vec<ExerciseAssignment>, ReadError> {
            self.check_connection()?;
            Ok(self.assignments.clone())
        }

        async fn read_workout_records(&self) -> Result<Vec<WorkoutRecord>, ReadError> {
            self.check_connection()?;
            Ok(self.records.clone())
        }

        async fn read_settings(&self) -> Result<Settings, ReadError> {
            self.check_connection()?;
            Ok(Settings::default())
        }
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let mut future = pin!(future);
        let mut context = Context::from_waker(Waker::noop());
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut context) {
                return output;
            }
        }
    }

    fn service(connected: bool) -> Service<FakeRepository> {
        Service::new(FakeRepository {
            connected,
            records: vec![
                record(1, 100.0, 10, 1, date(2024, 3, 4)),
                record(3, 80.0, 5, 3, date(2024, 3, 6)),
                record(99, 50.0, 10, 1, date(2024, 3, 6)),
            ],
            assignments: vec![
                ExerciseAssignment {
                    id: 1.into(),
                    exercise_id: 3.into(),
                    day_of_week: Weekday::Mon,
                    order: Some(2),
                },
                ExerciseAssignment {
                    id: 2.into(),
                    exercise_id: 1.into(),
                    day_of_week: Weekday::Mon,
                    order: Some(1),
                },
                ExerciseAssignment {
                    id: 3.into(),
                    exercise_id: 5.into(),
                    day_of_week: Weekday::Tue,
                    order: None,
                },
            ],
        })
    }

    #[test]
    fn test_get_dashboard() {
        let dashboard = block_on(service(true).get_dashboard(date(2024, 3, 7))).unwrap();

        assert_eq!(dashboard.orphans.total_records, 3);
        assert_eq!(dashboard.orphans.orphaned_records, 1);
        assert_eq!(dashboard.weekly_summary.workouts, 2);
        assert_eq!(dashboard.exercises.len(), 2);
    }

    #[test]
    fn test_get_dashboard_no_connection() {
        assert!(
            block_on(service(false).get_dashboard(date(2024, 3, 7)))
                .unwrap_err()
                .is_no_connection()
        );
    }

    #[test]
    fn test_get_day_plan() {
        let service = service(true);

        assert_eq!(
            block_on(service.get_day_plan(Weekday::Mon)).unwrap(),
            vec![BENCH_PRESS.clone(), SQUAT.clone()]
        );
        assert_eq!(block_on(service.get_day_plan(Weekday::Sun)).unwrap(), vec![]);
    }

    #[test]
    fn test_get_day_plan_no_connection() {
        assert!(
            block_on(service(false).get_day_plan(Weekday::Mon))
                .unwrap_err()
                .is_no_connection()
        );
    }
}
