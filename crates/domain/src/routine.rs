use chrono::Weekday;
use derive_more::Deref;
use log::debug;
use uuid::Uuid;

use crate::{Exercise, ExerciseID, exercises_by_id};

/// Assignment of an exercise to a day of the weekly routine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseAssignment {
    pub id: AssignmentID,
    pub exercise_id: ExerciseID,
    pub day_of_week: Weekday,
    pub order: Option<u32>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssignmentID(Uuid);

impl AssignmentID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for AssignmentID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for AssignmentID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedExercise<'a> {
    pub assignment: &'a ExerciseAssignment,
    pub exercise: &'a Exercise,
}

/// Exercises assigned to a weekday in their intended order.
///
/// Assignments without an order are placed at the end. Assignments referring to a deleted
/// exercise are skipped.
#[must_use]
pub fn day_plan<'a>(
    assignments: &'a [ExerciseAssignment],
    exercises: &'a [Exercise],
    weekday: Weekday,
) -> Vec<PlannedExercise<'a>> {
    let exercises = exercises_by_id(exercises);

    let mut plan = assignments
        .iter()
        .filter(|a| a.day_of_week == weekday)
        .filter_map(|assignment| {
            let Some(&exercise) = exercises.get(&assignment.exercise_id) else {
                debug!(
                    "skipping assignment {} of missing exercise {}",
                    *assignment.id, *assignment.exercise_id
                );
                return None;
            };
            Some(PlannedExercise {
                assignment,
                exercise,
            })
        })
        .collect::<Vec<_>>();

    plan.sort_by_key(|p| (p.assignment.order.is_none(), p.assignment.order));
    plan
}

/// Assignments referring to exercises that no longer exist.
#[must_use]
pub fn dangling_assignments<'a>(
    assignments: &'a [ExerciseAssignment],
    exercises: &[Exercise],
) -> Vec<&'a ExerciseAssignment> {
    let exercises = exercises_by_id(exercises);
    assignments
        .iter()
        .filter(|a| !exercises.contains_key(&a.exercise_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::tests::data::EXERCISES;

    use super::*;

    #[test]
    fn test_assignment_id_from_u128() {
        let id = 0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10;

        assert_eq!(
            *AssignmentID::from(id),
            Uuid::from_bytes(id.to_be_bytes())
        );
        assert_eq!(*AssignmentID::from(id), *ExerciseID::from(id));
    }

    fn assignment(
        id: u128,
        exercise_id: u128,
        day_of_week: Weekday,
        order: Option<u32>,
    ) -> ExerciseAssignment {
        ExerciseAssignment {
            id: id.into(),
            exercise_id: exercise_id.into(),
            day_of_week,
            order,
        }
    }

    fn assignments() -> Vec<ExerciseAssignment> {
        vec![
            assignment(1, 3, Weekday::Mon, None),
            assignment(2, 1, Weekday::Mon, Some(2)),
            assignment(3, 99, Weekday::Mon, Some(1)),
            assignment(4, 2, Weekday::Mon, Some(1)),
            assignment(5, 5, Weekday::Wed, Some(1)),
            assignment(6, 6, Weekday::Mon, None),
        ]
    }

    #[test]
    fn test_day_plan() {
        let assignments = assignments();

        let plan = day_plan(&assignments, &EXERCISES, Weekday::Mon);

        assert_eq!(
            plan.iter()
                .map(|p| (*p.assignment.id, p.exercise.name.to_string()))
                .collect::<Vec<_>>(),
            vec![
                (Uuid::from_u128(4), "Dominadas".to_string()),
                (Uuid::from_u128(2), "Press banca".to_string()),
                (Uuid::from_u128(1), "Sentadilla".to_string()),
                (Uuid::from_u128(6), "Plancha".to_string()),
            ]
        );
    }

    #[test]
    fn test_day_plan_empty_day() {
        let assignments = assignments();

        assert_eq!(day_plan(&assignments, &EXERCISES, Weekday::Sun), vec![]);
        assert_eq!(day_plan(&[], &EXERCISES, Weekday::Mon), vec![]);
    }

    #[test]
    fn test_dangling_assignments() {
        let assignments = assignments();

        assert_eq!(
            dangling_assignments(&assignments, &EXERCISES),
            vec![&assignments[2]]
        );
        assert_eq!(
            dangling_assignments(&assignments, &[]).len(),
            assignments.len()
        );
    }

    #[test]
    fn test_assignment_id_nil() {
        assert!(AssignmentID::nil().is_nil());
        assert!(!AssignmentID::from(1).is_nil());
    }
}
