//! Goal use cases.

use chrono::NaiveDate;

use tempo_core::{ActivityId, Goal, GoalId, GoalPeriod, GoalType, NewGoal};

use crate::{Tempo, UseCaseError};

/// A goal to create.
#[derive(Debug, Clone, Copy)]
pub struct SetGoal {
    pub activity_id: ActivityId,
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub target_ms: i64,
    pub created_on: NaiveDate,
}

impl Tempo {
    /// Creates a goal for an existing activity.
    pub async fn set_goal(&self, request: SetGoal) -> Result<Goal, UseCaseError> {
        self.run("set_goal", move |store| {
            let new = NewGoal::new(
                request.activity_id,
                request.goal_type,
                request.period,
                request.target_ms,
                request.created_on,
            )?;
            if store.activities().get(new.activity_id)?.is_none() {
                return Err(UseCaseError::not_found("activity", new.activity_id));
            }
            Ok(store.goals().insert(&new)?)
        })
        .await
    }

    pub async fn delete_goal(&self, id: GoalId) -> Result<(), UseCaseError> {
        self.run("delete_goal", move |store| {
            if store.goals().delete(id)? {
                Ok(())
            } else {
                Err(UseCaseError::not_found("goal", id))
            }
        })
        .await
    }

    pub async fn list_goals(&self) -> Result<Vec<Goal>, UseCaseError> {
        self.run("list_goals", |store| Ok(store.goals().list()?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempo_core::ValidationError;

    use crate::testing::tempo;

    fn request(activity_id: ActivityId, target_ms: i64) -> SetGoal {
        SetGoal {
            activity_id,
            goal_type: GoalType::Maximum,
            period: GoalPeriod::Day,
            target_ms,
            created_on: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn set_list_delete() {
        let tempo = tempo();
        let activity = tempo
            .create_activity("Social media".to_string(), None)
            .await
            .unwrap();
        let goal = tempo.set_goal(request(activity.id, 1_800_000)).await.unwrap();
        assert_eq!(tempo.list_goals().await.unwrap(), vec![goal.clone()]);
        tempo.delete_goal(goal.id).await.unwrap();
        assert!(tempo.list_goals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_validates_target_then_activity() {
        let tempo = tempo();
        let err = tempo.set_goal(request(ActivityId::new(1), 0)).await.unwrap_err();
        assert!(matches!(
            err,
            UseCaseError::Invalid(ValidationError::NonPositiveTarget { target_ms: 0 })
        ));
        let err = tempo
            .set_goal(request(ActivityId::new(1), 60_000))
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound { what: "activity", .. }));
    }

    #[tokio::test]
    async fn deleting_activity_removes_goals() {
        let tempo = tempo();
        let activity = tempo
            .create_activity("Gaming".to_string(), None)
            .await
            .unwrap();
        tempo.set_goal(request(activity.id, 3_600_000)).await.unwrap();
        tempo.delete_activity(activity.id).await.unwrap();
        assert!(tempo.list_goals().await.unwrap().is_empty());
    }
}
