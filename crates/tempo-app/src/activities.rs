//! Activity use cases.

use tempo_core::{ActivityId, ActivityType, Color, NewActivity};

use crate::{Tempo, UseCaseError};

impl Tempo {
    /// Creates an activity type, falling back to the default color.
    pub async fn create_activity(
        &self,
        name: String,
        color: Option<Color>,
    ) -> Result<ActivityType, UseCaseError> {
        self.run("create_activity", move |store| {
            let new = NewActivity::new(&name, color.unwrap_or_default())?;
            Ok(store.activities().insert(&new)?)
        })
        .await
    }

    /// Renames and/or recolors an activity. `None` keeps the current value.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        name: Option<String>,
        color: Option<Color>,
    ) -> Result<ActivityType, UseCaseError> {
        self.run("update_activity", move |store| {
            let activities = store.activities();
            let mut activity = activities
                .get(id)?
                .ok_or_else(|| UseCaseError::not_found("activity", id))?;
            if let Some(name) = name {
                activity.name = name;
            }
            if let Some(color) = color {
                activity.color = color;
            }
            activities
                .update(&activity)?
                .ok_or_else(|| UseCaseError::not_found("activity", id))
        })
        .await
    }

    /// Deletes an activity along with its entries and goals.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), UseCaseError> {
        self.run("delete_activity", move |store| {
            if store.activities().delete(id)? {
                Ok(())
            } else {
                Err(UseCaseError::not_found("activity", id))
            }
        })
        .await
    }

    pub async fn list_activities(&self) -> Result<Vec<ActivityType>, UseCaseError> {
        self.run("list_activities", |store| Ok(store.activities().list()?))
            .await
    }

    /// Resolves an activity by name, or by id when `key` is numeric.
    pub async fn find_activity(&self, key: String) -> Result<ActivityType, UseCaseError> {
        self.run("find_activity", move |store| {
            let activities = store.activities();
            if let Some(activity) = activities.find_by_name(&key)? {
                return Ok(activity);
            }
            let by_id = match key.trim().parse::<ActivityId>() {
                Ok(id) => activities.get(id)?,
                Err(_) => None,
            };
            by_id.ok_or_else(|| UseCaseError::not_found("activity", key.trim()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempo_core::ValidationError;

    use crate::testing::tempo;

    #[tokio::test]
    async fn create_uses_default_color() {
        let tempo = tempo();
        let activity = tempo
            .create_activity(" Coding ".to_string(), None)
            .await
            .unwrap();
        assert_eq!(activity.name, "Coding");
        assert_eq!(activity.color.as_str(), Color::DEFAULT_HEX);
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let tempo = tempo();
        let err = tempo
            .create_activity("  ".to_string(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Invalid(ValidationError::Empty { .. })));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let tempo = tempo();
        let activity = tempo
            .create_activity("Coding".to_string(), None)
            .await
            .unwrap();
        let red = Color::parse("#ff0000").unwrap();
        let updated = tempo
            .update_activity(activity.id, None, Some(red.clone()))
            .await
            .unwrap();
        assert_eq!(updated.name, "Coding");
        assert_eq!(updated.color, red);

        let renamed = tempo
            .update_activity(activity.id, Some("  Programming ".to_string()), None)
            .await
            .unwrap();
        assert_eq!(renamed.name, "Programming");
        assert_eq!(tempo.find_activity("Programming".to_string()).await.unwrap(), renamed);

        let err = tempo
            .update_activity(activity.id, Some(" ".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Invalid(ValidationError::Empty { .. })));

        let err = tempo
            .update_activity(ActivityId::new(42), Some("Ghost".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound { what: "activity", .. }));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let tempo = tempo();
        let err = tempo.delete_activity(ActivityId::new(1)).await.unwrap_err();
        assert_eq!(err.to_string(), "activity 1 not found");
    }

    #[tokio::test]
    async fn find_by_name_or_id() {
        let tempo = tempo();
        let activity = tempo
            .create_activity("Reading".to_string(), None)
            .await
            .unwrap();
        assert_eq!(
            tempo.find_activity("Reading".to_string()).await.unwrap(),
            activity
        );
        assert_eq!(
            tempo.find_activity(activity.id.to_string()).await.unwrap(),
            activity
        );
        assert!(tempo.find_activity("Gym".to_string()).await.is_err());
    }
}
