//! Tag use cases.

use tempo_core::{EntryId, Tag, TagId};

use crate::{Tempo, UseCaseError};

impl Tempo {
    pub async fn create_tag(&self, name: String) -> Result<Tag, UseCaseError> {
        self.run("create_tag", move |store| Ok(store.tags().insert(&name)?))
            .await
    }

    pub async fn delete_tag(&self, id: TagId) -> Result<(), UseCaseError> {
        self.run("delete_tag", move |store| {
            if store.tags().delete(id)? {
                Ok(())
            } else {
                Err(UseCaseError::not_found("tag", id))
            }
        })
        .await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, UseCaseError> {
        self.run("list_tags", |store| Ok(store.tags().list()?))
            .await
    }

    pub async fn find_tag(&self, name: String) -> Result<Tag, UseCaseError> {
        self.run("find_tag", move |store| {
            store
                .tags()
                .find_by_name(&name)?
                .ok_or_else(|| UseCaseError::not_found("tag", name.trim()))
        })
        .await
    }

    /// Links a tag to an entry. Returns `false` when it was already linked.
    pub async fn tag_entry(&self, entry: EntryId, tag: TagId) -> Result<bool, UseCaseError> {
        self.run("tag_entry", move |store| {
            if store.entries().get(entry)?.is_none() {
                return Err(UseCaseError::not_found("entry", entry));
            }
            if store.tags().get(tag)?.is_none() {
                return Err(UseCaseError::not_found("tag", tag));
            }
            Ok(store.tags().attach(entry, tag)?)
        })
        .await
    }

    /// Unlinks a tag from an entry. Returns `false` when it was not linked.
    pub async fn untag_entry(&self, entry: EntryId, tag: TagId) -> Result<bool, UseCaseError> {
        self.run("untag_entry", move |store| Ok(store.tags().detach(entry, tag)?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::LogEntry;
    use crate::testing::{tempo, ts};

    #[tokio::test]
    async fn tag_and_untag_entry() {
        let tempo = tempo();
        let activity = tempo
            .create_activity("Coding".to_string(), None)
            .await
            .unwrap();
        let entry = tempo
            .log_entry(LogEntry {
                activity_id: activity.id,
                start: ts("2025-03-01T09:00:00Z"),
                end: ts("2025-03-01T10:00:00Z"),
                note: None,
                tags: Vec::new(),
            })
            .await
            .unwrap();
        let tag = tempo.create_tag("billable".to_string()).await.unwrap();

        assert!(tempo.tag_entry(entry.id, tag.id).await.unwrap());
        assert!(!tempo.tag_entry(entry.id, tag.id).await.unwrap());
        assert!(tempo.untag_entry(entry.id, tag.id).await.unwrap());
        assert!(!tempo.untag_entry(entry.id, tag.id).await.unwrap());

        let err = tempo
            .tag_entry(EntryId::new(1234), tag.id)
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound { what: "entry", .. }));
    }

    #[tokio::test]
    async fn delete_and_find() {
        let tempo = tempo();
        let tag = tempo.create_tag("urgent".to_string()).await.unwrap();
        assert_eq!(tempo.find_tag(" urgent".to_string()).await.unwrap(), tag);
        tempo.delete_tag(tag.id).await.unwrap();
        assert!(tempo.list_tags().await.unwrap().is_empty());
        assert!(matches!(
            tempo.delete_tag(tag.id).await,
            Err(UseCaseError::NotFound { what: "tag", .. })
        ));
    }
}
