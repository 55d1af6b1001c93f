//! Ideas Command
//!
//! Browse and remove stored ideas.
//!
//! Usage:
//!   bizplan ideas list [-f json]
//!   bizplan ideas show <id> [-f json|yaml]
//!   bizplan ideas delete <id>

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat, serialize_as};
use crate::storage::{IdeaStore, StoredIdea};
use crate::types::{IdeaId, PlanError, Result};

pub async fn list(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let ideas = ctx.store.list().await?;
    match serialize_as(&ideas, format)? {
        Some(rendered) => println!("{}", rendered),
        None => Output::new().idea_list(&ideas),
    }
    Ok(())
}

pub async fn show(ctx: &CommandContext, id: &str, format: OutputFormat) -> Result<()> {
    let stored = find(ctx.store.as_ref(), id).await?;
    match serialize_as(&stored, format)? {
        Some(rendered) => println!("{}", rendered),
        None => {
            let output = Output::new();
            output.idea(&stored.idea);
            output.info(&format!(
                "Created {}, updated {}",
                stored.created_at.to_rfc3339(),
                stored.updated_at.to_rfc3339()
            ));
        }
    }
    Ok(())
}

pub async fn delete(ctx: &CommandContext, id: &str) -> Result<()> {
    if ctx.store.delete(&IdeaId::from(id)).await? {
        Output::new().success(&format!("Deleted idea {}", id));
        Ok(())
    } else {
        Err(PlanError::NotFound(id.to_string()))
    }
}

async fn find(store: &dyn IdeaStore, id: &str) -> Result<StoredIdea> {
    store
        .get(&IdeaId::from(id))
        .await?
        .ok_or_else(|| PlanError::NotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::idea::fixtures::sample_idea;

    #[tokio::test]
    async fn test_find() {
        let store = MemoryStore::new();
        store.save(&sample_idea("idea-1")).await.unwrap();

        let found = find(&store, "idea-1").await.unwrap();
        assert_eq!(found.idea.title(), "Neighborhood Bakery");

        let err = find(&store, "idea-2").await.unwrap_err();
        assert!(matches!(err, PlanError::NotFound(id) if id == "idea-2"));
    }
}
