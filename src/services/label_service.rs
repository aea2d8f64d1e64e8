use sqlx::PgPool;
use tracing::{info, warn};

use super::access::can_manage_labels;
use super::{Actor, ServiceError, ServiceResult};
use crate::database::models::label::DEFAULT_LABEL_COLOR;
use crate::database::models::Label;
use crate::database::repositories::LabelRepository;

pub struct LabelService {
    labels: LabelRepository,
}

impl LabelService {
    pub fn new(pool: PgPool) -> ServiceResult<Self> {
        Ok(Self {
            labels: LabelRepository::new(pool)?,
        })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Label>> {
        Ok(self.labels.list().await?)
    }

    pub async fn get(&self, label_id: i64) -> ServiceResult<Label> {
        self.labels
            .find_by_id(label_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Label not found".to_string()))
    }

    pub async fn create(&self, actor: Actor, name: &str, color: Option<&str>) -> ServiceResult<Label> {
        require_label_admin(actor, "Only admins can create labels")?;
        if self.labels.find_by_name(name).await?.is_some() {
            return Err(ServiceError::Conflict("Label with this name already exists".to_string()));
        }

        let label = self
            .labels
            .create(name, color.unwrap_or(DEFAULT_LABEL_COLOR))
            .await?;
        info!(label_id = label.id, name = %label.name, "Label created");
        Ok(label)
    }

    pub async fn update(
        &self,
        actor: Actor,
        label_id: i64,
        name: Option<&str>,
        color: Option<&str>,
    ) -> ServiceResult<Label> {
        require_label_admin(actor, "Only admins can update labels")?;
        self.get(label_id).await?;

        if let Some(name) = name {
            // Renaming a label to its own name is fine
            if let Some(existing) = self.labels.find_by_name(name).await? {
                if existing.id != label_id {
                    return Err(ServiceError::Conflict(
                        "Label with this name already exists".to_string(),
                    ));
                }
            }
        }

        let label = self.labels.update(label_id, name, color).await?;
        info!(label_id, "Label updated");
        Ok(label)
    }

    pub async fn delete(&self, actor: Actor, label_id: i64) -> ServiceResult<()> {
        require_label_admin(actor, "Only admins can delete labels")?;
        if !self.labels.delete(label_id).await? {
            return Err(ServiceError::NotFound("Label not found".to_string()));
        }
        info!(label_id, "Label deleted");
        Ok(())
    }
}

fn require_label_admin(actor: Actor, message: &str) -> ServiceResult<()> {
    if can_manage_labels(&actor) {
        return Ok(());
    }
    warn!(user_id = actor.id, "Label management denied");
    Err(ServiceError::Forbidden(message.to_string()))
}
