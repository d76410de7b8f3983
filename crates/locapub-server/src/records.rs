//! In-memory record store standing in for the webhook service's database.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use locapub_shared::protocol::{DistributeRequest, NewCampaign, NewSupport};
use locapub_shared::{Campaign, CampaignId, Owner, Support, SupportId};

use crate::error::ServerError;

/// One accepted distribution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub campaign_id: CampaignId,
    pub support_id: SupportId,
    pub owner: Owner,
}

#[derive(Debug, Default)]
pub struct RecordStore {
    supports: RwLock<Vec<Support>>,
    campaigns: RwLock<Vec<Campaign>>,
    distributions: RwLock<Vec<Distribution>>,
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_support(&self, new: NewSupport) -> Result<SupportId, ServerError> {
        if new.title.trim().is_empty() {
            return Err(ServerError::BadRequest("Le titre est obligatoire.".into()));
        }
        let id = SupportId(new_id());
        let support = Support {
            id: id.clone(),
            owner: new.owner,
            category: new.category,
            kind: new.kind,
            title: new.title,
            description: new.description,
            content: new.content,
            created_at: Some(new.created_at),
            updated_at: Some(new.updated_at),
        };
        info!(id = %id, owner = %support.owner, kind = support.kind.label(), "Support stored");
        self.supports.write().await.push(support);
        Ok(id)
    }

    pub async fn supports_of(&self, owner: &Owner) -> Vec<Support> {
        self.supports
            .read()
            .await
            .iter()
            .filter(|s| &s.owner == owner)
            .cloned()
            .collect()
    }

    pub async fn rename_support(&self, id: &SupportId, title: &str) -> Result<(), ServerError> {
        if title.trim().is_empty() {
            return Err(ServerError::BadRequest("Le titre est obligatoire.".into()));
        }
        let mut supports = self.supports.write().await;
        let support = supports
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ServerError::NotFound(format!("Support {id} introuvable.")))?;
        support.title = title.to_string();
        support.updated_at = Some(Utc::now());
        debug!(id = %id, "Support renamed");
        Ok(())
    }

    pub async fn delete_support(&self, id: &SupportId) -> Result<(), ServerError> {
        let mut supports = self.supports.write().await;
        let before = supports.len();
        supports.retain(|s| &s.id != id);
        if supports.len() == before {
            return Err(ServerError::NotFound(format!("Support {id} introuvable.")));
        }
        info!(id = %id, "Support deleted");
        Ok(())
    }

    pub async fn insert_campaign(&self, new: NewCampaign) -> Result<CampaignId, ServerError> {
        if new.title.trim().is_empty() {
            return Err(ServerError::BadRequest("Le titre est obligatoire.".into()));
        }
        let known_support = self
            .supports
            .read()
            .await
            .iter()
            .any(|s| s.id == new.support_id);
        if !known_support {
            return Err(ServerError::BadRequest(format!(
                "Support {} inconnu.",
                new.support_id
            )));
        }

        let id = CampaignId(new_id());
        let campaign = Campaign {
            id: id.clone(),
            owner: new.owner,
            category: new.category,
            channel: new.channel,
            title: new.title,
            description: new.description,
            support_id: new.support_id,
            created_at: Some(new.created_at),
            updated_at: Some(new.updated_at),
        };
        info!(id = %id, support = %campaign.support_id, "Campaign stored");
        self.campaigns.write().await.push(campaign);
        Ok(id)
    }

    pub async fn campaigns_of(&self, owner: &Owner) -> Vec<Campaign> {
        self.campaigns
            .read()
            .await
            .iter()
            .filter(|c| &c.owner == owner)
            .cloned()
            .collect()
    }

    /// Record a distribution of an existing campaign.
    pub async fn distribute(&self, request: DistributeRequest) -> Result<(), ServerError> {
        let exists = self
            .campaigns
            .read()
            .await
            .iter()
            .any(|c| c.id == request.campaign_id);
        if !exists {
            return Err(ServerError::NotFound(format!(
                "Campagne {} introuvable.",
                request.campaign_id
            )));
        }
        info!(
            campaign = %request.campaign_id,
            support = %request.support_id,
            channel = request.channel.label(),
            "Distribution queued"
        );
        self.distributions.write().await.push(Distribution {
            campaign_id: request.campaign_id,
            support_id: request.support_id,
            owner: request.owner,
        });
        Ok(())
    }

    pub async fn distributions(&self) -> Vec<Distribution> {
        self.distributions.read().await.clone()
    }
}
