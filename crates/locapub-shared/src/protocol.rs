//! Request and response bodies of the webhook backend.
//!
//! Keys are the backend's own (French) names; Rust fields are renamed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CATEGORY_CAMPAIGN, CATEGORY_SUPPORT};
use crate::types::{Campaign, CampaignId, Channel, Owner, Session, SupportId, SupportKind};

/// Body of the two list endpoints: `{"user": …}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerFilter {
    pub user: Owner,
}

impl OwnerFilter {
    pub fn for_session(session: &Session) -> Self {
        Self {
            user: session.owner.clone(),
        }
    }
}

/// Asks the backend to generate content for a support.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateRequest {
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Type")]
    pub kind: SupportKind,
}

/// `{"Support": <payload>}`: base64 for image/audio, plain text for text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GenerateResponse {
    #[serde(rename = "Support", default)]
    pub payload: Option<String>,
}

/// A support record as inserted by the client (no `_id` yet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewSupport {
    #[serde(rename = "User")]
    pub owner: Owner,
    #[serde(rename = "Catégorie")]
    pub category: String,
    #[serde(rename = "Type")]
    pub kind: SupportKind,
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Contenu")]
    pub content: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl NewSupport {
    pub fn new(
        session: &Session,
        kind: SupportKind,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: session.owner.clone(),
            category: CATEGORY_SUPPORT.to_string(),
            kind,
            title: title.into(),
            description: description.into(),
            content: content.into(),
            updated_at: now,
            created_at: now,
        }
    }
}

/// A campaign record as inserted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCampaign {
    #[serde(rename = "User")]
    pub owner: Owner,
    #[serde(rename = "Catégorie")]
    pub category: String,
    #[serde(rename = "Type")]
    pub channel: Channel,
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Support")]
    pub support_id: SupportId,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl NewCampaign {
    pub fn new(
        session: &Session,
        channel: Channel,
        title: impl Into<String>,
        description: impl Into<String>,
        support_id: SupportId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owner: session.owner.clone(),
            category: CATEGORY_CAMPAIGN.to_string(),
            channel,
            title: title.into(),
            description: description.into(),
            support_id,
            updated_at: now,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModifySupportRequest {
    #[serde(rename = "_id")]
    pub id: SupportId,
    #[serde(rename = "Titre")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteSupportRequest {
    #[serde(rename = "_id")]
    pub id: SupportId,
}

/// Payload of the distribution webhook.
///
/// Built from the campaign itself. The backend contract for this call is
/// not settled; `campaign_id` is an addition the backend may ignore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributeRequest {
    #[serde(rename = "User")]
    pub owner: Owner,
    #[serde(rename = "Catégorie")]
    pub category: String,
    #[serde(rename = "Type")]
    pub channel: Channel,
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Support")]
    pub support_id: SupportId,
    #[serde(rename = "Campagne")]
    pub campaign_id: CampaignId,
    #[serde(rename = "Date")]
    pub requested_at: DateTime<Utc>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DistributeRequest {
    pub fn for_campaign(session: &Session, campaign: &Campaign, now: DateTime<Utc>) -> Self {
        Self {
            owner: session.owner.clone(),
            category: CATEGORY_CAMPAIGN.to_string(),
            channel: campaign.channel,
            title: campaign.title.clone(),
            description: campaign.description.clone(),
            support_id: campaign.support_id.clone(),
            campaign_id: campaign.id.clone(),
            requested_at: now,
            updated_at: campaign.updated_at,
            created_at: campaign.created_at,
        }
    }
}

/// Error body convention of the backend: `{"message": …}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_filter_is_lowercase_user() {
        let body = OwnerFilter::for_session(&Session::new("Alexis"));
        assert_eq!(serde_json::to_value(body).unwrap(), json!({ "user": "Alexis" }));
    }

    #[test]
    fn new_support_carries_session_owner_and_category() {
        let now = Utc::now();
        let record = NewSupport::new(
            &Session::new("Alexis"),
            SupportKind::Image,
            "Noël",
            "Visuel",
            "data:image/png;base64,AAAA",
            now,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["User"], "Alexis");
        assert_eq!(value["Catégorie"], "Support");
        assert_eq!(value["Type"], "Image");
        assert_eq!(value["createdAt"], value["updatedAt"]);
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn distribute_request_uses_campaign_fields() {
        let campaign = Campaign {
            id: CampaignId::from("c1"),
            owner: Owner("Alexis".into()),
            category: CATEGORY_CAMPAIGN.into(),
            channel: Channel::Email,
            title: "Soldes".into(),
            description: "Été".into(),
            support_id: SupportId::from("s9"),
            created_at: None,
            updated_at: None,
        };

        let req = DistributeRequest::for_campaign(&Session::new("Alexis"), &campaign, Utc::now());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["Titre"], "Soldes");
        assert_eq!(value["Support"], "s9");
        assert_eq!(value["Campagne"], "c1");
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn generate_response_without_payload() {
        let resp: GenerateResponse = serde_json::from_value(json!({ "other": 1 })).unwrap();
        assert!(resp.payload.is_none());
    }
}
