use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{CATEGORY_CAMPAIGN, CATEGORY_SUPPORT, DEFAULT_OWNER};

// Server-assigned support identifier (`_id` on the wire)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SupportId(pub String);

impl SupportId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SupportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SupportId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct CampaignId(pub String);

impl CampaignId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Owner of records (`User` on the wire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Owner(pub String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user context threaded into every gateway call.
///
/// Built once at the composition root; nothing below it reads a global
/// user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub owner: Owner,
}

impl Session {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: Owner(owner.into()),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER)
    }
}

/// Media type of a support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportKind {
    Image,
    #[serde(rename = "Texte")]
    Text,
    Audio,
    /// Any value the backend sends that this client does not know.
    #[serde(other)]
    Unknown,
}

impl SupportKind {
    /// Kinds a user can ask the backend to generate.
    pub const SELECTABLE: [SupportKind; 3] = [SupportKind::Image, SupportKind::Text, SupportKind::Audio];

    pub fn label(&self) -> &'static str {
        match self {
            SupportKind::Image => "Image",
            SupportKind::Text => "Texte",
            SupportKind::Audio => "Audio",
            SupportKind::Unknown => "Inconnu",
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, SupportKind::Unknown)
    }
}

/// Distribution channel of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Email,
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "Réseaux sociaux")]
    SocialNetworks,
    #[serde(other)]
    Unknown,
}

impl Channel {
    pub const SELECTABLE: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::SocialNetworks];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::Sms => "SMS",
            Channel::SocialNetworks => "Réseaux sociaux",
            Channel::Unknown => "Inconnu",
        }
    }

    pub fn is_selectable(&self) -> bool {
        !matches!(self, Channel::Unknown)
    }
}

fn support_category() -> String {
    CATEGORY_SUPPORT.to_string()
}

fn campaign_category() -> String {
    CATEGORY_CAMPAIGN.to_string()
}

/// Reads a timestamp, mapping anything that is not an RFC 3339 string to
/// `None` so one odd record cannot fail a whole collection.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// A generated communication artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Support {
    #[serde(rename = "_id")]
    pub id: SupportId,
    #[serde(rename = "User", default)]
    pub owner: Owner,
    #[serde(rename = "Catégorie", default = "support_category")]
    pub category: String,
    #[serde(rename = "Type")]
    pub kind: SupportKind,
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    /// Inline text, or a base64 data URI for image and audio.
    #[serde(rename = "Contenu", default)]
    pub content: String,
    #[serde(
        rename = "createdAt",
        alias = "CreatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        alias = "UpdatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A distribution record pairing one support with a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    #[serde(rename = "User", default)]
    pub owner: Owner,
    #[serde(rename = "Catégorie", default = "campaign_category")]
    pub category: String,
    #[serde(rename = "Type")]
    pub channel: Channel,
    #[serde(rename = "Titre")]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    /// Weak reference: the support may no longer exist.
    #[serde(rename = "Support")]
    pub support_id: SupportId,
    #[serde(
        rename = "createdAt",
        alias = "CreatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        alias = "UpdatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn support_reads_backend_keys() {
        let raw = json!({
            "_id": "s1",
            "User": "Alexis",
            "Catégorie": "Support",
            "Type": "Texte",
            "Titre": "Promo",
            "Description": "Fin d'année",
            "Contenu": "Profitez de -20%",
            "createdAt": "2025-06-26T10:00:00Z",
            "updatedAt": "not a date"
        });

        let support: Support = serde_json::from_value(raw).unwrap();
        assert_eq!(support.id, SupportId::from("s1"));
        assert_eq!(support.kind, SupportKind::Text);
        assert_eq!(support.owner.as_str(), "Alexis");
        assert!(support.created_at.is_some());
        assert!(support.updated_at.is_none());
    }

    #[test]
    fn support_tolerates_unknown_kind_and_missing_fields() {
        let raw = json!({ "_id": "s2", "Type": "Video", "Titre": "Clip" });

        let support: Support = serde_json::from_value(raw).unwrap();
        assert_eq!(support.kind, SupportKind::Unknown);
        assert_eq!(support.category, "Support");
        assert!(support.content.is_empty());
    }

    #[test]
    fn campaign_accepts_capitalised_timestamps() {
        let raw = json!({
            "_id": "c1",
            "User": "Alexis",
            "Type": "Réseaux sociaux",
            "Titre": "Soldes",
            "Description": "Été",
            "Support": "s1",
            "CreatedAt": "2025-06-26T10:00:00+02:00"
        });

        let campaign: Campaign = serde_json::from_value(raw).unwrap();
        assert_eq!(campaign.channel, Channel::SocialNetworks);
        assert_eq!(campaign.support_id.as_str(), "s1");
        assert_eq!(campaign.category, "Campaign");
        assert!(campaign.created_at.is_some());
    }

    #[test]
    fn channel_wire_names() {
        assert_eq!(serde_json::to_value(Channel::Sms).unwrap(), json!("SMS"));
        assert_eq!(
            serde_json::to_value(Channel::SocialNetworks).unwrap(),
            json!("Réseaux sociaux")
        );
        assert_eq!(serde_json::to_value(SupportKind::Text).unwrap(), json!("Texte"));
    }

    #[test]
    fn default_session_uses_default_owner() {
        assert_eq!(Session::default().owner.as_str(), DEFAULT_OWNER);
    }
}
