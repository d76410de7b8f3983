//! Cross-view "open this item when you land on tab X" requests.
//!
//! A request is a one-shot command: the destination view takes it after its
//! own collection has loaded, and taking it clears it whether or not the item
//! is found.

use locapub_shared::{CampaignId, SupportId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    support: Option<SupportId>,
    campaign: Option<CampaignId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any support request not yet taken.
    pub fn request_support(&mut self, id: SupportId) {
        tracing::debug!(support = %id, "pending open: support");
        self.support = Some(id);
    }

    pub fn request_campaign(&mut self, id: CampaignId) {
        tracing::debug!(campaign = %id, "pending open: campaign");
        self.campaign = Some(id);
    }

    pub fn take_support(&mut self) -> Option<SupportId> {
        self.support.take()
    }

    pub fn take_campaign(&mut self) -> Option<CampaignId> {
        self.campaign.take()
    }

    pub fn pending_support(&self) -> Option<&SupportId> {
        self.support.as_ref()
    }

    pub fn pending_campaign(&self) -> Option<&CampaignId> {
        self.campaign.as_ref()
    }
}

/// What a destination view did with a request it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// The item is not in the loaded collection; the request is dropped.
    NotFound,
    /// The item is not in the cached snapshot; it opens when the background
    /// refresh brings it.
    Deferred,
    NoRequest,
}
