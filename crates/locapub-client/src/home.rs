//! Home tab: a short preview of the latest supports and campaigns whose
//! tiles jump to the matching item in its own tab.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use locapub_net::Gateway;
use locapub_shared::constants::PREVIEW_TILE_LIMIT;
use locapub_shared::{Campaign, CampaignId, GatewayError, Session, Support, SupportId};

use crate::campaigns::{index_supports, lenient_supports, SupportLink};
use crate::lifetime::Lifetime;
use crate::notice::{Action, ActionError};
use crate::shell::Shell;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeView {
    /// At most [`PREVIEW_TILE_LIMIT`] supports.
    pub supports: Vec<Support>,
    /// At most [`PREVIEW_TILE_LIMIT`] campaigns.
    pub campaigns: Vec<Campaign>,
    /// Every support, for campaign tiles.
    pub support_map: HashMap<SupportId, Support>,
    pub loading: bool,
    pub error: Option<ActionError>,
}

impl HomeView {
    pub fn has_content(&self) -> bool {
        !self.supports.is_empty() || !self.campaigns.is_empty()
    }

    pub fn support_for(&self, campaign: &Campaign) -> SupportLink<'_> {
        match self.support_map.get(&campaign.support_id) {
            Some(support) => SupportLink::Found(support),
            None => SupportLink::Missing,
        }
    }
}

pub struct HomePreview {
    gateway: Arc<dyn Gateway>,
    session: Session,
    lifetime: Lifetime,
    state: Mutex<HomeView>,
}

impl HomePreview {
    pub fn new(gateway: Arc<dyn Gateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            lifetime: Lifetime::new(),
            state: Mutex::new(HomeView::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HomeView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut HomeView)) {
        if self.lifetime.is_alive() {
            f(&mut self.lock());
        }
    }

    fn fail(&self, err: &GatewayError) {
        warn!(error = %err, "Failed to load home preview");
        self.update(|view| {
            view.error = Some(ActionError::gateway(Action::LoadPreview, err));
            view.loading = false;
        });
    }

    /// Load supports, then campaigns. Any failure aborts the preview.
    pub async fn load(&self) {
        self.update(|view| {
            view.loading = true;
            view.error = None;
        });

        let Some(supports) = self
            .lifetime
            .guard(self.gateway.list_supports(&self.session))
            .await
        else {
            return;
        };
        let supports = match lenient_supports(supports) {
            Ok(supports) => supports,
            Err(e) => return self.fail(&e),
        };
        let map = index_supports(&supports);
        let tiles: Vec<Support> = supports.into_iter().take(PREVIEW_TILE_LIMIT).collect();
        self.update(|view| {
            view.supports = tiles;
            view.support_map = map;
        });

        let Some(campaigns) = self
            .lifetime
            .guard(self.gateway.list_campaigns(&self.session))
            .await
        else {
            return;
        };
        match campaigns {
            Ok(mut campaigns) => {
                campaigns.truncate(PREVIEW_TILE_LIMIT);
                debug!(campaigns = campaigns.len(), "Home preview loaded");
                self.update(|view| {
                    view.campaigns = campaigns;
                    view.loading = false;
                });
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn unmount(&self) {
        self.lifetime.end();
    }

    pub fn view(&self) -> HomeView {
        self.lock().clone()
    }

    /// Jump to the supports tab with `id` queued for opening.
    pub fn activate_support_tile(&self, id: &SupportId, shell: &mut Shell) {
        shell.open_support(id.clone());
    }

    /// Jump to the campaigns tab with `id` queued for focus.
    pub fn activate_campaign_tile(&self, id: &CampaignId, shell: &mut Shell) {
        shell.open_campaign(id.clone());
    }
}

impl Drop for HomePreview {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}
