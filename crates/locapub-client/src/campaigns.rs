//! "Mes campagnes" view controller: campaign list, support lookup and
//! per-campaign distribution.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use locapub_net::{DistributionReceipt, Gateway};
use locapub_shared::protocol::DistributeRequest;
use locapub_shared::{Campaign, CampaignId, GatewayError, Session, Support, SupportId};

use crate::lifetime::Lifetime;
use crate::navigator::OpenOutcome;
use crate::notice::{emit_notice, Action, ActionError, Notice, NoticeSender};
use crate::shell::Tab;

pub const DISTRIBUTED_MESSAGE: &str = "Campagne diffusée avec succès !";

/// How long a focused campaign stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// The support a campaign points at, as far as this view knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportLink<'a> {
    Found(&'a Support),
    /// Deleted, or the supports lookup could not be loaded.
    Missing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignsView {
    pub campaigns: Vec<Campaign>,
    pub supports: HashMap<SupportId, Support>,
    pub loading: bool,
    pub error: Option<ActionError>,
    pub highlighted: Option<CampaignId>,
    /// Campaigns with a distribution in flight.
    pub distributing: HashSet<CampaignId>,
}

impl CampaignsView {
    pub fn support_for(&self, campaign: &Campaign) -> SupportLink<'_> {
        match self.supports.get(&campaign.support_id) {
            Some(support) => SupportLink::Found(support),
            None => SupportLink::Missing,
        }
    }

    pub fn is_distributing(&self, id: &CampaignId) -> bool {
        self.distributing.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty() && !self.loading && self.error.is_none()
    }

    pub fn empty_state_target(&self) -> Option<Tab> {
        self.is_empty().then_some(Tab::CreateCampaign)
    }

    pub fn find(&self, id: &CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| &c.id == id)
    }
}

/// Supports list where an unparseable body counts as empty. Views that only
/// use supports as a lookup go on without them.
pub(crate) fn lenient_supports(
    result: Result<Vec<Support>, GatewayError>,
) -> Result<Vec<Support>, GatewayError> {
    match result {
        Err(e) if e.is_malformed_json() => {
            warn!(error = %e, "Supports lookup unreadable, continuing without it");
            Ok(Vec::new())
        }
        other => other,
    }
}

pub(crate) fn index_supports(supports: &[Support]) -> HashMap<SupportId, Support> {
    supports.iter().map(|s| (s.id.clone(), s.clone())).collect()
}

struct Inner {
    gateway: Arc<dyn Gateway>,
    session: Session,
    notices: NoticeSender,
    lifetime: Lifetime,
    state: Mutex<CampaignsView>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CampaignsView> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut CampaignsView)) -> bool {
        if !self.lifetime.is_alive() {
            return false;
        }
        f(&mut self.lock());
        true
    }

    async fn distribute(&self, campaign: Campaign) {
        let request = DistributeRequest::for_campaign(&self.session, &campaign, Utc::now());
        let Some(result) = self
            .lifetime
            .guard(self.gateway.distribute_campaign(&request))
            .await
        else {
            debug!(campaign = %campaign.id, "Distribution outcome dropped after unmount");
            return;
        };

        let notice = match result {
            Ok(receipt) => {
                match &receipt {
                    DistributionReceipt::Confirmed(body) => {
                        info!(campaign = %campaign.id, body = %body, "Campaign distributed")
                    }
                    _ => info!(campaign = %campaign.id, "Campaign distributed"),
                }
                Notice::success(DISTRIBUTED_MESSAGE)
            }
            Err(e) => {
                warn!(campaign = %campaign.id, error = %e, "Failed to distribute campaign");
                Notice::error(&ActionError::gateway(Action::DistributeCampaign, &e))
            }
        };

        if self.update(|view| {
            view.distributing.remove(&campaign.id);
        }) {
            emit_notice(&self.notices, notice);
        }
    }
}

/// Controller behind the campaigns list. Dropping it unmounts it.
pub struct CampaignsController {
    inner: Arc<Inner>,
}

impl CampaignsController {
    pub fn new(gateway: Arc<dyn Gateway>, session: Session, notices: NoticeSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                session,
                notices,
                lifetime: Lifetime::new(),
                state: Mutex::new(CampaignsView::default()),
            }),
        }
    }

    /// Load campaigns, then the supports they reference.
    pub async fn load(&self) {
        let inner = &self.inner;
        if !inner.update(|view| {
            view.loading = true;
            view.error = None;
        }) {
            return;
        }

        let Some(campaigns) = inner
            .lifetime
            .guard(inner.gateway.list_campaigns(&inner.session))
            .await
        else {
            return;
        };
        let campaigns = match campaigns {
            Ok(campaigns) => campaigns,
            Err(e) => {
                warn!(error = %e, "Failed to fetch campaigns");
                inner.update(|view| {
                    view.error = Some(ActionError::gateway(Action::LoadCampaigns, &e));
                    view.loading = false;
                });
                return;
            }
        };
        debug!(count = campaigns.len(), "Campaigns fetched");
        inner.update(|view| view.campaigns = campaigns);

        let Some(supports) = inner
            .lifetime
            .guard(inner.gateway.list_supports(&inner.session))
            .await
        else {
            return;
        };
        match lenient_supports(supports) {
            Ok(supports) => {
                let map = index_supports(&supports);
                inner.update(|view| {
                    view.supports = map;
                    view.loading = false;
                });
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch supports for campaigns");
                inner.update(|view| {
                    view.error = Some(ActionError::gateway(Action::LoadCampaigns, &e));
                    view.loading = false;
                });
            }
        }
    }

    pub fn unmount(&self) {
        self.inner.lifetime.end();
    }

    pub fn view(&self) -> CampaignsView {
        self.inner.lock().clone()
    }

    pub fn is_distributing(&self, id: &CampaignId) -> bool {
        self.inner.lock().is_distributing(id)
    }

    /// Handle a cross-view open request taken after the list loaded.
    pub fn apply_open_request(&self, request: Option<CampaignId>) -> OpenOutcome {
        match request {
            Some(id) => self.focus(&id),
            None => OpenOutcome::NoRequest,
        }
    }

    /// Highlight `id` for [`HIGHLIGHT_DURATION`].
    pub fn focus(&self, id: &CampaignId) -> OpenOutcome {
        {
            let mut view = self.inner.lock();
            if view.find(id).is_none() {
                debug!(campaign = %id, "Focus request for unknown campaign dropped");
                return OpenOutcome::NotFound;
            }
            view.highlighted = Some(id.clone());
        }

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            let id = id.clone();
            runtime.spawn(async move {
                if inner.lifetime.guard(tokio::time::sleep(HIGHLIGHT_DURATION)).await.is_some() {
                    inner.update(|view| {
                        if view.highlighted.as_ref() == Some(&id) {
                            view.highlighted = None;
                        }
                    });
                }
            });
        }
        OpenOutcome::Opened
    }

    pub fn clear_highlight(&self) {
        self.inner.lock().highlighted = None;
    }

    /// Start distributing `id` in the background.
    ///
    /// Each campaign has its own in-flight flag; a second request for a
    /// campaign already in flight, or for an unknown one, is ignored and
    /// returns `None`, as is a call made outside a tokio runtime. The outcome
    /// is reported on the notice channel.
    pub fn distribute(&self, id: &CampaignId) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(campaign = %id, error = %e, "Distribution requested outside a runtime");
                return None;
            }
        };
        let campaign = {
            let mut view = self.inner.lock();
            let campaign = match view.find(id) {
                Some(campaign) => campaign.clone(),
                None => {
                    warn!(campaign = %id, "Distribution requested for unknown campaign");
                    return None;
                }
            };
            if !view.distributing.insert(id.clone()) {
                debug!(campaign = %id, "Distribution already in flight");
                return None;
            }
            campaign
        };

        info!(campaign = %id, channel = campaign.channel.label(), "Distributing campaign");
        let inner = Arc::clone(&self.inner);
        Some(runtime.spawn(async move { inner.distribute(campaign).await }))
    }
}

impl Drop for CampaignsController {
    fn drop(&mut self) {
        self.inner.lifetime.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{notice_channel, NoticeLevel};
    use crate::testing::{campaign, status_error, support, Call, ScriptedGateway};

    async fn loaded(gateway: &Arc<ScriptedGateway>) -> (CampaignsController, crate::NoticeReceiver) {
        let (tx, rx) = notice_channel();
        let ctrl = CampaignsController::new(gateway.clone(), Session::default(), tx);
        ctrl.load().await;
        (ctrl, rx)
    }

    #[tokio::test]
    async fn loads_campaigns_then_supports() {
        let gateway = ScriptedGateway::with_supports(vec![support("s1", "Affiche")]);
        gateway.set_campaigns(vec![campaign("c1", "s1"), campaign("c2", "gone")]);
        let (ctrl, _rx) = loaded(&gateway).await;

        assert_eq!(gateway.calls(), vec![Call::ListCampaigns, Call::ListSupports]);
        let view = ctrl.view();
        assert!(!view.loading);
        assert!(matches!(
            view.support_for(&view.campaigns[0]),
            SupportLink::Found(s) if s.title == "Affiche"
        ));
        assert_eq!(view.support_for(&view.campaigns[1]), SupportLink::Missing);
    }

    #[tokio::test]
    async fn unreadable_supports_body_leaves_empty_lookup() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        gateway.push_supports_reply(Err(GatewayError::MalformedJson {
            detail: "expected value".into(),
        }));
        let (ctrl, _rx) = loaded(&gateway).await;

        let view = ctrl.view();
        assert!(view.error.is_none());
        assert!(view.supports.is_empty());
        assert_eq!(view.campaigns.len(), 1);
    }

    #[tokio::test]
    async fn supports_status_error_fails_the_load() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        gateway.push_supports_reply(Err(status_error(502, "passerelle")));
        let (ctrl, _rx) = loaded(&gateway).await;

        let view = ctrl.view();
        assert_eq!(
            view.error.unwrap().to_string(),
            "Erreur lors du chargement des campagnes: passerelle"
        );
        assert_eq!(view.campaigns.len(), 1);
    }

    #[tokio::test]
    async fn campaign_error_skips_supports() {
        let gateway = ScriptedGateway::new();
        gateway.push_campaigns_reply(Err(status_error(500, "boom")));
        let (ctrl, _rx) = loaded(&gateway).await;

        assert_eq!(gateway.calls(), vec![Call::ListCampaigns]);
        assert_eq!(ctrl.view().error.unwrap().message, "boom");
    }

    #[tokio::test]
    async fn focus_highlights_known_campaign_only() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        let (ctrl, _rx) = loaded(&gateway).await;

        assert_eq!(
            ctrl.apply_open_request(Some(CampaignId::from("zzz"))),
            OpenOutcome::NotFound
        );
        assert!(ctrl.view().highlighted.is_none());

        assert_eq!(ctrl.focus(&CampaignId::from("c1")), OpenOutcome::Opened);
        assert_eq!(ctrl.view().highlighted, Some(CampaignId::from("c1")));
    }

    #[tokio::test]
    async fn distribution_flags_are_independent() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1"), campaign("c2", "s2")]);
        let (ctrl, mut rx) = loaded(&gateway).await;
        let c1 = CampaignId::from("c1");
        let c2 = CampaignId::from("c2");
        let gate1 = gateway.gate_distribution(&c1);
        let gate2 = gateway.gate_distribution(&c2);

        let h1 = ctrl.distribute(&c1).unwrap();
        let h2 = ctrl.distribute(&c2).unwrap();
        assert!(ctrl.is_distributing(&c1));
        assert!(ctrl.is_distributing(&c2));
        assert!(ctrl.distribute(&c1).is_none());

        gate1.send(Ok(DistributionReceipt::Empty)).unwrap();
        h1.await.unwrap();
        assert!(!ctrl.is_distributing(&c1));
        assert!(ctrl.is_distributing(&c2));
        assert_eq!(rx.recv().await, Some(Notice::success(DISTRIBUTED_MESSAGE)));

        gate2.send(Err(status_error(500, "canal indisponible"))).unwrap();
        h2.await.unwrap();
        assert!(!ctrl.is_distributing(&c2));
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.ends_with("canal indisponible"));
    }

    #[tokio::test]
    async fn distribution_does_not_refetch() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        let (ctrl, _rx) = loaded(&gateway).await;

        ctrl.distribute(&CampaignId::from("c1")).unwrap().await.unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                Call::ListCampaigns,
                Call::ListSupports,
                Call::Distribute(CampaignId::from("c1")),
            ]
        );
        assert!(ctrl.distribute(&CampaignId::from("unknown")).is_none());
    }

    #[tokio::test]
    async fn no_notice_after_unmount() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        let (ctrl, mut rx) = loaded(&gateway).await;
        let c1 = CampaignId::from("c1");
        let gate = gateway.gate_distribution(&c1);

        let handle = ctrl.distribute(&c1).unwrap();
        ctrl.unmount();
        let _ = gate.send(Ok(DistributionReceipt::Empty));
        handle.await.unwrap();
        drop(ctrl);

        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn distribute_outside_runtime_is_ignored() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        let (ctrl, _rx) = runtime.block_on(loaded(&gateway));
        let c1 = CampaignId::from("c1");

        assert!(ctrl.distribute(&c1).is_none());
        assert!(!ctrl.is_distributing(&c1));
        assert_eq!(gateway.count(|c| matches!(c, Call::Distribute(_))), 0);

        runtime.block_on(async { ctrl.distribute(&c1).unwrap().await.unwrap() });
        assert_eq!(gateway.count(|c| matches!(c, Call::Distribute(_))), 1);
    }
}
