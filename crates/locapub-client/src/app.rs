//! Composition root: wires the gateway, the session cache and the session
//! into the view controllers, and routes cross-view open requests.

use std::sync::Arc;

use tracing::{info, warn};

use locapub_net::{Endpoints, Gateway, HttpGateway};
use locapub_shared::Session;
use locapub_store::{CacheStore, MemoryStore, SqliteStore, StoreError};

use crate::campaigns::CampaignsController;
use crate::config::{CacheBackend, ClientConfig};
use crate::forms::{CampaignForm, CreationForm};
use crate::home::HomePreview;
use crate::navigator::OpenOutcome;
use crate::notice::{notice_channel, NoticeReceiver, NoticeSender};
use crate::shell::{Shell, Tab};
use crate::supports::{Mount, SupportsController};

/// Supports tab after entering it.
pub struct SupportsTab {
    pub controller: SupportsController,
    /// Background refresh started from a cached snapshot, if any.
    pub revalidation: Mount,
    /// What happened to the pending open request.
    pub opened: OpenOutcome,
}

pub struct CampaignsTab {
    pub controller: CampaignsController,
    pub opened: OpenOutcome,
}

pub struct App {
    gateway: Arc<dyn Gateway>,
    cache: Arc<dyn CacheStore>,
    session: Session,
    shell: Shell,
    notices: NoticeSender,
}

impl App {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        cache: Arc<dyn CacheStore>,
        session: Session,
    ) -> (Self, NoticeReceiver) {
        let (notices, rx) = notice_channel();
        let app = Self {
            gateway,
            cache,
            session,
            shell: Shell::new(),
            notices,
        };
        (app, rx)
    }

    /// Build the HTTP gateway and the configured cache backend.
    pub fn from_config(config: &ClientConfig) -> Result<(Self, NoticeReceiver), StoreError> {
        let gateway = HttpGateway::new(Endpoints::new(config.api_base_url.as_str()));
        let cache: Arc<dyn CacheStore> = match &config.cache {
            CacheBackend::Memory => Arc::new(MemoryStore::with_quota(config.cache_quota_bytes)),
            CacheBackend::Sqlite { path } => {
                let store = match path {
                    Some(path) => SqliteStore::open_session(path, config.cache_quota_bytes)?,
                    None => SqliteStore::open_default(config.cache_quota_bytes)?,
                };
                if let Err(e) = store.purge_other_sessions() {
                    warn!(error = %e, "Failed to purge stale cache sessions");
                }
                Arc::new(store)
            }
        };

        info!(
            api = %config.api_base_url,
            user = %config.user,
            cache = ?config.cache,
            "Locapub client ready"
        );
        Ok(Self::new(Arc::new(gateway), cache, Session::new(config.user.as_str())))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    pub fn notices(&self) -> NoticeSender {
        self.notices.clone()
    }

    pub async fn enter_home(&mut self) -> HomePreview {
        self.shell.select(Tab::Home);
        let home = HomePreview::new(self.gateway.clone(), self.session.clone());
        home.load().await;
        home
    }

    /// Mount the supports list, then hand it the pending open request.
    pub async fn enter_supports(&mut self) -> SupportsTab {
        self.shell.select(Tab::Supports);
        let controller =
            SupportsController::new(self.gateway.clone(), self.cache.clone(), self.session.clone());
        let revalidation = controller.mount().await;
        let opened = controller.apply_open_request(self.shell.navigator_mut().take_support());
        SupportsTab {
            controller,
            revalidation,
            opened,
        }
    }

    /// Load the campaigns list, then hand it the pending focus request.
    pub async fn enter_campaigns(&mut self) -> CampaignsTab {
        self.shell.select(Tab::Campaigns);
        let controller =
            CampaignsController::new(self.gateway.clone(), self.session.clone(), self.notices());
        controller.load().await;
        let opened = controller.apply_open_request(self.shell.navigator_mut().take_campaign());
        CampaignsTab { controller, opened }
    }

    pub fn enter_creation(&mut self) -> CreationForm {
        self.shell.select(Tab::CreateSupport);
        CreationForm::new(self.gateway.clone(), self.session.clone())
    }

    pub fn enter_campaign_creation(&mut self) -> CampaignForm {
        self.shell.select(Tab::CreateCampaign);
        CampaignForm::new(self.gateway.clone(), self.session.clone())
    }
}

#[cfg(test)]
mod tests {
    use locapub_shared::{CampaignId, SupportId};

    use super::*;
    use crate::testing::{campaign, support, ScriptedGateway};

    fn app(gateway: &Arc<ScriptedGateway>) -> (App, NoticeReceiver) {
        App::new(
            gateway.clone(),
            Arc::new(MemoryStore::new()),
            Session::default(),
        )
    }

    #[tokio::test]
    async fn home_tile_opens_support_in_its_tab() {
        let gateway = ScriptedGateway::with_supports(vec![support("s1", "Affiche")]);
        let (mut app, _rx) = app(&gateway);

        let home = app.enter_home().await;
        home.activate_support_tile(&SupportId::from("s1"), app.shell_mut());
        drop(home);

        let tab = app.enter_supports().await;
        assert_eq!(tab.opened, OpenOutcome::Opened);
        assert_eq!(tab.controller.view().edit.unwrap().support.id, SupportId::from("s1"));
        assert!(app.shell().navigator().pending_support().is_none());
    }

    #[tokio::test]
    async fn stale_request_is_consumed_once() {
        let gateway = ScriptedGateway::new();
        gateway.set_campaigns(vec![campaign("c1", "s1")]);
        let (mut app, _rx) = app(&gateway);
        app.shell_mut().open_campaign(CampaignId::from("deleted"));

        let tab = app.enter_campaigns().await;
        assert_eq!(tab.opened, OpenOutcome::NotFound);
        assert!(tab.controller.view().highlighted.is_none());
        drop(tab);

        let tab = app.enter_campaigns().await;
        assert_eq!(tab.opened, OpenOutcome::NoRequest);
        assert_eq!(app.shell().active(), Tab::Campaigns);
    }

    #[tokio::test]
    async fn second_visit_serves_cached_supports() {
        let gateway = ScriptedGateway::with_supports(vec![support("s1", "Affiche")]);
        let (mut app, _rx) = app(&gateway);

        let first = app.enter_supports().await;
        assert!(matches!(first.revalidation, Mount::Fetched));
        drop(first);

        let second = app.enter_supports().await;
        assert!(matches!(second.revalidation, Mount::FromCache(_)));
        assert_eq!(second.controller.view().items.len(), 1);
        second.revalidation.settled().await;
    }

    #[tokio::test]
    async fn new_support_tile_opens_after_cached_visit() {
        let gateway = ScriptedGateway::with_supports(vec![support("s1", "Affiche")]);
        let (mut app, _rx) = app(&gateway);
        drop(app.enter_supports().await);

        gateway.set_supports(vec![support("s1", "Affiche"), support("s2", "Spot radio")]);
        let home = app.enter_home().await;
        home.activate_support_tile(&SupportId::from("s2"), app.shell_mut());
        drop(home);

        let tab = app.enter_supports().await;
        assert!(matches!(tab.revalidation, Mount::FromCache(_)));
        assert_eq!(tab.opened, OpenOutcome::Deferred);
        assert!(app.shell().navigator().pending_support().is_none());

        tab.revalidation.settled().await;
        assert_eq!(tab.controller.view().edit.unwrap().support.id, SupportId::from("s2"));
    }

    #[test]
    fn memory_config_builds_app() {
        let config = ClientConfig {
            user: "Camille".into(),
            ..ClientConfig::default()
        };
        let (app, _rx) = App::from_config(&config).unwrap();
        assert_eq!(app.session().owner.as_str(), "Camille");
        assert_eq!(app.shell().active(), Tab::Home);
    }
}
