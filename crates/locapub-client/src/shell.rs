//! Tab selection. Which controller is live is decided here and nowhere else.

use locapub_shared::{CampaignId, SupportId};

use crate::navigator::Navigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Home,
    CreateSupport,
    Supports,
    CreateCampaign,
    Campaigns,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Home,
        Tab::CreateSupport,
        Tab::Supports,
        Tab::CreateCampaign,
        Tab::Campaigns,
    ];

    /// Stable identifier, e.g. for routing or persisted UI state.
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Home => "accueil",
            Tab::CreateSupport => "creation",
            Tab::Supports => "mes-supports",
            Tab::CreateCampaign => "creation-campagne",
            Tab::Campaigns => "campagnes",
        }
    }

    pub fn from_id(id: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|tab| tab.id() == id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Home => "Accueil",
            Tab::CreateSupport => "Création de support",
            Tab::Supports => "Mes supports",
            Tab::CreateCampaign => "Création de campagne",
            Tab::Campaigns => "Mes campagnes",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Shell {
    active: Tab,
    navigator: Navigator,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        if self.active != tab {
            tracing::debug!(from = self.active.id(), to = tab.id(), "tab switch");
        }
        self.active = tab;
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    /// Go to the supports tab and open `id` there once it has loaded.
    pub fn open_support(&mut self, id: SupportId) {
        self.navigator.request_support(id);
        self.select(Tab::Supports);
    }

    /// Go to the campaigns tab and focus `id` there once it has loaded.
    pub fn open_campaign(&mut self, id: CampaignId) {
        self.navigator.request_campaign(id);
        self.select(Tab::Campaigns);
    }
}
