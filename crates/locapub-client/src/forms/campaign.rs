//! Campaign creation: brief, channel and one existing support.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use locapub_net::Gateway;
use locapub_shared::protocol::NewCampaign;
use locapub_shared::{Channel, Field, Session, Support, ValidationError};

use super::{filled, FormPhase, SupportPicker};
use crate::lifetime::Lifetime;
use crate::notice::{Action, ActionError, FormMessage};

pub const SAVED_MESSAGE: &str = "Votre campagne a été enregistrée avec succès !";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignState {
    pub title: String,
    pub description: String,
    pub channel: Option<Channel>,
    pub support: Option<Support>,
    pub submitting: bool,
    pub message: Option<FormMessage>,
}

impl CampaignState {
    pub fn missing_fields(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        if !filled(&self.title) {
            missing.push(Field::Title);
        }
        if !filled(&self.description) {
            missing.push(Field::Description);
        }
        if self.channel.is_none() {
            missing.push(Field::Channel);
        }
        if self.support.is_none() {
            missing.push(Field::Support);
        }
        missing
    }

    pub fn phase(&self) -> FormPhase {
        FormPhase::of(!self.missing_fields().is_empty(), self.submitting)
    }

    pub fn can_submit(&self) -> bool {
        self.phase() == FormPhase::Valid
    }
}

pub struct CampaignForm {
    gateway: Arc<dyn Gateway>,
    session: Session,
    lifetime: Lifetime,
    state: Mutex<CampaignState>,
}

impl CampaignForm {
    pub fn new(gateway: Arc<dyn Gateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            lifetime: Lifetime::new(),
            state: Mutex::new(CampaignState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CampaignState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn edit(&self, f: impl FnOnce(&mut CampaignState)) {
        let mut state = self.lock();
        f(&mut state);
        state.message = None;
    }

    pub fn state(&self) -> CampaignState {
        self.lock().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.edit(|state| state.title = title);
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.edit(|state| state.description = description);
    }

    pub fn set_channel(&self, channel: Channel) {
        self.edit(|state| state.channel = channel.is_selectable().then_some(channel));
    }

    /// Fetch the supports to choose from.
    pub async fn open_picker(&self) -> SupportPicker {
        SupportPicker::open(&self.gateway, &self.session).await
    }

    pub fn select_support(&self, support: Support) {
        self.edit(|state| state.support = Some(support));
    }

    pub fn clear_support(&self) {
        self.edit(|state| state.support = None);
    }

    pub fn unmount(&self) {
        self.lifetime.end();
    }

    /// Insert the campaign. Clears the form on success.
    pub async fn submit(&self) -> Result<(), ActionError> {
        let campaign = {
            let mut state = self.lock();
            let refusal = if state.submitting {
                Some(ValidationError::Busy)
            } else {
                let missing = state.missing_fields();
                (!missing.is_empty()).then_some(ValidationError::Incomplete { missing })
            };
            if let Some(refusal) = refusal {
                let err = ActionError::validation(Action::SaveCampaign, &refusal);
                state.message = Some(FormMessage::Error(err.clone()));
                return Err(err);
            }
            let (Some(channel), Some(support)) = (state.channel, state.support.as_ref()) else {
                return Ok(());
            };
            let campaign = NewCampaign::new(
                &self.session,
                channel,
                state.title.trim(),
                state.description.trim(),
                support.id.clone(),
                Utc::now(),
            );
            state.submitting = true;
            state.message = None;
            campaign
        };

        let Some(result) = self
            .lifetime
            .guard(self.gateway.insert_campaign(&campaign))
            .await
        else {
            return Ok(());
        };

        let mut state = self.lock();
        match result {
            Ok(()) => {
                info!(
                    title = %campaign.title,
                    support = %campaign.support_id,
                    channel = campaign.channel.label(),
                    "Campaign saved"
                );
                *state = CampaignState {
                    message: Some(FormMessage::Success(SAVED_MESSAGE.to_string())),
                    ..CampaignState::default()
                };
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save campaign");
                let err = ActionError::gateway(Action::SaveCampaign, &e);
                state.submitting = false;
                state.message = Some(FormMessage::Error(err.clone()));
                Err(err)
            }
        }
    }
}

impl Drop for CampaignForm {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}
