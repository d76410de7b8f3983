//! Support creation: generate content from a brief, then save it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use locapub_net::Gateway;
use locapub_shared::content;
use locapub_shared::protocol::{GenerateRequest, NewSupport};
use locapub_shared::{Field, Session, SupportKind, ValidationError};

use super::{filled, FormPhase};
use crate::lifetime::Lifetime;
use crate::notice::{Action, ActionError, FormMessage};

pub const SAVED_MESSAGE: &str = "Votre support a été enregistré";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationState {
    pub title: String,
    pub description: String,
    pub kind: Option<SupportKind>,
    /// Storable content from the last generation, already keyed by kind.
    pub generated: Option<String>,
    pub generating: bool,
    pub saving: bool,
    pub message: Option<FormMessage>,
}

impl CreationState {
    pub fn missing_fields(&self) -> Vec<Field> {
        let mut missing = Vec::new();
        if !filled(&self.title) {
            missing.push(Field::Title);
        }
        if !filled(&self.description) {
            missing.push(Field::Description);
        }
        if self.kind.is_none() {
            missing.push(Field::Kind);
        }
        missing
    }

    pub fn phase(&self) -> FormPhase {
        FormPhase::of(!self.missing_fields().is_empty(), self.busy())
    }

    pub fn busy(&self) -> bool {
        self.generating || self.saving
    }

    pub fn can_generate(&self) -> bool {
        self.phase() == FormPhase::Valid
    }

    pub fn can_save(&self) -> bool {
        self.can_generate() && self.generated.is_some()
    }

    fn edited(&mut self) {
        self.generated = None;
        self.message = None;
    }

    fn refuse(&mut self, action: Action, err: ValidationError) -> ActionError {
        let err = ActionError::validation(action, &err);
        self.message = Some(FormMessage::Error(err.clone()));
        err
    }

    fn check(&mut self, action: Action) -> Result<SupportKind, ActionError> {
        if self.busy() {
            return Err(self.refuse(action, ValidationError::Busy));
        }
        let missing = self.missing_fields();
        let kind = self.kind;
        match kind {
            Some(kind) if missing.is_empty() => Ok(kind),
            _ => Err(self.refuse(action, ValidationError::Incomplete { missing })),
        }
    }
}

pub struct CreationForm {
    gateway: Arc<dyn Gateway>,
    session: Session,
    lifetime: Lifetime,
    state: Mutex<CreationState>,
}

impl CreationForm {
    pub fn new(gateway: Arc<dyn Gateway>, session: Session) -> Self {
        Self {
            gateway,
            session,
            lifetime: Lifetime::new(),
            state: Mutex::new(CreationState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CreationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> CreationState {
        self.lock().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let mut state = self.lock();
        state.title = title.into();
        state.edited();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        let mut state = self.lock();
        state.description = description.into();
        state.edited();
    }

    pub fn set_kind(&self, kind: SupportKind) {
        let mut state = self.lock();
        state.kind = kind.is_selectable().then_some(kind);
        state.edited();
    }

    pub fn unmount(&self) {
        self.lifetime.end();
    }

    /// Ask the backend for content matching the brief.
    ///
    /// Content arriving after the brief was edited is discarded.
    pub async fn generate(&self) -> Result<(), ActionError> {
        let request = {
            let mut state = self.lock();
            let kind = state.check(Action::GenerateContent)?;
            state.generating = true;
            state.generated = None;
            state.message = None;
            GenerateRequest {
                title: state.title.clone(),
                description: state.description.clone(),
                kind,
            }
        };

        debug!(kind = request.kind.label(), "Generating content");
        let Some(result) = self
            .lifetime
            .guard(self.gateway.generate_content(&request))
            .await
        else {
            return Ok(());
        };

        let mut state = self.lock();
        state.generating = false;
        match result {
            Ok(payload) => {
                let unchanged = state.title == request.title
                    && state.description == request.description
                    && state.kind == Some(request.kind);
                if unchanged {
                    state.generated = Some(content::from_generated(request.kind, &payload));
                } else {
                    debug!("Brief edited during generation, content discarded");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Content generation failed");
                let err = ActionError::gateway(Action::GenerateContent, &e);
                state.message = Some(FormMessage::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Save the generated support. Clears the form on success.
    pub async fn save(&self) -> Result<(), ActionError> {
        let support = {
            let mut state = self.lock();
            let kind = state.check(Action::SaveSupport)?;
            let Some(generated) = state.generated.clone() else {
                return Err(state.refuse(Action::SaveSupport, ValidationError::ContentNotGenerated));
            };
            state.saving = true;
            state.message = None;
            NewSupport::new(
                &self.session,
                kind,
                state.title.trim(),
                state.description.trim(),
                generated,
                Utc::now(),
            )
        };

        let Some(result) = self
            .lifetime
            .guard(self.gateway.insert_support(&support))
            .await
        else {
            return Ok(());
        };

        let mut state = self.lock();
        match result {
            Ok(()) => {
                info!(title = %support.title, kind = support.kind.label(), "Support saved");
                *state = CreationState {
                    message: Some(FormMessage::Success(SAVED_MESSAGE.to_string())),
                    ..CreationState::default()
                };
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save support");
                let err = ActionError::gateway(Action::SaveSupport, &e);
                state.saving = false;
                state.message = Some(FormMessage::Error(err.clone()));
                Err(err)
            }
        }
    }
}

impl Drop for CreationForm {
    fn drop(&mut self) {
        self.lifetime.end();
    }
}

#[cfg(test)]
mod tests {
    use locapub_shared::GatewayError;

    use super::*;
    use crate::testing::{status_error, Call, ScriptedGateway};

    fn filled_form(gateway: &Arc<ScriptedGateway>, kind: SupportKind) -> CreationForm {
        let form = CreationForm::new(gateway.clone(), Session::default());
        form.set_title("Soldes d'hiver");
        form.set_description("Bannière pour la vitrine");
        form.set_kind(kind);
        form
    }

    #[tokio::test]
    async fn incomplete_form_cannot_generate() {
        let gateway = ScriptedGateway::new();
        let form = CreationForm::new(gateway.clone(), Session::default());
        form.set_title("Titre");

        assert_eq!(form.state().phase(), FormPhase::Invalid);
        let err = form.generate().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Veuillez remplir tous les champs obligatoires (description, type de support)."
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn image_payload_becomes_data_uri() {
        let gateway = ScriptedGateway::new();
        gateway.set_generate_reply(Ok("iVBORw0KGgo=".into()));
        let form = filled_form(&gateway, SupportKind::Image);

        form.generate().await.unwrap();

        let state = form.state();
        assert_eq!(
            state.generated.as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
        assert!(state.can_save());
        assert!(!state.generating);
    }

    #[tokio::test]
    async fn editing_after_generation_disables_save() {
        let gateway = ScriptedGateway::new();
        let form = filled_form(&gateway, SupportKind::Text);
        form.generate().await.unwrap();
        assert!(form.state().can_save());

        form.set_description("Autre brief");

        let state = form.state();
        assert!(state.generated.is_none());
        assert!(!state.can_save());
        let err = form.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Veuillez générer du contenu avant de valider.");
        assert_eq!(gateway.count(|c| matches!(c, Call::InsertSupport(_))), 0);
    }

    #[tokio::test]
    async fn missing_payload_is_reported() {
        let gateway = ScriptedGateway::new();
        gateway.set_generate_reply(Err(GatewayError::MissingPayload));
        let form = filled_form(&gateway, SupportKind::Audio);

        let err = form.generate().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Erreur lors de la génération: La réponse de l'API ne contient pas de support valide."
        );
        assert!(form.state().generated.is_none());
    }

    #[tokio::test]
    async fn save_posts_full_record_and_clears_form() {
        let gateway = ScriptedGateway::new();
        gateway.set_generate_reply(Ok("Profitez de -50 %".into()));
        let form = filled_form(&gateway, SupportKind::Text);
        form.generate().await.unwrap();

        form.save().await.unwrap();

        let calls = gateway.calls();
        let Call::InsertSupport(saved) = &calls[1] else {
            panic!("expected insert, got {calls:?}");
        };
        assert_eq!(saved.owner.as_str(), "Alexis");
        assert_eq!(saved.category, "Support");
        assert_eq!(saved.content, "Profitez de -50 %");
        assert_eq!(saved.created_at, saved.updated_at);

        let state = form.state();
        assert_eq!(state.title, "");
        assert_eq!(state.kind, None);
        assert_eq!(
            state.message,
            Some(FormMessage::Success(SAVED_MESSAGE.to_string()))
        );
        assert_eq!(state.phase(), FormPhase::Invalid);
    }

    #[tokio::test]
    async fn failed_save_keeps_fields() {
        let gateway = ScriptedGateway::new();
        gateway.fail_writes(status_error(413, "trop volumineux"));
        let form = filled_form(&gateway, SupportKind::Text);
        form.generate().await.unwrap();

        let err = form.save().await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur lors de l'enregistrement: trop volumineux");

        let state = form.state();
        assert_eq!(state.title, "Soldes d'hiver");
        assert!(state.generated.is_some());
        assert_eq!(state.phase(), FormPhase::Valid);

        form.set_title("Soldes d'été");
        assert!(form.state().message.is_none());
    }

    #[test]
    fn unknown_kind_is_not_a_selection() {
        let gateway = ScriptedGateway::new();
        let form = CreationForm::new(gateway, Session::default());
        form.set_kind(SupportKind::Unknown);
        assert_eq!(form.state().missing_fields().last(), Some(&Field::Kind));
    }
}
