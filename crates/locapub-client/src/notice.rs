//! User-facing messages.
//!
//! [`ActionError`] is the text a view shows next to the action that failed.
//! [`Notice`] is a one-shot message (an alert) pushed to the UI over a
//! channel, used where no view owns the outcome.

use std::fmt;

use tokio::sync::mpsc;

use locapub_shared::{GatewayError, ValidationError};

/// The user action an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    LoadSupports,
    LoadCampaigns,
    LoadPreview,
    ModifySupport,
    DeleteSupport,
    GenerateContent,
    SaveSupport,
    SaveCampaign,
    DistributeCampaign,
}

impl Action {
    fn failure_prefix(&self) -> &'static str {
        match self {
            Action::LoadSupports => "Erreur lors du chargement des supports",
            Action::LoadCampaigns => "Erreur lors du chargement des campagnes",
            Action::LoadPreview => "Erreur lors du chargement de l'aperçu",
            Action::ModifySupport => "Erreur lors de la modification",
            Action::DeleteSupport => "Erreur lors de la suppression",
            Action::GenerateContent => "Erreur lors de la génération",
            Action::SaveSupport => "Erreur lors de l'enregistrement",
            Action::SaveCampaign => "Échec de l'enregistrement de la campagne",
            Action::DistributeCampaign => "Erreur lors de la diffusion de la campagne",
        }
    }
}

/// A failure scoped to one user action.
///
/// `message` is the resolved cause (e.g. the backend's `message` field);
/// `Display` adds the action prefix, except for validation failures which
/// read on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    pub action: Action,
    pub message: String,
    pub validation: bool,
}

impl ActionError {
    pub fn gateway(action: Action, err: &GatewayError) -> Self {
        Self {
            action,
            message: err.to_string(),
            validation: false,
        }
    }

    pub fn validation(action: Action, err: &ValidationError) -> Self {
        Self {
            action,
            message: err.to_string(),
            validation: true,
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.validation {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.action.failure_prefix(), self.message)
        }
    }
}

impl std::error::Error for ActionError {}

/// Outcome message of a form submission. Success and error exclude each
/// other by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMessage {
    Success(String),
    Error(ActionError),
}

impl FormMessage {
    pub fn is_error(&self) -> bool {
        matches!(self, FormMessage::Error(_))
    }

    pub fn text(&self) -> String {
        match self {
            FormMessage::Success(text) => text.clone(),
            FormMessage::Error(err) => err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(err: &ActionError) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: err.to_string(),
        }
    }
}

pub type NoticeSender = mpsc::UnboundedSender<Notice>;
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::unbounded_channel()
}

pub fn emit_notice(tx: &NoticeSender, notice: Notice) {
    if let Err(e) = tx.send(notice) {
        tracing::debug!(text = %e.0.text, "No UI listening for notices");
    }
}
