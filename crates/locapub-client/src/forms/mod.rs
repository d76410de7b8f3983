//! Creation forms and the support picker.
//!
//! A form is `Invalid` until every required field is filled, `Valid` after
//! that and `Submitting` while a remote call runs. Submitting an invalid or
//! busy form is refused with a [`ValidationError`] and makes no remote call.
//! Any field change clears the outcome message.
//!
//! [`ValidationError`]: locapub_shared::ValidationError

pub mod campaign;
pub mod creation;
pub mod picker;

pub use campaign::CampaignForm;
pub use creation::CreationForm;
pub use picker::SupportPicker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Invalid,
    Valid,
    Submitting,
}

impl FormPhase {
    pub(crate) fn of(missing_any: bool, busy: bool) -> Self {
        if busy {
            FormPhase::Submitting
        } else if missing_any {
            FormPhase::Invalid
        } else {
            FormPhase::Valid
        }
    }
}

/// A text input counts as filled once trimmed.
pub(crate) fn filled(text: &str) -> bool {
    !text.trim().is_empty()
}
