use std::sync::Arc;

use tracing::debug;

use locapub_net::Gateway;
use locapub_shared::{Session, Support, SupportId};

use crate::notice::{Action, ActionError};

/// Read-only list of supports to pick one from.
///
/// Every open fetches fresh; the session cache is never consulted. The
/// picker is consumed by choosing or closing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportPicker {
    pub supports: Vec<Support>,
    pub error: Option<ActionError>,
}

impl SupportPicker {
    pub async fn open(gateway: &Arc<dyn Gateway>, session: &Session) -> Self {
        match gateway.list_supports(session).await {
            Ok(supports) => {
                debug!(count = supports.len(), "Support picker loaded");
                Self {
                    supports,
                    error: None,
                }
            }
            Err(e) => Self {
                supports: Vec::new(),
                error: Some(ActionError::gateway(Action::LoadSupports, &e)),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.supports.is_empty() && self.error.is_none()
    }

    /// Close the picker with `id` selected, if it is listed.
    pub fn choose(self, id: &SupportId) -> Option<Support> {
        self.supports.into_iter().find(|s| &s.id == id)
    }

    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{status_error, support, Call, ScriptedGateway};

    #[tokio::test]
    async fn each_open_fetches() {
        let scripted = ScriptedGateway::with_supports(vec![support("s1", "Affiche")]);
        let gateway: Arc<dyn Gateway> = scripted.clone();

        SupportPicker::open(&gateway, &Session::default()).await.close();
        let picker = SupportPicker::open(&gateway, &Session::default()).await;

        assert_eq!(scripted.count(|c| matches!(c, Call::ListSupports)), 2);
        let chosen = picker.choose(&SupportId::from("s1")).unwrap();
        assert_eq!(chosen.title, "Affiche");
    }

    #[tokio::test]
    async fn error_and_empty_states() {
        let scripted = ScriptedGateway::new();
        scripted.push_supports_reply(Err(status_error(500, "boom")));
        let gateway: Arc<dyn Gateway> = scripted.clone();

        let picker = SupportPicker::open(&gateway, &Session::default()).await;
        assert_eq!(
            picker.error.as_ref().unwrap().to_string(),
            "Erreur lors du chargement des supports: boom"
        );
        assert!(!picker.is_empty());

        let picker = SupportPicker::open(&gateway, &Session::default()).await;
        assert!(picker.is_empty());
        assert!(picker.choose(&SupportId::from("s1")).is_none());
    }
}
