//! In-crate fake gateway for controller tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use locapub_net::{DistributionReceipt, Gateway};
use locapub_shared::protocol::{
    DeleteSupportRequest, DistributeRequest, GenerateRequest, ModifySupportRequest, NewCampaign,
    NewSupport,
};
use locapub_shared::{
    Campaign, CampaignId, Channel, GatewayError, Owner, Session, Support, SupportId, SupportKind,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Generate(GenerateRequest),
    InsertSupport(NewSupport),
    ListSupports,
    ModifySupport(ModifySupportRequest),
    DeleteSupport(SupportId),
    InsertCampaign(NewCampaign),
    ListCampaigns,
    Distribute(CampaignId),
}

type DistributionReply = Result<DistributionReceipt, GatewayError>;

/// Records every call and answers from a script.
///
/// List calls pop scripted replies first and fall back to the current
/// collection. Distribution and list calls can be held open until the test
/// releases them.
#[derive(Default)]
pub struct ScriptedGateway {
    calls: Mutex<Vec<Call>>,
    supports: Mutex<Vec<Support>>,
    support_replies: Mutex<VecDeque<Result<Vec<Support>, GatewayError>>>,
    campaigns: Mutex<Vec<Campaign>>,
    campaign_replies: Mutex<VecDeque<Result<Vec<Campaign>, GatewayError>>>,
    generate_reply: Mutex<Option<Result<String, GatewayError>>>,
    write_failure: Mutex<Option<GatewayError>>,
    list_hold: Mutex<Option<oneshot::Receiver<()>>>,
    distribution_gates: Mutex<HashMap<CampaignId, oneshot::Receiver<DistributionReply>>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_supports(supports: Vec<Support>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.supports.lock().unwrap() = supports;
        Arc::new(gateway)
    }

    pub fn set_supports(&self, supports: Vec<Support>) {
        *self.supports.lock().unwrap() = supports;
    }

    pub fn set_campaigns(&self, campaigns: Vec<Campaign>) {
        *self.campaigns.lock().unwrap() = campaigns;
    }

    pub fn push_supports_reply(&self, reply: Result<Vec<Support>, GatewayError>) {
        self.support_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_campaigns_reply(&self, reply: Result<Vec<Campaign>, GatewayError>) {
        self.campaign_replies.lock().unwrap().push_back(reply);
    }

    pub fn set_generate_reply(&self, reply: Result<String, GatewayError>) {
        *self.generate_reply.lock().unwrap() = Some(reply);
    }

    /// Every write (insert/modify/delete) fails with `err` from now on.
    pub fn fail_writes(&self, err: GatewayError) {
        *self.write_failure.lock().unwrap() = Some(err);
    }

    /// The next supports list call waits until the returned sender fires,
    /// then answers with the reply it drew when it was issued.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_hold.lock().unwrap() = Some(rx);
        tx
    }

    /// Distribution of `id` waits for the reply sent through the returned sender.
    pub fn gate_distribution(&self, id: &CampaignId) -> oneshot::Sender<DistributionReply> {
        let (tx, rx) = oneshot::channel();
        self.distribution_gates.lock().unwrap().insert(id.clone(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_result(&self) -> Result<(), GatewayError> {
        match self.write_failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        self.record(Call::Generate(request.clone()));
        self.generate_reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok("Texte généré".to_string()))
    }

    async fn insert_support(&self, support: &NewSupport) -> Result<(), GatewayError> {
        self.record(Call::InsertSupport(support.clone()));
        self.write_result()
    }

    async fn list_supports(&self, _session: &Session) -> Result<Vec<Support>, GatewayError> {
        self.record(Call::ListSupports);
        let scripted = self.support_replies.lock().unwrap().pop_front();
        let reply = scripted.unwrap_or_else(|| Ok(self.supports.lock().unwrap().clone()));
        let hold = self.list_hold.lock().unwrap().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        reply
    }

    async fn modify_support(&self, request: &ModifySupportRequest) -> Result<(), GatewayError> {
        self.record(Call::ModifySupport(request.clone()));
        self.write_result()
    }

    async fn delete_support(&self, request: &DeleteSupportRequest) -> Result<(), GatewayError> {
        self.record(Call::DeleteSupport(request.id.clone()));
        self.write_result()?;
        self.supports
            .lock()
            .unwrap()
            .retain(|s| s.id != request.id);
        Ok(())
    }

    async fn insert_campaign(&self, campaign: &NewCampaign) -> Result<(), GatewayError> {
        self.record(Call::InsertCampaign(campaign.clone()));
        self.write_result()
    }

    async fn list_campaigns(&self, _session: &Session) -> Result<Vec<Campaign>, GatewayError> {
        self.record(Call::ListCampaigns);
        let scripted = self.campaign_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.campaigns.lock().unwrap().clone()))
    }

    async fn distribute_campaign(
        &self,
        request: &DistributeRequest,
    ) -> Result<DistributionReceipt, GatewayError> {
        self.record(Call::Distribute(request.campaign_id.clone()));
        let gate = self
            .distribution_gates
            .lock()
            .unwrap()
            .remove(&request.campaign_id);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(GatewayError::Transport("gate dropped".into()))),
            None => Ok(DistributionReceipt::Empty),
        }
    }
}

pub fn support(id: &str, title: &str) -> Support {
    Support {
        id: SupportId::from(id),
        owner: Owner("Alexis".into()),
        category: "Support".into(),
        kind: SupportKind::Text,
        title: title.into(),
        description: format!("Description de {title}"),
        content: format!("Contenu de {title}"),
        created_at: None,
        updated_at: None,
    }
}

pub fn campaign(id: &str, support_id: &str) -> Campaign {
    Campaign {
        id: CampaignId::from(id),
        owner: Owner("Alexis".into()),
        category: "Campaign".into(),
        channel: Channel::Email,
        title: format!("Campagne {id}"),
        description: "Description".into(),
        support_id: SupportId::from(support_id),
        created_at: None,
        updated_at: None,
    }
}

pub fn status_error(status: u16, message: &str) -> GatewayError {
    GatewayError::Status {
        status,
        message: message.into(),
    }
}
