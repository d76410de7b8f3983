//! [`Gateway`] over HTTP with reqwest.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use locapub_shared::protocol::{
    DeleteSupportRequest, DistributeRequest, GenerateRequest, ModifySupportRequest, NewCampaign,
    NewSupport, OwnerFilter,
};
use locapub_shared::{Campaign, GatewayError, Session, Support};

use crate::decode::{
    decode_distribution, decode_generated, decode_list, resolve_error_message, DistributionReceipt,
};
use crate::endpoints::Endpoints;
use crate::gateway::Gateway;

/// Posts JSON bodies to the webhook endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(client: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// POST `body` and return the 2xx response text.
    async fn post<B: Serialize + Sync>(&self, url: &str, body: &B) -> Result<String, GatewayError> {
        debug!(url, "POST");

        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = resolve_error_message(status.as_u16(), &text);
            warn!(url, status = status.as_u16(), %message, "Backend rejected request");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        let body = self.post(&self.endpoints.generate_content(), request).await?;
        decode_generated(&body)
    }

    async fn insert_support(&self, support: &NewSupport) -> Result<(), GatewayError> {
        self.post(&self.endpoints.insert_support(), support).await?;
        Ok(())
    }

    async fn list_supports(&self, session: &Session) -> Result<Vec<Support>, GatewayError> {
        let body = self
            .post(
                &self.endpoints.read_all_supports(),
                &OwnerFilter::for_session(session),
            )
            .await?;
        let supports: Vec<Support> = decode_list(&body)?;
        debug!(count = supports.len(), "Fetched supports");
        Ok(supports)
    }

    async fn modify_support(&self, request: &ModifySupportRequest) -> Result<(), GatewayError> {
        self.post(&self.endpoints.modify_support(), request).await?;
        Ok(())
    }

    async fn delete_support(&self, request: &DeleteSupportRequest) -> Result<(), GatewayError> {
        self.post(&self.endpoints.delete_support(), request).await?;
        Ok(())
    }

    async fn insert_campaign(&self, campaign: &NewCampaign) -> Result<(), GatewayError> {
        self.post(&self.endpoints.insert_campaign(), campaign).await?;
        Ok(())
    }

    async fn list_campaigns(&self, session: &Session) -> Result<Vec<Campaign>, GatewayError> {
        let body = self
            .post(
                &self.endpoints.read_all_campaigns(),
                &OwnerFilter::for_session(session),
            )
            .await?;
        let campaigns: Vec<Campaign> = decode_list(&body)?;
        debug!(count = campaigns.len(), "Fetched campaigns");
        Ok(campaigns)
    }

    async fn distribute_campaign(
        &self,
        request: &DistributeRequest,
    ) -> Result<DistributionReceipt, GatewayError> {
        let body = self
            .post(&self.endpoints.distribute_campaign(), request)
            .await?;
        Ok(decode_distribution(&body))
    }
}
