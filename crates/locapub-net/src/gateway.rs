use async_trait::async_trait;

use locapub_shared::protocol::{
    DeleteSupportRequest, DistributeRequest, GenerateRequest, ModifySupportRequest, NewCampaign,
    NewSupport,
};
use locapub_shared::{Campaign, GatewayError, Session, Support};

use crate::decode::DistributionReceipt;

/// Logical operations of the webhook backend.
///
/// Every call is attempted exactly once; there is no retry and no timeout
/// at this layer.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Returns the raw `Support` payload (base64 for media, text otherwise).
    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, GatewayError>;

    async fn insert_support(&self, support: &NewSupport) -> Result<(), GatewayError>;

    async fn list_supports(&self, session: &Session) -> Result<Vec<Support>, GatewayError>;

    async fn modify_support(&self, request: &ModifySupportRequest) -> Result<(), GatewayError>;

    async fn delete_support(&self, request: &DeleteSupportRequest) -> Result<(), GatewayError>;

    async fn insert_campaign(&self, campaign: &NewCampaign) -> Result<(), GatewayError>;

    async fn list_campaigns(&self, session: &Session) -> Result<Vec<Campaign>, GatewayError>;

    async fn distribute_campaign(
        &self,
        request: &DistributeRequest,
    ) -> Result<DistributionReceipt, GatewayError>;
}
