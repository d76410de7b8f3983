// HTTP gateway to the Locapub webhook backend.

pub mod decode;
pub mod endpoints;
pub mod gateway;
pub mod http;

pub use decode::DistributionReceipt;
pub use endpoints::Endpoints;
pub use gateway::Gateway;
pub use http::HttpGateway;
