/// Application name
pub const APP_NAME: &str = "Locapub";

/// Base URL of the webhook backend used when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/webhook";

/// Owner used when no session user is configured
pub const DEFAULT_OWNER: &str = "Alexis";

/// Default HTTP port of the development backend
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Webhook paths, relative to the base URL
pub const PATH_GENERATE_CONTENT: &str = "create_content";
pub const PATH_INSERT_SUPPORT: &str = "insertSupport";
pub const PATH_READ_ALL_SUPPORTS: &str = "readAllSupport";
pub const PATH_MODIFY_SUPPORT: &str = "modifySupport";
pub const PATH_DELETE_SUPPORT: &str = "deleteSupport";
pub const PATH_INSERT_CAMPAIGN: &str = "insertCampaign";
pub const PATH_READ_ALL_CAMPAIGNS: &str = "readAllCampaign";
pub const PATH_DISTRIBUTE_CAMPAIGN: &str = "diffusionCampaign";

/// Category tags written into records
pub const CATEGORY_SUPPORT: &str = "Support";
pub const CATEGORY_CAMPAIGN: &str = "Campaign";

/// Session cache key holding the supports snapshot
pub const SUPPORTS_CACHE_KEY: &str = "mySupportsData";

/// Session cache quota in bytes (5 MiB, same order as browser session storage)
pub const DEFAULT_CACHE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Number of tiles per collection on the home preview
pub const PREVIEW_TILE_LIMIT: usize = 4;

/// MIME types used to wrap generated base64 payloads
pub const IMAGE_MIME: &str = "image/png";
pub const AUDIO_MIME: &str = "audio/mpeg";
