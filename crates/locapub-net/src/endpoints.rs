//! Fixed webhook endpoints under a configurable base URL.

use locapub_shared::constants::{
    DEFAULT_API_BASE_URL, PATH_DELETE_SUPPORT, PATH_DISTRIBUTE_CAMPAIGN, PATH_GENERATE_CONTENT,
    PATH_INSERT_CAMPAIGN, PATH_INSERT_SUPPORT, PATH_MODIFY_SUPPORT, PATH_READ_ALL_CAMPAIGNS,
    PATH_READ_ALL_SUPPORTS,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn generate_content(&self) -> String {
        self.join(PATH_GENERATE_CONTENT)
    }

    pub fn insert_support(&self) -> String {
        self.join(PATH_INSERT_SUPPORT)
    }

    pub fn read_all_supports(&self) -> String {
        self.join(PATH_READ_ALL_SUPPORTS)
    }

    pub fn modify_support(&self) -> String {
        self.join(PATH_MODIFY_SUPPORT)
    }

    pub fn delete_support(&self) -> String {
        self.join(PATH_DELETE_SUPPORT)
    }

    pub fn insert_campaign(&self) -> String {
        self.join(PATH_INSERT_CAMPAIGN)
    }

    pub fn read_all_campaigns(&self) -> String {
        self.join(PATH_READ_ALL_CAMPAIGNS)
    }

    pub fn distribute_campaign(&self) -> String {
        self.join(PATH_DISTRIBUTE_CAMPAIGN)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
