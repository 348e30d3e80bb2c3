use anyhow::{anyhow, Result};
use log::debug;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A content-model class as reported by the Pimcore webservice. Everything
/// besides the name is backend-defined metadata and is kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ClassDescriptor>,
    pub msg: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    http_client: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            http_client: HttpClient::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}webservice/rest/{}?apikey={}",
            self.base_url, path, self.api_key
        )
    }

    pub async fn list_classes(&self) -> Result<ApiResponse> {
        let url = self.endpoint("classes");

        debug!("Fetching class definitions from {}", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach Pimcore at {}: {}", self.base_url, e))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Class listing request returned status {}",
                response.status()
            ));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse class listing response: {}", e))?;

        Ok(body)
    }
}

pub fn find_class<'a>(classes: &'a [ClassDescriptor], name: &str) -> Option<&'a ClassDescriptor> {
    classes.iter().find(|class| class.name == name)
}
