use anyhow::{bail, Result};
use clap::Parser;
use log::{debug, error};
use reqwest::Url;

use crate::pimcore::{ApiClient, ClassDescriptor};

pub const DEFAULT_INDEX_NAME: &str = "vue_storefront_pimcore";

#[derive(Parser, Debug)]
#[command(name = "storefront-setup")]
#[command(about = "Bootstraps the Pimcore to storefront integration")]
pub struct Args {
    #[arg(long, env = "PIMCORE_URL", help = "Base url of the Pimcore instance")]
    pub pimcore_url: String,

    #[arg(long, env = "PIMCORE_API_KEY", help = "Pimcore webservice api key")]
    pub api_key: String,

    #[arg(long, env = "ELASTICSEARCH_HOST", help = "Elasticsearch host")]
    pub elasticsearch_host: String,

    #[arg(long, env = "ELASTICSEARCH_PORT", help = "Elasticsearch port")]
    pub elasticsearch_port: Option<u16>,

    #[arg(
        long,
        env = "PIMCORE_ROOT_CATEGORY",
        help = "Id of the category subtree to import"
    )]
    pub root_category_id: i64,

    #[arg(
        long,
        env = "IMAGES_ASSET_PATH",
        help = "Path the image assets are served from"
    )]
    pub assets_path: String,

    #[arg(
        long,
        env = "PIMCORE_LG_VERSION",
        default_value = "en_GB",
        help = "Locale of the imported content"
    )]
    pub locale: String,

    #[arg(
        long,
        default_value = DEFAULT_INDEX_NAME,
        help = "Name of the elasticsearch index to create"
    )]
    pub index_name: String,

    #[arg(long, default_value = "Product", help = "Pimcore class holding products")]
    pub product_class: String,

    #[arg(
        long,
        default_value = "ProductCategory",
        help = "Pimcore class holding categories"
    )]
    pub category_class: String,
}

/// The answers every later setup step works from. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub pimcore_url: String,
    pub api_key: String,
    pub elasticsearch_url: String,
    pub elasticsearch_index_name: String,
    pub root_category_id: i64,
    pub assets_path: String,
    pub locale: String,
    pub product_class: String,
    pub category_class: String,
}

#[derive(Debug)]
pub struct Collected {
    pub config: SetupConfig,
    pub classes: Vec<ClassDescriptor>,
}

pub fn normalize_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{}", url);
    }

    while url.ends_with('/') {
        url.pop();
    }
    url.push('/');

    url
}

pub fn validated_url(raw: &str) -> Result<String> {
    let url = normalize_url(raw);
    if Url::parse(&url).is_err() {
        bail!("Incorrect Pimcore url");
    }
    Ok(url)
}

fn elasticsearch_url(host: &str, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}/", host, port),
        None => host.to_string(),
    }
}

/// Asks Pimcore for its class definitions and assembles the setup answers.
/// Exactly one request, no retries; every failure comes back as a message.
pub async fn collect(args: &Args, api: &ApiClient) -> Result<Collected> {
    let response = match api.list_classes().await {
        Ok(response) => response,
        Err(e) => {
            error!("Class listing failed: {:#}", e);
            bail!("Invalid Pimcore url or api key");
        }
    };

    if !response.success {
        bail!(response
            .msg
            .unwrap_or_else(|| "Pimcore reported a failure".to_string()));
    }

    let config = SetupConfig {
        pimcore_url: api.base_url().to_string(),
        api_key: args.api_key.clone(),
        elasticsearch_url: elasticsearch_url(&args.elasticsearch_host, args.elasticsearch_port),
        elasticsearch_index_name: args.index_name.clone(),
        root_category_id: args.root_category_id,
        assets_path: args.assets_path.clone(),
        locale: args.locale.clone(),
        product_class: args.product_class.clone(),
        category_class: args.category_class.clone(),
    };

    debug!("Collected configuration: {:?}", config);

    Ok(Collected {
        config,
        classes: response.data,
    })
}
