//! Azure OpenAI deployment client.
//!
//! Azure routes by deployment name rather than by model, so it does not fit
//! the `Provider::create(api_key, model)` shape and exposes its own
//! constructors instead.

use crate::api::openai::{ChatEndpoint, OpenAiCompatibleClient, OpenAiCompatibleModel};
use crate::options::{ModelOptions, TransportOptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_VERSION: &str = "2024-10-21";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AzureOpenAiModel;

impl OpenAiCompatibleModel for AzureOpenAiModel {}

pub type AzureOpenAiClient = OpenAiCompatibleClient<AzureOpenAiModel>;

pub struct AzureOpenAi;

impl AzureOpenAi {
    pub fn create(endpoint: String, deployment: String, api_key: String) -> AzureOpenAiClient {
        Self::create_with_options(
            endpoint,
            deployment,
            DEFAULT_API_VERSION.to_string(),
            api_key,
            ModelOptions::default(),
            TransportOptions::default(),
        )
    }

    pub fn create_with_options(
        endpoint: String,
        deployment: String,
        api_version: String,
        api_key: String,
        model_options: ModelOptions<AzureOpenAiModel>,
        transport_options: TransportOptions,
    ) -> AzureOpenAiClient {
        AzureOpenAiClient::new(
            api_key,
            ChatEndpoint::Azure {
                endpoint,
                deployment,
                api_version,
            },
            model_options,
            transport_options,
        )
    }
}
