//! HTTP client for the Keyward API.

use keyward_api::ErrorDetails;
use keyward_core::ValidationErrors;
use keyward_licensing::{
    ActivationRequest, LicenseRequest, LicenseResponse, ProductRequest, ProductResponse,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::CliConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with an error body.
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        validation_errors: ValidationErrors,
    },

    #[error("Server error: {0}")]
    Server(StatusCode),
}

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &CliConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|_| ClientError::InvalidUrl(config.api_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.api_url.clone()));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// URL for `/api/<segments>`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let res = request.send().await?;
        if res.status().is_success() {
            Ok(res.json().await?)
        } else {
            Err(Self::error(res).await)
        }
    }

    async fn send_empty(request: RequestBuilder) -> Result<(), ClientError> {
        let res = request.send().await?;
        if res.status().is_success() {
            Ok(())
        } else {
            Err(Self::error(res).await)
        }
    }

    async fn error(res: Response) -> ClientError {
        let status = res.status();
        match res.json::<ErrorDetails>().await {
            Ok(details) => ClientError::Api {
                status,
                message: details.message,
                validation_errors: details.validation_errors.unwrap_or_default(),
            },
            Err(_) => ClientError::Server(status),
        }
    }

    pub async fn create_product(
        &self,
        request: &ProductRequest,
    ) -> Result<ProductResponse, ClientError> {
        Self::send(self.request(Method::POST, &["products"]).json(request)).await
    }

    pub async fn list_products(&self) -> Result<Vec<ProductResponse>, ClientError> {
        Self::send(self.request(Method::GET, &["products"])).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::DELETE, &["products", id])).await
    }

    pub async fn create_license(
        &self,
        request: &LicenseRequest,
    ) -> Result<LicenseResponse, ClientError> {
        Self::send(self.request(Method::POST, &["licenses"]).json(request)).await
    }

    pub async fn get_license(&self, key: &str) -> Result<LicenseResponse, ClientError> {
        Self::send(self.request(Method::GET, &["licenses", key])).await
    }

    pub async fn list_licenses(&self) -> Result<Vec<LicenseResponse>, ClientError> {
        Self::send(self.request(Method::GET, &["licenses"])).await
    }

    pub async fn delete_license(&self, key: &str) -> Result<(), ClientError> {
        Self::send_empty(self.request(Method::DELETE, &["licenses", key])).await
    }

    pub async fn activate_license(
        &self,
        request: &ActivationRequest,
    ) -> Result<LicenseResponse, ClientError> {
        Self::send(self.request(Method::POST, &["licenses", "activate"]).json(request)).await
    }

    pub async fn validate_license(
        &self,
        request: &ActivationRequest,
    ) -> Result<LicenseResponse, ClientError> {
        Self::send(self.request(Method::POST, &["licenses", "validate"]).json(request)).await
    }
}
