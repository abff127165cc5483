//! HTTP implementation of the fleet service API.
//!
//! Thin request/response mapping; the service's rejections (bad input,
//! quota, permission) are carried back verbatim in
//! [`FleetError::Service`] with no local interpretation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use outpost_core::{Arn, CloudConfig, GroupId, ThingName};

use crate::api::FleetApi;
use crate::error::{FleetError, FleetResult};
use crate::types::{
    CertificateBundle, ConnectorDefinition, CoreDefinitionSpec, DefinitionVersion,
    FunctionDefinition, GroupRecord, GroupVersionRecord, GroupVersionRefs, PolicyDocument,
    PolicyRecord, ResourceDefinition, ThingRecord,
};

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

/// HTTP client for the fleet provisioning service.
#[derive(Debug, Clone)]
pub struct HttpFleetApi {
    client: Client,
    base_url: String,
}

impl HttpFleetApi {
    /// Create a client from cloud configuration.
    pub fn new(config: &CloudConfig) -> FleetResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.endpoints.request_timeout_secs))
            .build()
            .map_err(FleetError::Http)?;

        Ok(Self {
            client,
            base_url: config.endpoints.fleet_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Create a client with a custom base URL.
    pub fn with_url(url: impl Into<String>) -> FleetResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FleetError::Http)?;

        Ok(Self {
            client,
            base_url: url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> FleetResult<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(FleetError::Http);
        }

        let message = match response.json::<ServiceError>().await {
            Ok(err) => err.message,
            Err(_) => "unparseable error response".to_owned(),
        };
        Err(FleetError::service(status.as_u16(), message))
    }

    async fn expect_no_content(response: Response) -> FleetResult<()> {
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => {
                let message = match response.json::<ServiceError>().await {
                    Ok(err) => err.message,
                    Err(_) => "unparseable error response".to_owned(),
                };
                Err(FleetError::service(status.as_u16(), message))
            }
        }
    }
}

#[async_trait]
impl FleetApi for HttpFleetApi {
    async fn create_group(&self, name: &str) -> FleetResult<GroupRecord> {
        debug!(name = %name, "creating group");
        let response = self
            .client
            .post(self.url("/groups"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_keys_and_certificate(&self) -> FleetResult<CertificateBundle> {
        debug!("creating keys and certificate");
        let response = self
            .client
            .post(self.url("/certificates"))
            .json(&serde_json::json!({ "set_as_active": true }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_core_thing(&self, name: &ThingName) -> FleetResult<ThingRecord> {
        debug!(name = %name, "creating core thing");
        let response = self
            .client
            .post(self.url("/things"))
            .json(&serde_json::json!({ "name": name.as_str() }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn attach_thing_principal(
        &self,
        thing: &ThingName,
        certificate_arn: &Arn,
    ) -> FleetResult<()> {
        debug!(thing = %thing, "attaching certificate to thing");
        let response = self
            .client
            .put(self.url(&format!("/things/{}/principals", thing.as_str())))
            .json(&serde_json::json!({ "principal": certificate_arn.as_str() }))
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    async fn create_policy(
        &self,
        name: &str,
        document: &PolicyDocument,
    ) -> FleetResult<PolicyRecord> {
        debug!(name = %name, "creating policy");
        let response = self
            .client
            .post(self.url("/policies"))
            .json(&serde_json::json!({ "name": name, "document": document }))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn attach_policy(&self, policy_name: &str, certificate_arn: &Arn) -> FleetResult<()> {
        debug!(policy = %policy_name, "attaching policy to certificate");
        let response = self
            .client
            .put(self.url(&format!("/policies/{policy_name}/targets")))
            .json(&serde_json::json!({ "target": certificate_arn.as_str() }))
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    async fn create_core_definition(
        &self,
        group_id: &GroupId,
        spec: &CoreDefinitionSpec,
    ) -> FleetResult<DefinitionVersion> {
        debug!(group_id = %group_id, "creating core definition");
        let response = self
            .client
            .post(self.url(&format!("/groups/{}/core-definition", group_id.as_str())))
            .json(spec)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_resource_definition(
        &self,
        resource: &ResourceDefinition,
    ) -> FleetResult<DefinitionVersion> {
        debug!(name = %resource.name, "creating resource definition");
        let response = self
            .client
            .post(self.url("/definitions/resources"))
            .json(resource)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_function_definition(
        &self,
        function: &FunctionDefinition,
    ) -> FleetResult<DefinitionVersion> {
        debug!(name = %function.name, "creating function definition");
        let response = self
            .client
            .post(self.url("/definitions/functions"))
            .json(function)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_connector_definition(
        &self,
        connector: &ConnectorDefinition,
    ) -> FleetResult<DefinitionVersion> {
        debug!(name = %connector.name, "creating connector definition");
        let response = self
            .client
            .post(self.url("/definitions/connectors"))
            .json(connector)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn create_group_version(
        &self,
        group_id: &GroupId,
        refs: &GroupVersionRefs,
    ) -> FleetResult<GroupVersionRecord> {
        debug!(group_id = %group_id, "creating group version");
        let response = self
            .client
            .post(self.url(&format!("/groups/{}/versions", group_id.as_str())))
            .json(refs)
            .send()
            .await?;
        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_from_config() {
        let config = CloudConfig::default();
        assert!(HttpFleetApi::new(&config).is_ok());
    }

    #[test]
    fn base_url_is_normalised() {
        let api = HttpFleetApi::with_url("http://localhost:8090/").unwrap();
        assert_eq!(api.url("/groups"), "http://localhost:8090/groups");
    }
}
