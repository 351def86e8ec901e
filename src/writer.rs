//! Create requests whose echoed bodies are decoded into entities.
//!
//! The writer does not touch the fetch coordinator. Callers that want to see
//! newly written data issue a fresh [`crate::fetcher::ProjectsFetcher::fetch`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::client::{ApiClient, ApiRequest, HttpMethod};
use crate::decode;
use crate::error::{Error, Result};
use crate::models::*;

#[derive(Debug, Clone)]
pub struct ProjectsWriter {
    client: ApiClient,
    user_key: String,
    catalog: Arc<PriorityCatalog>,
}

impl ProjectsWriter {
    pub fn new(client: ApiClient, user_key: impl Into<String>) -> Self {
        Self {
            client,
            user_key: user_key.into(),
            catalog: Arc::new(PriorityCatalog::default()),
        }
    }

    /// Catalog used to resolve index-shaped priorities in echoed projects.
    pub fn with_catalog(mut self, catalog: Arc<PriorityCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Create a project for the writer's user.
    pub async fn create_project(&self, input: &NewProject) -> Result<Project> {
        let request = self.write_request(input, &["user", "projects", "new"])?;
        let body = self.execute(&request).await?;
        Ok(decode::decode_project(&body, &self.catalog)?)
    }

    /// Add a measured goal to a project.
    pub async fn add_measured_goal(
        &self,
        project_id: Uuid,
        input: &NewMeasuredGoal,
    ) -> Result<MeasuredGoal> {
        let project_id = project_id.to_string();
        let request = self.write_request(input, &["projects", project_id.as_str(), "measured-goals"])?;
        let body = self.execute(&request).await?;
        Ok(decode::decode_measured_goal(&body)?)
    }

    /// Record a failure against a measured goal.
    pub async fn add_failure(&self, goal_id: Uuid, input: &NewFailure) -> Result<Failure> {
        let goal_id = goal_id.to_string();
        let request = self.write_request(input, &["measured-goals", goal_id.as_str(), "failures"])?;
        let body = self.execute(&request).await?;
        Ok(decode::decode_failure(&body)?)
    }

    fn write_request(
        &self,
        input: &impl Serialize,
        path_segments: &[&str],
    ) -> Result<ApiRequest<Value>> {
        let body = serde_json::to_value(input)
            .map_err(|e| Error::InvalidRequest(format!("unserializable request body: {}", e)))?;
        self.client
            .build_request(&self.user_key, HttpMethod::Post, path_segments, Some(body))
    }

    async fn execute(&self, request: &ApiRequest<Value>) -> Result<Value> {
        let response = self.client.execute(request).await?;
        tracing::debug!(path = request.path(), status = response.status, "Write acknowledged");
        Ok(response.body)
    }
}
