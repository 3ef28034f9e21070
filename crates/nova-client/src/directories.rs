//! Directory management operations

use crate::{
    types::{Directory, DirectoryFilters},
    NovaClient, NovaError, Result,
};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

const DIRECTORY_ROUTE: &str = "/manager/directory";

#[derive(Serialize)]
struct CreateDirectoryRequest<'a> {
    name: &'a str,
    is_public: bool,
}

impl DirectoryFilters {
    /// Query parameters for the present filters, stringified.
    ///
    /// Absent filters (and an empty name) produce no parameter at all.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.id {
            query.push(("id", id.to_string()));
        }
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            query.push(("name", name.to_string()));
        }
        if let Some(is_public) = self.is_public {
            query.push(("is_public", is_public.to_string()));
        }
        query
    }
}

impl NovaClient {
    // ==================== Directory Operations ====================

    /// Create a directory
    #[instrument(skip(self))]
    pub async fn create_directory(&self, name: &str, is_public: bool) -> Result<Directory> {
        if name.trim().is_empty() {
            return Err(NovaError::validation(
                "create_directory",
                "Directory name is required",
                "name",
                json!(name),
            ));
        }

        let request = self
            .request(Method::POST, DIRECTORY_ROUTE)
            .json(&CreateDirectoryRequest { name, is_public });

        self.execute(request)
            .await?
            .take_field("directory", "create_directory", DIRECTORY_ROUTE)
    }

    /// List directories, optionally filtered
    #[instrument(skip(self))]
    pub async fn get_directories(&self, filters: Option<DirectoryFilters>) -> Result<Vec<Directory>> {
        let query = filters.map(|f| f.to_query()).unwrap_or_default();

        let mut request = self.request(Method::GET, DIRECTORY_ROUTE);
        if !query.is_empty() {
            request = request.query(&query);
        }

        self.execute(request)
            .await?
            .take_field("directories", "get_directories", DIRECTORY_ROUTE)
    }

    /// Delete a directory
    #[instrument(skip(self))]
    pub async fn delete_directory(&self, id: u64) -> Result<()> {
        if id == 0 {
            return Err(NovaError::validation(
                "delete_directory",
                "Directory id is required",
                "id",
                json!(id),
            ));
        }

        let route = format!("{}/{}", DIRECTORY_ROUTE, id);
        self.execute(self.request(Method::DELETE, &route))
            .await?
            .ensure_success("delete_directory", &route)
    }
}
