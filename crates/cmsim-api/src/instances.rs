// Instance endpoints
//
// Lookup by id and the add/edit pair used by the instance form. Listing and
// paging go through `request` like every browse screen.

use tracing::debug;

use crate::client::{SimulatorClient, require_data};
use crate::error::Error;
use crate::models::{Instance, InstanceDraft};

impl SimulatorClient {
    /// Fetch a single instance.
    ///
    /// `GET /instance/{id}`
    pub async fn get_instance(&self, id: i64) -> Result<Instance, Error> {
        let data = self.get(&format!("/instance/{id}")).await?;
        require_data(data, || format!("instance {id}"))
    }

    /// Create an instance. Any `id` on the draft is dropped.
    ///
    /// `POST /instance/add`. The backend may or may not echo the new row.
    pub async fn add_instance(&self, draft: &InstanceDraft) -> Result<Option<Instance>, Error> {
        let body = InstanceDraft {
            id: None,
            ..draft.clone()
        };
        debug!(ip = %body.http_ip, port = body.http_port, "adding instance");
        self.post("/instance/add", &body).await
    }

    /// Update an existing instance. The draft must carry an `id`.
    ///
    /// `POST /instance/edit`
    pub async fn edit_instance(&self, draft: &InstanceDraft) -> Result<Option<Instance>, Error> {
        let Some(id) = draft.id else {
            return Err(Error::InvalidRequest("instance id is required for edit"));
        };
        debug!(id, "editing instance");
        self.post("/instance/edit", draft).await
    }
}
