// ── Instance administration ──
//
// Lookup and the add/edit pair behind the instance form. Drafts are checked
// locally before anything goes on the wire.

use cmsim_api::{Instance, InstanceDraft, SimulatorClient};
use tracing::info;

use crate::error::CoreError;

/// Reject drafts the form would not submit: blank address or port 0.
pub fn validate_draft(draft: &InstanceDraft) -> Result<(), CoreError> {
    if draft.http_ip.trim().is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "instance IP address is required".into(),
        });
    }
    if draft.http_port == 0 {
        return Err(CoreError::ValidationFailed {
            message: "instance port must be between 1 and 65535".into(),
        });
    }
    Ok(())
}

pub async fn fetch_instance(client: &SimulatorClient, id: i64) -> Result<Instance, CoreError> {
    client.get_instance(id).await.map_err(|e| {
        if e.is_not_found() {
            CoreError::NotFound {
                entity_type: "instance",
                identifier: id.to_string(),
            }
        } else {
            e.into()
        }
    })
}

/// Create an instance from `draft`. Any id on the draft is ignored.
pub async fn create_instance(
    client: &SimulatorClient,
    draft: &InstanceDraft,
) -> Result<Option<Instance>, CoreError> {
    validate_draft(draft)?;
    let created = client.add_instance(draft).await?;
    info!(
        ip = %draft.http_ip,
        port = draft.http_port,
        "instance added"
    );
    Ok(created)
}

/// Save `draft` over the existing instance with the same id.
pub async fn update_instance(
    client: &SimulatorClient,
    draft: &InstanceDraft,
) -> Result<Option<Instance>, CoreError> {
    validate_draft(draft)?;
    let updated = client.edit_instance(draft).await?;
    info!(id = ?draft.id, "instance updated");
    Ok(updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_draft_needs_an_address() {
        let err = validate_draft(&InstanceDraft::default()).unwrap_err();
        assert!(err.to_string().contains("IP address is required"));
    }

    #[test]
    fn port_zero_rejected() {
        let draft = InstanceDraft {
            http_ip: "10.0.0.1".into(),
            http_port: 0,
            ..InstanceDraft::default()
        };
        assert!(matches!(
            validate_draft(&draft),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn filled_draft_passes() {
        let draft = InstanceDraft {
            http_ip: "10.0.0.1".into(),
            ..InstanceDraft::default()
        };
        assert!(validate_draft(&draft).is_ok());
    }
}
