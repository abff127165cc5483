//! Group version composition.

use tracing::info;

use outpost_core::GroupId;

use crate::api::FleetApi;
use crate::error::FleetResult;
use crate::types::{GroupVersionRecord, GroupVersionRefs};

/// Compose a new group version from the latest definition version ARNs.
///
/// Pure aggregation: every referenced definition must already exist (the
/// service rejects unknown ARNs), and repeat calls with unchanged refs
/// mint a new version with identical content; the service does not
/// dedupe.
pub async fn compose_group_version(
    api: &dyn FleetApi,
    group_id: &GroupId,
    refs: &GroupVersionRefs,
) -> FleetResult<GroupVersionRecord> {
    let version = api.create_group_version(group_id, refs).await?;

    info!(
        group_id = %group_id,
        version = %version.arn,
        "group version composed"
    );

    Ok(version)
}
