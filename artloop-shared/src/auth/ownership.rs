/// Owner-only capability check
///
/// Every edit/delete operation in the API reduces to the same question:
/// does the caller own the resource? Each engine looks up the resource's
/// owner id (post author, comment author, artwork's artist's owner) and
/// funnels the decision through [`owner_only`]; a mismatch maps to HTTP 403
/// at the boundary.
use uuid::Uuid;

/// Error type for ownership decisions
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// Caller is not the owner of the resource
    #[error("Not authorized")]
    NotOwner,
}

/// Fails unless the caller is the resource owner
pub fn owner_only(resource_owner: Uuid, caller: Uuid) -> Result<(), OwnershipError> {
    if resource_owner == caller {
        Ok(())
    } else {
        Err(OwnershipError::NotOwner)
    }
}
