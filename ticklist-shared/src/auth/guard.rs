/// Ownership guard
///
/// Decides whether a resolved principal may act on a specific record. The
/// rule is strict: only a member principal whose id equals the record's
/// owner id is allowed; everything else is denied.
///
/// Denials are deliberately information-hiding. A caller probing a record it
/// does not own must see exactly what it would see for a record that does
/// not exist, so services map [`OwnershipDenied`] to their not-found error
/// and the API layer serves both as the same status.

use uuid::Uuid;

use crate::auth::resolver::Principal;

/// Denial decision from the ownership guard.
///
/// Carries no detail on purpose: whether the record exists is exactly the
/// information a denied caller must not learn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("record not found")]
pub struct OwnershipDenied;

/// Allows the operation iff `principal` is a member owning the record.
pub fn authorize(principal: &Principal, record_owner: Uuid) -> Result<(), OwnershipDenied> {
    match principal {
        Principal::Member { id } if *id == record_owner => Ok(()),
        _ => Err(OwnershipDenied),
    }
}
