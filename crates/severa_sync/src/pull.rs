//! Pull phase: replace local remote-owned state with the remote truth.
//!
//! The phase fetches everything first (the aggregate membership query,
//! then per-pantry rosters and items) and only then applies the whole
//! result in a single store transaction. A fetch error therefore leaves
//! the local tables exactly as they were.

use crate::error::SyncResult;
use severa_model::{
    invitation_from_membership, item_from_remote, member_from_remote, pantry_from_remote,
    MemberStatus, Pantry, PantryItem, PantryMember, RemoteId,
};
use severa_remote::RemoteStore;
use severa_store::Store;

/// What one pull phase applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullSummary {
    /// Pantries upserted locally.
    pub pantries: usize,
    /// Items upserted locally.
    pub items: usize,
    /// Membership rows replaced.
    pub members: usize,
    /// Pending invitations replaced.
    pub invitations: usize,
}

impl PullSummary {
    /// Total rows applied.
    pub fn total(&self) -> usize {
        self.pantries + self.items + self.members + self.invitations
    }
}

/// Runs the pull phase against one store/remote pair.
pub struct PullEngine<'a, R: RemoteStore> {
    store: &'a Store,
    remote: &'a R,
}

impl<'a, R: RemoteStore> PullEngine<'a, R> {
    /// Creates a pull engine over the given store and remote.
    pub fn new(store: &'a Store, remote: &'a R) -> Self {
        Self { store, remote }
    }

    /// Fetches the user's visible remote state and applies it atomically.
    pub fn run(&self) -> SyncResult<PullSummary> {
        let memberships = self.remote.fetch_memberships()?;

        let mut invitations = Vec::new();
        let mut pantries: Vec<Pantry> = Vec::new();
        for row in &memberships {
            if let Some(invitation) = invitation_from_membership(row) {
                invitations.push(invitation);
                continue;
            }
            if row.status != MemberStatus::Accepted {
                continue;
            }
            match &row.pantry {
                Some(pantry_row) => pantries.push(pantry_from_remote(pantry_row)?),
                // Row-level rules filtered the pantry out of the join.
                None => tracing::debug!(membership = row.id, "accepted membership without pantry"),
            }
        }

        let mut members: Vec<PantryMember> = Vec::new();
        let mut items: Vec<(RemoteId, Vec<PantryItem>)> = Vec::new();
        for pantry in &pantries {
            let Some(remote_id) = pantry.remote_id else {
                continue;
            };
            for roster_row in self.remote.fetch_pantry_members(remote_id)? {
                members.push(member_from_remote(&roster_row));
            }
            let mapped = self
                .remote
                .fetch_pantry_items(remote_id)?
                .iter()
                .map(|row| item_from_remote(row, 0))
                .collect::<Result<Vec<_>, _>>()?;
            items.push((remote_id, mapped));
        }

        let summary = PullSummary {
            pantries: pantries.len(),
            items: items.iter().map(|(_, rows)| rows.len()).sum(),
            members: members.len(),
            invitations: invitations.len(),
        };

        self.store.transaction(move |txn| {
            txn.upsert_pantries_by_remote(pantries)?;
            for (pantry_remote_id, rows) in items {
                match txn.pantry_local_id(pantry_remote_id) {
                    Some(local_pantry_id) => {
                        let rehomed = rows
                            .into_iter()
                            .map(|mut item| {
                                item.pantry_id = local_pantry_id;
                                item
                            })
                            .collect();
                        txn.upsert_items_by_remote(rehomed)?;
                    }
                    None => tracing::warn!(
                        pantry = pantry_remote_id,
                        "pulled items reference a pantry that did not land"
                    ),
                }
            }
            txn.replace_members(members)?;
            txn.replace_invitations(invitations);
            Ok(())
        })?;

        tracing::debug!(
            pantries = summary.pantries,
            items = summary.items,
            members = summary.members,
            invitations = summary.invitations,
            "pull phase complete"
        );
        Ok(summary)
    }
}
