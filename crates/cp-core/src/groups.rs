//! Group registry.

use std::collections::BTreeSet;

use crate::error::DispatchError;
use crate::types::GroupId;

/// The groups currently known to the service.
///
/// Identities come from a counter that survives removals, so a dropped-off
/// group's identity is never handed out again.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: BTreeSet<GroupId>,
    last_issued: Option<GroupId>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new group and returns its identity.
    pub fn register(&mut self) -> GroupId {
        let id = GroupId::after(self.last_issued);
        self.last_issued = Some(id);
        self.groups.insert(id);
        id
    }

    pub fn exists(&self, id: GroupId) -> bool {
        self.groups.contains(&id)
    }

    pub fn remove(&mut self, id: GroupId) -> Result<(), DispatchError> {
        if self.groups.remove(&id) {
            Ok(())
        } else {
            Err(DispatchError::GroupNotFound(id))
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over registered groups in registration order.
    pub fn iter(&self) -> impl Iterator<Item = GroupId> {
        self.groups.iter().copied()
    }
}
