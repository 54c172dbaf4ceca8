//! # Role Table
//!
//! Access control for local callers. `Admin` implicitly holds every role
//! and is the only role allowed to grant or revoke.

use serde::{Deserialize, Serialize};
use shared_bus::{EventBuffer, FeeEvent};
use shared_types::Address;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Local roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Everything, including role administration.
    Admin,
    /// Fee configs, chains, assignments, sync queues.
    FeeManager,
    /// Relayers, deploy fee, send fee, send threshold.
    DeployerManager,
    /// Fee store collection and operator.
    StoreManager,
    /// Distributor receivers, paths, bounty, start/stop.
    DistributorManager,
    /// Bridge actors and stranded-asset recovery.
    RelayManager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::FeeManager => "FEE_MANAGER",
            Role::DeployerManager => "DEPLOYER_MANAGER",
            Role::StoreManager => "STORE_MANAGER",
            Role::DistributorManager => "DISTRIBUTOR_MANAGER",
            Role::RelayManager => "RELAY_MANAGER",
        };
        f.write_str(name)
    }
}

/// Role grants of one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    grants: BTreeMap<Role, BTreeSet<Address>>,
}

impl RoleTable {
    /// Table with `admin` holding `Admin`.
    #[must_use]
    pub fn with_admin(admin: Address) -> Self {
        let mut table = Self::default();
        table.grants.entry(Role::Admin).or_default().insert(admin);
        table
    }

    /// True if `account` holds `role` directly or through `Admin`.
    #[must_use]
    pub fn has(&self, role: Role, account: Address) -> bool {
        let held = |r: Role| self.grants.get(&r).is_some_and(|s| s.contains(&account));
        held(Role::Admin) || held(role)
    }

    /// Grant a role. Returns false if already held directly.
    pub fn grant(&mut self, role: Role, account: Address, events: &mut EventBuffer) -> bool {
        let added = self.grants.entry(role).or_default().insert(account);
        if added {
            events.emit(FeeEvent::RoleGranted {
                role: role.to_string(),
                account,
            });
        }
        added
    }

    /// Revoke a role. Returns false if it was not held directly.
    pub fn revoke(&mut self, role: Role, account: Address, events: &mut EventBuffer) -> bool {
        let removed = self
            .grants
            .get_mut(&role)
            .is_some_and(|set| set.remove(&account));
        if removed {
            events.emit(FeeEvent::RoleRevoked {
                role: role.to_string(),
                account,
            });
        }
        removed
    }

    /// Direct holders of `role`.
    #[must_use]
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.grants
            .get(&role)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }
}
