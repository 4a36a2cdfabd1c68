// Copyright 2026 grid Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Address of a cluster node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create an address from the node name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cluster-wide identity of a transaction: the node that started it plus a node-local id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalTransaction {
    id: u64,
    address: Address,
}

impl GlobalTransaction {
    /// Create a transaction identity.
    pub fn new(address: Address, id: u64) -> Self {
        Self { id, address }
    }

    /// Node-local id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Node that started the transaction.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl Display for GlobalTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GlobalTransaction({}:{})", self.address, self.id)
    }
}

/// Attributes shared by all commands scoped to a transaction boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxBoundary {
    gtx: GlobalTransaction,
    origin: Address,
    one_phase_commit: bool,
}

impl TxBoundary {
    /// A boundary originating on the node that started the transaction, committed in two phases.
    pub fn new(gtx: GlobalTransaction) -> Self {
        let origin = gtx.address().clone();
        Self {
            gtx,
            origin,
            one_phase_commit: false,
        }
    }

    /// Set the node the command was sent from.
    pub fn with_origin(mut self, origin: Address) -> Self {
        self.origin = origin;
        self
    }

    /// Commit in a single phase.
    pub fn with_one_phase_commit(mut self, one_phase_commit: bool) -> Self {
        self.one_phase_commit = one_phase_commit;
        self
    }

    /// The transaction.
    pub fn gtx(&self) -> &GlobalTransaction {
        &self.gtx
    }

    /// The node the command was sent from.
    pub fn origin(&self) -> &Address {
        &self.origin
    }

    /// Whether the transaction commits in a single phase.
    pub fn one_phase_commit(&self) -> bool {
        self.one_phase_commit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary() {
        let gtx = GlobalTransaction::new(Address::new("node-1"), 7);
        assert_eq!(gtx.to_string(), "GlobalTransaction(node-1:7)");

        let boundary = TxBoundary::new(gtx.clone());
        assert_eq!(boundary.origin(), gtx.address());
        assert!(!boundary.one_phase_commit());

        let remote = boundary.clone().with_origin(Address::new("node-2")).with_one_phase_commit(true);
        assert_eq!(remote.gtx(), &gtx);
        assert_eq!(remote.origin().name(), "node-2");
        assert_ne!(remote, boundary);
    }
}
