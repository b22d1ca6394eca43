//! Names of the benchmarked backends and operations.
//!
//! Benchmark ids have the form `<Operation::group_name>/<Backend::id>`, for
//! example `Each_Concrete/Doublets_Split_Volatile`.

use std::fmt;

/// One of the six benchmarked backends, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    DoubletsUnitedVolatile,
    DoubletsUnitedNonVolatile,
    DoubletsSplitVolatile,
    DoubletsSplitNonVolatile,
    Neo4jNonTransaction,
    Neo4jTransaction,
}

impl Backend {
    pub const ALL: [Backend; 6] = [
        Backend::DoubletsUnitedVolatile,
        Backend::DoubletsUnitedNonVolatile,
        Backend::DoubletsSplitVolatile,
        Backend::DoubletsSplitNonVolatile,
        Backend::Neo4jNonTransaction,
        Backend::Neo4jTransaction,
    ];

    /// Identifier used in benchmark ids.
    pub const fn id(self) -> &'static str {
        match self {
            Backend::DoubletsUnitedVolatile => "Doublets_United_Volatile",
            Backend::DoubletsUnitedNonVolatile => "Doublets_United_NonVolatile",
            Backend::DoubletsSplitVolatile => "Doublets_Split_Volatile",
            Backend::DoubletsSplitNonVolatile => "Doublets_Split_NonVolatile",
            Backend::Neo4jNonTransaction => "Neo4j_NonTransaction",
            Backend::Neo4jTransaction => "Neo4j_Transaction",
        }
    }

    /// Column header in the results table.
    pub const fn label(self) -> &'static str {
        match self {
            Backend::DoubletsUnitedVolatile => "Doublets United Volatile",
            Backend::DoubletsUnitedNonVolatile => "Doublets United NonVolatile",
            Backend::DoubletsSplitVolatile => "Doublets Split Volatile",
            Backend::DoubletsSplitNonVolatile => "Doublets Split NonVolatile",
            Backend::Neo4jNonTransaction => "Neo4j NonTransaction",
            Backend::Neo4jTransaction => "Neo4j Transaction",
        }
    }

    pub fn from_id(id: &str) -> Option<Backend> {
        Backend::ALL.into_iter().find(|backend| backend.id() == id)
    }

    pub const fn is_neo4j(self) -> bool {
        matches!(self, Backend::Neo4jNonTransaction | Backend::Neo4jTransaction)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One of the eight benchmarked operations, in table row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Create,
    Update,
    Delete,
    EachAll,
    EachIdentity,
    EachConcrete,
    EachOutgoing,
    EachIncoming,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::EachAll,
        Operation::EachIdentity,
        Operation::EachConcrete,
        Operation::EachOutgoing,
        Operation::EachIncoming,
    ];

    /// Criterion group name.
    pub const fn group_name(self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::EachAll => "Each_All",
            Operation::EachIdentity => "Each_Identity",
            Operation::EachConcrete => "Each_Concrete",
            Operation::EachOutgoing => "Each_Outgoing",
            Operation::EachIncoming => "Each_Incoming",
        }
    }

    /// Row label in the results table.
    pub const fn label(self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::EachAll => "Each All",
            Operation::EachIdentity => "Each Identity",
            Operation::EachConcrete => "Each Concrete",
            Operation::EachOutgoing => "Each Outgoing",
            Operation::EachIncoming => "Each Incoming",
        }
    }

    pub fn from_group(group: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.group_name() == group)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group_name())
    }
}
