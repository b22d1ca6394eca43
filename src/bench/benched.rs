//! [`Benched`] for every backend.
//!
//! | Type                | Builder              | Fork                           | Unfork            |
//! |---------------------|----------------------|--------------------------------|-------------------|
//! | `UnitedVolatile`    | `()`                 | `delete_all`                   | `delete_all`      |
//! | `UnitedNonVolatile` | `&Path`              | `delete_all`                   | `delete_all`      |
//! | `SplitVolatile`     | `()`                 | `delete_all`                   | `delete_all`      |
//! | `SplitNonVolatile`  | `(&Path, &Path)`     | `delete_all`                   | `delete_all`      |
//! | `Client`            | `&Neo4jConfig`       | drop all nodes, ensure schema  | drop all nodes    |
//! | `Transaction`       | `&Client`            | roll back, drop all, schema    | commit, drop all  |

use std::path::Path;

use super::{Benched, Fork};
use crate::{
    links::{Doublets, Result},
    neo4j::{Client, Neo4jConfig, Transaction},
    store::{SplitNonVolatile, SplitStore, SplitVolatile, UnitedNonVolatile, UnitedStore, UnitedVolatile},
};

impl Benched for UnitedVolatile {
    type Builder<'p> = ();

    fn setup(_: Self::Builder<'_>) -> Result<Self> {
        Ok(UnitedStore::volatile())
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.delete_all()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.delete_all()
    }
}

impl Benched for UnitedNonVolatile {
    type Builder<'p> = &'p Path;

    fn setup(path: Self::Builder<'_>) -> Result<Self> {
        UnitedStore::open(path)
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.delete_all()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.delete_all()?;
        self.flush()
    }
}

impl Benched for SplitVolatile {
    type Builder<'p> = ();

    fn setup(_: Self::Builder<'_>) -> Result<Self> {
        Ok(SplitStore::volatile())
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.delete_all()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.delete_all()
    }
}

impl Benched for SplitNonVolatile {
    type Builder<'p> = (&'p Path, &'p Path);

    fn setup((data, index): Self::Builder<'_>) -> Result<Self> {
        SplitStore::open(data, index)
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.delete_all()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.delete_all()?;
        self.flush()
    }
}

impl Benched for Client {
    type Builder<'p> = &'p Neo4jConfig;

    fn setup(config: Self::Builder<'_>) -> Result<Self> {
        Client::new(config)
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.drop_all()?;
        self.ensure_schema()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.drop_all()
    }
}

impl<'c> Benched for Transaction<'c> {
    type Builder<'p> = &'c Client;

    fn setup(client: Self::Builder<'_>) -> Result<Self> {
        Ok(Transaction::new(client))
    }

    fn fork(&mut self) -> Result<Fork<'_, Self>> {
        self.rollback()?;
        self.client().drop_all()?;
        self.client().ensure_schema()?;
        Ok(Fork::new(self))
    }

    fn unfork(&mut self) -> Result<()> {
        self.commit()?;
        self.client().drop_all()
    }
}
