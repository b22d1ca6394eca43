use getset::Getters;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Runtime;

use super::{
    cypher::{self, CypherRequest, CypherResponse, QueryResult, Statement},
    operations::{self, Cypher},
    Neo4jConfig,
};
use crate::links::{
    Doublets, Flow, Link, LinkId, Links, LinksConstants, LinksError, ReadHandler, Result,
    WriteHandler,
};

/// Neo4j client running every statement in its own auto-committed transaction.
///
/// HTTP requests are driven by a private single-threaded tokio runtime, so the
/// client can be used from synchronous code such as criterion benchmarks.
#[derive(Getters)]
pub struct Client {
    #[getset(get = "pub")]
    base_url: String,
    #[getset(get = "pub")]
    database: String,
    user: String,
    password: String,
    http: reqwest::Client,
    runtime: Runtime,
    constants: LinksConstants,
    next_id: AtomicU64,
}

impl Client {
    /// Connects, creates the schema and picks up id allocation after the
    /// highest id already stored.
    pub fn new(config: &Neo4jConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        let client = Self {
            base_url: config.http_base(),
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
            http,
            runtime,
            constants: LinksConstants::new(),
            next_id: AtomicU64::new(1),
        };

        client.ensure_schema()?;
        let max_id = client.execute(cypher::max_id())?.scalar()?;
        client.next_id.store(max_id + 1, Ordering::SeqCst);

        tracing::info!(url = %client.base_url, database = %client.database, next_id = max_id + 1, "connected to Neo4j");
        Ok(client)
    }

    pub(crate) fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.base_url, self.database)
    }

    pub(crate) fn begin_url(&self) -> String {
        format!("{}/db/{}/tx", self.base_url, self.database)
    }

    /// Posts `statements` to `url` and decodes the response.
    pub(crate) fn post(&self, url: &str, statements: Vec<Statement>) -> Result<CypherResponse> {
        let request = CypherRequest { statements };
        self.runtime.block_on(async {
            let response = self
                .http
                .post(url)
                .basic_auth(&self.user, Some(&self.password))
                .header(reqwest::header::ACCEPT, "application/json")
                .json(&request)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, LinksError>(response.json::<CypherResponse>().await?)
        })
    }

    /// Sends a `DELETE` to `url`, which rolls back the transaction living there.
    pub(crate) fn delete_transaction(&self, url: &str) -> Result<()> {
        self.runtime.block_on(async {
            self.http
                .delete(url)
                .basic_auth(&self.user, Some(&self.password))
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, LinksError>(())
        })
    }

    /// Runs a single auto-committed statement.
    pub fn execute(&self, statement: Statement) -> Result<QueryResult> {
        let results = self.post(&self.commit_url(), vec![statement])?.into_results()?;
        Ok(results.into_iter().next().unwrap_or_default())
    }

    /// Creates the uniqueness constraint and the source and target indexes.
    pub fn ensure_schema(&self) -> Result<()> {
        for statement in cypher::schema() {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Removes every link node and restarts id allocation at 1.
    pub fn drop_all(&self) -> Result<()> {
        self.execute(cypher::drop_all())?;
        self.reset_next_id();
        tracing::debug!(url = %self.base_url, "dropped all links");
        Ok(())
    }

    /// Id the next created link will get.
    pub fn next_id(&self) -> LinkId {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn reset_next_id(&self) {
        self.next_id.store(1, Ordering::SeqCst);
    }

    pub(crate) fn fetch_next_id(&self) -> LinkId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Cypher for Client {
    fn run(&self, statement: Statement) -> Result<QueryResult> {
        self.execute(statement)
    }

    fn client(&self) -> &Client {
        self
    }
}

impl Links for Client {
    fn constants(&self) -> &LinksConstants {
        &self.constants
    }

    fn count_links(&self, query: &[LinkId]) -> Result<u64> {
        operations::count_links(self, query)
    }

    fn create_links(&mut self, _query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        operations::create_links(self, handler)
    }

    fn each_links(&self, query: &[LinkId], handler: ReadHandler<'_>) -> Result<Flow> {
        operations::each_links(self, query, handler)
    }

    fn update_links(
        &mut self,
        query: &[LinkId],
        change: &[LinkId],
        handler: WriteHandler<'_>,
    ) -> Result<Flow> {
        operations::update_links(self, query, change, handler)
    }

    fn delete_links(&mut self, query: &[LinkId], handler: WriteHandler<'_>) -> Result<Flow> {
        operations::delete_links(self, query, handler)
    }
}

impl Doublets for Client {
    fn get_link(&self, index: LinkId) -> Result<Option<Link>> {
        operations::get_link(self, index)
    }

    fn create_point(&mut self) -> Result<LinkId> {
        operations::create_point(self)
    }

    fn delete_all(&mut self) -> Result<()> {
        self.drop_all()
    }
}
