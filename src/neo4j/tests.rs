#[cfg(test)]
mod neo4j_tests {
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::{TcpListener, TcpStream},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Mutex,
        },
        thread,
    };

    use serde_json::{json, Value};

    use crate::{
        links::{Link, LinksError, QueryKind},
        neo4j::{
            cypher::{self, CypherRequest, CypherResponse, Statement},
            transaction::{settle, transaction_url},
            Client, Neo4jConfig, Neo4jConfigBuilder, Transaction,
        },
    };

    const COMMIT: &str = "http://localhost:7474/db/neo4j/tx/7/commit";
    const FAILING: &str = "RETURN 1/0";

    /// A fake HTTP endpoint that answers like Neo4j and logs `METHOD path`
    /// for every request. Explicit transactions always get id 7.
    struct FakeServer {
        base: String,
        requests: Arc<Mutex<Vec<String>>>,
        expired: Arc<AtomicBool>,
    }

    impl FakeServer {
        fn start() -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));
            let expired = Arc::new(AtomicBool::new(false));
            let (log, gone, url) = (requests.clone(), expired.clone(), base.clone());
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(stream) = stream else { break };
                    answer(stream, &url, &log, &gone);
                }
            });
            FakeServer {
                base,
                requests,
                expired,
            }
        }

        fn client(&self) -> Client {
            let client = Client::new(&config(&self.base)).unwrap();
            self.take();
            client
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.requests.lock().unwrap())
        }
    }

    fn answer(mut stream: TcpStream, base: &str, log: &Mutex<Vec<String>>, expired: &AtomicBool) {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap();
                }
            }
        }
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        let body = String::from_utf8_lossy(&body);

        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default();
        let path = parts.next().unwrap_or_default();
        log.lock().unwrap().push(format!("{method} {path}"));

        let commit = format!("{base}/db/neo4j/tx/7/commit");
        let count = json!([{ "columns": ["count"], "data": [{ "row": [1] }] }]);
        let (status, reply): (&str, Value) = match (method, path) {
            ("DELETE", "/db/neo4j/tx/7") => ("200 OK", json!({ "results": [], "errors": [] })),
            ("POST", "/db/neo4j/tx/commit") => (
                "200 OK",
                json!({ "results": [{ "columns": ["max_id"], "data": [{ "row": [0] }] }], "errors": [] }),
            ),
            ("POST", "/db/neo4j/tx/7") if expired.load(Ordering::SeqCst) => {
                ("404 Not Found", json!({ "errors": [] }))
            }
            ("POST", "/db/neo4j/tx" | "/db/neo4j/tx/7") if body.contains(FAILING) => (
                "200 OK",
                json!({
                    "results": [],
                    "errors": [{ "code": "Neo.ClientError.Statement.ArithmeticError", "message": "/ by zero" }],
                    "commit": commit
                }),
            ),
            ("POST", "/db/neo4j/tx" | "/db/neo4j/tx/7") => {
                ("200 OK", json!({ "results": count, "errors": [], "commit": commit }))
            }
            ("POST", "/db/neo4j/tx/7/commit") => ("200 OK", json!({ "results": [], "errors": [] })),
            _ => ("404 Not Found", json!({})),
        };
        let reply = reply.to_string();
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
            reply.len()
        )
        .unwrap();
        stream.flush().unwrap();
    }

    fn response(value: Value) -> CypherResponse {
        serde_json::from_value(value).unwrap()
    }

    fn count_statement() -> Vec<Statement> {
        vec![cypher::count(&QueryKind::All)]
    }

    fn config(uri: &str) -> Neo4jConfig {
        Neo4jConfigBuilder::default().uri(uri).build().unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let config = Neo4jConfigBuilder::default().build().unwrap();
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.database, "neo4j");
        assert_eq!(config.http_base(), "http://localhost:7474");
    }

    #[test]
    fn test_bolt_uri_maps_to_http() {
        assert_eq!(config("bolt://localhost:7687").http_base(), "http://localhost:7474");
        assert_eq!(config("bolt://db.internal").http_base(), "http://db.internal:7474");
        assert_eq!(config("bolt://db.internal:9000").http_base(), "http://db.internal:9000");
        assert_eq!(config("http://localhost:7474/").http_base(), "http://localhost:7474");
        assert_eq!(config("localhost:7474").http_base(), "http://localhost:7474");
    }

    #[test]
    fn test_select_statements() {
        let all = cypher::select(&QueryKind::All);
        assert_eq!(
            all.statement,
            "MATCH (l:Link) RETURN l.id AS id, l.source AS source, l.target AS target"
        );
        assert!(all.parameters.is_none());

        let concrete = cypher::select(&QueryKind::Concrete {
            source: 2,
            target: 3,
        });
        assert_eq!(
            concrete.statement,
            "MATCH (l:Link) WHERE l.source = $source AND l.target = $target \
             RETURN l.id AS id, l.source AS source, l.target AS target"
        );
        assert_eq!(concrete.parameters, Some(json!({ "source": 2, "target": 3 })));

        let identity = cypher::count(&QueryKind::Identity {
            index: 9,
            source: None,
            target: Some(1),
        });
        assert_eq!(
            identity.statement,
            "MATCH (l:Link {id: $id}) WHERE l.target = $target RETURN count(l) AS count"
        );
        assert_eq!(identity.parameters, Some(json!({ "id": 9, "target": 1 })));
    }

    #[test]
    fn test_request_serialization_skips_missing_parameters() {
        let request = CypherRequest {
            statements: vec![cypher::drop_all(), cypher::delete(4)],
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "statements": [
                    { "statement": "MATCH (l:Link) DETACH DELETE l" },
                    { "statement": "MATCH (l:Link {id: $id}) DELETE l", "parameters": { "id": 4 } }
                ]
            })
        );
    }

    #[test]
    fn test_response_rows_become_links() {
        let response: CypherResponse = serde_json::from_value(json!({
            "results": [{
                "columns": ["id", "source", "target"],
                "data": [
                    { "row": [1, 1, 1], "meta": [null, null, null] },
                    { "row": [2, 1, 3], "meta": [null, null, null] }
                ]
            }],
            "errors": [],
            "commit": "http://localhost:7474/db/neo4j/tx/12/commit"
        }))
        .unwrap();
        assert_eq!(
            response.commit.as_deref().map(transaction_url),
            Some("http://localhost:7474/db/neo4j/tx/12")
        );
        let results = response.into_results().unwrap();
        assert_eq!(
            results[0].links().unwrap(),
            vec![Link::point(1), Link::new(2, 1, 3)]
        );
    }

    #[test]
    fn test_response_errors_are_reported() {
        let response: CypherResponse = serde_json::from_value(json!({
            "results": [],
            "errors": [{
                "code": "Neo.ClientError.Statement.SyntaxError",
                "message": "Invalid input"
            }]
        }))
        .unwrap();
        match response.into_results() {
            Err(LinksError::Cypher { code, .. }) => {
                assert_eq!(code, "Neo.ClientError.Statement.SyntaxError")
            }
            other => panic!("expected a Cypher error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_reads_count() {
        let response: CypherResponse = serde_json::from_value(json!({
            "results": [{ "columns": ["count"], "data": [{ "row": [42] }] }]
        }))
        .unwrap();
        let results = response.into_results().unwrap();
        assert_eq!(results[0].scalar().unwrap(), 42);
        assert_eq!(
            cypher::create(5, 5, 5),
            Statement::new("CREATE (l:Link {id: $id, source: $source, target: $target})")
                .with_parameters(json!({ "id": 5, "source": 5, "target": 5 }))
        );
    }

    #[test]
    fn test_settle_opens_transaction_from_commit_url() {
        let mut open = None;
        let results = settle(
            &mut open,
            Ok(response(json!({ "results": [{ "columns": ["count"], "data": [] }], "commit": COMMIT }))),
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(open.as_deref(), Some("http://localhost:7474/db/neo4j/tx/7"));

        settle(&mut open, Ok(response(json!({ "results": [] })))).unwrap();
        assert_eq!(open.as_deref(), Some("http://localhost:7474/db/neo4j/tx/7"));
    }

    #[test]
    fn test_settle_requires_commit_url_on_begin() {
        let mut open = None;
        let result = settle(&mut open, Ok(response(json!({ "results": [] }))));
        assert!(matches!(result, Err(LinksError::UnexpectedResponse(_))), "{result:?}");
        assert_eq!(open, None);
    }

    #[test]
    fn test_settle_closes_on_cypher_error() {
        let mut open = Some("http://localhost:7474/db/neo4j/tx/7".to_string());
        let result = settle(
            &mut open,
            Ok(response(json!({
                "errors": [{ "code": "Neo.ClientError.Schema.ConstraintValidationFailed", "message": "exists" }],
                "commit": COMMIT
            }))),
        );
        assert!(matches!(result, Err(LinksError::Cypher { .. })));
        assert_eq!(open, None);
    }

    #[test]
    fn test_settle_closes_on_transport_error() {
        let mut open = Some("http://localhost:7474/db/neo4j/tx/7".to_string());
        let result = settle(
            &mut open,
            Err(LinksError::UnexpectedResponse("connection reset".into())),
        );
        assert!(result.is_err());
        assert_eq!(open, None);
    }

    #[test]
    fn test_transaction_begins_lazily_and_commits() {
        let server = FakeServer::start();
        let client = server.client();
        let transaction = Transaction::new(&client);
        assert!(!transaction.is_open().unwrap());
        transaction.commit().unwrap();
        assert!(server.take().is_empty());

        let results = transaction.execute_all(count_statement()).unwrap();
        assert_eq!(results[0].scalar().unwrap(), 1);
        assert!(transaction.is_open().unwrap());
        transaction.execute_all(count_statement()).unwrap();
        transaction.commit().unwrap();
        assert!(!transaction.is_open().unwrap());
        drop(transaction);

        assert_eq!(
            server.take(),
            vec![
                "POST /db/neo4j/tx",
                "POST /db/neo4j/tx/7",
                "POST /db/neo4j/tx/7/commit",
            ]
        );
    }

    #[test]
    fn test_rollback_and_drop_delete_the_transaction() {
        let server = FakeServer::start();
        let client = server.client();

        let transaction = Transaction::new(&client);
        transaction.execute_all(count_statement()).unwrap();
        transaction.rollback().unwrap();
        assert!(!transaction.is_open().unwrap());
        transaction.rollback().unwrap();
        drop(transaction);
        assert_eq!(server.take(), vec!["POST /db/neo4j/tx", "DELETE /db/neo4j/tx/7"]);

        {
            let transaction = Transaction::new(&client);
            transaction.execute_all(count_statement()).unwrap();
        }
        assert_eq!(server.take(), vec!["POST /db/neo4j/tx", "DELETE /db/neo4j/tx/7"]);
    }

    #[test]
    fn test_failed_statement_closes_transaction() {
        let server = FakeServer::start();
        let client = server.client();
        {
            let transaction = Transaction::new(&client);
            transaction.execute_all(count_statement()).unwrap();
            let result = transaction.execute_all(vec![Statement::new(FAILING)]);
            assert!(matches!(result, Err(LinksError::Cypher { .. })), "{result:?}");
            assert!(!transaction.is_open().unwrap());
        }
        assert_eq!(server.take(), vec!["POST /db/neo4j/tx", "POST /db/neo4j/tx/7"]);
    }

    #[test]
    fn test_expired_transaction_is_reopened() {
        let server = FakeServer::start();
        let client = server.client();
        let transaction = Transaction::new(&client);
        transaction.execute_all(count_statement()).unwrap();

        server.expired.store(true, Ordering::SeqCst);
        let result = transaction.execute_all(count_statement());
        assert!(matches!(result, Err(LinksError::Http(_))), "{result:?}");
        assert!(!transaction.is_open().unwrap());

        server.expired.store(false, Ordering::SeqCst);
        transaction.execute_all(count_statement()).unwrap();
        assert!(transaction.is_open().unwrap());
        transaction.commit().unwrap();
        assert_eq!(
            server.take(),
            vec![
                "POST /db/neo4j/tx",
                "POST /db/neo4j/tx/7",
                "POST /db/neo4j/tx",
                "POST /db/neo4j/tx/7/commit",
            ]
        );
    }
}
