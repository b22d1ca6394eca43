#[cfg(test)]
mod report_tests {
    use crate::{
        bench::{Backend, Operation},
        report::{BenchLine, ReportError, ResultsTable},
    };

    const OUTPUT: &str = "\
Benchmarking Create/Neo4j_NonTransaction: Warming up for 3.0000 s
test Create/Neo4j_NonTransaction ... bench:  3,200,000 ns/iter (+/- 12,000)
test Create/Neo4j_Transaction ... bench:  1600000 ns/iter (+/- 9000)
test Create/Doublets_United_Volatile ... bench:      100000 ns/iter (+/- 20)
test Create/Doublets_Split_NonVolatile ... bench:     400,000 ns/iter (+/- 1,000)
test Create/Something_Else ... bench:     1 ns/iter (+/- 1)
";

    #[test]
    fn test_parse_bench_line() {
        let pattern = BenchLine::pattern().unwrap();
        let line = BenchLine::parse(
            "  test Each_Concrete/Doublets_Split_Volatile ... bench:     1,234 ns/iter (+/- 56)",
            &pattern,
        )
        .unwrap();
        assert_eq!(line.operation, Operation::EachConcrete);
        assert_eq!(line.backend, Backend::DoubletsSplitVolatile);
        assert_eq!(line.ns_per_iter, 1234);
        assert_eq!(line.deviation, 56);
        assert_eq!(line.id(), "Each_Concrete/Doublets_Split_Volatile");

        assert!(BenchLine::parse("Benchmarking Create: Collecting 10 samples", &pattern).is_none());
        assert!(BenchLine::parse(
            "test Create/Something_Else ... bench:     1 ns/iter (+/- 1)",
            &pattern
        )
        .is_none());
    }

    #[test]
    fn test_table_values_and_speedup() {
        let table = ResultsTable::parse(OUTPUT).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.get(Operation::Create, Backend::Neo4jNonTransaction),
            Some(3_200_000)
        );
        assert_eq!(table.fastest_neo4j(Operation::Create), Some(1_600_000));
        assert_eq!(
            table.speedup(Operation::Create, Backend::DoubletsUnitedVolatile),
            Some(16.0)
        );
        assert_eq!(table.get(Operation::Update, Backend::DoubletsUnitedVolatile), None);
        assert_eq!(table.speedup(Operation::Update, Backend::DoubletsUnitedVolatile), None);
    }

    #[test]
    fn test_zero_times_count_as_missing() {
        let text = "\
test Create/Neo4j_NonTransaction ... bench:  0 ns/iter (+/- 0)
test Create/Neo4j_Transaction ... bench:  500 ns/iter (+/- 5)
test Create/Doublets_United_Volatile ... bench:  0 ns/iter (+/- 0)
test Create/Doublets_Split_Volatile ... bench:  100 ns/iter (+/- 1)
";
        let table = ResultsTable::parse(text).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(Operation::Create, Backend::Neo4jNonTransaction), None);
        assert_eq!(table.fastest_neo4j(Operation::Create), Some(500));
        assert_eq!(
            table.speedup(Operation::Create, Backend::DoubletsSplitVolatile),
            Some(5.0)
        );
        assert_eq!(table.speedup(Operation::Create, Backend::DoubletsUnitedVolatile), None);

        let missing = table.missing();
        assert!(missing.contains(&"Create/Neo4j_NonTransaction".to_string()));
        assert!(missing.contains(&"Create/Doublets_United_Volatile".to_string()));
        assert!(!missing.contains(&"Create/Neo4j_Transaction".to_string()));

        let markdown = table.to_markdown();
        let create = markdown.lines().nth(2).unwrap();
        assert_eq!(
            create,
            "| Create        | N/A                      | N/A                         | \
             100 (5.0x faster)       | N/A                        | N/A                  | 500               |"
        );
    }

    #[test]
    fn test_later_lines_replace_earlier_ones() {
        let text = format!(
            "{OUTPUT}test Create/Neo4j_Transaction ... bench:  800000 ns/iter (+/- 1)\n"
        );
        let table = ResultsTable::parse(&text).unwrap();
        assert_eq!(table.fastest_neo4j(Operation::Create), Some(800_000));
    }

    #[test]
    fn test_failures_are_reported() {
        let text = format!("{OUTPUT}thread 'main' panicked at benches/links_bench.rs:42:9:\n");
        match ResultsTable::parse(&text) {
            Err(ReportError::BenchmarkFailed { line }) => {
                assert!(line.starts_with("thread 'main' panicked at"))
            }
            other => panic!("expected a failure, got {other:?}"),
        }

        let text = "error: bench failed, to rerun pass `--bench links_bench`";
        assert!(matches!(
            ResultsTable::parse(text),
            Err(ReportError::BenchmarkFailed { .. })
        ));
    }

    #[test]
    fn test_empty_output_is_an_error() {
        assert!(matches!(ResultsTable::parse(""), Err(ReportError::NoResults)));
        assert!(matches!(
            ResultsTable::parse("Benchmarking Create/Neo4j_Transaction: Warming up"),
            Err(ReportError::NoResults)
        ));
    }

    #[test]
    fn test_missing_cells() {
        let table = ResultsTable::parse(OUTPUT).unwrap();
        let missing = table.missing();
        assert_eq!(missing.len(), 8 * 6 - 4);
        assert_eq!(missing[0], "Create/Doublets_United_NonVolatile");
        assert!(missing.contains(&"Each_Incoming/Neo4j_Transaction".to_string()));
        match table.check_complete() {
            Err(ReportError::Incomplete { missing }) => assert_eq!(missing.len(), 44),
            other => panic!("expected an incomplete table, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_table() {
        let mut text = String::new();
        for operation in Operation::ALL {
            for backend in Backend::ALL {
                text.push_str(&format!(
                    "test {}/{} ... bench: 10 ns/iter (+/- 1)\n",
                    operation.group_name(),
                    backend.id()
                ));
            }
        }
        let table = ResultsTable::parse(&text).unwrap();
        assert!(table.missing().is_empty());
        assert!(table.check_complete().is_ok());
    }

    #[test]
    fn test_markdown_layout() {
        let table = ResultsTable::parse(OUTPUT).unwrap();
        let markdown = table.to_markdown();
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(
            lines[0],
            "| Operation     | Doublets United Volatile | Doublets United NonVolatile | \
             Doublets Split Volatile | Doublets Split NonVolatile | Neo4j NonTransaction | Neo4j Transaction |"
        );
        assert_eq!(
            lines[1],
            "|---------------|--------------------------|-----------------------------|\
             -------------------------|----------------------------|----------------------|-------------------|"
        );
        assert_eq!(
            lines[2],
            "| Create        | 100000 (16.0x faster)    | N/A                         | \
             N/A                     | 400000 (4.0x faster)       | 3200000              | 1600000           |"
        );
        assert!(lines[3].starts_with("| Update        | N/A "));
        assert!(lines[9].starts_with("| Each Incoming | N/A "));
    }
}
