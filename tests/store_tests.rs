//! Integration tests for the native doublets stores.
//!
//! Every layout and memory kind is driven with the same seeded random
//! operations and compared against a plain map after each step. The
//! file-backed variants are also closed and reopened to check that links,
//! free ids and indexes survive.

use std::collections::BTreeMap;

use linksneo4j::{
    Doublets, Flow, Link, LinkId, LinksError, SplitNonVolatile, SplitVolatile, UnitedNonVolatile,
    UnitedVolatile,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

type Model = BTreeMap<LinkId, (LinkId, LinkId)>;

fn collect<S: Doublets>(store: &S, query: [LinkId; 3]) -> Vec<Link> {
    let mut links = Vec::new();
    store
        .each_by(query, |link| {
            links.push(link);
            Flow::Continue
        })
        .unwrap();
    links.sort();
    links
}

fn expected(model: &Model, query: [LinkId; 3]) -> Vec<Link> {
    let [index, source, target] = query;
    model
        .iter()
        .map(|(&id, &(s, t))| Link::new(id, s, t))
        .filter(|link| index == 0 || link.index == index)
        .filter(|link| source == 0 || link.source == source)
        .filter(|link| target == 0 || link.target == target)
        .collect()
}

fn check_against_model<S: Doublets>(store: &S, model: &Model, rng: &mut StdRng) {
    assert_eq!(store.count().unwrap(), model.len() as u64);
    assert_eq!(collect(store, [0, 0, 0]), expected(model, [0, 0, 0]));

    let bound = model.keys().next_back().copied().unwrap_or(0) + 2;
    for _ in 0..8 {
        let query = [
            if rng.gen_bool(0.3) { rng.gen_range(1..bound) } else { 0 },
            if rng.gen_bool(0.5) { rng.gen_range(1..bound) } else { 0 },
            if rng.gen_bool(0.5) { rng.gen_range(1..bound) } else { 0 },
        ];
        let want = expected(model, query);
        assert_eq!(collect(store, query), want, "query {query:?}");
        assert_eq!(store.count_by(query).unwrap(), want.len() as u64, "count {query:?}");
    }
}

fn random_operations<S: Doublets>(store: &mut S, model: &mut Model, seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..steps {
        let ids: Vec<LinkId> = model.keys().copied().collect();
        match rng.gen_range(0..10) {
            0..=3 => {
                let id = store.create_point().unwrap();
                assert!(!model.contains_key(&id), "id {id} handed out twice");
                assert!(id <= ids.last().copied().unwrap_or(0) + 1);
                model.insert(id, (id, id));
            }
            4 => {
                let id = store.create().unwrap();
                assert!(!model.contains_key(&id));
                model.insert(id, (0, 0));
            }
            5..=6 if !ids.is_empty() => {
                let id = ids[rng.gen_range(0..ids.len())];
                let source = ids[rng.gen_range(0..ids.len())];
                let target = ids[rng.gen_range(0..ids.len())];
                assert_eq!(store.update(id, source, target).unwrap(), id);
                model.insert(id, (source, target));
            }
            7..=8 if !ids.is_empty() => {
                let id = ids[rng.gen_range(0..ids.len())];
                assert_eq!(store.delete(id).unwrap(), id);
                model.remove(&id);
                assert!(!store.exists(id).unwrap());
            }
            _ => check_against_model(store, model, &mut rng),
        }
    }
    check_against_model(store, model, &mut rng);
}

#[test]
fn test_united_volatile_matches_model() {
    let mut store = UnitedVolatile::volatile();
    random_operations(&mut store, &mut Model::new(), 1, 2_000);
}

#[test]
fn test_split_volatile_matches_model() {
    let mut store = SplitVolatile::volatile();
    random_operations(&mut store, &mut Model::new(), 2, 2_000);
}

#[test]
fn test_united_file_matches_model_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("united.links");
    let mut model = Model::new();
    {
        let mut store = UnitedNonVolatile::open(&path).unwrap();
        random_operations(&mut store, &mut model, 3, 1_000);
        store.flush().unwrap();
    }
    let mut store = UnitedNonVolatile::open(&path).unwrap();
    check_against_model(&store, &model, &mut StdRng::seed_from_u64(4));
    random_operations(&mut store, &mut model, 5, 500);
}

#[test]
fn test_split_file_matches_model_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("split_data.links");
    let index = dir.path().join("split_index.links");
    let mut model = Model::new();
    {
        let mut store = SplitNonVolatile::open(&data, &index).unwrap();
        random_operations(&mut store, &mut model, 6, 1_000);
        store.flush().unwrap();
    }
    let mut store = SplitNonVolatile::open(&data, &index).unwrap();
    check_against_model(&store, &model, &mut StdRng::seed_from_u64(7));
    random_operations(&mut store, &mut model, 8, 500);
}

#[test]
fn test_reopen_reuses_free_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("united.links");
    {
        let mut store = UnitedNonVolatile::open(&path).unwrap();
        for expected in 1..=5 {
            assert_eq!(store.create_point().unwrap(), expected);
        }
        store.delete(2).unwrap();
        store.delete(4).unwrap();
    }
    let mut store = UnitedNonVolatile::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(store.create_point().unwrap(), 4);
    assert_eq!(store.create_point().unwrap(), 2);
    assert_eq!(store.create_point().unwrap(), 6);
}

#[test]
fn test_delete_all_empties_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data.links");
    let index = dir.path().join("index.links");
    {
        let mut store = SplitNonVolatile::open(&data, &index).unwrap();
        for _ in 0..10 {
            store.create_point().unwrap();
        }
        store.delete_all().unwrap();
        assert_eq!(store.create_point().unwrap(), 1);
    }
    let store = SplitNonVolatile::open(&data, &index).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get_link(1).unwrap(), Some(Link::point(1)));
}

#[test]
fn test_errors_on_missing_links() {
    let mut store = UnitedVolatile::volatile();
    store.create_point().unwrap();
    assert!(matches!(store.delete(7), Err(LinksError::NotExists(7))));
    assert!(matches!(store.update(7, 1, 1), Err(LinksError::NotExists(7))));
    assert_eq!(store.search(1, 1).unwrap(), Some(1));
    assert_eq!(store.search(1, 2).unwrap(), None);
}
