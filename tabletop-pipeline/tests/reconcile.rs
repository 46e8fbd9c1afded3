mod common;

use common::*;
use tabletop_catalog::*;
use tabletop_pipeline::*;

const LIST: &str = "\
# my shelf
Catan
https://example-catalog/boardgame/322708/descent-legends-of-the-dark # Descent
Wingspan
asdkjf12390
";

fn remote() -> MockDatabase {
    MockDatabase::new().with_search("wingspan", vec![candidate(266192, "Wingspan", Some(2019))])
}

fn run(entries: &[ListEntry], prior: &[ResolutionRecord], remote: &MockDatabase) -> ResolutionPass {
    let index = sample_index();
    let resolver = Resolver::new(Some(&index), Some(remote), ResolverOptions::default());
    let mut log = RunLog::new();
    run_resolution(entries, prior, &resolver, None, &SilentProgress, &mut log)
}

#[test]
fn first_pass_resolves_in_list_order() {
    let entries = parse_list(LIST);
    let pass = run(&entries, &[], &remote());

    let ids: Vec<Option<u32>> = pass.records.iter().map(|r| r.catalog_id).collect();
    assert_eq!(ids, vec![Some(13), Some(322708), Some(266192), None]);
    assert_eq!(pass.stats.resolved, 3);
    assert_eq!(pass.stats.unresolved, 1);
    assert_eq!(pass.records[3].status, ResolutionStatus::ManualReviewNeeded);
}

#[test]
fn manual_id_is_never_overwritten() {
    let entries = parse_list("Catan\n");
    let prior = vec![ResolutionRecord {
        input: "Catan".into(),
        catalog_id: Some(27710),
        confidence: Confidence::None,
        status: ResolutionStatus::ManualReviewNeeded,
        ..Default::default()
    }];
    let remote = remote();

    let pass = run(&entries, &prior, &remote);

    assert_eq!(pass.records, prior);
    assert_eq!(pass.stats.preserved, 1);
    assert_eq!(remote.total_calls(), 0);
}

#[test]
fn second_pass_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("boardgame_ids.csv");
    let entries = parse_list(LIST);

    let first = run(&entries, &[], &remote());
    write_store(&store, &first.records).unwrap();
    let before = std::fs::read(&store).unwrap();

    let prior = load_store(&store).unwrap();
    assert_eq!(prior, first.records);
    let second = run(&entries, &prior, &remote());
    write_store(&store, &second.records).unwrap();

    assert_eq!(std::fs::read(&store).unwrap(), before);
    assert_eq!(second.stats.preserved, 3);
}

#[test]
fn unresolved_row_keeps_typed_custom_name() {
    let entries = parse_list("Wingspan\n");
    let prior = vec![ResolutionRecord {
        input: "Wingspan".into(),
        custom_name: Some("Birds".into()),
        ..Default::default()
    }];

    let pass = run(&entries, &prior, &remote());
    let record = &pass.records[0];

    assert_eq!(record.catalog_id, Some(266192));
    assert_eq!(record.custom_name.as_deref(), Some("Birds"));
    assert_eq!(record.match_method, MatchMethod::RemoteSearchMatch);
}

#[test]
fn pairs_by_link_when_the_line_changed() {
    let entries = parse_list(
        "https://example-catalog/boardgame/322708/descent-legends-of-the-dark # Descent LotD\n",
    );
    let prior = vec![ResolutionRecord {
        input: "old line".into(),
        source_link: Some(
            "https://example-catalog/boardgame/322708/descent-legends-of-the-dark".into(),
        ),
        catalog_id: Some(322708),
        custom_name: Some("Descent".into()),
        ..Default::default()
    }];

    let pass = run(&entries, &prior, &remote());

    assert_eq!(pass.records.len(), 1);
    assert_eq!(pass.records[0].custom_name.as_deref(), Some("Descent"));
    assert_eq!(pass.stats.orphaned, 0);
}

#[test]
fn duplicates_pair_with_duplicates() {
    let entries = parse_list("Azul\nAzul\n");
    let prior = vec![
        ResolutionRecord {
            input: "Azul".into(),
            catalog_id: Some(230802),
            ..Default::default()
        },
        ResolutionRecord {
            input: "Azul".into(),
            catalog_id: Some(230802),
            custom_name: Some("Azul (spare)".into()),
            ..Default::default()
        },
    ];

    let pairs = pair_entries(&entries, &prior);
    assert_eq!(pairs, vec![Some(0), Some(1)]);

    let pass = run(&entries, &prior, &remote());
    assert_eq!(pass.records, prior);
}

#[test]
fn unpaired_rows_are_appended() {
    let entries = parse_list("Catan\n");
    let prior = vec![ResolutionRecord {
        input: "Removed From List".into(),
        catalog_id: Some(1),
        ..Default::default()
    }];

    let pass = run(&entries, &prior, &remote());

    assert_eq!(pass.records.len(), 2);
    assert_eq!(pass.records[0].catalog_id, Some(13));
    assert_eq!(pass.records[1].input, "Removed From List");
    assert_eq!(pass.stats.orphaned, 1);
}

#[test]
fn limit_defers_remaining_lookups() {
    let entries = parse_list("Wingspan\nasdkjf12390\n");
    let remote = remote();
    let resolver = Resolver::new(None, Some(&remote), ResolverOptions::default());
    let mut log = RunLog::new();

    let pass = run_resolution(&entries, &[], &resolver, Some(1), &SilentProgress, &mut log);

    assert_eq!(remote.searches.get(), 1);
    assert_eq!(pass.stats.deferred, 1);
    assert_eq!(pass.records.len(), 2);
    assert_eq!(pass.records[1].status, ResolutionStatus::ManualReviewNeeded);
}

#[test]
fn run_log_records_each_outcome() {
    let entries = parse_list(LIST);
    let index = sample_index();
    let remote = remote();
    let resolver = Resolver::new(Some(&index), Some(&remote), ResolverOptions::default());
    let mut log = RunLog::new();

    run_resolution(&entries, &[], &resolver, None, &SilentProgress, &mut log);
    let summary = log.summary();

    assert_eq!(summary.resolved, 3);
    assert_eq!(summary.high, 2);
    assert_eq!(summary.medium, 1);
    assert_eq!(summary.unresolved, 1);
}
