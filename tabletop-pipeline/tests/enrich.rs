mod common;

use std::path::Path;

use common::*;
use tabletop_catalog::*;
use tabletop_pipeline::*;

fn found(input: &str, id: u32) -> ResolutionRecord {
    let mut record = ResolutionRecord {
        input: input.to_string(),
        ..Default::default()
    };
    record.resolve(id, Some(input.to_string()), Confidence::High, MatchMethod::LocalIndexMatch);
    record
}

fn open_cache(dir: &Path) -> EnrichmentCache {
    EnrichmentCache::open(&dir.join("boardgames_enriched.csv"), &dir.join("images")).unwrap()
}

fn enrich(
    remote: &MockDatabase,
    records: &[ResolutionRecord],
    cache: &mut EnrichmentCache,
    options: EnrichOptions,
) -> (Result<EnrichStats, PipelineError>, RunLog) {
    let mut log = RunLog::new();
    let enricher = Enricher::new(remote, None, options);
    let result = enricher.run(records, cache, &SilentProgress, &mut log);
    (result, log)
}

fn tmp_files(dir: &Path) -> Vec<String> {
    walk(dir)
        .into_iter()
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

fn walk(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            names.extend(walk(&path));
        } else {
            names.push(path.display().to_string());
        }
    }
    names
}

#[test]
fn fetches_details_and_image() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new().with_game(details(13, "CATAN"));
    let mut cache = open_cache(dir.path());

    let (result, _) = enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default());
    let stats = result.unwrap();

    assert_eq!(stats.enriched, 1);
    assert_eq!(stats.images_downloaded, 1);
    let game = cache.get(13).unwrap();
    assert_eq!(game.name, "CATAN");
    assert_eq!(game.image_path.as_deref(), Some("13.jpg"));
    assert!(dir.path().join("images/13.jpg").is_file());
    assert!(tmp_files(dir.path()).is_empty());

    let reopened = open_cache(dir.path());
    assert_eq!(reopened.get(13), cache.get(13));
}

#[test]
fn cached_game_with_image_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new().with_game(details(13, "CATAN"));
    let mut cache = open_cache(dir.path());
    enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    let cache_path = dir.path().join("boardgames_enriched.csv");
    let image_path = dir.path().join("images/13.jpg");
    let cache_before = std::fs::read(&cache_path).unwrap();
    let image_before = std::fs::read(&image_path).unwrap();

    let remote = MockDatabase::new();
    let mut cache = open_cache(dir.path());
    let (result, log) = enrich(
        &remote,
        &[found("Catan", 13)],
        &mut cache,
        EnrichOptions::default(),
    );

    assert_eq!(result.unwrap().skipped, 1);
    assert_eq!(remote.total_calls(), 0);
    assert_eq!(std::fs::read(&cache_path).unwrap(), cache_before);
    assert_eq!(std::fs::read(&image_path).unwrap(), image_before);
    assert_eq!(log.summary().skipped, 1);
}

#[test]
fn failure_for_one_id_does_not_stop_the_next() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new()
        .with_game(details(1, "First"))
        .with_game(details(2, "Second"))
        .failing_id(1);
    let mut cache = open_cache(dir.path());
    let records = vec![found("First", 1), found("Second", 2)];

    let (result, log) = enrich(&remote, &records, &mut cache, EnrichOptions::default());
    let stats = result.unwrap();

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.enriched, 1);
    assert!(cache.get(1).is_none());
    assert_eq!(cache.get(2).unwrap().name, "Second");
    assert!(log.entries().iter().any(|e| matches!(
        e,
        RunEntry::Failed { catalog_id: 1, .. }
    )));
}

#[test]
fn missing_game_counts_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new();
    let mut cache = open_cache(dir.path());

    let stats = enrich(&remote, &[found("Ghost", 404)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    assert_eq!(stats.not_found, 1);
    assert!(cache.is_empty());
}

#[test]
fn missing_image_is_retried_with_one_call() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://cf.example/pic13.jpg";
    let remote = MockDatabase::new()
        .with_game(details(13, "CATAN"))
        .failing_image(url);
    let mut cache = open_cache(dir.path());

    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();
    assert_eq!(stats.enriched, 1);
    assert_eq!(stats.image_failures, 1);
    assert_eq!(cache.get(13).unwrap().image_path, None);

    let remote = MockDatabase::new();
    let mut cache = open_cache(dir.path());
    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    assert_eq!(stats.image_only, 1);
    assert_eq!(remote.image_calls.get(), 1);
    assert_eq!(remote.total_calls(), 1);
    assert_eq!(cache.get(13).unwrap().image_path.as_deref(), Some("13.jpg"));
}

#[test]
fn image_already_on_disk_is_relinked_without_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(dir.path());
    cache.insert(EnrichedGame {
        catalog_id: 13,
        name: "CATAN".into(),
        display_name: "CATAN".into(),
        image_url: Some("https://cf.example/pic13.png".into()),
        ..Default::default()
    });
    cache.save().unwrap();
    std::fs::create_dir_all(dir.path().join("images")).unwrap();
    std::fs::write(dir.path().join("images/13.png"), b"png").unwrap();

    let remote = MockDatabase::new();
    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    assert_eq!(stats.image_only, 1);
    assert_eq!(remote.total_calls(), 0);
    assert_eq!(cache.get(13).unwrap().image_path.as_deref(), Some("13.png"));
}

#[test]
fn earlier_ids_survive_a_later_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A file where the images directory should be makes image writes fail.
    std::fs::write(dir.path().join("images"), b"not a directory").unwrap();

    let mut first = details(1, "First");
    first.image_url = None;
    let remote = MockDatabase::new()
        .with_game(first)
        .with_game(details(2, "Second"));
    let mut cache = open_cache(dir.path());
    let records = vec![found("First", 1), found("Second", 2)];

    let (result, _) = enrich(&remote, &records, &mut cache, EnrichOptions::default());

    assert!(matches!(result, Err(PipelineError::Persist { .. })));
    let reopened = open_cache(dir.path());
    assert_eq!(reopened.get(1).unwrap().name, "First");
    assert!(reopened.get(2).is_none());
}

#[test]
fn no_images_option_skips_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new().with_game(details(13, "CATAN"));
    let mut cache = open_cache(dir.path());
    let options = EnrichOptions {
        download_images: false,
        ..Default::default()
    };

    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, options.clone())
        .0
        .unwrap();
    assert_eq!(stats.images_downloaded, 0);
    assert_eq!(remote.image_calls.get(), 0);

    // Cached without an image file, but downloads are off: nothing to do.
    let remote = MockDatabase::new();
    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, options)
        .0
        .unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(remote.total_calls(), 0);
}

#[test]
fn refresh_refetches_cached_games() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new().with_game(details(13, "CATAN"));
    let mut cache = open_cache(dir.path());
    enrich(&remote, &[found("Catan", 13)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    let remote = MockDatabase::new().with_game(details(13, "CATAN (new edition)"));
    let options = EnrichOptions {
        refresh: true,
        ..Default::default()
    };
    let stats = enrich(&remote, &[found("Catan", 13)], &mut cache, options)
        .0
        .unwrap();

    assert_eq!(stats.enriched, 1);
    assert_eq!(remote.detail_calls.get(), 1);
    // The image on disk is reused.
    assert_eq!(remote.image_calls.get(), 0);
    assert_eq!(cache.get(13).unwrap().name, "CATAN (new edition)");
}

#[test]
fn limit_counts_only_ids_needing_work() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new()
        .with_game(details(1, "One"))
        .with_game(details(2, "Two"))
        .with_game(details(3, "Three"));
    let mut cache = open_cache(dir.path());
    enrich(&remote, &[found("One", 1)], &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    let records = vec![found("One", 1), found("Two", 2), found("Three", 3)];
    let options = EnrichOptions {
        limit: Some(1),
        ..Default::default()
    };
    let stats = enrich(&remote, &records, &mut cache, options).0.unwrap();

    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.enriched, 1);
    assert_eq!(stats.deferred, 1);
    assert!(cache.get(2).is_some());
    assert!(cache.get(3).is_none());
}

#[test]
fn duplicate_ids_are_enriched_once() {
    let dir = tempfile::tempdir().unwrap();
    let remote = MockDatabase::new().with_game(details(13, "CATAN"));
    let mut cache = open_cache(dir.path());
    let records = vec![found("Catan", 13), found("Catan again", 13)];

    let stats = enrich(&remote, &records, &mut cache, EnrichOptions::default())
        .0
        .unwrap();

    assert_eq!(stats.ids, 1);
    assert_eq!(remote.detail_calls.get(), 1);
}

#[test]
fn build_game_prefers_custom_name_and_fills_from_index() {
    let index = sample_index();
    let mut record = found("Catan", 13);
    record.custom_name = Some("Settlers".into());
    let mut payload = details(13, "CATAN");
    payload.year = None;

    let game = build_game(&record, 13, payload, Some(&index));

    assert_eq!(game.display_name, "Settlers");
    assert_eq!(game.name, "CATAN");
    assert_eq!(game.year, Some(1995));
    assert_eq!(game.rank, Some(5));
    assert_eq!(
        game.source_link.as_deref(),
        Some("https://boardgamegeek.com/boardgame/13")
    );
    assert!(game.fetched_at.is_some());
}

#[test]
fn cache_rows_that_do_not_parse_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = open_cache(dir.path());
    for (id, name) in [(13, "CATAN"), (230802, "Azul")] {
        cache.insert(EnrichedGame {
            catalog_id: id,
            display_name: name.to_string(),
            name: name.to_string(),
            ..Default::default()
        });
    }
    cache.save().unwrap();

    let path = dir.path().join("boardgames_enriched.csv");
    let saved = std::fs::read_to_string(&path).unwrap();
    let (header, rows) = saved.split_once('\n').unwrap();
    std::fs::write(&path, format!("{header}\nabc,Broken,Broken\n0,Zero,Zero\n{rows}")).unwrap();

    let reopened = open_cache(dir.path());

    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(230802).unwrap().name, "Azul");
    assert!(reopened.get(0).is_none());
}
