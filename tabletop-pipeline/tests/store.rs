use tabletop_catalog::*;
use tabletop_pipeline::*;

#[test]
fn missing_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_store(&dir.path().join("nope.csv")).unwrap().is_empty());
}

#[test]
fn reads_hand_edited_rows_leniently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardgame_ids.csv");
    std::fs::write(
        &path,
        "\
input,custom_name,source_link,catalog_id,matched_name,confidence,status,match_method
Catan,,,13,CATAN,High,Found,LocalIndexMatch
 Mystery Game , My Mystery ,, 1234.0 ,,maybe,,
,,,,,,,
Broken,,,abc,,Low,Found,RemoteSearchMatch
",
    )
    .unwrap();

    let records = load_store(&path).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].catalog_id, Some(13));
    assert_eq!(records[0].match_method, MatchMethod::LocalIndexMatch);

    assert_eq!(records[1].input, "Mystery Game");
    assert_eq!(records[1].custom_name.as_deref(), Some("My Mystery"));
    assert_eq!(records[1].catalog_id, Some(1234));
    assert_eq!(records[1].confidence, Confidence::None);
    assert_eq!(records[1].status, ResolutionStatus::ManualReviewNeeded);

    assert_eq!(records[2].catalog_id, None);
    assert_eq!(records[2].confidence, Confidence::Low);
}

#[test]
fn accepts_reordered_and_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ids.csv");
    std::fs::write(&path, "catalog_id,input\n230802,Azul\n").unwrap();

    let records = load_store(&path).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].input, "Azul");
    assert_eq!(records[0].catalog_id, Some(230802));
    assert_eq!(records[0].custom_name, None);
}

#[test]
fn rejects_a_file_without_known_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ids.csv");
    std::fs::write(&path, "foo,bar\n1,2\n").unwrap();

    assert!(matches!(
        load_store(&path),
        Err(PipelineError::InvalidStore { .. })
    ));
}

#[test]
fn write_is_atomic_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/boardgame_ids.csv");
    let mut record = ResolutionRecord {
        input: "Escape Room \\#3 # Escape, the third".into(),
        custom_name: Some("Escape, the third".into()),
        ..Default::default()
    };
    record.resolve(
        42,
        Some("Escape Room: #3".into()),
        Confidence::Medium,
        MatchMethod::RemoteSearchMatch,
    );
    let records = vec![record, ResolutionRecord::default()];

    write_store(&path, &records).unwrap();

    let names: Vec<String> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["boardgame_ids.csv".to_string()]);

    let loaded = load_store(&path).unwrap();
    // The default row is blank and is dropped on read.
    assert_eq!(loaded, records[..1]);
}

#[test]
fn read_list_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_list(&dir.path().join("missing.txt")),
        Err(PipelineError::InputList { .. })
    ));
}

#[test]
fn line_numbers_survive_skipped_and_multiline_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardgame_ids.csv");
    std::fs::write(
        &path,
        "\
input,custom_name,source_link,catalog_id,matched_name,confidence,status,match_method
Catan,,,13,CATAN,High,Found,LocalIndexMatch
,,,,,,,
\"Azul
(tin edition)\",,,230802,Azul,Medium,Found,RemoteSearchMatch
Wingspan,,,,,None,ManualReviewNeeded,Unresolved
",
    )
    .unwrap();

    let rows = load_store_lines(&path).unwrap();

    let lines: Vec<u64> = rows.iter().map(|(line, _)| *line).collect();
    assert_eq!(lines, vec![2, 4, 6]);
    assert_eq!(rows[2].1.input, "Wingspan");
    assert_eq!(load_store(&path).unwrap().len(), 3);
}
