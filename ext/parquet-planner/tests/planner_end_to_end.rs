use std::path::Path;
use std::sync::Arc;

use parquet_planner::*;
use parquet_schema::{parse_message_type, ParquetError};

use test_helpers::*;

fn warehouse() -> Fixture {
    let fixture = Fixture::new();
    fixture.add_document_file(
        "/warehouse/events/part-0.parquet",
        10,
        &[4, 1004],
        vec![block(0, 1000, "node-1"), block(1000, 1000, "node-2")],
    );
    fixture.add_document_file(
        "/warehouse/events/day=2/part-0.parquet",
        20,
        &[4],
        vec![block(0, 500, "node-3")],
    );
    fixture.fs.add_file("/warehouse/events/_SUCCESS", 0, ts(30));
    fixture
        .fs
        .add_file("/warehouse/events/.part-0.parquet.crc", 16, ts(10));
    fixture
}

#[test]
fn test_plan_directory() {
    let fixture = warehouse();
    let planner = fixture.full_planner();

    let splits = planner.plan(&paths(&["/warehouse"])).unwrap();
    let summary: Vec<(&Path, u64, u64)> = splits
        .iter()
        .map(|s| (s.path(), s.start(), s.length()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Path::new("/warehouse/events/day=2/part-0.parquet"), 0, 60),
            (Path::new("/warehouse/events/part-0.parquet"), 0, 60),
            (Path::new("/warehouse/events/part-0.parquet"), 1000, 60),
        ]
    );
    assert_eq!(splits[2].hosts(), &["node-2".to_string()]);
    assert_eq!(fixture.reader.reads(), 2);
}

#[test]
fn test_hidden_files_are_not_listed() {
    let fixture = warehouse();
    let statuses = fixture
        .full_planner()
        .list_status(&paths(&["/warehouse/events"]))
        .unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| !is_hidden(s.path())));
}

#[test]
fn test_footers_are_reused_until_files_change() {
    let fixture = warehouse();
    let planner = fixture.full_planner();
    let roots = paths(&["/warehouse"]);

    planner.plan(&roots).unwrap();
    planner.plan(&roots).unwrap();
    assert_eq!(fixture.reader.reads(), 2);

    // rewriting a file invalidates only its footer
    fixture
        .fs
        .set_modification_time(Path::new("/warehouse/events/part-0.parquet"), ts(40))
        .unwrap();
    planner.plan(&roots).unwrap();
    assert_eq!(fixture.reader.reads(), 3);
}

#[test]
fn test_shared_cache_between_planners() {
    let fixture = warehouse();
    let cache = Arc::new(FooterCache::new(MIN_FOOTER_CACHE_SIZE));
    let first = fixture.full_planner().with_footer_cache(cache.clone());
    let second = fixture.full_planner().with_footer_cache(cache.clone());

    first.plan(&paths(&["/warehouse"])).unwrap();
    second.plan(&paths(&["/warehouse"])).unwrap();
    assert_eq!(fixture.reader.reads(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_partial_failure_is_aggregated_and_successes_cached() {
    let fixture = warehouse();
    fixture.fs.add_file("/warehouse/events/broken.parquet", 10, ts(10));
    fixture.fs.add_file("/warehouse/events/empty.parquet", 0, ts(10));
    let planner = fixture.full_planner();

    let statuses = planner.list_status(&paths(&["/warehouse"])).unwrap();
    assert_eq!(statuses.len(), 4);

    let err = planner.footers_for(&statuses).unwrap_err();
    let failed: Vec<&Path> = err.footer_failures().iter().map(|f| f.path.as_path()).collect();
    assert_eq!(
        failed,
        vec![
            Path::new("/warehouse/events/broken.parquet"),
            Path::new("/warehouse/events/empty.parquet"),
        ]
    );
    assert!(err.to_string().contains("broken.parquet"));
    assert_eq!(planner.footer_cache().len(), 2);

    let resolution = planner.resolve_footers(&statuses);
    assert_eq!(resolution.footers.len(), 2);
    assert_eq!(resolution.failures.len(), 2);
    // the two good footers came from the cache the second time
    assert_eq!(fixture.reader.reads(), 6);
}

#[test]
fn test_projection_read_support() {
    let fixture = warehouse();
    let projection = parse_message_type("message Document { required int64 DocId; }").unwrap();
    let planner = fixture.planner(Arc::new(
        ProjectionReadSupport::new(projection.clone()).with_metadata("projected", "true"),
    ));

    let splits = planner.plan(&paths(&["/warehouse"])).unwrap();
    assert_eq!(splits.len(), 3);
    for split in &splits {
        assert_eq!(split.length(), 10);
        assert_eq!(split.requested_schema().unwrap(), projection);
        assert_eq!(split.read_support_metadata()["projected"], "true");
    }
}

#[test]
fn test_projection_outside_the_files_fails() {
    let fixture = warehouse();
    let planner = fixture.planner(Arc::new(
        ProjectionReadSupport::from_schema_text("message Document { required int64 Title; }")
            .unwrap(),
    ));
    let err = planner.plan(&paths(&["/warehouse"])).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        PlannerError::Schema(ParquetError::IncompatibleSchema(_))
    ));
}

#[test]
fn test_global_metadata_over_evolving_files() {
    let fixture = Fixture::new();
    fixture.fs.add_file("/t/v1.parquet", 100, ts(1));
    fixture.fs.add_file("/t/v2.parquet", 100, ts(2));
    fixture.reader.insert(
        "/t/v1.parquet",
        ParquetMetadata::new(
            FileMetaData::new(parse_message_type("message e { required int64 id; }").unwrap())
                .with_created_by("writer 1"),
            vec![],
        ),
    );
    fixture.reader.insert(
        "/t/v2.parquet",
        ParquetMetadata::new(
            FileMetaData::new(
                parse_message_type("message e { optional int64 id; optional binary tag (UTF8); }")
                    .unwrap(),
            )
            .with_created_by("writer 2"),
            vec![],
        ),
    );

    let planner = fixture.full_planner();
    let statuses = planner.list_status(&paths(&["/t"])).unwrap();
    let footers = planner.footers_for(&statuses).unwrap();
    let global = planner.global_metadata(&footers).unwrap();

    assert_eq!(
        global.schema(),
        &parse_message_type("message e { optional int64 id; optional binary tag (UTF8); }")
            .unwrap()
    );
    assert_eq!(global.created_by().len(), 2);
    // files without row groups produce no splits
    assert!(planner.splits(&footers).unwrap().is_empty());
}

#[test]
fn test_missing_root() {
    let fixture = warehouse();
    let err = fixture
        .full_planner()
        .plan(&paths(&["/nowhere"]))
        .unwrap_err();
    assert!(matches!(err, PlannerError::NotFound(_)));
}
