//! Full pipeline runs over synthetic CSV fixtures

use botbid_features::FeatureError;
use botbid_pipeline::{run, PipelineConfig, PipelineError};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TRAIN: [(&str, bool); 10] = [
    ("h0", false),
    ("h1", false),
    ("h2", false),
    ("h3", false),
    ("h4", false),
    ("h5", false),
    ("r0", true),
    ("r1", true),
    ("r2", true),
    ("r3", true),
];

const TEST: [(&str, bool); 4] = [("t0", true), ("t1", false), ("t2", true), ("t3", false)];

/// Robots bid fast from one country on a few auctions; humans bid slowly
fn bids_csv() -> String {
    let mut out = String::from("bid_id,bidder_id,auction,merchandise,device,time,country,ip,url\n");
    let mut bid_id = 0;
    for (k, (bidder, robot)) in TRAIN.iter().chain(TEST.iter()).enumerate() {
        let n_bids = if *robot { 12 } else { 4 };
        let mut time = 1_000 * k as i64;
        for j in 0..n_bids {
            let (auction, merchandise, country, gap) = if *robot {
                (format!("a{}", j % 3), "mobile", "in", 2)
            } else {
                (format!("a{}", (k + j) % 5 + 3), "home goods", "us", 50 + 20 * (j as i64 % 2))
            };
            writeln!(
                out,
                "{},{},{},{},phone{},{},{},10.0.{}.{},url{}",
                bid_id,
                bidder,
                auction,
                merchandise,
                j % 4,
                time,
                country,
                usize::from(*robot),
                j % 3,
                j % 2
            )
            .unwrap();
            bid_id += 1;
            time += gap;
        }
    }
    out
}

fn write_fixtures(dir: &Path, template_ids: &[&str]) {
    fs::write(dir.join("bids.csv"), bids_csv()).unwrap();

    let mut train = String::from("bidder_id,payment_account,address,outcome\n");
    for (id, robot) in TRAIN {
        writeln!(train, "{},pay_{},addr_{},{}", id, id, id, if robot { "1.0" } else { "0.0" }).unwrap();
    }
    fs::write(dir.join("train.csv"), train).unwrap();

    let mut test = String::from("bidder_id,payment_account,address\n");
    let mut ids: Vec<&str> = TEST.iter().map(|(id, _)| *id).collect();
    ids.push("ghost");
    for id in &ids {
        writeln!(test, "{},pay_{},addr_{}", id, id, id).unwrap();
    }
    fs::write(dir.join("test.csv"), test).unwrap();

    let mut template = String::from("bidder_id,prediction\n");
    for id in template_ids {
        writeln!(template, "{},0.0", id).unwrap();
    }
    fs::write(dir.join("sampleSubmission.csv"), template).unwrap();
}

const TEMPLATE: [&str; 5] = ["t0", "t1", "t2", "t3", "ghost"];

fn fixture_dir(template_ids: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), template_ids);
    dir
}

fn quick_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default().with_data_dir(dir);
    config.trainer.gbdt.num_trees = 30;
    config.trainer.gbdt.learning_rate = 0.3;
    config.trainer.gbdt.gamma = 0.0;
    config.trainer.gbdt.min_child_weight = 0.1;
    config.trainer.gbdt.subsample = 1.0;
    config.trainer.gbdt.colsample = 1.0;
    config.trainer.bagging.bag_size = 3;
    config
}

fn read_predictions(path: &Path) -> Vec<(String, f64)> {
    let content = fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("bidder_id,prediction"));
    lines
        .map(|line| {
            let (id, p) = line.split_once(',').unwrap();
            (id.to_string(), p.parse().unwrap())
        })
        .collect()
}

#[test]
fn default_run_is_reproducible() {
    let dir = fixture_dir(&TEMPLATE);
    let config = PipelineConfig::default().with_data_dir(dir.path());

    let first = run(&config).unwrap();
    let first_bytes = fs::read(&first.output).unwrap();
    let second = run(&config).unwrap();
    let second_bytes = fs::read(&second.output).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first.digest, second.digest);
    assert_eq!(first.member_hashes, second.member_hashes);
    assert_eq!(first.member_hashes.len(), 15);
    assert_eq!(first.train_rows, 10);
    assert_eq!(first.test_rows, 5);
    assert_eq!(
        first.selected_columns,
        (first.feature_columns as f64 * 0.25).ceil() as usize
    );
}

#[test]
fn submission_follows_template_order() {
    let dir = fixture_dir(&TEMPLATE);
    let report = run(&quick_config(dir.path())).unwrap();

    let rows = read_predictions(&report.output);
    let ids: Vec<&str> = rows.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, TEMPLATE);
    assert!(rows.iter().all(|(_, p)| (0.0..=1.0).contains(p)));

    let score = |id: &str| rows.iter().find(|(i, _)| i == id).map(|(_, p)| *p).unwrap();
    assert!(score("t0") > score("t1"));
    assert!(score("t2") > score("t3"));
    assert_eq!(report.train_auc, Some(1.0));
}

#[test]
fn thread_count_does_not_change_output() {
    let dir = fixture_dir(&TEMPLATE);
    let mut config = quick_config(dir.path());

    config.trainer.bagging.threads = 1;
    let single = run(&config).unwrap();
    config.trainer.bagging.threads = 3;
    let multi = run(&config).unwrap();

    assert_eq!(single.digest, multi.digest);
}

#[test]
fn template_mismatch_aborts_before_writing() {
    let dir = fixture_dir(&["t1", "t0", "t2", "t3", "ghost"]);
    let config = quick_config(dir.path());

    match run(&config) {
        Err(PipelineError::TemplateOrder {
            position,
            template,
            test,
        }) => {
            assert_eq!(position, 0);
            assert_eq!(template, "t1");
            assert_eq!(test, "t0");
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert!(!config.paths.output_path().exists());
}

#[test]
fn unlabeled_training_row_is_fatal() {
    let dir = fixture_dir(&TEMPLATE);
    let train = fs::read_to_string(dir.path().join("train.csv")).unwrap();
    fs::write(
        dir.path().join("train.csv"),
        train.replace("h0,pay_h0,addr_h0,0.0", "h0,pay_h0,addr_h0,"),
    )
    .unwrap();

    assert!(matches!(
        run(&quick_config(dir.path())),
        Err(PipelineError::Features(FeatureError::MissingLabel(_)))
    ));
}

#[test]
fn malformed_timestamp_is_fatal() {
    let dir = fixture_dir(&TEMPLATE);
    let bids = fs::read_to_string(dir.path().join("bids.csv")).unwrap();
    fs::write(dir.path().join("bids.csv"), bids.replacen(",0,us,", ",soon,us,", 1)).unwrap();

    let result = run(&quick_config(dir.path()));
    assert!(
        matches!(
            result,
            Err(PipelineError::Features(FeatureError::InvalidTimestamp { .. }))
        ),
        "{:?}",
        result
    );
}
