mod common;

use common::{agreement_suite, write_suite, AGREEMENT_ITEMS, CORPUS};
use langscore_core::benchmark::Benchmark;
use langscore_core::errors::BenchmarkError;
use langscore_core::model::SUB_BENCHMARK_DIM;
use langscore_core::providers::BigramSubject;
use langscore_core::syntaxgym::{
    self, SyntaxGymSingleTse, SyntaxGymTse, SYNTAXGYM_2020_SUITES,
};

fn bigram() -> BigramSubject {
    BigramSubject::train("bigram-test", CORPUS, 0.1)
}

#[tokio::test]
async fn single_suite_scores_fraction_of_items_passing() {
    let bench = SyntaxGymSingleTse::new(agreement_suite("agreement", &AGREEMENT_ITEMS)).unwrap();
    assert_eq!(bench.identifier(), "syntaxgym-agreement");

    let mut lm = bigram();
    let score = bench.score(&mut lm).await.unwrap();
    assert!((score.value - 0.75).abs() < 1e-12);
    assert_eq!(score.raw, Some(score.value));
}

#[tokio::test]
async fn composite_is_mean_of_suites_with_labels_in_order() {
    let a = agreement_suite("agreement_all", &AGREEMENT_ITEMS);
    let b = agreement_suite("agreement_easy", &AGREEMENT_ITEMS[..2]);
    let composite = SyntaxGymTse::from_suites("syntaxgym-pair", vec![a.clone(), b.clone()]).unwrap();
    assert_eq!(composite.labels(), ["agreement_all", "agreement_easy"]);

    let mut lm = bigram();
    let score = composite.score(&mut lm).await.unwrap();
    let singles = [
        SyntaxGymSingleTse::new(a).unwrap().score(&mut lm).await.unwrap().value,
        SyntaxGymSingleTse::new(b).unwrap().score(&mut lm).await.unwrap().value,
    ];

    let sub = score.sub_scores.as_ref().unwrap();
    assert_eq!(sub.dim, SUB_BENCHMARK_DIM);
    assert_eq!(sub.labels(), vec!["agreement_all", "agreement_easy"]);
    assert_eq!(sub.values(), singles.to_vec());
    assert!((score.value - (singles[0] + singles[1]) / 2.0).abs() < 1e-12);
    assert!(score.error.is_some());
}

#[tokio::test]
async fn truncated_composite_matches_prefix_suites() {
    let mut composite = SyntaxGymTse::from_suites(
        "syntaxgym-trunc",
        vec![agreement_suite("agreement", &AGREEMENT_ITEMS)],
    )
    .unwrap();
    for sub in composite.sub_benchmarks.iter_mut() {
        sub.suite.items.truncate(3);
    }

    let mut lm = bigram();
    let truncated = composite.score(&mut lm).await.unwrap();
    let prefix = SyntaxGymSingleTse::new(agreement_suite("agreement", &AGREEMENT_ITEMS[..3]))
        .unwrap()
        .score(&mut lm)
        .await
        .unwrap();
    assert_eq!(truncated.value, prefix.value);
    assert_eq!(truncated.value, 1.0);
}

#[test]
fn region_totals_match_hand_computed_surprisal() {
    let bench = SyntaxGymSingleTse::new(agreement_suite("agreement", &AGREEMENT_ITEMS)).unwrap();
    let mut lm = bigram();
    let totals = bench.get_region_totals(&mut lm).unwrap();
    assert_eq!(totals.len(), AGREEMENT_ITEMS.len());

    let s = |prev: &str, w: &str| -lm.probability(prev, w).log2();
    let subject = s("<s>", "the") + s("the", "dog");
    let first = &totals[0];
    assert!((first[&("match".to_string(), 1)] - subject).abs() < 1e-3);
    assert!((first[&("match".to_string(), 2)] - s("dog", "runs")).abs() < 1e-3);
    assert!((first[&("mismatch".to_string(), 2)] - s("dog", "run")).abs() < 1e-3);
    assert_eq!(first.len(), 4);
}

#[test]
fn region_totals_of_truncated_suite_are_a_prefix() {
    let mut bench =
        SyntaxGymSingleTse::new(agreement_suite("agreement", &AGREEMENT_ITEMS)).unwrap();
    let full = bench.get_region_totals(&mut bigram()).unwrap();

    for k in 1..AGREEMENT_ITEMS.len() {
        bench.suite.items.truncate(k);
        let truncated = bench.get_region_totals(&mut bigram()).unwrap();
        assert_eq!(truncated.len(), k);
        for (got, want) in truncated.iter().zip(&full[..k]) {
            assert_eq!(got.len(), want.len());
            for (key, value) in want {
                assert!((got[key] - value).abs() < 1e-3, "{:?}", key);
            }
        }
    }
}

#[tokio::test]
async fn unsmoothed_model_is_a_data_error_not_a_wrong_accuracy() {
    let bench = SyntaxGymSingleTse::new(agreement_suite("agreement", &AGREEMENT_ITEMS)).unwrap();
    // "dog run" never occurs in the corpus, so its surprisal is infinite
    let mut lm = BigramSubject::train("bigram-unsmoothed", CORPUS, 0.0);

    let err = bench.get_region_totals(&mut lm).unwrap_err();
    assert!(matches!(err, BenchmarkError::Data(ref m) if m.contains("surprisal")));
    assert!(matches!(
        bench.score(&mut lm).await,
        Err(BenchmarkError::Data(_))
    ));
}

#[tokio::test]
async fn syntaxgym2020_has_one_sub_benchmark_per_suite() {
    let dir = tempfile::tempdir().unwrap();
    for name in SYNTAXGYM_2020_SUITES {
        write_suite(dir.path(), &agreement_suite(name, &AGREEMENT_ITEMS[..2]));
    }

    let composite = syntaxgym::syntaxgym2020(dir.path()).unwrap();
    assert_eq!(composite.identifier(), "syntaxgym-2020");
    assert_eq!(composite.sub_benchmarks.len(), 31);
    assert_eq!(composite.labels(), SYNTAXGYM_2020_SUITES);

    let mut lm = bigram();
    let score = composite.score(&mut lm).await.unwrap();
    assert_eq!(score.sub_scores.unwrap().labels().len(), 31);
    assert_eq!(score.value, 1.0);
}

#[test]
fn missing_suite_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = syntaxgym::syntaxgym2020(dir.path()).err().unwrap();
    assert!(format!("{:#}", err).contains("center_embed"));
}

#[test]
fn empty_composite_is_rejected() {
    assert!(matches!(
        SyntaxGymTse::from_suites("syntaxgym-none", vec![]),
        Err(BenchmarkError::EmptyComposite)
    ));
}

#[tokio::test]
async fn empty_suite_errors_instead_of_dividing_by_zero() {
    let bench = SyntaxGymSingleTse::new(agreement_suite("nothing", &[])).unwrap();
    let mut lm = bigram();
    let err = bench.score(&mut lm).await.unwrap_err();
    assert!(matches!(err, BenchmarkError::EmptySuite(ref n) if n == "nothing"));
}
