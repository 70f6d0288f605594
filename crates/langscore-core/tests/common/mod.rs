#![allow(dead_code)]

use langscore_core::storage::store::UserRow;
use langscore_core::storage::Store;
use langscore_core::syntaxgym::Suite;
use serde_json::json;

pub const CORPUS: &str = "the dog runs\nthe dogs run\nthe dog sleeps\nthe dogs sleep\n";

/// Subject-verb agreement items: (subject, grammatical verb, ungrammatical verb).
pub const AGREEMENT_ITEMS: [(&str, &str, &str); 4] = [
    ("the dog", "runs", "run"),
    ("the dogs", "run", "runs"),
    ("the dog", "sleeps", "sleep"),
    // reversed on purpose: the bigram model gets this one wrong
    ("the dog", "sleep", "sleeps"),
];

pub fn agreement_suite(name: &str, items: &[(&str, &str, &str)]) -> Suite {
    let items: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(i, (subj, good, bad))| {
            json!({
                "item_number": i + 1,
                "conditions": [
                    {"condition_name": "match", "regions": [
                        {"region_number": 1, "content": subj},
                        {"region_number": 2, "content": good}
                    ]},
                    {"condition_name": "mismatch", "regions": [
                        {"region_number": 1, "content": subj},
                        {"region_number": 2, "content": bad}
                    ]}
                ]
            })
        })
        .collect();
    let raw = json!({
        "meta": {"name": name, "metric": "sum"},
        "region_meta": {"1": "subject", "2": "verb"},
        "predictions": [{"type": "formula", "formula": "(2;%match%) < (2;%mismatch%)"}],
        "items": items,
    });
    Suite::from_json(&raw.to_string()).unwrap()
}

pub fn write_suite(dir: &std::path::Path, suite: &Suite) {
    let path = dir.join(format!("{}.json", suite.name()));
    std::fs::write(path, serde_json::to_string_pretty(suite).unwrap()).unwrap();
}

pub fn store_with_user() -> Store {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    store
        .insert_user(&UserRow {
            id: 1,
            email: "test@example.com".into(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
        })
        .unwrap();
    store
}
