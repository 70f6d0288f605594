//! Targeted syntactic evaluation over SyntaxGym test suites.

use std::collections::BTreeMap;
use std::path::Path;

pub mod benchmark;
pub mod formula;
pub mod suite;

pub use benchmark::{SyntaxGymSingleTse, SyntaxGymTse};
pub use suite::{Condition, Item, Prediction, Region, Suite};

/// Surprisal sum per `(condition, region_number)` for one item.
pub type RegionTotals = BTreeMap<(String, u32), f64>;

pub const SYNTAXGYM_2020_SUITES: [&str; 31] = [
    "center_embed",
    "center_embed_mod",
    "cleft",
    "cleft_modifier",
    "fgd_hierarchy",
    "fgd_object",
    "fgd_pp",
    "fgd_subject",
    "mvrr",
    "mvrr_mod",
    "npi_orc_any",
    "npi_orc_ever",
    "npi_src_any",
    "npi_src_ever",
    "npz_ambig",
    "npz_ambig_mod",
    "npz_obj",
    "npz_obj_mod",
    "number_orc",
    "number_prep",
    "number_src",
    "reflexive_orc_fem",
    "reflexive_orc_masc",
    "reflexive_prep_fem",
    "reflexive_prep_masc",
    "reflexive_src_fem",
    "reflexive_src_masc",
    "subordination",
    "subordination_orc-orc",
    "subordination_pp-pp",
    "subordination_src-src",
];

pub const SYNTAXGYM_2020_ID: &str = "syntaxgym-2020";

/// The SyntaxGym 2020 composite, reading suites from `suite_dir`.
pub fn syntaxgym2020(suite_dir: &Path) -> anyhow::Result<SyntaxGymTse> {
    let names: Vec<String> = SYNTAXGYM_2020_SUITES.iter().map(|s| s.to_string()).collect();
    SyntaxGymTse::from_dir(SYNTAXGYM_2020_ID, suite_dir, &names)
}
