mod yaml_runner;

pub use yaml_runner::{CaseResult, DiffCase, Expectation, load_cases_from_str, run_diff_case};
