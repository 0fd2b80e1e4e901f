mod common;
mod config_test;
mod scoring_test;
mod sweep_test;
