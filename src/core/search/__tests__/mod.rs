mod config_test;
mod evaluator_test;
