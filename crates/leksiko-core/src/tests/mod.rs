
mod dictionary_tests;
mod engine_tests;
