mod fixtures;

mod diff_tests;
mod visibility_tests;
