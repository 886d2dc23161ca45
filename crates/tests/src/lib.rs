pub mod fixtures;

#[cfg(test)]
mod attendance_tests;
#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod rule_tests;
#[cfg(test)]
mod schema_tests;
