pub mod code_units;
pub mod string_builder;
