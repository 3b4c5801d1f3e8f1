pub mod driver;
pub mod mysql;

#[cfg(test)]
pub mod fake;
