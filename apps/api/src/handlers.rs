pub mod accounts;
pub mod health;
pub mod menu;
pub mod roles;

#[cfg(test)]
mod tests;
