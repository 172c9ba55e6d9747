pub mod money;
pub mod testing;
