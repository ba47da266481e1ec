pub mod battle;
pub mod boss;
pub mod daily;
pub mod encounter;
pub mod fusion;
pub mod profile;
