pub mod battle;
pub mod boss;
pub mod collection;
pub mod daily;
pub mod encounter;
pub mod fusion;
pub mod ledger;
pub mod profile;
pub mod time;
