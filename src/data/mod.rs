pub mod bosses;
pub mod species;
