pub mod achievements;
pub mod agenda;
pub mod chamada;
