pub mod assign;
pub mod draw;
pub mod io;
pub mod ipw;
pub mod probabilities;
pub mod ri;
pub mod version;
