pub mod applicator;
pub mod builder;
pub mod checks;
pub mod complex;
pub mod contingency;
pub mod loader;
pub mod molecule;
pub mod rate;
pub mod reaction;
pub mod state;
pub mod tree;
