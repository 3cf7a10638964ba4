pub mod core;

pub use self::core::applicator::{CompileError, ComplexApplicator, ContingencyInput};
pub use self::core::builder::ComplexBuilder;
pub use self::core::complex::{AlternativeComplexes, BiologicalComplex, Side, Sign};
pub use self::core::contingency::{BoolExpr, Contingency, ContingencyApplicator, ContingencyKind};
pub use self::core::loader::{compile_network, load, LoadError, NetworkJSON};
pub use self::core::molecule::Molecule;
pub use self::core::rate::Rate;
pub use self::core::reaction::{Reaction, ReactionContainer};
pub use self::core::state::{Component, State, StateKind};
