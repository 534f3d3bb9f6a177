/// Coefficient variables bound to (molecule, side) pairs, labelled A, B, ..., AA, ...
pub mod variables;
/// Linear conservation equations over coefficient variables, the monotonic rational
/// assignment used while solving, and the textual notation `2A + B = 3C`.
pub mod linear_equation;
/// Builds one linear equation per element from reactant and product molecules.
///
/// # Examples
/// ```
/// use chem_balance::equation::ChemicalEquation;
/// use chem_balance::stoichiometry::builder::StoichiometricSystem;
/// let equation = ChemicalEquation::parse("H2 + O2 -> H2O").unwrap();
/// let system = StoichiometricSystem::from_equation(&equation).unwrap();
/// println!("{}", system.describe());
/// ```
pub mod builder;
/// Exact rational solver: seed, simple substitution, simultaneous elimination of
/// two equations sharing two unknowns, and integer normalization.
pub mod rational_solver;
/// Bounded backtracking search used when the rational solver finds no solving order.
pub mod brute_force;
/// The two balancing strategies behind one trait, dispatched through an enum.
pub mod strategy;
