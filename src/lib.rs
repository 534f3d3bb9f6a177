//! # chem_balance
//!
//! Balancing of chemical equations by element conservation.
//!
//! ```
//! use chem_balance::balance_equation;
//! let balanced = balance_equation("KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2").unwrap();
//! assert_eq!(
//!     balanced.to_string(),
//!     "2KMnO4 + 16HCl -> 2KCl + 2MnCl2 + 8H2O + 5Cl2"
//! );
//! ```

/// Reference element data: symbol, name, atomic number and atomic mass,
/// looked up by symbol or by (case-insensitive) English name.
pub mod elements;
/// Recursive-descent parser for formulas such as `Al2(CO3)3` and the
/// [`formula::Molecule`] value type.
pub mod formula;
/// Parser for whole equations, `2H2 + O2 -> 2H2O`.
pub mod equation;
/// From molecules to element-conservation equations and their integer solutions.
pub mod stoichiometry;
/// The balancing pipeline and its result type.
pub mod balancer;
/// Limiting reagent and mole amounts of a balanced reaction.
pub mod amounts;
pub mod config;
pub mod logging;
pub mod error;

pub use balancer::{BalanceReport, BalancedEquation, Balancer, balance_equation};
pub use config::{BalancerConfig, ConfigManager};
pub use equation::{ChemicalEquation, Side};
pub use error::{ChemError, ChemResult};
pub use formula::{Molecule, parse_formula};
