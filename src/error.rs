//! Error taxonomy shared by the parsers, the stoichiometry builder and the balancer.
use thiserror::Error;

/// Everything that can go wrong while reading formulas, equations or the
/// balancer configuration, or while balancing.
#[derive(Debug, Error)]
pub enum ChemError {
    /// malformed formula or equation text
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Unknown element: {0}")]
    UnknownElement(String),
    /// reactant and product sides reference different sets of elements
    #[error(
        "Element sets differ between sides (only in reactants: {reactant_only:?}, only in products: {product_only:?})"
    )]
    ElementSetMismatch {
        reactant_only: Vec<String>,
        product_only: Vec<String>,
    },
    /// a coefficient variable was placed twice on one side of a linear equation
    #[error("Variable {0} appears twice on one side of an equation")]
    DuplicateTerm(String),
    /// neither the rational solver nor the brute-force search found coefficients
    #[error("Equation cannot be balanced: {0}")]
    Unbalanceable(String),
    #[error("Substance {0} does not take part in the reaction")]
    NotInReaction(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type ChemResult<T> = Result<T, ChemError>;

impl ChemError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        ChemError::Syntax(msg.into())
    }
}
