//! Parsing of textual chemical equations such as `2H2 + O2 -> 2H2O`.
//!
//! ```text
//! equation := side arrow side
//! side     := term ('+' term)*
//! term     := count? formula
//! ```
//! Whitespace is ignored. Accepted arrows: `->`, `=>`, `<=>`, `=`, `→`.
//! A molecule that repeats on one side (by structure, not spelling) is merged
//! and its multipliers are added up; the first spelling is kept.
use crate::elements::{Element, ElementLookup, periodic_table};
use crate::error::{ChemError, ChemResult};
use crate::formula::Molecule;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

/// which side of the reaction arrow a molecule is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Reactant,
    Product,
}

/// checked in this order, so `<=>` wins over `=>` and `=`
const ARROWS: [&str; 5] = ["<=>", "->", "=>", "→", "="];
const ARROW_CHARS: [char; 5] = ['<', '-', '=', '>', '→'];

fn term_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d*)(.*)$").expect("term pattern is a valid regex"))
}

/// A parsed chemical equation with the multiplicities stated in the text
/// (an omitted multiplier is 1).
#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalEquation {
    reactants: Vec<(Molecule, u64)>,
    products: Vec<(Molecule, u64)>,
}

impl ChemicalEquation {
    /// Parses the equation and checks that both sides use the same elements.
    pub fn parse(text: &str) -> ChemResult<Self> {
        Self::parse_with(text, periodic_table())
    }

    pub fn parse_with(text: &str, table: &dyn ElementLookup) -> ChemResult<Self> {
        let equation = Self::parse_unvalidated(text, table)?;
        equation.validate_elements()?;
        Ok(equation)
    }

    /// Parses the text without comparing the element sets of the two sides.
    pub fn parse_unvalidated(text: &str, table: &dyn ElementLookup) -> ChemResult<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let (left, right) = split_arrow(&compact)?;
        let reactants = parse_side(left, table)?;
        let products = parse_side(right, table)?;
        debug!(
            "parsed '{}' into {} reactant(s) and {} product(s)",
            text,
            reactants.len(),
            products.len()
        );
        Ok(Self {
            reactants,
            products,
        })
    }

    /// Builds an equation from already parsed sides. Duplicate molecules on a
    /// side are merged the same way the parser merges them.
    pub fn from_sides(reactants: Vec<(Molecule, u64)>, products: Vec<(Molecule, u64)>) -> ChemResult<Self> {
        let mut merged_reactants = Vec::new();
        for (molecule, n) in reactants {
            merge_term(&mut merged_reactants, molecule, n)?;
        }
        let mut merged_products = Vec::new();
        for (molecule, n) in products {
            merge_term(&mut merged_products, molecule, n)?;
        }
        Ok(Self {
            reactants: merged_reactants,
            products: merged_products,
        })
    }

    pub fn reactants(&self) -> &[(Molecule, u64)] {
        &self.reactants
    }

    pub fn products(&self) -> &[(Molecule, u64)] {
        &self.products
    }

    pub fn side(&self, side: Side) -> &[(Molecule, u64)] {
        match side {
            Side::Reactant => &self.reactants,
            Side::Product => &self.products,
        }
    }

    pub fn reactant_molecules(&self) -> Vec<Molecule> {
        self.reactants.iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn product_molecules(&self) -> Vec<Molecule> {
        self.products.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Total atoms of each element on one side under the stated
    /// multiplicities. A total that does not fit in `u64` is a syntax error.
    pub fn element_totals(&self, side: Side) -> ChemResult<BTreeMap<Element, u64>> {
        let mut totals = BTreeMap::new();
        for (molecule, multiplier) in self.side(side) {
            for (element, &count) in molecule.element_counts() {
                let entry = totals.entry(element.clone()).or_insert(0u64);
                let sum = (count as u64)
                    .checked_mul(*multiplier)
                    .and_then(|atoms| entry.checked_add(atoms))
                    .ok_or_else(|| ChemError::syntax(format!("coefficient overflow for {}", molecule)))?;
                *entry = sum;
            }
        }
        Ok(totals)
    }

    /// elements present on a side, ordered by atomic number
    pub fn elements(&self, side: Side) -> BTreeSet<Element> {
        self.side(side)
            .iter()
            .flat_map(|(m, _)| m.elements().cloned())
            .collect()
    }

    /// Fails with `ElementSetMismatch` when an element occurs on one side only.
    pub fn validate_elements(&self) -> ChemResult<()> {
        let reactant_elements = self.elements(Side::Reactant);
        let product_elements = self.elements(Side::Product);
        if reactant_elements == product_elements {
            return Ok(());
        }
        Err(ChemError::ElementSetMismatch {
            reactant_only: reactant_elements
                .difference(&product_elements)
                .map(|e| e.symbol().to_string())
                .collect(),
            product_only: product_elements
                .difference(&reactant_elements)
                .map(|e| e.symbol().to_string())
                .collect(),
        })
    }

    /// true if the stated multiplicities already conserve every element
    pub fn is_balanced(&self) -> ChemResult<bool> {
        Ok(self.element_totals(Side::Reactant)? == self.element_totals(Side::Product)?)
    }
}

impl fmt::Display for ChemicalEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_equation(&self.reactants, &self.products))
    }
}

fn split_arrow(text: &str) -> ChemResult<(&str, &str)> {
    let (position, arrow) = ARROWS
        .iter()
        .find_map(|arrow| text.find(arrow).map(|pos| (pos, *arrow)))
        .ok_or_else(|| ChemError::syntax(format!("no reaction arrow in '{}'", text)))?;
    let left = &text[..position];
    let right = &text[position + arrow.len()..];
    if left.contains(ARROW_CHARS) || right.contains(ARROW_CHARS) {
        return Err(ChemError::syntax(format!(
            "'{}' must contain exactly one reaction arrow",
            text
        )));
    }
    Ok((left, right))
}

fn parse_side(side: &str, table: &dyn ElementLookup) -> ChemResult<Vec<(Molecule, u64)>> {
    if side.is_empty() {
        return Err(ChemError::syntax("one side of the equation is empty"));
    }
    let mut molecules: Vec<(Molecule, u64)> = Vec::new();
    for term in side.split('+') {
        if term.is_empty() {
            return Err(ChemError::syntax(format!("empty term in '{}'", side)));
        }
        let (multiplier, molecule) = parse_term(term, table)?;
        merge_term(&mut molecules, molecule, multiplier)?;
    }
    Ok(molecules)
}

fn parse_term(term: &str, table: &dyn ElementLookup) -> ChemResult<(u64, Molecule)> {
    let captures = term_pattern()
        .captures(term)
        .ok_or_else(|| ChemError::syntax(format!("cannot read term '{}'", term)))?;
    let digits = captures.get(1).map_or("", |m| m.as_str());
    let formula = captures.get(2).map_or("", |m| m.as_str());
    let multiplier = if digits.is_empty() {
        1
    } else {
        digits
            .parse::<u64>()
            .map_err(|_| ChemError::syntax(format!("coefficient '{}' is too large", digits)))?
    };
    if multiplier == 0 {
        return Err(ChemError::syntax(format!("zero coefficient in term '{}'", term)));
    }
    if formula.is_empty() {
        return Err(ChemError::syntax(format!("term '{}' has no formula", term)));
    }
    Ok((multiplier, Molecule::parse_with(formula, table)?))
}

fn merge_term(molecules: &mut Vec<(Molecule, u64)>, molecule: Molecule, multiplier: u64) -> ChemResult<()> {
    match molecules.iter_mut().find(|(m, _)| *m == molecule) {
        Some((existing, n)) => {
            debug!("{} repeats {} on one side, merging", molecule, existing);
            *n = n
                .checked_add(multiplier)
                .ok_or_else(|| ChemError::syntax(format!("coefficient overflow for {}", existing)))?;
        }
        None => molecules.push((molecule, multiplier)),
    }
    Ok(())
}

fn render_side(side: &[(Molecule, u64)]) -> String {
    side.iter()
        .filter(|(_, n)| *n != 0)
        .map(|(molecule, n)| {
            if *n == 1 {
                molecule.formula().to_string()
            } else {
                format!("{}{}", n, molecule.formula())
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Canonical text: coefficient 1 omitted, coefficient 0 molecules dropped,
/// terms joined by `" + "`, sides by `" -> "`.
pub fn render_equation(reactants: &[(Molecule, u64)], products: &[(Molecule, u64)]) -> String {
    format!("{} -> {}", render_side(reactants), render_side(products))
}
