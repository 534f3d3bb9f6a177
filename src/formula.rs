//! Parsing of chemical formulas into element counts and the `Molecule` type.
//!
//! Grammar (informal):
//! ```text
//! formula := unit+
//! unit    := element count? | '(' formula ')' count?
//! element := UPPER LOWER?
//! count   := DIGIT+
//! ```
//! Bracket groups nest to any depth; the trailing count of a group scales
//! every count inside it. Repeated elements accumulate.
//!
//! # Examples
//! ```
//! use chem_balance::formula::Molecule;
//! let alum = Molecule::parse("Al2(CO3)3").unwrap();
//! println!("{} has RFM {:.3}", alum, alum.relative_formula_mass());
//! ```
use crate::elements::{Element, ElementLookup, periodic_table};
use crate::error::{ChemError, ChemResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// element -> number of atoms, ordered by atomic number
pub type ElementCounts = BTreeMap<Element, u32>;

fn formula_characters() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9()]+$").expect("formula character class is a valid regex"))
}

/// Parses a formula against the standard periodic table.
pub fn parse_formula(formula: &str) -> ChemResult<ElementCounts> {
    parse_formula_with(formula, periodic_table())
}

/// Parses a formula, resolving symbols through `table`.
pub fn parse_formula_with(formula: &str, table: &dyn ElementLookup) -> ChemResult<ElementCounts> {
    if formula.is_empty() {
        return Err(ChemError::syntax("empty formula"));
    }
    if !formula_characters().is_match(formula) {
        return Err(ChemError::syntax(format!(
            "formula '{}' contains characters other than letters, digits and brackets",
            formula
        )));
    }
    let opening = formula.matches('(').count();
    let closing = formula.matches(')').count();
    if opening != closing {
        return Err(ChemError::syntax(format!(
            "formula '{}' has {} opening and {} closing brackets",
            formula, opening, closing
        )));
    }
    parse_units(formula, table)
}

// recursive descent over one (sub)formula; the input is ASCII at this point
fn parse_units(formula: &str, table: &dyn ElementLookup) -> ChemResult<ElementCounts> {
    let bytes = formula.as_bytes();
    if bytes.is_empty() {
        return Err(ChemError::syntax("empty bracket group"));
    }
    let mut counts = ElementCounts::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'(' {
            let close = matching_bracket(bytes, i).ok_or_else(|| {
                ChemError::syntax(format!("unclosed bracket in '{}'", formula))
            })?;
            let inner = parse_units(&formula[i + 1..close], table)?;
            let (multiplier, next) = read_count(formula, close + 1)?;
            for (element, count) in inner {
                let scaled = count
                    .checked_mul(multiplier)
                    .ok_or_else(|| ChemError::syntax(format!("atom count overflow in '{}'", formula)))?;
                accumulate(&mut counts, element, scaled, formula)?;
            }
            i = next;
        } else if c == b')' {
            return Err(ChemError::syntax(format!(
                "closing bracket without an opening bracket in '{}'",
                formula
            )));
        } else if c.is_ascii_uppercase() {
            let mut end = i + 1;
            if end < bytes.len() && bytes[end].is_ascii_lowercase() {
                end += 1;
            }
            let symbol = &formula[i..end];
            let element = table
                .lookup_element(symbol)
                .ok_or_else(|| ChemError::UnknownElement(symbol.to_string()))?
                .clone();
            let (count, next) = read_count(formula, end)?;
            accumulate(&mut counts, element, count, formula)?;
            i = next;
        } else if c.is_ascii_digit() {
            return Err(ChemError::syntax(format!(
                "number at position {} of '{}' has no element or group before it",
                i, formula
            )));
        } else {
            return Err(ChemError::syntax(format!(
                "lowercase letter at position {} of '{}' has no capital letter before it",
                i, formula
            )));
        }
    }
    Ok(counts)
}

fn matching_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads the digits starting at `start`; no digits means an implied 1.
fn read_count(formula: &str, start: usize) -> ChemResult<(u32, usize)> {
    let bytes = formula.as_bytes();
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Ok((1, start));
    }
    let count: u32 = formula[start..end]
        .parse()
        .map_err(|_| ChemError::syntax(format!("count '{}' is too large", &formula[start..end])))?;
    if count == 0 {
        return Err(ChemError::syntax(format!("zero count in '{}'", formula)));
    }
    Ok((count, end))
}

fn accumulate(counts: &mut ElementCounts, element: Element, n: u32, formula: &str) -> ChemResult<()> {
    let entry = counts.entry(element).or_insert(0);
    *entry = entry
        .checked_add(n)
        .ok_or_else(|| ChemError::syntax(format!("atom count overflow in '{}'", formula)))?;
    Ok(())
}

/// Sum of count x atomic mass.
pub fn relative_formula_mass(counts: &ElementCounts) -> f64 {
    counts
        .iter()
        .map(|(element, &count)| element.atomic_mass() * count as f64)
        .sum()
}

/// A parsed molecule. Equality and hashing look only at the element counts,
/// so `CH3COOH` and `C2H4O2` are the same molecule.
#[derive(Debug, Clone)]
pub struct Molecule {
    formula: String,
    elements: ElementCounts,
    relative_formula_mass: f64,
}

impl Molecule {
    pub fn parse(formula: &str) -> ChemResult<Self> {
        Self::parse_with(formula, periodic_table())
    }

    pub fn parse_with(formula: &str, table: &dyn ElementLookup) -> ChemResult<Self> {
        let elements = parse_formula_with(formula, table)?;
        Ok(Self::from_counts(formula, elements))
    }

    pub fn from_counts(formula: &str, elements: ElementCounts) -> Self {
        let relative_formula_mass = relative_formula_mass(&elements);
        Self {
            formula: formula.to_string(),
            elements,
            relative_formula_mass,
        }
    }

    /// the formula as it was written
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn element_counts(&self) -> &ElementCounts {
        &self.elements
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.keys()
    }

    pub fn contains(&self, element: &Element) -> bool {
        self.elements.contains_key(element)
    }

    /// number of atoms of `element`, 0 if absent
    pub fn count_of(&self, element: &Element) -> u32 {
        self.elements.get(element).copied().unwrap_or(0)
    }

    /// relative formula mass, g/mol
    pub fn relative_formula_mass(&self) -> f64 {
        self.relative_formula_mass
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Eq for Molecule {}

impl Hash for Molecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formula)
    }
}
