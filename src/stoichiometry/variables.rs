//! Coefficient variables: one per (molecule, side) within one balancing attempt.
use crate::equation::Side;
use std::fmt;

/// Dense index of a coefficient variable inside one `StoichiometricSystem`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Alphabetic label: A, B, ..., Z, AA, AB, ..., ZZ, AAA, ...
    pub fn label(self) -> String {
        let mut letters = Vec::new();
        let mut n = self.0 + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        String::from_utf8(letters).unwrap_or_default()
    }

    /// Inverse of [`VarId::label`]; `None` for anything but uppercase ASCII letters.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.is_empty() {
            return None;
        }
        let mut n: usize = 0;
        for b in label.bytes() {
            if !b.is_ascii_uppercase() {
                return None;
            }
            n = n.checked_mul(26)?.checked_add((b - b'A') as usize + 1)?;
        }
        Some(VarId(n - 1))
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Binds a variable to the molecule it multiplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoefficientVariable {
    pub id: VarId,
    pub side: Side,
    /// position of the molecule within its side
    pub molecule_index: usize,
}
