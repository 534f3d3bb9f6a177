//! Reference data for chemical elements and the lookup used by the formula parser.
//!
//! The built-in table carries standard atomic weights (g/mol); for elements with
//! no stable isotope the mass number of the longest-lived isotope is used.
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// A chemical element. Two elements are the same if their chemical identity
/// (atomic number, symbol, name and mass) is the same.
#[derive(Debug, Clone)]
pub struct Element {
    symbol: String,
    name: String,
    atomic_number: u32,
    atomic_mass: f64,
}

impl Element {
    pub fn new(symbol: &str, name: &str, atomic_number: u32, atomic_mass: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            atomic_number,
            atomic_mass,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    /// atomic mass in g/mol
    pub fn atomic_mass(&self) -> f64 {
        self.atomic_mass
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.atomic_number.hash(state);
        self.symbol.hash(state);
        self.name.hash(state);
        self.atomic_mass.to_bits().hash(state);
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ordered by atomic number first so element-indexed output follows the periodic table
impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        self.atomic_number
            .cmp(&other.atomic_number)
            .then_with(|| self.symbol.cmp(&other.symbol))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.atomic_mass.total_cmp(&other.atomic_mass))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Anything that can resolve an element symbol or name.
pub trait ElementLookup {
    /// Symbols are matched case-sensitively, names case-insensitively.
    fn lookup_element(&self, symbol_or_name: &str) -> Option<&Element>;
}

// (atomic number, symbol, name, atomic mass)
const ELEMENT_DATA: &[(u32, &str, &str, f64)] = &[
    (1, "H", "Hydrogen", 1.008),
    (2, "He", "Helium", 4.0026),
    (3, "Li", "Lithium", 6.94),
    (4, "Be", "Beryllium", 9.0122),
    (5, "B", "Boron", 10.81),
    (6, "C", "Carbon", 12.011),
    (7, "N", "Nitrogen", 14.007),
    (8, "O", "Oxygen", 15.999),
    (9, "F", "Fluorine", 18.998),
    (10, "Ne", "Neon", 20.180),
    (11, "Na", "Sodium", 22.990),
    (12, "Mg", "Magnesium", 24.305),
    (13, "Al", "Aluminium", 26.982),
    (14, "Si", "Silicon", 28.085),
    (15, "P", "Phosphorus", 30.974),
    (16, "S", "Sulfur", 32.06),
    (17, "Cl", "Chlorine", 35.45),
    (18, "Ar", "Argon", 39.948),
    (19, "K", "Potassium", 39.098),
    (20, "Ca", "Calcium", 40.078),
    (21, "Sc", "Scandium", 44.956),
    (22, "Ti", "Titanium", 47.867),
    (23, "V", "Vanadium", 50.942),
    (24, "Cr", "Chromium", 51.996),
    (25, "Mn", "Manganese", 54.938),
    (26, "Fe", "Iron", 55.845),
    (27, "Co", "Cobalt", 58.933),
    (28, "Ni", "Nickel", 58.693),
    (29, "Cu", "Copper", 63.546),
    (30, "Zn", "Zinc", 65.38),
    (31, "Ga", "Gallium", 69.723),
    (32, "Ge", "Germanium", 72.630),
    (33, "As", "Arsenic", 74.922),
    (34, "Se", "Selenium", 78.971),
    (35, "Br", "Bromine", 79.904),
    (36, "Kr", "Krypton", 83.798),
    (37, "Rb", "Rubidium", 85.468),
    (38, "Sr", "Strontium", 87.62),
    (39, "Y", "Yttrium", 88.906),
    (40, "Zr", "Zirconium", 91.224),
    (41, "Nb", "Niobium", 92.906),
    (42, "Mo", "Molybdenum", 95.95),
    (43, "Tc", "Technetium", 98.0),
    (44, "Ru", "Ruthenium", 101.07),
    (45, "Rh", "Rhodium", 102.91),
    (46, "Pd", "Palladium", 106.42),
    (47, "Ag", "Silver", 107.87),
    (48, "Cd", "Cadmium", 112.41),
    (49, "In", "Indium", 114.82),
    (50, "Sn", "Tin", 118.71),
    (51, "Sb", "Antimony", 121.76),
    (52, "Te", "Tellurium", 127.60),
    (53, "I", "Iodine", 126.90),
    (54, "Xe", "Xenon", 131.29),
    (55, "Cs", "Caesium", 132.91),
    (56, "Ba", "Barium", 137.33),
    (57, "La", "Lanthanum", 138.91),
    (58, "Ce", "Cerium", 140.12),
    (59, "Pr", "Praseodymium", 140.91),
    (60, "Nd", "Neodymium", 144.24),
    (61, "Pm", "Promethium", 145.0),
    (62, "Sm", "Samarium", 150.36),
    (63, "Eu", "Europium", 151.96),
    (64, "Gd", "Gadolinium", 157.25),
    (65, "Tb", "Terbium", 158.93),
    (66, "Dy", "Dysprosium", 162.50),
    (67, "Ho", "Holmium", 164.93),
    (68, "Er", "Erbium", 167.26),
    (69, "Tm", "Thulium", 168.93),
    (70, "Yb", "Ytterbium", 173.05),
    (71, "Lu", "Lutetium", 174.97),
    (72, "Hf", "Hafnium", 178.49),
    (73, "Ta", "Tantalum", 180.95),
    (74, "W", "Tungsten", 183.84),
    (75, "Re", "Rhenium", 186.21),
    (76, "Os", "Osmium", 190.23),
    (77, "Ir", "Iridium", 192.22),
    (78, "Pt", "Platinum", 195.08),
    (79, "Au", "Gold", 196.97),
    (80, "Hg", "Mercury", 200.59),
    (81, "Tl", "Thallium", 204.38),
    (82, "Pb", "Lead", 207.2),
    (83, "Bi", "Bismuth", 208.98),
    (84, "Po", "Polonium", 209.0),
    (85, "At", "Astatine", 210.0),
    (86, "Rn", "Radon", 222.0),
    (87, "Fr", "Francium", 223.0),
    (88, "Ra", "Radium", 226.0),
    (89, "Ac", "Actinium", 227.0),
    (90, "Th", "Thorium", 232.04),
    (91, "Pa", "Protactinium", 231.04),
    (92, "U", "Uranium", 238.03),
    (93, "Np", "Neptunium", 237.0),
    (94, "Pu", "Plutonium", 244.0),
    (95, "Am", "Americium", 243.0),
    (96, "Cm", "Curium", 247.0),
    (97, "Bk", "Berkelium", 247.0),
    (98, "Cf", "Californium", 251.0),
    (99, "Es", "Einsteinium", 252.0),
    (100, "Fm", "Fermium", 257.0),
    (101, "Md", "Mendelevium", 258.0),
    (102, "No", "Nobelium", 259.0),
    (103, "Lr", "Lawrencium", 266.0),
    (104, "Rf", "Rutherfordium", 267.0),
    (105, "Db", "Dubnium", 268.0),
    (106, "Sg", "Seaborgium", 269.0),
    (107, "Bh", "Bohrium", 270.0),
    (108, "Hs", "Hassium", 277.0),
    (109, "Mt", "Meitnerium", 278.0),
    (110, "Ds", "Darmstadtium", 281.0),
    (111, "Rg", "Roentgenium", 282.0),
    (112, "Cn", "Copernicium", 285.0),
    (113, "Nh", "Nihonium", 286.0),
    (114, "Fl", "Flerovium", 289.0),
    (115, "Mc", "Moscovium", 290.0),
    (116, "Lv", "Livermorium", 293.0),
    (117, "Ts", "Tennessine", 294.0),
    (118, "Og", "Oganesson", 294.0),
];

/// Table of elements indexed by symbol and by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct PeriodicTable {
    elements: Vec<Element>,
    by_symbol: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl PeriodicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// the table of all 118 elements
    pub fn standard() -> Self {
        let mut table = Self::new();
        for &(number, symbol, name, mass) in ELEMENT_DATA {
            table.insert(Element::new(symbol, name, number, mass));
        }
        table
    }

    /// Adds an element, replacing any element with the same symbol or name.
    /// If the symbol and the name belong to two different entries, the one
    /// matched by symbol is replaced and the one matched by name is dropped.
    pub fn insert(&mut self, element: Element) {
        let name_key = element.name.to_lowercase();
        let symbol_match = self.by_symbol.get(&element.symbol).copied();
        let name_match = self.by_name.get(&name_key).copied();
        match (symbol_match, name_match) {
            (None, None) => {
                let idx = self.elements.len();
                self.by_symbol.insert(element.symbol.clone(), idx);
                self.by_name.insert(name_key, idx);
                self.elements.push(element);
            }
            (Some(idx), None) | (None, Some(idx)) => {
                self.elements[idx] = element;
                self.reindex();
            }
            (Some(idx), Some(stale)) => {
                self.elements[idx] = element;
                if stale != idx {
                    self.elements.remove(stale);
                }
                self.reindex();
            }
        }
    }

    fn reindex(&mut self) {
        self.by_symbol.clear();
        self.by_name.clear();
        for (idx, element) in self.elements.iter().enumerate() {
            self.by_symbol.insert(element.symbol.clone(), idx);
            self.by_name.insert(element.name.to_lowercase(), idx);
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }
}

impl ElementLookup for PeriodicTable {
    fn lookup_element(&self, symbol_or_name: &str) -> Option<&Element> {
        self.by_symbol
            .get(symbol_or_name)
            .or_else(|| self.by_name.get(&symbol_or_name.to_lowercase()))
            .map(|&idx| &self.elements[idx])
    }
}

static STANDARD_TABLE: OnceLock<PeriodicTable> = OnceLock::new();

/// The shared, read-only standard periodic table.
pub fn periodic_table() -> &'static PeriodicTable {
    STANDARD_TABLE.get_or_init(PeriodicTable::standard)
}

/// Looks an element up by symbol or name in the standard table.
pub fn lookup_element(symbol_or_name: &str) -> Option<&'static Element> {
    periodic_table().lookup_element(symbol_or_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lookup_by_symbol_and_name() {
        let na = lookup_element("Na").unwrap();
        assert_eq!(na.name(), "Sodium");
        assert_eq!(na.atomic_number(), 11);
        assert_relative_eq!(na.atomic_mass(), 22.990, epsilon = 1e-6);

        let by_name = lookup_element("sodium").unwrap();
        assert_eq!(by_name, na);
        assert_eq!(lookup_element("Sodium").unwrap(), na);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        assert_eq!(lookup_element("Co").unwrap().name(), "Cobalt");
        assert!(lookup_element("CO").is_none());
        assert!(lookup_element("Xx").is_none());
    }

    #[test]
    fn test_standard_table_is_complete() {
        let table = periodic_table();
        assert_eq!(table.len(), 118);
        for (i, element) in table.iter().enumerate() {
            assert_eq!(element.atomic_number() as usize, i + 1);
        }
    }

    #[test]
    fn test_custom_element_replaces_by_symbol() {
        let mut table = PeriodicTable::standard();
        table.insert(Element::new("D", "Deuterium", 1, 2.014));
        assert_eq!(table.len(), 119);
        table.insert(Element::new("D", "Deuterium", 1, 2.0141));
        assert_eq!(table.len(), 119);
        let d = table.lookup_element("deuterium").unwrap();
        assert_relative_eq!(d.atomic_mass(), 2.0141);
        // same atomic number, different identity
        assert_ne!(d, table.lookup_element("H").unwrap());
    }

    #[test]
    fn test_insert_with_symbol_and_name_of_different_elements() {
        let mut table = PeriodicTable::standard();
        // symbol of hydrogen, name of helium
        table.insert(Element::new("H", "Helium", 1, 1.5));
        assert_eq!(table.len(), 117);

        let by_symbol = table.lookup_element("H").unwrap();
        assert_eq!(by_symbol.name(), "Helium");
        assert_eq!(table.lookup_element("helium").unwrap(), by_symbol);
        assert!(table.lookup_element("He").is_none());
        assert!(table.lookup_element("hydrogen").is_none());

        // entries after the removed one are still found by both keys
        let lithium = table.lookup_element("Li").unwrap();
        assert_eq!(lithium.name(), "Lithium");
        assert_eq!(table.lookup_element("lithium").unwrap(), lithium);
        for element in table.iter() {
            assert_eq!(table.lookup_element(element.symbol()).unwrap(), element);
            assert_eq!(table.lookup_element(element.name()).unwrap(), element);
        }
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut table = PeriodicTable::standard();
        table.insert(Element::new("Hy", "hydrogen", 1, 1.008));
        assert_eq!(table.len(), 118);
        assert!(table.lookup_element("H").is_none());
        assert_eq!(table.lookup_element("Hydrogen").unwrap().symbol(), "Hy");
    }

    #[test]
    fn test_ordering_follows_atomic_number() {
        let mut elements = vec![
            lookup_element("O").unwrap().clone(),
            lookup_element("H").unwrap().clone(),
            lookup_element("Fe").unwrap().clone(),
        ];
        elements.sort();
        let symbols: Vec<&str> = elements.iter().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["H", "O", "Fe"]);
    }
}
