//! Process-wide table of named units and SI prefixes.
//!
//! The table is static data. The symbol index is built on first lookup and
//! is read-only afterwards, so concurrent readers need no locking.

use crate::dimension::Dimension;
use crate::error::{UnitError, UnitResult};
use std::collections::HashMap;
use std::sync::OnceLock;

/// A named unit in the registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitDef {
    /// Canonical symbol.
    pub symbol: &'static str,
    /// Alternative spellings accepted by the parser.
    pub aliases: &'static [&'static str],
    /// Dimension of the unit.
    pub dimension: Dimension,
    /// Factor to the SI-coherent reference unit of the dimension.
    pub scale: f64,
    /// Whether SI prefixes may be attached.
    pub prefixable: bool,
}

/// An SI prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Prefix {
    pub symbol: &'static str,
    pub aliases: &'static [&'static str],
    pub factor: f64,
}

const fn def(
    symbol: &'static str,
    aliases: &'static [&'static str],
    dimension: Dimension,
    scale: f64,
    prefixable: bool,
) -> UnitDef {
    UnitDef { symbol, aliases, dimension, scale, prefixable }
}

pub static UNITS: &[UnitDef] = &[
    def("s", &["sec"], Dimension::TIME, 1.0, true),
    def("min", &[], Dimension::TIME, 60.0, false),
    def("h", &["hr"], Dimension::TIME, 3600.0, false),
    def("Hz", &[], Dimension::FREQUENCY, 1.0, true),
    def("m", &[], Dimension::LENGTH, 1.0, true),
    def("g", &[], Dimension::MASS, 1e-3, true),
    def("A", &[], Dimension::CURRENT, 1.0, true),
    def("K", &[], Dimension::TEMPERATURE, 1.0, true),
    def("mol", &[], Dimension::AMOUNT, 1.0, true),
    def("cd", &[], Dimension::LUMINOUS_INTENSITY, 1.0, false),
    def("V", &[], Dimension::POTENTIAL, 1.0, true),
    def("Ohm", &["Ω", "ohm"], Dimension::RESISTANCE, 1.0, true),
    def("S", &[], Dimension::CONDUCTANCE, 1.0, true),
    def("F", &[], Dimension::CAPACITANCE, 1.0, true),
    def("C", &[], Dimension::CHARGE, 1.0, true),
    def("N", &[], Dimension::FORCE, 1.0, true),
    def("J", &[], Dimension::ENERGY, 1.0, true),
    def("W", &[], Dimension::POWER, 1.0, true),
    def("dimensionless", &[], Dimension::DIMENSIONLESS, 1.0, false),
    def("%", &["percent"], Dimension::DIMENSIONLESS, 1e-2, false),
    def("rad", &[], Dimension::DIMENSIONLESS, 1.0, false),
];

pub static PREFIXES: &[Prefix] = &[
    Prefix { symbol: "a", aliases: &[], factor: 1e-18 },
    Prefix { symbol: "f", aliases: &[], factor: 1e-15 },
    Prefix { symbol: "p", aliases: &[], factor: 1e-12 },
    Prefix { symbol: "n", aliases: &[], factor: 1e-9 },
    Prefix { symbol: "u", aliases: &["µ", "μ"], factor: 1e-6 },
    Prefix { symbol: "m", aliases: &[], factor: 1e-3 },
    Prefix { symbol: "c", aliases: &[], factor: 1e-2 },
    Prefix { symbol: "d", aliases: &[], factor: 1e-1 },
    Prefix { symbol: "k", aliases: &[], factor: 1e3 },
    Prefix { symbol: "M", aliases: &[], factor: 1e6 },
    Prefix { symbol: "G", aliases: &[], factor: 1e9 },
    Prefix { symbol: "T", aliases: &[], factor: 1e12 },
];

/// A registry entry resolved from a (possibly prefixed) symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedUnit {
    /// Canonical spelling, e.g. `"us"` for `"µs"`.
    pub symbol: String,
    pub dimension: Dimension,
    pub scale: f64,
}

fn index() -> &'static HashMap<&'static str, &'static UnitDef> {
    static INDEX: OnceLock<HashMap<&'static str, &'static UnitDef>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut map = HashMap::new();
        for unit in UNITS {
            map.insert(unit.symbol, unit);
            for alias in unit.aliases {
                map.insert(*alias, unit);
            }
        }
        map
    })
}

/// Look up an unprefixed registered unit.
pub fn lookup(symbol: &str) -> Option<&'static UnitDef> {
    index().get(symbol).copied()
}

/// Resolve a symbol, trying an exact match before splitting off a prefix.
///
/// Exact matches win so that `"m"` is the metre and `"min"` the minute.
pub fn resolve(symbol: &str) -> UnitResult<ResolvedUnit> {
    if let Some(unit) = lookup(symbol) {
        return Ok(ResolvedUnit {
            symbol: unit.symbol.to_string(),
            dimension: unit.dimension,
            scale: unit.scale,
        });
    }

    for prefix in PREFIXES {
        for spelling in std::iter::once(&prefix.symbol).chain(prefix.aliases.iter()) {
            let Some(rest) = symbol.strip_prefix(spelling) else {
                continue;
            };
            if let Some(unit) = lookup(rest).filter(|u| u.prefixable) {
                return Ok(ResolvedUnit {
                    symbol: format!("{}{}", prefix.symbol, unit.symbol),
                    dimension: unit.dimension,
                    scale: prefix.factor * unit.scale,
                });
            }
        }
    }

    Err(UnitError::UnknownUnit(symbol.to_string()))
}
