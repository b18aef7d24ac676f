//! 2×2 contingency table value types.
//!
//! [`ObservedTable`] holds the four raw counts, [`ExpectedTable`] the
//! frequencies predicted under independence, and [`RiskTable`] the
//! exposure/outcome relabeling used by relative risk and odds ratio.
//!
//! Cells are laid out as:
//!
//! ```text
//!            col 1   col 2
//! row 1        a       b
//! row 2        c       d
//! ```

use core::fmt;

use crate::error::{FourfoldError, Result};

/// `x + y`, or [`FourfoldError::InvalidInput`] naming `what` on overflow.
fn checked_sum(x: u64, y: u64, what: &str) -> Result<u64> {
    x.checked_add(y)
        .ok_or_else(|| FourfoldError::InvalidInput(format!("{what} overflows u64")))
}

/// One of the four cells of a 2×2 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    /// Row 1, column 1.
    A,
    /// Row 1, column 2.
    B,
    /// Row 2, column 1.
    C,
    /// Row 2, column 2.
    D,
}

impl Cell {
    /// All four cells in row-major order.
    pub const ALL: [Cell; 4] = [Cell::A, Cell::B, Cell::C, Cell::D];

    /// Zero-based row index.
    pub fn row(self) -> usize {
        match self {
            Cell::A | Cell::B => 0,
            Cell::C | Cell::D => 1,
        }
    }

    /// Zero-based column index.
    pub fn col(self) -> usize {
        match self {
            Cell::A | Cell::C => 0,
            Cell::B | Cell::D => 1,
        }
    }

    /// The cell at the mirrored position when rows and columns are swapped.
    pub fn transposed(self) -> Cell {
        match self {
            Cell::A => Cell::A,
            Cell::B => Cell::C,
            Cell::C => Cell::B,
            Cell::D => Cell::D,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cell::A => "a",
            Cell::B => "b",
            Cell::C => "c",
            Cell::D => "d",
        };
        f.write_str(name)
    }
}

// ── Observed table ─────────────────────────────────────────────────────────

/// Observed counts of a 2×2 table.
///
/// Counts are unsigned, so the non-negativity invariant holds by
/// construction. An all-zero table is representable; the operations that
/// divide by the total reject it. Margins are checked, so a table whose
/// total does not fit in a `u64` is rejected rather than wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedTable {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
}

impl ObservedTable {
    /// Create a table from its four cells in row-major order.
    pub const fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self { a, b, c, d }
    }

    /// Build a table from the `[[a, b], [c, d]]` array layout.
    pub const fn from_array(table: [[u64; 2]; 2]) -> Self {
        Self::new(table[0][0], table[0][1], table[1][0], table[1][1])
    }

    /// The 1961 ascorbic acid trial on 279 French skiers.
    ///
    /// Rows are outcomes (cold symptoms, no cold symptoms), columns are
    /// treatments (ascorbic acid, placebo).
    pub const fn ascorbic_acid_trial() -> Self {
        Self::new(17, 31, 122, 109)
    }

    /// Count in the given cell.
    pub fn get(&self, cell: Cell) -> u64 {
        match cell {
            Cell::A => self.a,
            Cell::B => self.b,
            Cell::C => self.c,
            Cell::D => self.d,
        }
    }

    /// Counts in row-major order.
    pub fn cells(&self) -> [u64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// The `[[a, b], [c, d]]` array layout.
    pub fn as_array(&self) -> [[u64; 2]; 2] {
        [[self.a, self.b], [self.c, self.d]]
    }

    /// Grand total `n = a + b + c + d`.
    ///
    /// # Errors
    ///
    /// Returns [`FourfoldError::InvalidInput`] if the total overflows `u64`.
    pub fn total(&self) -> Result<u64> {
        let [top, bottom] = self.row_sums()?;
        checked_sum(top, bottom, "table total")
    }

    /// Row sums `[a + b, c + d]`.
    pub fn row_sums(&self) -> Result<[u64; 2]> {
        Ok([
            checked_sum(self.a, self.b, "row 1 sum")?,
            checked_sum(self.c, self.d, "row 2 sum")?,
        ])
    }

    /// Column sums `[a + c, b + d]`.
    pub fn col_sums(&self) -> Result<[u64; 2]> {
        Ok([
            checked_sum(self.a, self.c, "column 1 sum")?,
            checked_sum(self.b, self.d, "column 2 sum")?,
        ])
    }

    /// Swap rows and columns (`b` and `c` trade places).
    pub fn transpose(&self) -> Self {
        Self::new(self.a, self.c, self.b, self.d)
    }

    /// Whether any cell is zero.
    pub fn has_zero_cell(&self) -> bool {
        self.cells().contains(&0)
    }
}

impl fmt::Display for ObservedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}, {}], [{}, {}]]", self.a, self.b, self.c, self.d)
    }
}

// ── Expected table ─────────────────────────────────────────────────────────

/// Expected frequencies of a 2×2 table under the independence hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpectedTable {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl ExpectedTable {
    /// Expected frequency in the given cell.
    pub fn get(&self, cell: Cell) -> f64 {
        match cell {
            Cell::A => self.a,
            Cell::B => self.b,
            Cell::C => self.c,
            Cell::D => self.d,
        }
    }

    /// Frequencies in row-major order.
    pub fn cells(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Sum of all four expected frequencies.
    pub fn total(&self) -> f64 {
        self.a + self.b + self.c + self.d
    }

    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        Self {
            a: self.a,
            b: self.c,
            c: self.b,
            d: self.d,
        }
    }
}

// ── Labels ─────────────────────────────────────────────────────────────────

/// Display names for the rows (outcomes) and columns (groups) of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableLabels {
    /// Row names, e.g. outcome categories.
    pub rows: [String; 2],
    /// Column names, e.g. treatment groups.
    pub cols: [String; 2],
}

impl TableLabels {
    /// Labels from row names and column names.
    pub fn new(rows: [&str; 2], cols: [&str; 2]) -> Self {
        Self {
            rows: [rows[0].to_string(), rows[1].to_string()],
            cols: [cols[0].to_string(), cols[1].to_string()],
        }
    }

    /// Labels of the ascorbic acid trial (see [`ObservedTable::ascorbic_acid_trial`]).
    pub fn ascorbic_acid_trial() -> Self {
        Self::new(
            ["Cold Symptoms", "No Cold Symptoms"],
            ["Ascorbic Acid Treatment", "Placebo Treatment"],
        )
    }

    /// "column, row" label of a cell, e.g. `Placebo Treatment, Cold Symptoms`.
    pub fn cell_label(&self, cell: Cell) -> String {
        format!("{}, {}", self.cols[cell.col()], self.rows[cell.row()])
    }
}

impl Default for TableLabels {
    fn default() -> Self {
        Self::new(["Row 1", "Row 2"], ["Column 1", "Column 2"])
    }
}

// ── Risk table ─────────────────────────────────────────────────────────────

/// Exposure × outcome relabeling of a 2×2 table.
///
/// ```text
///              Disease   No disease
/// Exposed         a          b
/// Unexposed       c          d
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskTable {
    pub exposed_cases: u64,
    pub exposed_noncases: u64,
    pub unexposed_cases: u64,
    pub unexposed_noncases: u64,
}

impl RiskTable {
    /// Create a risk table from `a, b, c, d` in the layout above.
    pub const fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self {
            exposed_cases: a,
            exposed_noncases: b,
            unexposed_cases: c,
            unexposed_noncases: d,
        }
    }

    /// Relabel an outcome × group table where column 1 is the exposed group
    /// and row 1 the diseased outcome.
    ///
    /// Observed `{a, b, c, d}` becomes exposed+diseased = `a`,
    /// exposed+healthy = `c`, unexposed+diseased = `b`, unexposed+healthy = `d`.
    pub const fn from_observed(obs: &ObservedTable) -> Self {
        Self::new(obs.a, obs.c, obs.b, obs.d)
    }

    /// Cells `[a, b, c, d]` in the exposure × outcome layout.
    pub fn cells(&self) -> [u64; 4] {
        [
            self.exposed_cases,
            self.exposed_noncases,
            self.unexposed_cases,
            self.unexposed_noncases,
        ]
    }

    /// Size of the exposed group (`a + b`).
    pub fn exposed_total(&self) -> Result<u64> {
        checked_sum(self.exposed_cases, self.exposed_noncases, "exposed group size")
    }

    /// Size of the unexposed group (`c + d`).
    pub fn unexposed_total(&self) -> Result<u64> {
        checked_sum(self.unexposed_cases, self.unexposed_noncases, "unexposed group size")
    }

    /// Whether any cell is zero.
    pub fn has_zero_cell(&self) -> bool {
        self.cells().contains(&0)
    }
}
