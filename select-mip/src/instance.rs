//! Test-selection instance: costs and the test-by-disease response matrix.
//!
//! File format (whitespace-delimited, line-oriented):
//!
//! ```text
//! #Tests (n)
//! #Diseases (m)
//! Cost_1 Cost_2 ... Cost_n
//! A(1,1) A(1,2) ... A(1,m)
//! ...
//! A(n,1) A(n,2) ... A(n,m)
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

/// Malformed or incomplete instance input. Always fatal to loading; a
/// partial instance is never returned. Distinct from solver infeasibility,
/// which is a property of a well-formed instance.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The file ended before the expected line.
    #[error("missing line: expected {0}")]
    MissingLine(&'static str),

    /// A token could not be parsed as the expected numeric type.
    #[error("invalid {what} on line {line}: {token:?}")]
    InvalidToken {
        /// What the token was supposed to be.
        what: &'static str,
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A line held the wrong number of values.
    #[error("line {line}: expected {expected} values, found {found}")]
    WrongCount {
        /// 1-based line number.
        line: usize,
        /// Expected value count.
        expected: usize,
        /// Actual value count.
        found: usize,
    },

    /// A matrix entry was neither 0 nor 1.
    #[error("matrix entry at test {test}, disease {disease} is {value}, expected 0 or 1")]
    NotBinary {
        /// Test (row) index.
        test: usize,
        /// Disease (column) index.
        disease: usize,
        /// The offending value.
        value: i64,
    },

    /// A test cost was negative.
    #[error("cost of test {test} is {cost}, costs must be nonnegative")]
    NegativeCost {
        /// Test index.
        test: usize,
        /// The offending cost.
        cost: f64,
    },

    /// A declared dimension was not positive.
    #[error("{what} must be positive, got {value}")]
    BadDimension {
        /// Which dimension.
        what: &'static str,
        /// The offending value.
        value: i64,
    },

    /// Underlying I/O failure while reading the instance file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An immutable test-selection instance.
///
/// `a[k][j]` is 1 when test `k` responds positive for disease `j`.
#[derive(Debug, Clone)]
pub struct Instance {
    num_tests: usize,
    num_diseases: usize,
    cost: Vec<f64>,
    a: Vec<Vec<u8>>,
}

impl Instance {
    /// Build an instance from already-parsed parts, validating the
    /// dimension invariants.
    pub fn new(cost: Vec<f64>, a: Vec<Vec<u8>>) -> Result<Self, FormatError> {
        let num_tests = cost.len();
        if num_tests == 0 {
            return Err(FormatError::BadDimension {
                what: "number of tests",
                value: 0,
            });
        }
        if a.len() != num_tests {
            return Err(FormatError::WrongCount {
                line: 4,
                expected: num_tests,
                found: a.len(),
            });
        }
        let num_diseases = a[0].len();
        if num_diseases == 0 {
            return Err(FormatError::BadDimension {
                what: "number of diseases",
                value: 0,
            });
        }

        for (k, cost_k) in cost.iter().enumerate() {
            if *cost_k < 0.0 || !cost_k.is_finite() {
                return Err(FormatError::NegativeCost {
                    test: k,
                    cost: *cost_k,
                });
            }
        }
        for (k, row) in a.iter().enumerate() {
            if row.len() != num_diseases {
                return Err(FormatError::WrongCount {
                    line: 4 + k,
                    expected: num_diseases,
                    found: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                if v > 1 {
                    return Err(FormatError::NotBinary {
                        test: k,
                        disease: j,
                        value: v as i64,
                    });
                }
            }
        }

        Ok(Self {
            num_tests,
            num_diseases,
            cost,
            a,
        })
    }

    /// Parse an instance from its textual representation.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let mut lines = input.lines().enumerate();

        let num_tests = parse_dimension(&mut lines, "number of tests")?;
        let num_diseases = parse_dimension(&mut lines, "number of diseases")?;

        let (line_no, cost_line) = lines
            .next()
            .ok_or(FormatError::MissingLine("cost line"))?;
        let cost = parse_floats(cost_line, line_no + 1, num_tests)?;

        let mut a = Vec::with_capacity(num_tests);
        for k in 0..num_tests {
            let (line_no, row_line) = lines
                .next()
                .ok_or(FormatError::MissingLine("matrix row"))?;
            a.push(parse_matrix_row(row_line, line_no + 1, k, num_diseases)?);
        }

        Self::new(cost, a)
    }

    /// Read and parse an instance file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Number of tests (n).
    pub fn num_tests(&self) -> usize {
        self.num_tests
    }

    /// Number of diseases (m).
    pub fn num_diseases(&self) -> usize {
        self.num_diseases
    }

    /// Cost of test `k`.
    pub fn cost(&self, k: usize) -> f64 {
        self.cost[k]
    }

    /// The full cost vector.
    pub fn costs(&self) -> &[f64] {
        &self.cost
    }

    /// Response of test `k` for disease `j`.
    pub fn response(&self, k: usize, j: usize) -> u8 {
        self.a[k][j]
    }

    /// Tests whose response differs between diseases `i` and `j`.
    ///
    /// A selection distinguishes the pair iff it intersects this set.
    pub fn distinguishing_tests(&self, i: usize, j: usize) -> Vec<usize> {
        (0..self.num_tests)
            .filter(|&k| self.a[k][i] != self.a[k][j])
            .collect()
    }

    /// Iterate over all unordered disease pairs `(i, j)` with `i < j`.
    pub fn disease_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_diseases)
            .flat_map(move |i| ((i + 1)..self.num_diseases).map(move |j| (i, j)))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "test" stays singular: downstream tooling matches this exact line.
        writeln!(f, "Number of test: {}", self.num_tests)?;
        writeln!(f, "Number of diseases: {}", self.num_diseases)?;
        let costs: Vec<String> = self.cost.iter().map(|c| c.to_string()).collect();
        writeln!(f, "Cost of tests: {}", costs.join(" "))?;
        writeln!(f, "A:")?;
        for (k, row) in self.a.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            if k + 1 < self.num_tests {
                writeln!(f, "{}", cells.join(" "))?;
            } else {
                write!(f, "{}", cells.join(" "))?;
            }
        }
        Ok(())
    }
}

fn parse_dimension<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    what: &'static str,
) -> Result<usize, FormatError> {
    let (line_no, line) = lines.next().ok_or(FormatError::MissingLine(
        "dimension line",
    ))?;
    let token = line.trim();
    let value: i64 = token.parse().map_err(|_| FormatError::InvalidToken {
        what,
        line: line_no + 1,
        token: token.to_string(),
    })?;
    if value <= 0 {
        return Err(FormatError::BadDimension { what, value });
    }
    Ok(value as usize)
}

fn parse_floats(line: &str, line_no: usize, expected: usize) -> Result<Vec<f64>, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(FormatError::WrongCount {
            line: line_no,
            expected,
            found: tokens.len(),
        });
    }
    tokens
        .iter()
        .map(|t| {
            t.parse().map_err(|_| FormatError::InvalidToken {
                what: "cost",
                line: line_no,
                token: t.to_string(),
            })
        })
        .collect()
}

fn parse_matrix_row(
    line: &str,
    line_no: usize,
    test: usize,
    expected: usize,
) -> Result<Vec<u8>, FormatError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(FormatError::WrongCount {
            line: line_no,
            expected,
            found: tokens.len(),
        });
    }
    let mut row = Vec::with_capacity(expected);
    for (j, t) in tokens.iter().enumerate() {
        let value: i64 = t.parse().map_err(|_| FormatError::InvalidToken {
            what: "matrix entry",
            line: line_no,
            token: t.to_string(),
        })?;
        if value != 0 && value != 1 {
            return Err(FormatError::NotBinary {
                test,
                disease: j,
                value,
            });
        }
        row.push(value as u8);
    }
    Ok(row)
}
