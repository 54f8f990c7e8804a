//! Two-phase tableau simplex.
//!
//! Phase 1 minimizes the sum of artificial variables to find a basic
//! feasible point (or prove infeasibility); phase 2 minimizes the true
//! objective from that basis. The tableau is dense: the relaxations this
//! crate exists for have at most a few hundred rows and columns, where a
//! dense pivot is both simpler and faster than sparse bookkeeping.

use crate::{
    LpError, LpProblem, LpResult, LpSettings, LpSolution, LpStatus, PivotRule, RowSense,
};

/// A constraint row after bound lowering and sign normalization
/// (rhs >= 0, dense coefficients).
struct NormRow {
    coefs: Vec<f64>,
    sense: RowSense,
    rhs: f64,
}

/// Dense simplex tableau. `a[i]` has `ncols + 1` entries, the last being
/// the right-hand side. `obj` is the reduced-cost row.
struct Tableau {
    a: Vec<Vec<f64>>,
    obj: Vec<f64>,
    basis: Vec<usize>,
    ncols: usize,
    /// Columns barred from entering the basis (artificials in phase 2).
    blocked: Vec<bool>,
    /// Set when the ratio test finds no leaving row.
    unbounded: bool,
}

/// Solve a linear program.
///
/// Returns an [`LpSolution`] whose status distinguishes optimal,
/// infeasible, unbounded, and iteration-limited outcomes. Only malformed
/// input is an `Err`.
pub fn solve(prob: &LpProblem, settings: &LpSettings) -> LpResult<LpSolution> {
    let n = prob.objective.len();
    validate(prob, n)?;

    let rows = normalize_rows(prob, n);
    if rows.is_empty() {
        return Ok(solve_bounds_only(prob, n));
    }

    let (mut tab, num_artificial) = build_tableau(&rows, n);
    let mut iterations = 0usize;

    // Phase 1: drive the artificials to zero.
    if num_artificial > 0 {
        if !run_simplex(&mut tab, settings, &mut iterations) {
            return Ok(LpSolution::without_point(
                LpStatus::IterationLimit,
                iterations,
            ));
        }
        if tab.unbounded {
            // Phase 1 is bounded below by zero; reaching this means the
            // pivots went numerically astray. Report it like a stall so the
            // caller's retry policy kicks in.
            return Ok(LpSolution::without_point(
                LpStatus::IterationLimit,
                iterations,
            ));
        }

        let infeas: f64 = tab
            .basis
            .iter()
            .enumerate()
            .filter(|(_, &b)| b >= n + num_slack(&rows))
            .map(|(i, _)| tab.a[i][tab.ncols])
            .sum();
        if infeas > settings.tol.max(1e-7) {
            return Ok(LpSolution::without_point(LpStatus::Infeasible, iterations));
        }

        evict_artificials(&mut tab, n + num_slack(&rows), settings.tol);
    }

    // Phase 2: price out the true objective over the phase-1 basis.
    let first_artificial = n + num_slack(&rows);
    for j in first_artificial..tab.ncols {
        tab.blocked[j] = true;
    }
    tab.obj = vec![0.0; tab.ncols + 1];
    for (j, &cj) in prob.objective.iter().enumerate() {
        tab.obj[j] = cj;
    }
    for i in 0..tab.a.len() {
        let cb = tab.obj[tab.basis[i]];
        if cb.abs() > 0.0 {
            for j in 0..=tab.ncols {
                tab.obj[j] -= cb * tab.a[i][j];
            }
        }
    }

    if !run_simplex(&mut tab, settings, &mut iterations) {
        return Ok(LpSolution::without_point(
            LpStatus::IterationLimit,
            iterations,
        ));
    }
    if tab.unbounded {
        return Ok(LpSolution::without_point(LpStatus::Unbounded, iterations));
    }

    // Read off the structural variables.
    let mut x = vec![0.0; n];
    for (i, &b) in tab.basis.iter().enumerate() {
        if b < n {
            x[b] = tab.a[i][tab.ncols];
        }
    }
    // Clamp tiny negatives from roundoff back into the box.
    for (xi, &(lb, ub)) in x.iter_mut().zip(&prob.bounds) {
        if *xi < lb && *xi > lb - 1e-7 {
            *xi = lb;
        }
        if ub.is_finite() && *xi > ub && *xi < ub + 1e-7 {
            *xi = ub;
        }
    }

    let obj_val: f64 = x.iter().zip(&prob.objective).map(|(xi, ci)| xi * ci).sum();
    log::trace!(
        "simplex optimal: obj={obj_val:.6e} after {iterations} pivots ({} rows)",
        tab.a.len()
    );

    Ok(LpSolution {
        status: LpStatus::Optimal,
        x,
        obj_val,
        iterations,
    })
}

fn validate(prob: &LpProblem, n: usize) -> LpResult<()> {
    if prob.bounds.len() != n {
        return Err(LpError::DimensionMismatch(format!(
            "{} bounds for {} variables",
            prob.bounds.len(),
            n
        )));
    }
    if prob.objective.iter().any(|c| !c.is_finite()) {
        return Err(LpError::NonFiniteData("objective".into()));
    }
    for (i, &(lb, ub)) in prob.bounds.iter().enumerate() {
        if lb < 0.0 {
            return Err(LpError::DimensionMismatch(format!(
                "variable {i} has negative lower bound {lb}"
            )));
        }
        if !lb.is_finite() || ub.is_nan() || ub < lb {
            return Err(LpError::NonFiniteData(format!(
                "variable {i} bounds ({lb}, {ub})"
            )));
        }
    }
    for (i, row) in prob.rows.iter().enumerate() {
        if !row.rhs.is_finite() {
            return Err(LpError::NonFiniteData(format!("row {i} rhs")));
        }
        for &(j, v) in &row.coefs {
            if j >= n {
                return Err(LpError::DimensionMismatch(format!(
                    "row {i} references variable {j} but there are {n} variables"
                )));
            }
            if !v.is_finite() {
                return Err(LpError::NonFiniteData(format!("row {i}, variable {j}")));
            }
        }
    }
    Ok(())
}

/// Lower box bounds to rows, densify, and flip signs so every rhs >= 0.
fn normalize_rows(prob: &LpProblem, n: usize) -> Vec<NormRow> {
    let mut rows = Vec::with_capacity(prob.rows.len());

    for row in &prob.rows {
        let mut coefs = vec![0.0; n];
        for &(j, v) in &row.coefs {
            coefs[j] += v;
        }
        rows.push(NormRow {
            coefs,
            sense: row.sense,
            rhs: row.rhs,
        });
    }

    for (j, &(lb, ub)) in prob.bounds.iter().enumerate() {
        if lb > 0.0 {
            let mut coefs = vec![0.0; n];
            coefs[j] = 1.0;
            rows.push(NormRow {
                coefs,
                sense: RowSense::Ge,
                rhs: lb,
            });
        }
        if ub.is_finite() {
            let mut coefs = vec![0.0; n];
            coefs[j] = 1.0;
            rows.push(NormRow {
                coefs,
                sense: RowSense::Le,
                rhs: ub,
            });
        }
    }

    for row in &mut rows {
        if row.rhs < 0.0 {
            for c in &mut row.coefs {
                *c = -*c;
            }
            row.rhs = -row.rhs;
            row.sense = match row.sense {
                RowSense::Le => RowSense::Ge,
                RowSense::Ge => RowSense::Le,
                RowSense::Eq => RowSense::Eq,
            };
        }
    }

    rows
}

fn num_slack(rows: &[NormRow]) -> usize {
    rows.iter()
        .filter(|r| r.sense != RowSense::Eq)
        .count()
}

/// Build the phase-1 tableau: slack/surplus columns first, then one
/// artificial per `>=`/`=` row, with the artificials priced at 1.
fn build_tableau(rows: &[NormRow], n: usize) -> (Tableau, usize) {
    let m = rows.len();
    let n_slack = num_slack(rows);
    let n_art = rows
        .iter()
        .filter(|r| r.sense != RowSense::Le)
        .count();
    let ncols = n + n_slack + n_art;

    let mut a = vec![vec![0.0; ncols + 1]; m];
    let mut basis = vec![0usize; m];
    let mut slack_idx = n;
    let mut art_idx = n + n_slack;

    for (i, row) in rows.iter().enumerate() {
        a[i][..n].copy_from_slice(&row.coefs);
        a[i][ncols] = row.rhs;
        match row.sense {
            RowSense::Le => {
                a[i][slack_idx] = 1.0;
                basis[i] = slack_idx;
                slack_idx += 1;
            }
            RowSense::Ge => {
                a[i][slack_idx] = -1.0;
                slack_idx += 1;
                a[i][art_idx] = 1.0;
                basis[i] = art_idx;
                art_idx += 1;
            }
            RowSense::Eq => {
                a[i][art_idx] = 1.0;
                basis[i] = art_idx;
                art_idx += 1;
            }
        }
    }

    // Phase-1 reduced costs: unit cost on artificials, priced out over the
    // starting basis.
    let mut obj = vec![0.0; ncols + 1];
    for j in (n + n_slack)..ncols {
        obj[j] = 1.0;
    }
    for (i, row) in a.iter().enumerate() {
        if basis[i] >= n + n_slack {
            for j in 0..=ncols {
                obj[j] -= row[j];
            }
        }
    }

    (
        Tableau {
            a,
            obj,
            basis,
            ncols,
            blocked: vec![false; ncols],
            unbounded: false,
        },
        n_art,
    )
}

impl Tableau {
    fn pivot(&mut self, row: usize, col: usize) {
        let pivot_val = self.a[row][col];
        for j in 0..=self.ncols {
            self.a[row][j] /= pivot_val;
        }
        for i in 0..self.a.len() {
            if i != row {
                let factor = self.a[i][col];
                if factor != 0.0 {
                    for j in 0..=self.ncols {
                        self.a[i][j] -= factor * self.a[row][j];
                    }
                }
            }
        }
        let factor = self.obj[col];
        if factor != 0.0 {
            for j in 0..=self.ncols {
                self.obj[j] -= factor * self.a[row][j];
            }
        }
        self.basis[row] = col;
    }
}

/// Run simplex pivots until optimal, unbounded, or out of budget.
///
/// Returns false if the iteration budget ran out. Unboundedness is flagged
/// on the tableau rather than returned so the caller can distinguish it
/// from the phase-1 case, where it cannot occur.
fn run_simplex(tab: &mut Tableau, settings: &LpSettings, iterations: &mut usize) -> bool {
    loop {
        if *iterations >= settings.max_iter {
            return false;
        }

        let entering = choose_entering(tab, settings);
        let col = match entering {
            Some(c) => c,
            None => return true,
        };

        let row = match choose_leaving(tab, col, settings.tol) {
            Some(r) => r,
            None => {
                tab.unbounded = true;
                return true;
            }
        };

        tab.pivot(row, col);
        *iterations += 1;
    }
}

fn choose_entering(tab: &Tableau, settings: &LpSettings) -> Option<usize> {
    match settings.pivot_rule {
        PivotRule::Dantzig => {
            let mut best: Option<(usize, f64)> = None;
            for j in 0..tab.ncols {
                if tab.blocked[j] || tab.obj[j] >= -settings.tol {
                    continue;
                }
                match best {
                    Some((_, v)) if tab.obj[j] >= v => {}
                    _ => best = Some((j, tab.obj[j])),
                }
            }
            best.map(|(j, _)| j)
        }
        PivotRule::Bland => (0..tab.ncols)
            .find(|&j| !tab.blocked[j] && tab.obj[j] < -settings.tol),
    }
}

/// Minimum-ratio test; ties break on the lowest basis index, which is the
/// anti-cycling half of Bland's rule.
fn choose_leaving(tab: &Tableau, col: usize, tol: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, row) in tab.a.iter().enumerate() {
        if row[col] <= tol {
            continue;
        }
        let ratio = row[tab.ncols] / row[col];
        best = match best {
            Some((bi, bratio)) => {
                if ratio < bratio - tol
                    || (ratio < bratio + tol && tab.basis[i] < tab.basis[bi])
                {
                    Some((i, ratio))
                } else {
                    Some((bi, bratio))
                }
            }
            None => Some((i, ratio)),
        };
    }
    best.map(|(i, _)| i)
}

/// Pivot zero-valued artificials out of the basis; rows where no structural
/// or slack column can take over are redundant and dropped.
fn evict_artificials(tab: &mut Tableau, first_artificial: usize, tol: f64) {
    let mut i = 0;
    while i < tab.a.len() {
        if tab.basis[i] < first_artificial {
            i += 1;
            continue;
        }
        let col = (0..first_artificial).find(|&j| tab.a[i][j].abs() > tol);
        match col {
            Some(j) => {
                tab.pivot(i, j);
                i += 1;
            }
            None => {
                tab.a.remove(i);
                tab.basis.remove(i);
            }
        }
    }
}

/// Degenerate case with no rows and no finite bound rows: each variable
/// sits at whichever bound its cost prefers.
fn solve_bounds_only(prob: &LpProblem, n: usize) -> LpSolution {
    let mut x = vec![0.0; n];
    for j in 0..n {
        let (lb, ub) = prob.bounds[j];
        if prob.objective[j] < 0.0 {
            if !ub.is_finite() {
                return LpSolution::without_point(LpStatus::Unbounded, 0);
            }
            x[j] = ub;
        } else {
            x[j] = lb;
        }
    }
    let obj_val = x.iter().zip(&prob.objective).map(|(xi, ci)| xi * ci).sum();
    LpSolution {
        status: LpStatus::Optimal,
        x,
        obj_val,
        iterations: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LpRow;

    fn settings() -> LpSettings {
        LpSettings::default()
    }

    #[test]
    fn test_simple_cover_lp() {
        // min x0 + 2 x1 + 3 x2  s.t.  x0 + x2 >= 1,  0 <= x <= 1
        let prob = LpProblem {
            objective: vec![1.0, 2.0, 3.0],
            rows: vec![LpRow::ge(vec![(0, 1.0), (2, 1.0)], 1.0)],
            bounds: vec![(0.0, 1.0); 3],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Optimal);
        assert!((sol.obj_val - 1.0).abs() < 1e-8);
        assert!((sol.x[0] - 1.0).abs() < 1e-8);
        assert!(sol.x[1].abs() < 1e-8);
        assert!(sol.x[2].abs() < 1e-8);
    }

    #[test]
    fn test_fractional_odd_cycle() {
        // Three pairwise covers over unit costs relax to x = (0.5, 0.5, 0.5).
        let prob = LpProblem {
            objective: vec![1.0, 1.0, 1.0],
            rows: vec![
                LpRow::ge(vec![(0, 1.0), (1, 1.0)], 1.0),
                LpRow::ge(vec![(1, 1.0), (2, 1.0)], 1.0),
                LpRow::ge(vec![(0, 1.0), (2, 1.0)], 1.0),
            ],
            bounds: vec![(0.0, 1.0); 3],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Optimal);
        assert!((sol.obj_val - 1.5).abs() < 1e-8);
    }

    #[test]
    fn test_infeasible_box() {
        // x0 >= 2 contradicts x0 <= 1.
        let prob = LpProblem {
            objective: vec![1.0],
            rows: vec![LpRow::ge(vec![(0, 1.0)], 2.0)],
            bounds: vec![(0.0, 1.0)],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Infeasible);
    }

    #[test]
    fn test_fixed_variable_bounds() {
        // Fixing x0 = 1 through its box forces the cheap cover choice away.
        let prob = LpProblem {
            objective: vec![1.0, 2.0],
            rows: vec![LpRow::ge(vec![(0, 1.0), (1, 1.0)], 1.0)],
            bounds: vec![(1.0, 1.0), (0.0, 1.0)],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Optimal);
        assert!((sol.x[0] - 1.0).abs() < 1e-8);
        assert!((sol.obj_val - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_equality_row() {
        // min x0 + x1  s.t.  x0 + x1 = 2, 0 <= x <= 2
        let prob = LpProblem {
            objective: vec![1.0, 1.0],
            rows: vec![LpRow::eq(vec![(0, 1.0), (1, 1.0)], 2.0)],
            bounds: vec![(0.0, 2.0); 2],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Optimal);
        assert!((sol.obj_val - 2.0).abs() < 1e-8);
    }

    #[test]
    fn test_unbounded() {
        // min -x0 with no upper bound.
        let prob = LpProblem {
            objective: vec![-1.0, 0.0],
            rows: vec![LpRow::ge(vec![(1, 1.0)], 1.0)],
            bounds: vec![(0.0, f64::INFINITY), (0.0, f64::INFINITY)],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Unbounded);
    }

    #[test]
    fn test_bounds_only() {
        let prob = LpProblem {
            objective: vec![2.0, -1.0],
            rows: Vec::new(),
            bounds: vec![(0.0, 1.0), (0.0, 1.0)],
        };

        let sol = solve(&prob, &settings()).unwrap();
        assert_eq!(sol.status, LpStatus::Optimal);
        assert_eq!(sol.x, vec![0.0, 1.0]);
        assert!((sol.obj_val + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_limit() {
        let prob = LpProblem {
            objective: vec![1.0, 1.0, 1.0],
            rows: vec![
                LpRow::ge(vec![(0, 1.0), (1, 1.0)], 1.0),
                LpRow::ge(vec![(1, 1.0), (2, 1.0)], 1.0),
            ],
            bounds: vec![(0.0, 1.0); 3],
        };
        let tight = LpSettings {
            max_iter: 1,
            ..LpSettings::default()
        };

        let sol = solve(&prob, &tight).unwrap();
        assert_eq!(sol.status, LpStatus::IterationLimit);
    }

    #[test]
    fn test_bland_matches_dantzig() {
        let prob = LpProblem {
            objective: vec![3.0, 1.0, 4.0, 1.5],
            rows: vec![
                LpRow::ge(vec![(0, 1.0), (1, 1.0)], 1.0),
                LpRow::ge(vec![(2, 1.0), (3, 1.0)], 1.0),
                LpRow::ge(vec![(0, 1.0), (3, 1.0)], 1.0),
            ],
            bounds: vec![(0.0, 1.0); 4],
        };

        let dantzig = solve(&prob, &settings()).unwrap();
        let bland = solve(
            &prob,
            &LpSettings {
                pivot_rule: PivotRule::Bland,
                ..LpSettings::default()
            },
        )
        .unwrap();

        assert_eq!(dantzig.status, LpStatus::Optimal);
        assert_eq!(bland.status, LpStatus::Optimal);
        assert!((dantzig.obj_val - bland.obj_val).abs() < 1e-8);
    }

    #[test]
    fn test_dimension_mismatch() {
        let prob = LpProblem {
            objective: vec![1.0],
            rows: vec![LpRow::ge(vec![(3, 1.0)], 1.0)],
            bounds: vec![(0.0, 1.0)],
        };

        assert!(matches!(
            solve(&prob, &settings()),
            Err(LpError::DimensionMismatch(_))
        ));
    }
}
