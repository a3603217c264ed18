//! Jacobi-preconditioned Conjugate Gradient.
//!
//! Solves `A·x = b` for symmetric positive definite `A`:
//!
//! ```text
//! r_0 = b, z_0 = M⁻¹ r_0, p_0 = z_0
//! α_k = (r_k · z_k) / (p_k · A p_k)
//! x_{k+1} = x_k + α_k p_k
//! r_{k+1} = r_k - α_k A p_k
//! β_k = (r_{k+1} · z_{k+1}) / (r_k · z_k)
//! p_{k+1} = z_{k+1} + β_k p_k
//! ```
//!
//! `M` is the diagonal of `A`. The initial guess is always zero.

use super::sparse::SparseMatrix;
use nalgebra::DVector;
use config::constants::{SOLVER_MAX_ITERATIONS, SOLVER_TOLERANCE};
use config::settings::KernelConfig;

/// Configuration for [`ConjugateGradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Convergence threshold on the absolute residual norm `‖b − A·x‖`.
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: SOLVER_MAX_ITERATIONS,
            tolerance: SOLVER_TOLERANCE,
        }
    }
}

impl From<&KernelConfig> for SolverConfig {
    fn from(config: &KernelConfig) -> Self {
        Self {
            max_iterations: config.solver_max_iterations,
            tolerance: config.solver_tolerance,
        }
    }
}

/// Outcome of a solve. Never an error: non-convergence is reported here.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Best iterate.
    pub solution: DVector<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// Residual norm of `solution`.
    pub residual_norm: f64,
    /// True when `residual_norm <= tolerance`.
    pub converged: bool,
}

/// Conjugate Gradient solver.
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    config: SolverConfig,
}

impl ConjugateGradient {
    /// Creates a solver.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves `matrix · x = rhs`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use nalgebra::DVector;
    /// use patch_kernel::param::{ConjugateGradient, SparseMatrix, SolverConfig};
    ///
    /// let a = SparseMatrix::from_triplets(
    ///     2,
    ///     [(0, 0, 4.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 3.0)],
    /// );
    /// let result = ConjugateGradient::new(SolverConfig::default()).solve(&a, &DVector::from_vec(vec![1.0, 2.0]));
    /// assert!(result.converged);
    /// assert!((result.solution[0] - 1.0 / 11.0).abs() < 1e-9);
    /// assert!((result.solution[1] - 7.0 / 11.0).abs() < 1e-9);
    /// ```
    pub fn solve(&self, matrix: &SparseMatrix, rhs: &DVector<f64>) -> SolveResult {
        let n = matrix.dim();
        debug_assert_eq!(rhs.len(), n);

        let mut x = DVector::zeros(n);
        let mut r = rhs.clone();
        let mut residual_norm = r.norm();
        if residual_norm <= self.config.tolerance {
            return SolveResult {
                solution: x,
                iterations: 0,
                residual_norm,
                converged: true,
            };
        }

        // Zero diagonal entries fall back to identity.
        let inv_diag = matrix
            .diagonal()
            .map(|d| if d.abs() > f64::EPSILON { 1.0 / d } else { 1.0 });

        let mut z = r.component_mul(&inv_diag);
        let mut p = z.clone();
        let mut rz = r.dot(&z);
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            let ap = matrix.mul_vec(&p);
            let p_ap = p.dot(&ap);
            if !p_ap.is_finite() || p_ap <= 0.0 {
                break;
            }

            let alpha = rz / p_ap;
            x.axpy(alpha, &p, 1.0);
            r.axpy(-alpha, &ap, 1.0);
            iterations += 1;

            residual_norm = r.norm();
            if residual_norm <= self.config.tolerance {
                break;
            }

            z = r.component_mul(&inv_diag);
            let rz_next = r.dot(&z);
            p.axpy(1.0, &z, rz_next / rz);
            rz = rz_next;
        }

        SolveResult {
            solution: x,
            iterations,
            residual_norm,
            converged: residual_norm <= self.config.tolerance,
        }
    }
}
