use nalgebra::{DMatrix, DVector};

use crate::constants::{
    EXACT_FIT_RATIO, LM_LAMBDA_DOWN, LM_LAMBDA_INITIAL, LM_LAMBDA_MAX, LM_LAMBDA_MIN,
    LM_LAMBDA_UP,
};
use crate::error::{PeakError, Result};

/// Levenberg-Marquardt solver for small nonlinear least-squares fits
///
/// Uses Marquardt's diagonal scaling, so parameters of very different
/// magnitude (an amplitude in the thousands next to a frequency) are damped
/// evenly.
#[derive(Debug, Clone, Copy)]
pub struct LevenbergMarquardt {
    /// Iteration budget; exceeding it is a convergence failure
    pub max_iterations: usize,
    /// Relative cost improvement (and relative step size) below which the
    /// fit is considered converged
    pub tolerance: f64,
}

/// Converged parameters
#[derive(Debug, Clone)]
pub struct FitResult {
    pub parameters: Vec<f64>,
    /// Sum of squared residuals at `parameters`
    pub cost: f64,
    pub iterations: usize,
}

/// Gauss-Newton normal equations at one parameter vector
struct NormalEquations {
    jtj: DMatrix<f64>,
    jtr: DVector<f64>,
    cost: f64,
}

impl NormalEquations {
    fn damped_step(&self, lambda: f64) -> Option<DVector<f64>> {
        let mut damped = self.jtj.clone();
        for i in 0..damped.nrows() {
            let d = self.jtj[(i, i)];
            damped[(i, i)] += lambda * if d > 0.0 { d } else { 1.0 };
        }
        damped.cholesky().map(|c| c.solve(&self.jtr))
    }
}

impl LevenbergMarquardt {
    /// Minimize `sum((y - model(x))^2)` over the free parameters
    ///
    /// `model(x, parameters, gradient)` returns the model value at `x` and
    /// writes the partial derivative for every parameter into `gradient`.
    /// Parameters whose `free` flag is `false` stay at their initial value.
    ///
    /// # Errors
    /// `InsufficientData` if there are fewer samples than free parameters,
    /// `FitDidNotConverge` if the iteration budget runs out or the
    /// parameters stop being finite.
    pub fn minimize<F>(
        &self,
        model: F,
        xs: &[f64],
        ys: &[f64],
        initial: &[f64],
        free: &[bool],
    ) -> Result<FitResult>
    where
        F: Fn(f64, &[f64], &mut [f64]) -> f64,
    {
        debug_assert_eq!(initial.len(), free.len());
        let active: Vec<usize> = free
            .iter()
            .enumerate()
            .filter_map(|(i, &is_free)| is_free.then_some(i))
            .collect();
        if xs.len() < active.len() {
            return Err(PeakError::InsufficientData {
                what: "samples",
                needed: active.len(),
                available: xs.len(),
            });
        }

        let exact = EXACT_FIT_RATIO * ys.iter().map(|y| y * y).sum::<f64>();
        let mut parameters = initial.to_vec();
        let mut system = linearize(&model, xs, ys, &parameters, &active);
        if !system.cost.is_finite() {
            return Err(PeakError::FitDidNotConverge { iterations: 0 });
        }
        let mut lambda = LM_LAMBDA_INITIAL;

        for iteration in 1..=self.max_iterations {
            if system.cost <= exact {
                return Ok(FitResult {
                    parameters,
                    cost: system.cost,
                    iterations: iteration - 1,
                });
            }

            let Some(step) = system.damped_step(lambda) else {
                lambda *= LM_LAMBDA_UP;
                if lambda > LM_LAMBDA_MAX {
                    return Err(PeakError::FitDidNotConverge { iterations: iteration });
                }
                continue;
            };

            let mut trial = parameters.clone();
            for (j, &i) in active.iter().enumerate() {
                trial[i] += step[j];
            }
            let trial_cost = cost(&model, xs, ys, &trial);

            if trial_cost.is_finite() && trial_cost < system.cost {
                let improvement = (system.cost - trial_cost) / system.cost;
                let scale: f64 = active.iter().map(|&i| parameters[i] * parameters[i]).sum();
                let small_step = step.norm() <= self.tolerance * (scale.sqrt() + self.tolerance);

                parameters = trial;
                system = linearize(&model, xs, ys, &parameters, &active);
                lambda = (lambda * LM_LAMBDA_DOWN).max(LM_LAMBDA_MIN);

                if improvement < self.tolerance || small_step {
                    return Ok(FitResult {
                        parameters,
                        cost: system.cost,
                        iterations: iteration,
                    });
                }
            } else {
                lambda *= LM_LAMBDA_UP;
                if lambda > LM_LAMBDA_MAX {
                    // No downhill step left: already at the minimum
                    return Ok(FitResult {
                        parameters,
                        cost: system.cost,
                        iterations: iteration,
                    });
                }
            }
        }

        Err(PeakError::FitDidNotConverge {
            iterations: self.max_iterations,
        })
    }
}

fn linearize<F>(model: &F, xs: &[f64], ys: &[f64], parameters: &[f64], active: &[usize]) -> NormalEquations
where
    F: Fn(f64, &[f64], &mut [f64]) -> f64,
{
    let k = active.len();
    let mut jtj = DMatrix::zeros(k, k);
    let mut jtr = DVector::zeros(k);
    let mut total = 0.0;
    let mut gradient = vec![0.0; parameters.len()];

    for (&x, &y) in xs.iter().zip(ys) {
        let residual = y - model(x, parameters, &mut gradient);
        total += residual * residual;
        for (a, &i) in active.iter().enumerate() {
            jtr[a] += gradient[i] * residual;
            for (b, &j) in active.iter().enumerate() {
                jtj[(a, b)] += gradient[i] * gradient[j];
            }
        }
    }

    NormalEquations {
        jtj,
        jtr,
        cost: total,
    }
}

fn cost<F>(model: &F, xs: &[f64], ys: &[f64], parameters: &[f64]) -> f64
where
    F: Fn(f64, &[f64], &mut [f64]) -> f64,
{
    let mut gradient = vec![0.0; parameters.len()];
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let residual = y - model(x, parameters, &mut gradient);
            residual * residual
        })
        .sum()
}
