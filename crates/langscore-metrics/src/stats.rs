//! Small statistics helpers shared by the benchmark kinds.

/// Pearson correlation coefficient.
///
/// `None` when the inputs differ in length, have fewer than two points, or
/// either side has zero variance.
pub fn pearsonr(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Upper triangle (excluding the diagonal) of the correlation-distance RDM
/// of `rows`, in row-major order.
///
/// Pairs where either row is constant get the maximal distance of 1.
pub fn rdm_upper(rows: &[Vec<f64>]) -> Vec<f64> {
    let n = rows.len();
    let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearsonr(&rows[i], &rows[j]).unwrap_or(0.0);
            out.push(1.0 - r);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_and_inverse_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert!((pearsonr(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearsonr(&x, &[4.0, 3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_have_no_correlation() {
        assert_eq!(pearsonr(&[1.0], &[1.0]), None);
        assert_eq!(pearsonr(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearsonr(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn known_value() {
        // scipy.stats.pearsonr([1,2,3,4,5],[2,1,4,3,5]) = 0.8
        let r = pearsonr(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rdm_upper_has_n_choose_2_entries() {
        let rows = vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.0, 6.0],
            vec![3.0, 2.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ];
        let upper = rdm_upper(&rows);
        assert_eq!(upper.len(), 6);
        assert!(upper[0].abs() < 1e-12);
        assert!((upper[1] - 2.0).abs() < 1e-12);
        assert_eq!(upper[2], 1.0);
    }
}
