//! ROC and precision-recall curves with trapezoidal areas.
use std::cmp::Ordering;
use std::path::Path;

use crate::data::dataset::Label;
use crate::error::ImbalanceError;

/// One point of a curve, together with the decision threshold that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    /// Scores `>= threshold` are predicted positive. `+inf` for the origin sentinel.
    pub threshold: f64,
    pub x: f64,
    pub y: f64,
}

/// Ordered curve points plus the area under them.
///
/// Points run from the strictest threshold to the loosest, so `x` never decreases.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub points: Vec<CurvePoint>,
    pub area: f64,
}

impl Curve {
    fn from_points(points: Vec<CurvePoint>) -> Self {
        let area = trapezoidal_area(&points);
        Self { points, area }
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Writes the points as `threshold,<x_name>,<y_name>` CSV rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_csv<P: AsRef<Path>>(
        &self,
        path: P,
        x_name: &str,
        y_name: &str,
    ) -> Result<(), ImbalanceError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["threshold", x_name, y_name])?;
        for point in &self.points {
            writer.write_record([
                point.threshold.to_string(),
                point.x.to_string(),
                point.y.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Running confusion counts while sweeping thresholds from high to low.
struct Sweep {
    /// `(threshold, tp, fp)` after admitting every score `>= threshold`.
    steps: Vec<(f64, usize, usize)>,
    positives: usize,
    negatives: usize,
}

fn sweep_scores(y_true: &[Label], scores: &[f64]) -> Result<Sweep, ImbalanceError> {
    if y_true.len() != scores.len() {
        return Err(ImbalanceError::LengthMismatch {
            expected: y_true.len(),
            got: scores.len(),
        });
    }
    if y_true.is_empty() {
        return Err(ImbalanceError::EmptyDataset);
    }
    if let Some((row, &label)) = y_true.iter().enumerate().find(|&(_, &l)| l > 1) {
        return Err(ImbalanceError::InvalidLabel {
            row,
            value: label.to_string(),
        });
    }

    let positives = y_true.iter().filter(|&&l| l == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(ImbalanceError::UndefinedAuc {
            class: u8::from(positives > 0),
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

    let mut steps = Vec::new();
    let (mut tp, mut fp) = (0, 0);
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        steps.push((threshold, tp, fp));
    }

    Ok(Sweep {
        steps,
        positives,
        negatives,
    })
}

/// ROC curve: `(false positive rate, true positive rate)` at every distinct score.
///
/// Starts at `(0, 0)` (threshold `+inf`) and ends at `(1, 1)` once every sample is
/// predicted positive.
///
/// # Errors
///
/// Returns [`ImbalanceError::UndefinedAuc`] if `y_true` holds a single class, and an error for
/// empty or mismatched inputs.
pub fn roc_curve(y_true: &[Label], scores: &[f64]) -> Result<Curve, ImbalanceError> {
    let sweep = sweep_scores(y_true, scores)?;
    let (p, n) = (sweep.positives as f64, sweep.negatives as f64);

    let mut points = vec![CurvePoint {
        threshold: f64::INFINITY,
        x: 0.0,
        y: 0.0,
    }];
    points.extend(sweep.steps.iter().map(|&(threshold, tp, fp)| CurvePoint {
        threshold,
        x: fp as f64 / n,
        y: tp as f64 / p,
    }));
    Ok(Curve::from_points(points))
}

/// Precision-recall curve: `(recall, precision)` at every distinct score.
///
/// Starts at recall 0 with precision 1 (threshold `+inf`).
///
/// # Errors
///
/// Same as [`roc_curve`].
pub fn pr_curve(y_true: &[Label], scores: &[f64]) -> Result<Curve, ImbalanceError> {
    let sweep = sweep_scores(y_true, scores)?;
    let p = sweep.positives as f64;

    let mut points = vec![CurvePoint {
        threshold: f64::INFINITY,
        x: 0.0,
        y: 1.0,
    }];
    points.extend(sweep.steps.iter().map(|&(threshold, tp, fp)| CurvePoint {
        threshold,
        x: tp as f64 / p,
        y: tp as f64 / (tp + fp) as f64,
    }));
    Ok(Curve::from_points(points))
}

/// Area under the ROC curve.
pub fn roc_auc(y_true: &[Label], scores: &[f64]) -> Result<f64, ImbalanceError> {
    Ok(roc_curve(y_true, scores)?.area)
}

/// Area under the precision-recall curve.
pub fn pr_auc(y_true: &[Label], scores: &[f64]) -> Result<f64, ImbalanceError> {
    Ok(pr_curve(y_true, scores)?.area)
}

/// Trapezoidal area over points sorted by ascending `x`.
fn trapezoidal_area(points: &[CurvePoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x) * (pair[1].y + pair[0].y) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_roc_perfect_separator() {
        let y_true = [0, 0, 1, 1, 0, 1];
        let scores: Vec<f64> = y_true.iter().map(|&l| f64::from(l)).collect();
        let curve = roc_curve(&y_true, &scores).unwrap();
        assert_relative_eq!(curve.area, 1.0);
        assert_eq!(curve.xs(), vec![0.0, 0.0, 1.0]);
        assert_eq!(curve.ys(), vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_pr_perfect_separator() {
        let y_true = [0, 0, 1, 1, 0, 1];
        let scores: Vec<f64> = y_true.iter().map(|&l| f64::from(l)).collect();
        assert_relative_eq!(pr_auc(&y_true, &scores).unwrap(), 1.0);
    }

    #[test]
    fn test_roc_known_value() {
        // Pairs ranked correctly: 3 of 4.
        let y_true = [0, 0, 1, 1];
        let scores = [0.1, 0.4, 0.35, 0.8];
        assert_relative_eq!(roc_auc(&y_true, &scores).unwrap(), 0.75);
    }

    #[test]
    fn test_roc_ties_form_diagonal() {
        let y_true = [0, 1, 0, 1];
        let scores = [0.5; 4];
        let curve = roc_curve(&y_true, &scores).unwrap();
        assert_eq!(curve.points.len(), 2);
        assert_relative_eq!(curve.area, 0.5);
    }

    #[test]
    fn test_roc_x_is_monotonic() {
        let y_true = [0, 1, 0, 0, 1, 0, 1, 0];
        let scores = [0.2, 0.9, 0.4, 0.1, 0.3, 0.8, 0.7, 0.6];
        let curve = roc_curve(&y_true, &scores).unwrap();
        for pair in curve.points.windows(2) {
            assert!(pair[0].x <= pair[1].x);
            assert!(pair[0].threshold > pair[1].threshold);
        }
        let last = curve.points.last().unwrap();
        assert_eq!((last.x, last.y), (1.0, 1.0));
    }

    #[test]
    fn test_roc_auc_invariant_under_monotonic_transform() {
        let y_true = [0, 1, 0, 0, 1, 0, 1, 0, 1, 0];
        let scores: [f64; 10] = [0.2, 0.9, 0.4, 0.1, 0.3, 0.8, 0.7, 0.6, 0.4, 0.05];
        let transformed: Vec<f64> = scores.iter().map(|s| (3.0 * s).exp() + 7.0).collect();
        assert_eq!(
            roc_auc(&y_true, &scores).unwrap(),
            roc_auc(&y_true, &transformed).unwrap()
        );
    }

    #[test]
    fn test_pr_curve_points() {
        let y_true = [0, 1, 1, 0];
        let scores = [0.2, 0.9, 0.5, 0.6];
        let curve = pr_curve(&y_true, &scores).unwrap();
        // thresholds: inf, 0.9, 0.6, 0.5, 0.2
        assert_eq!(curve.xs(), vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_relative_eq!(curve.points[2].y, 0.5);
        assert_relative_eq!(curve.points[3].y, 2.0 / 3.0);
        assert_relative_eq!(curve.points[4].y, 0.5);
        let expected = 0.5 * (1.0 + 1.0) / 2.0 + 0.5 * (0.5 + 2.0 / 3.0) / 2.0;
        assert_relative_eq!(curve.area, expected);
    }

    #[test]
    fn test_areas_are_bounded() {
        let y_true = [1, 0, 1, 0, 0, 1, 0];
        let scores = [0.1, 0.9, 0.2, 0.8, 0.7, 0.3, 0.6];
        for area in [
            roc_auc(&y_true, &scores).unwrap(),
            pr_auc(&y_true, &scores).unwrap(),
        ] {
            assert!((0.0..=1.0).contains(&area));
        }
    }

    #[test]
    fn test_single_class_is_undefined() {
        assert!(matches!(
            roc_auc(&[0, 0, 0], &[0.1, 0.2, 0.3]),
            Err(ImbalanceError::UndefinedAuc { class: 0 })
        ));
        assert!(matches!(
            pr_auc(&[1, 1], &[0.1, 0.2]),
            Err(ImbalanceError::UndefinedAuc { class: 1 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            roc_curve(&[0, 1], &[0.5]),
            Err(ImbalanceError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roc.csv");
        let curve = roc_curve(&[0, 1], &[0.2, 0.7]).unwrap();
        curve.write_csv(&path, "fpr", "tpr").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "threshold,fpr,tpr");
        assert_eq!(lines[1], "inf,0,0");
        assert_eq!(lines[2], "0.7,0,1");
        assert_eq!(lines[3], "0.2,1,1");
    }
}
