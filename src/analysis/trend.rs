//! Polynomial trend fitting for sales series.
//!
//! Dates are mapped to day ordinals, standardized, and expanded into
//! cubic polynomial features. An ordinary least-squares fit with intercept
//! is evaluated in-sample to produce the smoothed overlay.

use crate::errors::QueryError;
use crate::models::{Bucket, SalesSeries};
use chrono::Datelike;
use tracing::debug;

/// Highest power of the standardized date used as a feature.
pub const POLYNOMIAL_DEGREE: i32 = 3;

/// Columns whose residual norm falls below this fraction of their original
/// norm are treated as linearly dependent and dropped.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fit a cubic trend to `series` and return the fitted value of every bucket,
/// in the same date order.
///
/// Fails with [`QueryError::InsufficientData`] when fewer than two buckets
/// are available, since the dates cannot be standardized.
pub fn fit_trend(series: &SalesSeries) -> Result<Vec<Bucket>, QueryError> {
    if series.len() < 2 {
        return Err(QueryError::InsufficientData(format!(
            "trend needs at least 2 buckets, got {}",
            series.len()
        )));
    }

    let ordinals: Vec<f64> = series
        .dates()
        .map(|d| f64::from(d.num_days_from_ce()))
        .collect();
    let standardized = standardize(&ordinals)?;

    let features: Vec<Vec<f64>> = (0..=POLYNOMIAL_DEGREE)
        .map(|power| standardized.iter().map(|z| z.powi(power)).collect())
        .collect();
    let response: Vec<f64> = series.values().collect();

    let basis = orthonormal_basis(features);
    debug!(
        "Fitting degree-{} trend over {} buckets (rank {})",
        POLYNOMIAL_DEGREE,
        series.len(),
        basis.len()
    );

    let mut fitted = vec![0.0; response.len()];
    for q in &basis {
        let weight = dot(q, &response);
        for (f, qi) in fitted.iter_mut().zip(q) {
            *f += weight * qi;
        }
    }

    Ok(series
        .dates()
        .zip(fitted)
        .map(|(date, value)| Bucket { date, value })
        .collect())
}

/// Zero mean, unit (population) variance.
fn standardize(values: &[f64]) -> Result<Vec<f64>, QueryError> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return Err(QueryError::InsufficientData(
            "bucket dates have zero variance".to_string(),
        ));
    }

    Ok(values.iter().map(|v| (v - mean) / std_dev).collect())
}

/// Orthonormalize the feature columns with modified Gram-Schmidt.
///
/// Projecting the response onto the returned vectors gives the least-squares
/// fitted values, whether or not the design has full column rank.
fn orthonormal_basis(columns: Vec<Vec<f64>>) -> Vec<Vec<f64>> {
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

    for mut column in columns {
        let original_norm = dot(&column, &column).sqrt();
        if original_norm == 0.0 {
            continue;
        }

        for q in &basis {
            let projection = dot(q, &column);
            for (c, qi) in column.iter_mut().zip(q) {
                *c -= projection * qi;
            }
        }

        let norm = dot(&column, &column).sqrt();
        if norm <= RANK_TOLERANCE * original_norm {
            continue;
        }
        column.iter_mut().for_each(|c| *c /= norm);
        basis.push(column);
    }

    basis
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Granularity;
    use chrono::{Duration, NaiveDate};

    fn series_from(points: &[(i64, f64)]) -> SalesSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        SalesSeries {
            granularity: Granularity::Daily,
            buckets: points
                .iter()
                .map(|&(offset, value)| Bucket {
                    date: start + Duration::days(offset),
                    value,
                })
                .collect(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= 1e-6 * scale,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_exact_cubic_is_reproduced() {
        let points: Vec<(i64, f64)> = (0..12)
            .map(|i| {
                let t = i as f64;
                (i, 200.0 + 3.0 * t - 0.5 * t * t + 0.1 * t * t * t)
            })
            .collect();
        let series = series_from(&points);

        let fitted = fit_trend(&series).unwrap();
        for (bucket, (_, expected)) in fitted.iter().zip(&points) {
            assert_close(bucket.value, *expected);
        }
    }

    #[test]
    fn test_output_matches_input_length_and_order() {
        let series = series_from(&[
            (0, 120.0),
            (1, 80.0),
            (4, 150.0),
            (5, 90.0),
            (9, 200.0),
            (13, 60.0),
        ]);
        let fitted = fit_trend(&series).unwrap();

        assert_eq!(fitted.len(), series.len());
        let fitted_dates: Vec<_> = fitted.iter().map(|b| b.date).collect();
        let input_dates: Vec<_> = series.dates().collect();
        assert_eq!(fitted_dates, input_dates);
    }

    #[test]
    fn test_residuals_are_orthogonal_to_features() {
        let series = series_from(&[
            (0, 310.5),
            (1, 280.0),
            (2, 402.25),
            (3, 350.0),
            (5, 298.75),
            (6, 420.0),
            (7, 390.5),
            (10, 445.0),
        ]);
        let fitted = fit_trend(&series).unwrap();
        let residuals: Vec<f64> = series
            .values()
            .zip(&fitted)
            .map(|(y, f)| y - f.value)
            .collect();

        // Intercept: residuals sum to zero.
        assert!(residuals.iter().sum::<f64>().abs() < 1e-6);

        let ordinals: Vec<f64> = series
            .dates()
            .map(|d| f64::from(d.num_days_from_ce()))
            .collect();
        let z = standardize(&ordinals).unwrap();
        for power in 1..=POLYNOMIAL_DEGREE {
            let feature: Vec<f64> = z.iter().map(|v| v.powi(power)).collect();
            assert!(dot(&feature, &residuals).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rank_deficient_fits_interpolate() {
        let series = series_from(&[(0, 10.0), (7, 20.0)]);
        let fitted = fit_trend(&series).unwrap();
        assert_close(fitted[0].value, 10.0);
        assert_close(fitted[1].value, 20.0);

        let series = series_from(&[(0, 5.0), (1, 50.0), (3, 12.0)]);
        let fitted = fit_trend(&series).unwrap();
        assert_close(fitted[0].value, 5.0);
        assert_close(fitted[1].value, 50.0);
        assert_close(fitted[2].value, 12.0);
    }

    #[test]
    fn test_too_few_buckets_is_insufficient_data() {
        let err = fit_trend(&series_from(&[(0, 10.0)])).unwrap_err();
        assert!(matches!(err, QueryError::InsufficientData(_)));

        let err = fit_trend(&SalesSeries::default()).unwrap_err();
        assert!(matches!(err, QueryError::InsufficientData(_)));
    }

    #[test]
    fn test_standardize_rejects_zero_variance() {
        assert!(standardize(&[738000.0, 738000.0]).is_err());

        let z = standardize(&[1.0, 2.0, 3.0]).unwrap();
        assert_close(z.iter().sum::<f64>(), 0.0);
        assert_close(z.iter().map(|v| v * v).sum::<f64>() / 3.0, 1.0);
    }

    #[test]
    fn test_fit_is_idempotent() {
        let series = series_from(&[(0, 1.0), (2, 4.0), (3, 2.0), (8, 7.0), (9, 3.0)]);
        assert_eq!(fit_trend(&series).unwrap(), fit_trend(&series).unwrap());
    }
}
