use crate::error::Result;
use crate::models::AggregateTable;
use serde::{Deserialize, Serialize};

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub x_column: String,
    pub y_column: String,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: usize,
}

impl Trendline {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y_column` against `x_column` over rows where both are present.
///
/// Returns `None` when fewer than two paired points exist or every x is
/// the same value.
pub fn fit_trendline(
    table: &AggregateTable,
    x_column: &str,
    y_column: &str,
) -> Result<Option<Trendline>> {
    let xs = table.column(x_column)?;
    let ys = table.column(y_column)?;

    let points: Vec<(f64, f64)> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect();

    if points.len() < 2 {
        return Ok(None);
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return Ok(None);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Ok(Some(Trendline {
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        slope,
        intercept,
        r_squared,
        points: points.len(),
    }))
}
