use std::collections::HashMap;

use super::model::{Column, Table};

/// Occurrences of each distinct non-missing value, most frequent first.
/// Ties keep first-appearance order.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for cell in column.cells().filter(|c| !c.is_null()) {
        let key = cell.to_string();
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// Integer and float columns of `table` as `f64`, in column order.
pub fn numeric_columns(table: &Table) -> Vec<(String, Vec<f64>)> {
    table
        .iter()
        .filter_map(|(name, col)| col.to_f64().map(|values| (name.to_string(), values)))
        .collect()
}

/// Square matrix of pairwise Pearson correlations.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    /// Row-major, `names.len()` squared entries. NaN where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row * self.size() + col)
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Correlate every pair of `columns`, using the rows where both values are
/// present. Returns `None` when there are no columns.
pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> Option<CorrelationMatrix> {
    if columns.is_empty() {
        return None;
    }
    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i].1, &columns[j].1);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }
    Some(CorrelationMatrix {
        names: columns.iter().map(|(name, _)| name.clone()).collect(),
        values,
    })
}

/// Pearson's r over pairwise-complete observations. NaN with fewer than two
/// pairs or zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}
