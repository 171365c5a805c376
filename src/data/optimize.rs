use super::model::{Categorical, Column, Dtype, FloatData, IntData, Table};

/// Knobs for [`optimize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    /// A text column becomes categorical when its distinct count is below
    /// `category_ratio * rows`.
    pub category_ratio: f64,
    /// Largest absolute error accepted when narrowing `f64` to `f32`.
    /// `0.0` requires an exact round trip.
    pub float_tolerance: f64,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            category_ratio: 0.5,
            float_tolerance: 0.0,
        }
    }
}

/// One dtype change made by [`optimize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub column: String,
    pub from: Dtype,
    pub to: Dtype,
}

/// Shrink `table` in place: low-cardinality text to categorical, integers
/// and floats to their narrowest lossless width. A categorical whose
/// dictionary outweighs the text it replaces is discarded.
pub fn optimize(table: &mut Table, options: &OptimizeOptions) -> Vec<Conversion> {
    let rows = table.n_rows();
    let mut conversions = Vec::new();

    for (name, column) in table.iter_mut() {
        let from = column.dtype();
        let narrowed = match &*column {
            Column::Text(values) => {
                let distinct = column.n_unique();
                ((distinct as f64) < options.category_ratio * rows as f64)
                    .then(|| Column::Categorical(Categorical::from_values(values)))
                    .filter(|categorical| categorical.deep_size() <= column.deep_size())
            }
            Column::Int(data) => Some(Column::Int(IntData::narrowest(data.to_i64()))),
            Column::Float(FloatData::F64(values)) => downcast_f64(values, options.float_tolerance)
                .map(|v| Column::Float(FloatData::F32(v))),
            Column::Float(FloatData::F32(_)) | Column::Bool(_) | Column::Categorical(_) => None,
        };

        let Some(narrowed) = narrowed else {
            continue;
        };
        let to = narrowed.dtype();
        *column = narrowed;
        if from != to {
            log::info!("column {name:?}: {from} -> {to}");
            conversions.push(Conversion {
                column: name.to_string(),
                from,
                to,
            });
        }
    }

    conversions
}

/// Narrow to `f32` when every value round-trips within `tolerance`. NaN
/// matches NaN; a finite value overflowing to infinity never matches.
fn downcast_f64(values: &[f64], tolerance: f64) -> Option<Vec<f32>> {
    values
        .iter()
        .map(|&v| {
            let narrow = v as f32;
            let back = f64::from(narrow);
            let ok = if v.is_nan() {
                narrow.is_nan()
            } else if v.is_infinite() {
                back == v
            } else {
                back.is_finite() && (back - v).abs() <= tolerance
            };
            ok.then_some(narrow)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::analyze;
    use pretty_assertions::assert_eq;

    fn text(values: &[&str]) -> Column {
        Column::Text(values.iter().map(|s| Some(s.to_string())).collect())
    }

    #[test]
    fn small_mixed_table_shrinks() {
        let mut table = Table::from_columns([
            ("sex", text(&["M", "F", "M", "M", "F"])),
            ("age", Column::Int(IntData::I64(vec![21, 34, 55, 8, 99]))),
            ("lat", Column::Float(FloatData::F64(vec![34.0, 34.5, 33.75, 34.25, 34.125]))),
        ])
        .unwrap();
        let before = analyze(&table).total_mb;

        let conversions = optimize(&mut table, &OptimizeOptions::default());

        assert_eq!(table.column("sex").unwrap().dtype(), Dtype::Category);
        assert_eq!(table.column("age").unwrap().dtype(), Dtype::Int8);
        assert_eq!(table.column("lat").unwrap().dtype(), Dtype::Float32);
        assert_eq!(conversions.len(), 3);
        assert_eq!(table.n_rows(), 5);
        assert_eq!(table.n_columns(), 3);
        assert!(analyze(&table).total_mb < before);
    }

    #[test]
    fn high_cardinality_text_stays_object() {
        let mut table = Table::from_columns([("id", text(&["a", "b", "c", "a"]))]).unwrap();
        let conversions = optimize(&mut table, &OptimizeOptions::default());
        assert!(conversions.is_empty());
        assert_eq!(table.column("id").unwrap().dtype(), Dtype::Object);
    }

    #[test]
    fn categorical_keeps_values() {
        let mut table = Table::from_columns([(
            "c",
            Column::Text(vec![Some("x".into()), None, Some("x".into()), Some("y".into()), Some("x".into())]),
        )])
        .unwrap();
        optimize(&mut table, &OptimizeOptions::default());
        let col = table.column("c").unwrap();
        assert_eq!(
            col.to_text(),
            vec![Some("x".into()), None, Some("x".into()), Some("y".into()), Some("x".into())]
        );
    }

    #[test]
    fn integers_end_at_minimal_width() {
        let cases: [(Vec<i64>, Dtype); 4] = [
            (vec![0, 127, -128], Dtype::Int8),
            (vec![0, 1_000], Dtype::Int16),
            (vec![-70_000, 3], Dtype::Int32),
            (vec![1 << 40], Dtype::Int64),
        ];
        for (values, expected) in cases {
            let mut table = Table::from_columns([("n", Column::Int(IntData::I64(values.clone())))]).unwrap();
            optimize(&mut table, &OptimizeOptions::default());
            let col = table.column("n").unwrap();
            assert_eq!(col.dtype(), expected);
            let Column::Int(data) = col else {
                panic!("expected integer column");
            };
            assert_eq!(data.to_i64(), values);
        }
    }

    #[test]
    fn inexact_floats_need_tolerance() {
        let values = vec![34.0141, -118.2978];
        let mut table = Table::from_columns([("lat", Column::Float(FloatData::F64(values.clone())))]).unwrap();
        optimize(&mut table, &OptimizeOptions::default());
        assert_eq!(table.column("lat").unwrap().dtype(), Dtype::Float64);

        let loose = OptimizeOptions {
            float_tolerance: 5e-4,
            ..OptimizeOptions::default()
        };
        optimize(&mut table, &loose);
        assert_eq!(table.column("lat").unwrap().dtype(), Dtype::Float32);
    }

    #[test]
    fn floats_keep_nan_and_reject_overflow() {
        let narrowed = downcast_f64(&[f64::NAN, 1.5], 0.0).unwrap();
        assert!(narrowed[0].is_nan());
        assert_eq!(narrowed[1], 1.5);
        assert!(downcast_f64(&[1e300], 1.0).is_none());
        assert!(downcast_f64(&[f64::INFINITY], 0.0).is_some());
    }

    #[test]
    fn optimize_never_grows_memory() {
        let mut table = Table::from_columns([
            ("t", text(&["same", "same", "same", "other"])),
            ("u", text(&["a", "b", "c", "d"])),
            ("b", Column::Bool(vec![true, false, true, true])),
            ("f", Column::Float(FloatData::F64(vec![0.1, 0.2, 0.3, f64::NAN]))),
        ])
        .unwrap();
        let before = analyze(&table).total_mb;
        optimize(&mut table, &OptimizeOptions::default());
        assert!(analyze(&table).total_mb <= before);
        assert_eq!(table.n_rows(), 4);
    }

    #[test]
    fn loose_ratio_skips_categorical_that_would_grow() {
        let values: Vec<String> = (0..100).map(|i| format!("v{}", i.min(98))).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let mut table = Table::from_columns([("t", text(&refs))]).unwrap();
        let before = table.deep_size();

        let loose = OptimizeOptions {
            category_ratio: 1.0,
            ..OptimizeOptions::default()
        };
        let conversions = optimize(&mut table, &loose);

        assert!(conversions.is_empty());
        assert_eq!(table.column("t").unwrap().dtype(), Dtype::Object);
        assert_eq!(table.deep_size(), before);
    }

    #[test]
    fn loose_ratio_still_converts_repetitive_text() {
        let mut table = Table::from_columns([("t", text(&["aaaa", "aaaa", "bbbb", "aaaa"]))]).unwrap();
        let before = table.deep_size();
        let loose = OptimizeOptions {
            category_ratio: 1.0,
            ..OptimizeOptions::default()
        };
        optimize(&mut table, &loose);
        assert_eq!(table.column("t").unwrap().dtype(), Dtype::Category);
        assert!(table.deep_size() <= before);
    }
}
