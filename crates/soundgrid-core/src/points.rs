//! The columnar point set staged into the grid by named containers.
//!
//! Soundings arrive as row-oriented batches: required `x`/`y` coordinate
//! columns (f64) plus optional `z`/`tvu`/`thu` layer columns (f32), all of
//! one shared length. The two constructors mirror the two accepted input
//! shapes: typed column vectors, or labelled `(name, column)` pairs.

use crate::error::GridError;
use crate::layer::Layer;

/// One labelled input column for [`PointSet::from_columns`].
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// A coordinate column (`x` or `y`).
    F64(Vec<f64>),
    /// A layer column (`z`, `tvu`, or `thu`).
    F32(Vec<f32>),
}

/// A row-oriented batch of soundings with named, equal-length columns.
///
/// `x` and `y` are required; `z` (depth), `tvu` (vertical uncertainty) and
/// `thu` (horizontal uncertainty) are optional and map to the gridded
/// [`Layer`]s. A `PointSet` is immutable once built; the grid splits it by
/// lattice cell with [`take`](Self::take) during placement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSet {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Option<Vec<f32>>,
    tvu: Option<Vec<f32>>,
    thu: Option<Vec<f32>>,
}

impl PointSet {
    /// Create a point set from its required coordinate columns.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidInput`] if the columns differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, GridError> {
        if x.len() != y.len() {
            return Err(GridError::InvalidInput {
                reason: format!("'x' has {} rows but 'y' has {}", x.len(), y.len()),
            });
        }
        Ok(Self {
            x,
            y,
            z: None,
            tvu: None,
            thu: None,
        })
    }

    /// Attach the depth (`z`) column.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidInput`] on a length mismatch.
    pub fn with_depth(mut self, z: Vec<f32>) -> Result<Self, GridError> {
        check_len("z", z.len(), self.x.len())?;
        self.z = Some(z);
        Ok(self)
    }

    /// Attach the vertical uncertainty (`tvu`) column.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidInput`] on a length mismatch.
    pub fn with_vertical_uncertainty(mut self, tvu: Vec<f32>) -> Result<Self, GridError> {
        check_len("tvu", tvu.len(), self.x.len())?;
        self.tvu = Some(tvu);
        Ok(self)
    }

    /// Attach the horizontal uncertainty (`thu`) column.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidInput`] on a length mismatch.
    pub fn with_horizontal_uncertainty(mut self, thu: Vec<f32>) -> Result<Self, GridError> {
        check_len("thu", thu.len(), self.x.len())?;
        self.thu = Some(thu);
        Ok(self)
    }

    /// Build a point set from labelled columns.
    ///
    /// Column names must be among `x`, `y`, `z`, `tvu`, `thu`; `x` and `y`
    /// are required and must be [`Column::F64`], the rest [`Column::F32`].
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidInput`] for unrecognized or duplicate
    /// names, a missing coordinate column, a column of the wrong type, or
    /// unequal column lengths.
    pub fn from_columns<S, I>(columns: I) -> Result<Self, GridError>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Column)>,
    {
        let mut x: Option<Vec<f64>> = None;
        let mut y: Option<Vec<f64>> = None;
        let mut z: Option<Vec<f32>> = None;
        let mut tvu: Option<Vec<f32>> = None;
        let mut thu: Option<Vec<f32>> = None;

        for (name, column) in columns {
            let name = name.as_ref();
            match (name, column) {
                ("x", Column::F64(v)) => store_once("x", &mut x, v)?,
                ("y", Column::F64(v)) => store_once("y", &mut y, v)?,
                ("z", Column::F32(v)) => store_once("z", &mut z, v)?,
                ("tvu", Column::F32(v)) => store_once("tvu", &mut tvu, v)?,
                ("thu", Column::F32(v)) => store_once("thu", &mut thu, v)?,
                ("x" | "y", Column::F32(_)) => {
                    return Err(GridError::InvalidInput {
                        reason: format!("coordinate column '{name}' must be f64"),
                    })
                }
                ("z" | "tvu" | "thu", Column::F64(_)) => {
                    return Err(GridError::InvalidInput {
                        reason: format!("layer column '{name}' must be f32"),
                    })
                }
                _ => {
                    return Err(GridError::InvalidInput {
                        reason: format!(
                            "unrecognized column '{name}', expected one of x, y, z, tvu, thu"
                        ),
                    })
                }
            }
        }

        let (Some(x), Some(y)) = (x, y) else {
            return Err(GridError::InvalidInput {
                reason: "'x' and 'y' coordinate columns are required".into(),
            });
        };

        let mut points = PointSet::new(x, y)?;
        if let Some(z) = z {
            points = points.with_depth(z)?;
        }
        if let Some(tvu) = tvu {
            points = points.with_vertical_uncertainty(tvu)?;
        }
        if let Some(thu) = thu {
            points = points.with_horizontal_uncertainty(thu)?;
        }
        Ok(points)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the set holds no rows.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The x coordinate column.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The y coordinate column.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// The column backing a layer, if present.
    pub fn layer_column(&self, layer: Layer) -> Option<&[f32]> {
        match layer {
            Layer::Depth => self.z.as_deref(),
            Layer::VerticalUncertainty => self.tvu.as_deref(),
            Layer::HorizontalUncertainty => self.thu.as_deref(),
        }
    }

    /// The layers this point set can grid, in canonical order.
    pub fn layers(&self) -> Vec<Layer> {
        Layer::ALL
            .into_iter()
            .filter(|l| self.layer_column(*l).is_some())
            .collect()
    }

    /// Tight bounding box `(min_x, min_y, max_x, max_y)`, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let fold = |vals: &[f64]| {
            vals.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (min_x, max_x) = fold(&self.x);
        let (min_y, max_y) = fold(&self.y);
        Some((min_x, min_y, max_x, max_y))
    }

    /// Mean of the depth column, `None` when `z` is absent or empty.
    pub fn mean_depth(&self) -> Option<f64> {
        let z = self.z.as_deref()?;
        if z.is_empty() {
            return None;
        }
        Some(z.iter().map(|&v| v as f64).sum::<f64>() / z.len() as f64)
    }

    /// Row subset by index, preserving which columns are present.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn take(&self, indices: &[usize]) -> PointSet {
        let pick_f64 = |vals: &[f64]| indices.iter().map(|&i| vals[i]).collect::<Vec<_>>();
        let pick_f32 = |vals: &[f32]| indices.iter().map(|&i| vals[i]).collect::<Vec<_>>();
        PointSet {
            x: pick_f64(&self.x),
            y: pick_f64(&self.y),
            z: self.z.as_deref().map(pick_f32),
            tvu: self.tvu.as_deref().map(pick_f32),
            thu: self.thu.as_deref().map(pick_f32),
        }
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> Result<(), GridError> {
    if got != expected {
        return Err(GridError::InvalidInput {
            reason: format!("'{name}' has {got} rows but coordinates have {expected}"),
        });
    }
    Ok(())
}

fn store_once<T>(name: &str, slot: &mut Option<T>, value: T) -> Result<(), GridError> {
    if slot.is_some() {
        return Err(GridError::InvalidInput {
            reason: format!("duplicate column '{name}'"),
        });
    }
    *slot = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PointSet {
        PointSet::new(vec![0.0, 100.0, 200.0], vec![0.0, 50.0, 100.0])
            .unwrap()
            .with_depth(vec![20.0, 25.0, 30.0])
            .unwrap()
            .with_vertical_uncertainty(vec![1.0, 1.5, 2.0])
            .unwrap()
    }

    #[test]
    fn length_mismatch_is_invalid_input() {
        let err = PointSet::new(vec![0.0], vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn from_columns_requires_coordinates() {
        let err =
            PointSet::from_columns([("z", Column::F32(vec![20.0]))]).unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn from_columns_rejects_unknown_names() {
        let err = PointSet::from_columns([
            ("x", Column::F64(vec![0.0])),
            ("y", Column::F64(vec![0.0])),
            ("backscatter", Column::F32(vec![1.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn from_columns_rejects_wrong_column_type() {
        let err = PointSet::from_columns([
            ("x", Column::F32(vec![0.0])),
            ("y", Column::F64(vec![0.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidInput { .. }));
    }

    #[test]
    fn layers_reflect_present_columns() {
        let pts = sample();
        assert_eq!(pts.layers(), vec![Layer::Depth, Layer::VerticalUncertainty]);
        assert!(pts.layer_column(Layer::HorizontalUncertainty).is_none());
    }

    #[test]
    fn bounds_and_mean_depth() {
        let pts = sample();
        assert_eq!(pts.bounds(), Some((0.0, 0.0, 200.0, 100.0)));
        let mean = pts.mean_depth().unwrap();
        assert!((mean - 25.0).abs() < 1e-9);
    }

    #[test]
    fn mean_depth_none_without_z() {
        let pts = PointSet::new(vec![0.0], vec![0.0]).unwrap();
        assert_eq!(pts.mean_depth(), None);
    }

    #[test]
    fn take_preserves_columns() {
        let pts = sample().take(&[2, 0]);
        assert_eq!(pts.x(), &[200.0, 0.0]);
        assert_eq!(pts.layer_column(Layer::Depth), Some(&[30.0f32, 20.0][..]));
        assert!(pts.layer_column(Layer::HorizontalUncertainty).is_none());
    }
}
