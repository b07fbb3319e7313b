/// 2D grid of pheromone intensities, one cell per world unit.
///
/// Lookups round to the nearest cell and clamp both axes, so any coordinate
/// (including far out-of-range or non-finite ones) resolves to some edge cell.
#[derive(Clone, Debug)]
pub struct ScalarField {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl ScalarField {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "field width must be positive");
        assert!(height > 0, "field height must be positive");
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Intensity of the cell nearest to `(x, y)`.
    pub fn get(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.clamp_coords(x, y);
        self.data[cy * self.width + cx]
    }

    /// Overwrite the cell nearest to `(x, y)`.
    pub fn set(&mut self, x: f64, y: f64, value: f64) {
        let (cx, cy) = self.clamp_coords(x, y);
        self.data[cy * self.width + cx] = value;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell values, `height` rows of `width` cells.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Largest intensity in the field (0 for an all-zero field).
    pub fn peak(&self) -> f64 {
        self.data.iter().copied().fold(0.0, f64::max)
    }

    fn clamp_coords(&self, x: f64, y: f64) -> (usize, usize) {
        if !(x.is_finite() && y.is_finite()) {
            tracing::debug!(x, y, "non-finite field coordinate clamped to edge cell");
        }
        (
            Self::clamp_axis(x, self.width),
            Self::clamp_axis(y, self.height),
        )
    }

    fn clamp_axis(coord: f64, len: usize) -> usize {
        // `as` saturates infinities and maps NaN to 0.
        let cell = coord.round() as i64;
        cell.clamp(0, len as i64 - 1) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::ScalarField;
    use proptest::prelude::*;

    #[test]
    fn rounds_to_nearest_cell() {
        let mut field = ScalarField::new(10, 10);
        field.set(2.4, 3.6, 0.75);
        assert_eq!(field.get(2.0, 4.0), 0.75);
        assert_eq!(field.get(1.6, 4.4), 0.75);
        assert_eq!(field.get(3.0, 4.0), 0.0);
    }

    #[test]
    fn out_of_range_coordinates_clamp_to_edges() {
        let mut field = ScalarField::new(10, 5);
        field.set(9.0, 4.0, 2.0);
        assert_eq!(field.get(1e9, 1e9), 2.0);
        assert_eq!(field.get(f64::INFINITY, 100.0), 2.0);

        field.set(-50.0, -50.0, 1.5);
        assert_eq!(field.get(0.0, 0.0), 1.5);
        assert_eq!(field.get(f64::NEG_INFINITY, -3.0), 1.5);
    }

    #[test]
    fn non_finite_coordinates_do_not_panic() {
        let mut field = ScalarField::new(4, 4);
        field.set(f64::NAN, f64::NAN, 0.5);
        assert_eq!(field.get(0.0, 0.0), 0.5);
        assert_eq!(field.get(f64::NAN, 0.0), 0.5);
    }

    #[test]
    fn peak_reports_maximum() {
        let mut field = ScalarField::new(3, 3);
        field.set(1.0, 1.0, 0.9);
        field.set(2.0, 2.0, 0.4);
        assert_eq!(field.peak(), 0.9);
    }

    proptest! {
        #[test]
        fn proptest_set_then_get_same_cell(
            x in 0.0f64..63.0,
            y in 0.0f64..31.0,
            value in -10.0f64..10.0,
        ) {
            let mut field = ScalarField::new(64, 32);
            field.set(x, y, value);
            prop_assert_eq!(field.get(x.round(), y.round()), value);
            prop_assert_eq!(field.get(x, y), value);
        }
    }
}
