use crate::extraction::tags::{
    get_multi_f64_value, IMAGE_ORIENTATION_PATIENT, IMAGE_POSITION_PATIENT, PIXEL_SPACING,
    SLICE_THICKNESS, SPACING_BETWEEN_SLICES,
};
use crate::series::{cross, dot};
use dicom_object::InMemDicomObject;

const AXIAL: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

/// Spatial attributes of one slice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceGeometry {
    /// ImagePositionPatient (LPS, mm)
    pub position: [f64; 3],

    /// ImageOrientationPatient: row direction then column direction
    pub orientation: [f64; 6],

    /// PixelSpacing: spacing between rows, then between columns
    pub pixel_spacing: [f64; 2],

    /// SpacingBetweenSlices, falling back to SliceThickness
    pub slice_spacing: Option<f64>,
}

impl SliceGeometry {
    /// Reads the geometry tags, substituting identity values for absent ones
    pub fn from_dicom(dcm: &InMemDicomObject) -> Self {
        let position = get_multi_f64_value(dcm, IMAGE_POSITION_PATIENT)
            .and_then(|v| v.get(..3).map(|s| [s[0], s[1], s[2]]))
            .unwrap_or([0.0; 3]);
        let orientation = get_multi_f64_value(dcm, IMAGE_ORIENTATION_PATIENT)
            .and_then(|v| v.get(..6).map(|s| [s[0], s[1], s[2], s[3], s[4], s[5]]))
            .unwrap_or(AXIAL);
        let pixel_spacing = get_multi_f64_value(dcm, PIXEL_SPACING)
            .and_then(|v| v.get(..2).map(|s| [s[0], s[1]]))
            .filter(|s| s[0] > 0.0 && s[1] > 0.0)
            .unwrap_or([1.0, 1.0]);
        let slice_spacing = [SPACING_BETWEEN_SLICES, SLICE_THICKNESS]
            .into_iter()
            .filter_map(|tag| get_multi_f64_value(dcm, tag).and_then(|v| v.first().copied()))
            .find(|s| *s > 0.0);

        Self {
            position,
            orientation,
            pixel_spacing,
            slice_spacing,
        }
    }

    fn row_direction(&self) -> [f64; 3] {
        [self.orientation[0], self.orientation[1], self.orientation[2]]
    }

    fn column_direction(&self) -> [f64; 3] {
        [self.orientation[3], self.orientation[4], self.orientation[5]]
    }

    /// Unit normal of the slice plane
    pub fn normal(&self) -> [f64; 3] {
        cross(self.row_direction(), self.column_direction())
    }

    /// Voxel spacing and voxel-to-RAS affine rows of a stack of `slices`
    ///
    /// The slice step is taken from the first and last positions when they
    /// differ, otherwise from the slice spacing along the plane normal.
    pub fn affine(&self, last: Option<&SliceGeometry>, slices: usize) -> ([f64; 3], [[f64; 4]; 3]) {
        let [row_spacing, column_spacing] = self.pixel_spacing;

        let step = last
            .filter(|_| slices > 1)
            .map(|last| {
                let n = (slices - 1) as f64;
                [
                    (last.position[0] - self.position[0]) / n,
                    (last.position[1] - self.position[1]) / n,
                    (last.position[2] - self.position[2]) / n,
                ]
            })
            .filter(|s| dot(*s, *s) > 0.0)
            .unwrap_or_else(|| self.normal().map(|c| c * self.slice_spacing.unwrap_or(1.0)));

        let i = self.row_direction().map(|c| c * column_spacing);
        let j = self.column_direction().map(|c| c * row_spacing);

        // LPS to RAS flips the first two axes
        let mut srow = [[0.0; 4]; 3];
        for axis in 0..3 {
            let sign = if axis < 2 { -1.0 } else { 1.0 };
            srow[axis] = [
                sign * i[axis],
                sign * j[axis],
                sign * step[axis],
                sign * self.position[axis],
            ];
        }

        let spacing = [column_spacing, row_spacing, dot(step, step).sqrt()];
        (spacing, srow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axial(z: f64) -> SliceGeometry {
        SliceGeometry {
            position: [-100.0, -120.0, z],
            orientation: AXIAL,
            pixel_spacing: [0.8, 0.6],
            slice_spacing: Some(2.5),
        }
    }

    #[test]
    fn test_axial_stack_affine() {
        let first = axial(10.0);
        let last = axial(16.0);
        let (spacing, srow) = first.affine(Some(&last), 4);

        assert_eq!(spacing, [0.6, 0.8, 2.0]);
        assert_eq!(srow[0], [-0.6, 0.0, 0.0, 100.0]);
        assert_eq!(srow[1], [0.0, -0.8, 0.0, 120.0]);
        assert_eq!(srow[2], [0.0, 0.0, 2.0, 10.0]);
    }

    #[test]
    fn test_single_slice_uses_slice_spacing() {
        let (spacing, srow) = axial(0.0).affine(None, 1);
        assert_eq!(spacing[2], 2.5);
        assert_eq!(srow[2][2], 2.5);
    }

    #[test]
    fn test_coincident_positions_fall_back_to_normal() {
        let first = axial(5.0);
        let (spacing, _) = first.affine(Some(&axial(5.0)), 3);
        assert_eq!(spacing[2], 2.5);
    }

    #[test]
    fn test_missing_tags_default_to_identity() {
        let geometry = SliceGeometry::from_dicom(&InMemDicomObject::new_empty());
        assert_eq!(geometry.position, [0.0; 3]);
        assert_eq!(geometry.orientation, AXIAL);
        assert_eq!(geometry.pixel_spacing, [1.0, 1.0]);
        assert_eq!(geometry.slice_spacing, None);
        assert_eq!(geometry.normal(), [0.0, 0.0, 1.0]);
    }
}
