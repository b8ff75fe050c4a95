use crate::geometry::DTransformation;

/// One placed part: the transformation applied to the part's canonical pose to position
/// it on a sheet. The rotation is taken about the part's reference vertex and the
/// translation is the absolute position of that vertex after placement.
#[derive(Clone, Debug)]
pub struct Placement {
    /// Id of the placed part
    pub part_id: usize,
    /// Index of the sheet the part was placed on
    pub sheet_index: usize,
    /// Index of the chosen rotation within the driver's rotation set
    pub rotation_index: usize,
    /// Rotation (about the reference vertex) and reference-vertex position
    pub d_transf: DTransformation,
}
