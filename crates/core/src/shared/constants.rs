/// Landmark count of the base Face Mesh topology (478 with iris refinement).
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Left eye contour for EAR: [outer corner, upper 1, upper 2, inner corner, lower 2, lower 1].
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye contour for EAR, same ordering as [`LEFT_EYE`].
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

pub const NOSE_TIP: usize = 1;

/// Face outline points at cheek height on the image-left and image-right side.
pub const LEFT_FACE_EDGE: usize = 234;
pub const RIGHT_FACE_EDGE: usize = 454;

/// Smallest index count a landmark set must carry for every extractor to work.
pub const REQUIRED_LANDMARKS: usize = RIGHT_FACE_EDGE + 1;
