/// View/projection for the orbit camera
/// Fixed eye at (3, 3, 3) looking at the nucleus, rotated by the orbit controls

use crate::controls::OrbitControls;
use glm::ext::{look_at, perspective, rotate};
use glm::{vec3, vec4, Matrix4};

const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// GL clip space has z in [-1, 1], wgpu expects [0, 1]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        vec4(1.0, 0.0, 0.0, 0.0),
        vec4(0.0, 1.0, 0.0, 0.0),
        vec4(0.0, 0.0, 0.5, 0.0),
        vec4(0.0, 0.0, 0.5, 1.0),
    )
}

pub fn view_projection(width: u32, height: u32, controls: &OrbitControls) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let projection = perspective(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR);

    let view = look_at(
        vec3(3.0, 3.0, 3.0),
        vec3(0.0, 0.0, 0.0),
        vec3(0.0, 1.0, 0.0),
    );
    let model_view = rotate(&view, controls.rotation_x.to_radians(), vec3(1.0, 0.0, 0.0));
    let model_view = rotate(&model_view, controls.rotation_y.to_radians(), vec3(0.0, 1.0, 0.0));

    opengl_to_wgpu() * projection * model_view
}

/// Column-major layout expected by a WGSL `mat4x4<f32>` uniform.
pub fn to_columns(m: &Matrix4<f32>) -> [[f32; 4]; 4] {
    [
        [m.c0.x, m.c0.y, m.c0.z, m.c0.w],
        [m.c1.x, m.c1.y, m.c1.z, m.c1.w],
        [m.c2.x, m.c2.y, m.c2.z, m.c2.w],
        [m.c3.x, m.c3.y, m.c3.z, m.c3.w],
    ]
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(width: u32, height: u32, controls: &OrbitControls) -> Self {
        CameraUniform {
            view_proj: to_columns(&view_projection(width, height, controls)),
        }
    }
}
