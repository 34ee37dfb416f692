//! Orbit camera, projection and the uniform the shaders read.
//!
//! The camera orbits a target point: dragging with the left mouse button turns
//! it around the target, the wheel moves it closer or further away. Keyboard
//! input is ignored.

use cgmath::{InnerSpace, Point3, Rad, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.001;

/// Field of view (degrees) that makes `height` world units fill the viewport
/// when seen from `perspective` units away: `2 * atan(height / perspective)`.
pub fn fov_for_viewport(height: f32, perspective: f32) -> f32 {
    (2.0 * (height / perspective).atan()).to_degrees()
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitCamera {
    pub fn looking_at(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        Self {
            target,
            distance,
            yaw: Rad(offset.x.atan2(offset.z)),
            pitch: Rad((offset.y / distance).clamp(-1.0, 1.0).asin()),
            min_distance: 1.0,
            max_distance: f32::MAX,
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        self.target
            + Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }

    pub fn rotate(&mut self, yaw: Rad<f32>, pitch: Rad<f32>) {
        self.yaw += yaw;
        self.pitch = Rad((self.pitch.0 + pitch.0).clamp(-SAFE_PITCH, SAFE_PITCH));
    }

    /// Multiplies the distance to the target, clamped to the configured range.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn set_fovy<F: Into<Rad<f32>>>(&mut self, fovy: F) {
        self.fovy = fovy.into();
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Linear distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub colour: [f32; 3],
    pub near: f32,
    pub far: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    fog_colour: [f32; 4],
    fog_range: [f32; 4],
}

impl CameraUniform {
    pub fn new(fog: Fog) -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
            fog_colour: [fog.colour[0], fog.colour[1], fog.colour[2], 1.0],
            fog_range: [fog.near, fog.far.max(fog.near + f32::EPSILON), 0.0, 0.0],
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.eye().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }

    pub fn view_proj(&self) -> cgmath::Matrix4<f32> {
        self.view_proj.into()
    }
}

/// Turns pointer drags and wheel input into orbit rotation and zoom.
#[derive(Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    zoom_speed: f32,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
    pending_rotation: (f32, f32),
    pending_scroll: f32,
}

impl OrbitController {
    /// `rotate_speed` is radians per pixel dragged, `zoom_speed` the relative
    /// distance change per wheel line.
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            dragging: false,
            last_cursor: None,
            pending_rotation: (0.0, 0.0),
            pending_scroll: 0.0,
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.last_cursor) {
                    self.handle_mouse(position.x - last.x, position.y - last.y);
                }
                self.last_cursor = Some(*position);
                self.dragging
            }
            WindowEvent::CursorLeft { .. } => {
                self.dragging = false;
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.pending_scroll += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                true
            }
            _ => false,
        }
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.pending_rotation.0 += dx as f32;
        self.pending_rotation.1 += dy as f32;
    }

    /// Applies and clears the input gathered since the last call.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        let (dx, dy) = std::mem::take(&mut self.pending_rotation);
        camera.rotate(
            Rad(-dx * self.rotate_speed),
            Rad(dy * self.rotate_speed),
        );
        let scroll = std::mem::take(&mut self.pending_scroll);
        if scroll != 0.0 {
            camera.zoom((1.0 - self.zoom_speed).powf(scroll));
        }
    }
}
