use cgmath::{Matrix4, Point2, Point3, SquareMatrix, Vector3, Vector4};

use crate::viewport::Viewport;

pub trait Camera {
    fn get_view(&self) -> &Matrix4<f32>;
    fn get_projection(&self) -> &Matrix4<f32>;
    fn update_matrices(&mut self);

    fn get_position(&self) -> Point3<f32>;
    fn set_position(&mut self, new: Point3<f32>);

    fn combined(&self) -> Matrix4<f32> {
        self.get_projection() * self.get_view()
    }

    /// Maps a window-space point (origin top-left, y down) to world space.
    fn unproject(&self, screen_x: f32, screen_y: f32, viewport: &Viewport) -> Option<Point2<f32>> {
        if viewport.width <= 0 || viewport.height <= 0 {
            return None;
        }

        let ndc_x = 2.0 * (screen_x - viewport.x as f32) / viewport.width as f32 - 1.0;
        let ndc_y = 1.0 - 2.0 * (screen_y - viewport.y as f32) / viewport.height as f32;

        let inverse = self.combined().invert()?;
        let world = inverse * Vector4::new(ndc_x, ndc_y, 0.0, 1.0);
        if world.w == 0.0 {
            return None;
        }

        Some(Point2::new(world.x / world.w, world.y / world.w))
    }
}

/// Orthographic camera whose world units are framebuffer pixels, centred on
/// the origin.
#[derive(Debug)]
pub struct OrthographicCamera {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub position: Point3<f32>,
    pub orientation: Vector3<f32>,
    pub up: Vector3<f32>,

    pub width: f32,
    pub height: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl OrthographicCamera {
    pub fn pixel_perfect(width: u32, height: u32) -> Self {
        let mut camera = Self {
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            position: Point3::new(0.0, 0.0, 1.0),
            orientation: cgmath::vec3(0.0, 0.0, -1.0),
            up: cgmath::vec3(0.0, 1.0, 0.0),
            width: width as f32,
            height: height as f32,
            near_plane: 0.1,
            far_plane: 100.0,
        };
        camera.update_matrices();
        camera
    }
}

impl Camera for OrthographicCamera {
    fn get_view(&self) -> &Matrix4<f32> {
        &self.view
    }

    fn get_projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    fn update_matrices(&mut self) {
        self.view = Matrix4::look_at_rh(self.position, self.position + self.orientation, self.up);

        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        self.projection = cgmath::ortho(
            -half_w,
            half_w,
            -half_h,
            half_h,
            self.near_plane,
            self.far_plane,
        );
    }

    fn get_position(&self) -> Point3<f32> {
        self.position
    }

    fn set_position(&mut self, new: Point3<f32>) {
        self.position = new;
        self.update_matrices();
    }
}
