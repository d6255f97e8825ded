//! Full-screen quad used by passes that sample a buffer and emit a
//! full-screen result.
//!
//! The quad is a 2×2 plane centered on the origin, seen through an
//! orthographic camera spanning exactly `[-1, 1]` on both axes, so it covers
//! the whole destination. It is never frustum culled. The material is left
//! unassigned; the pass that owns the quad picks and owns it.

use glam::Mat4;

use crate::renderer::{ClearColor, RenderDestination, Renderer};

/// One quad vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate, origin at the top-left texel.
    pub uv: [f32; 2],
}

/// Orthographic camera with a fixed projection volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthographicCamera {
    /// Left plane.
    pub left: f32,
    /// Right plane.
    pub right: f32,
    /// Top plane.
    pub top: f32,
    /// Bottom plane.
    pub bottom: f32,
    /// Near plane.
    pub near: f32,
    /// Far plane.
    pub far: f32,
}

impl OrthographicCamera {
    /// The camera spanning the normalized device volume:
    /// left -1, right 1, top 1, bottom -1, near 0, far 1.
    #[must_use]
    pub const fn full_screen() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 0.0,
            far: 1.0,
        }
    }

    /// Right-handed projection matrix with a `[0, 1]` depth range.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// A 2×2 plane mesh with culling disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadMesh {
    vertices: [QuadVertex; 4],
    indices: [u16; 6],
    frustum_culled: bool,
}

impl Default for QuadMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadMesh {
    /// Plane side length.
    pub const SIZE: f32 = 2.0;

    /// Build the plane. Triangles wind counter-clockwise when viewed down
    /// the -Z axis.
    #[must_use]
    pub fn new() -> Self {
        let h = Self::SIZE / 2.0;
        Self {
            vertices: [
                QuadVertex { position: [-h, h, 0.0], uv: [0.0, 0.0] },
                QuadVertex { position: [h, h, 0.0], uv: [1.0, 0.0] },
                QuadVertex { position: [-h, -h, 0.0], uv: [0.0, 1.0] },
                QuadVertex { position: [h, -h, 0.0], uv: [1.0, 1.0] },
            ],
            indices: [0, 2, 1, 2, 3, 1],
            frustum_culled: false,
        }
    }

    /// The four corner vertices.
    #[must_use]
    pub const fn vertices(&self) -> &[QuadVertex; 4] {
        &self.vertices
    }

    /// Triangle-list indices into [`QuadMesh::vertices`].
    #[must_use]
    pub const fn indices(&self) -> &[u16; 6] {
        &self.indices
    }

    /// Always `false`: the quad covers the screen by construction.
    #[must_use]
    pub const fn frustum_culled(&self) -> bool {
        self.frustum_culled
    }
}

/// Private scene holding the single quad.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuadScene {
    quad: QuadMesh,
}

impl QuadScene {
    /// The objects in the scene; always exactly one quad.
    #[must_use]
    pub fn objects(&self) -> &[QuadMesh] {
        std::slice::from_ref(&self.quad)
    }
}

/// Camera, one-quad scene and an optional material.
#[derive(Debug, Clone)]
pub struct QuadRenderable<M> {
    camera: OrthographicCamera,
    scene: QuadScene,
    material: Option<M>,
}

impl<M> Default for QuadRenderable<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> QuadRenderable<M> {
    /// Build the camera and quad scene with no material.
    #[must_use]
    pub fn new() -> Self {
        Self {
            camera: OrthographicCamera::full_screen(),
            scene: QuadScene::default(),
            material: None,
        }
    }

    /// The fixed orthographic camera.
    #[must_use]
    pub const fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    /// The private quad scene.
    #[must_use]
    pub const fn scene(&self) -> &QuadScene {
        &self.scene
    }

    /// The quad mesh.
    #[must_use]
    pub const fn mesh(&self) -> &QuadMesh {
        &self.scene.quad
    }

    /// The assigned material, if any.
    #[must_use]
    pub const fn material(&self) -> Option<&M> {
        self.material.as_ref()
    }

    /// Assign the material, returning the previous one so the owner can
    /// release it.
    pub fn set_material(&mut self, material: M) -> Option<M> {
        self.material.replace(material)
    }

    /// Remove the material for disposal.
    pub fn take_material(&mut self) -> Option<M> {
        self.material.take()
    }

    /// Draw the quad sampling `input` into `destination`.
    ///
    /// Without a material nothing is drawn: the error is logged, and debug
    /// builds assert.
    pub fn draw<R>(
        &self,
        renderer: &mut R,
        input: &R::Target,
        destination: RenderDestination<'_, R::Target>,
        clear: Option<ClearColor>,
    ) where
        R: Renderer<Material = M> + ?Sized,
    {
        debug_assert!(
            self.material.is_some(),
            "full-screen quad drawn before a material was assigned"
        );
        let Some(material) = self.material.as_ref() else {
            log::error!(
                "full-screen quad has no material; skipping its draw"
            );
            return;
        };
        renderer.render_quad(self, material, input, destination, clear);
    }
}

/// Lazily created full-screen quad slot owned by a pass.
#[derive(Debug, Clone)]
pub struct FullScreenQuad<M> {
    quad: Option<QuadRenderable<M>>,
}

impl<M> Default for FullScreenQuad<M> {
    fn default() -> Self {
        Self { quad: None }
    }
}

impl<M> FullScreenQuad<M> {
    /// Build the quad on first call; later calls return the existing one
    /// untouched.
    pub fn ensure(&mut self) -> &mut QuadRenderable<M> {
        self.quad.get_or_insert_with(|| {
            log::debug!("creating full-screen quad");
            QuadRenderable::new()
        })
    }

    /// The quad, if it has been created.
    #[must_use]
    pub const fn get(&self) -> Option<&QuadRenderable<M>> {
        self.quad.as_ref()
    }

    /// Whether the quad has been created.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        self.quad.is_some()
    }

    /// Drop the quad, handing back its material for release.
    pub fn take_material(&mut self) -> Option<M> {
        self.quad.take().and_then(|mut quad| quad.take_material())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;
    use crate::renderer::recording::{Draw, RecordingRenderer};

    #[test]
    fn camera_spans_normalized_device_volume() {
        let camera = OrthographicCamera::full_screen();
        assert_eq!(
            (camera.left, camera.right, camera.top, camera.bottom),
            (-1.0, 1.0, 1.0, -1.0)
        );
        assert_eq!((camera.near, camera.far), (0.0, 1.0));

        let proj = camera.projection();
        let top_left = proj * Vec4::new(-1.0, 1.0, 0.0, 1.0);
        let bottom_right = proj * Vec4::new(1.0, -1.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6);
        assert!((top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6);
        assert!((bottom_right.y + 1.0).abs() < 1e-6);
        assert!(top_left.z.abs() < 1e-6);
    }

    #[test]
    fn quad_is_a_two_unit_unculled_plane() {
        let mesh = QuadMesh::new();
        assert!(!mesh.frustum_culled());
        let xs = mesh.vertices().map(|v| v.position[0]);
        let ys = mesh.vertices().map(|v| v.position[1]);
        let width = xs.iter().copied().fold(f32::MIN, f32::max)
            - xs.iter().copied().fold(f32::MAX, f32::min);
        let height = ys.iter().copied().fold(f32::MIN, f32::max)
            - ys.iter().copied().fold(f32::MAX, f32::min);
        assert_eq!((width, height), (2.0, 2.0));
        assert!(mesh.indices().iter().all(|&i| i < 4));
    }

    #[test]
    fn scene_contains_exactly_the_quad() {
        let quad = QuadRenderable::<u32>::new();
        assert_eq!(quad.scene().objects().len(), 1);
        assert_eq!(&quad.scene().objects()[0], quad.mesh());
        assert!(quad.material().is_none());
    }

    #[test]
    fn ensure_does_not_replace_an_existing_quad() {
        let mut slot = FullScreenQuad::<u32>::default();
        assert!(!slot.is_created());
        let _ = slot.ensure().set_material(7);
        let _ = slot.ensure();
        assert_eq!(slot.get().and_then(QuadRenderable::material), Some(&7));
        assert_eq!(slot.take_material(), Some(7));
        assert!(!slot.is_created());
    }

    #[test]
    fn draw_with_material_reaches_the_renderer() {
        let mut renderer = RecordingRenderer::default();
        let input = renderer.create_target(4, 4, Default::default());
        let mut quad = QuadRenderable::new();
        let material = renderer.copy_material();
        let _ = quad.set_material(material);

        quad.draw(&mut renderer, &input, RenderDestination::Screen, None);

        assert_eq!(
            renderer.draws(),
            &[Draw::Quad {
                input: input.id(),
                destination: None,
                cleared: false,
            }]
        );
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn draw_without_material_is_a_no_op_in_release() {
        let mut renderer = RecordingRenderer::default();
        let input = renderer.create_target(4, 4, Default::default());
        let quad = QuadRenderable::new();
        quad.draw(&mut renderer, &input, RenderDestination::Screen, None);
        assert!(renderer.draws().is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "before a material was assigned")]
    fn draw_without_material_asserts_in_debug() {
        let mut renderer = RecordingRenderer::default();
        let input = renderer.create_target(4, 4, Default::default());
        let quad = QuadRenderable::new();
        quad.draw(&mut renderer, &input, RenderDestination::Screen, None);
    }
}
