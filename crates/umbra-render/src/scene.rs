//! Scene composition: the lit base scene and the ordered shadow volumes.

use glam::{Vec2, Vec3};
use umbra_config::{SceneConfig, VolumeConfig};
use umbra_mesh::{Transform, extrude_polygon, rolling_terrain, unit_cuboid};

use crate::backend::MeshUploader;

/// Backend-issued reference to uploaded geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// A mesh placed in the world with a flat RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObject {
    pub mesh: MeshHandle,
    pub transform: Transform,
    pub color: [f32; 4],
}

/// Ordinary opaque geometry, drawn once per frame before the volumes.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its index.
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Closed solid whose interior is tinted where it contains visible geometry.
///
/// The mesh must be closed and consistently wound outward; otherwise the
/// stencil counts are wrong and the tint is misplaced without any error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowVolume {
    pub mesh: MeshHandle,
    pub transform: Transform,
    /// Straight RGBA tint; alpha is the blend weight.
    pub tint: [f32; 4],
}

impl ShadowVolume {
    /// Draw item carrying the tint as its color.
    pub fn as_object(&self) -> SceneObject {
        SceneObject {
            mesh: self.mesh,
            transform: self.transform,
            color: self.tint,
        }
    }
}

/// Shadow volumes in processing order.
#[derive(Clone, Debug, Default)]
pub struct VolumeScene {
    volumes: Vec<ShadowVolume>,
}

impl VolumeScene {
    pub fn builder() -> VolumeSceneBuilder {
        VolumeSceneBuilder::default()
    }

    pub fn volumes(&self) -> &[ShadowVolume] {
        &self.volumes
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ShadowVolume> {
        self.volumes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// Collects shadow volumes; order of insertion is rendering order.
#[derive(Debug, Default)]
pub struct VolumeSceneBuilder {
    volumes: Vec<ShadowVolume>,
}

impl VolumeSceneBuilder {
    pub fn volume(mut self, mesh: MeshHandle, transform: Transform, tint: [f32; 4]) -> Self {
        self.push(mesh, transform, tint);
        self
    }

    pub fn push(&mut self, mesh: MeshHandle, transform: Transform, tint: [f32; 4]) {
        self.volumes.push(ShadowVolume {
            mesh,
            transform,
            tint,
        });
    }

    pub fn build(self) -> VolumeScene {
        VolumeScene {
            volumes: self.volumes,
        }
    }
}

/// Uploads the terrain and returns the base scene plus the terrain's index.
pub fn base_scene_from_config<U: MeshUploader + ?Sized>(
    uploader: &mut U,
    config: &SceneConfig,
) -> (Scene, usize) {
    let terrain = uploader.upload_mesh("terrain", &rolling_terrain(config.terrain_segments));
    let mut scene = Scene::new();
    let index = scene.add(SceneObject {
        mesh: terrain,
        transform: Transform::IDENTITY,
        color: config.terrain_color,
    });
    (scene, index)
}

/// Uploads every configured volume, keeping configuration order.
pub fn volume_scene_from_config<U: MeshUploader + ?Sized>(
    uploader: &mut U,
    volumes: &[VolumeConfig],
) -> VolumeScene {
    let mut builder = VolumeScene::builder();
    for (i, volume) in volumes.iter().enumerate() {
        let label = format!("volume-{i}");
        match volume {
            VolumeConfig::Cuboid {
                position,
                scale,
                tint,
            } => {
                let mesh = uploader.upload_mesh(&label, &unit_cuboid());
                let transform = Transform::from_translation(Vec3::from_array(*position))
                    .with_scale(Vec3::from_array(*scale));
                builder.push(mesh, transform, *tint);
            }
            VolumeConfig::Prism {
                path,
                low,
                high,
                position,
                tint,
            } => {
                let path: Vec<Vec2> = path.iter().map(|&p| Vec2::from_array(p)).collect();
                let solid = extrude_polygon(&path, *low, *high);
                if solid.triangle_count() == 0 {
                    log::warn!("{label}: prism path has fewer than 3 points, skipped");
                    continue;
                }
                let mesh = uploader.upload_mesh(&label, &solid);
                builder.push(mesh, Transform::from_translation(Vec3::from_array(*position)), *tint);
            }
        }
    }
    let scene = builder.build();
    log::info!("volume scene: {} volumes", scene.len());
    scene
}
