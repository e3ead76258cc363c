//! Flat GPU-ready buffers for the page's renderer
//!
//! Everything is handed over as `f32` arrays; the layouts match the
//! instance attributes the page binds.

use bytemuck::{Pod, Zeroable};
use hoop_core::physics::{PhysicsWorld, Shape};
use hoop_core::systems::{AimPreview, CameraDirector};
use hoop_core::{BallSnapshot, HoopAssembly};

/// Camera uniform data
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4], // xyz + padding
}

impl CameraUniform {
    pub fn from_director(camera: &CameraDirector) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.position().extend(1.0).to_array(),
        }
    }
}

/// One ball: position, radius, rotation quaternion
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BallInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub rotation: [f32; 4],
}

/// One oriented box (rim segment or backboard)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BoxInstance {
    pub position: [f32; 4],
    pub rotation: [f32; 4],
    pub half_extents: [f32; 4],
}

pub fn ball_instances(balls: &[BallSnapshot], radius: f32) -> Vec<BallInstance> {
    balls
        .iter()
        .map(|b| BallInstance {
            position: b.position.to_array(),
            radius,
            rotation: b.rotation.to_array(),
        })
        .collect()
}

/// Rim segments followed by the backboard
pub fn hoop_instances(physics: &PhysicsWorld, hoop: &HoopAssembly) -> Vec<BoxInstance> {
    hoop.rim_segments()
        .iter()
        .chain(std::iter::once(&hoop.backboard()))
        .filter_map(|handle| physics.body(*handle))
        .filter_map(|body| match body.shape {
            Shape::Cuboid { half_extents } => Some(BoxInstance {
                position: body.position.extend(1.0).to_array(),
                rotation: body.rotation.to_array(),
                half_extents: half_extents.extend(0.0).to_array(),
            }),
            Shape::Sphere { .. } => None,
        })
        .collect()
}

pub fn as_floats<T: Pod>(items: &[T]) -> Vec<f32> {
    bytemuck::cast_slice::<T, f32>(items).to_vec()
}

/// Aim overlay split into the arrays the page uploads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewBuffers {
    pub aim_line: Vec<f32>,
    pub points: Vec<f32>,
    pub colors: Vec<f32>,
    pub indicator: Option<u32>,
}

impl PreviewBuffers {
    pub fn from_preview(preview: Option<&AimPreview>) -> Self {
        let Some(preview) = preview else {
            return Self::default();
        };
        let aim_line = preview.aim_line.iter().flat_map(|p| p.to_array()).collect();
        match &preview.trajectory {
            Some(arc) => Self {
                aim_line,
                points: arc.points.iter().flat_map(|p| p.to_array()).collect(),
                colors: as_floats(&arc.colors),
                indicator: Some(arc.hoop_indicator()),
            },
            None => Self {
                aim_line,
                ..Self::default()
            },
        }
    }
}
