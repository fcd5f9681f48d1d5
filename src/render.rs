//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which is used by flows to specify
//! what should be rendered. The engine uses `Render` to sort objects into an
//! opaque and a transparent batch. Within a batch each object's material
//! selects its pipeline variant; transparent objects are drawn back to front.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)
//!

use cgmath::{InnerSpace, Point3, Vector3};

use crate::data_structures::model::{Blending, Model};

/// Data for instanced object rendering: a model, its instance buffer and the
/// world position used to order transparent draws.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub anchor: Vector3<f32>,
}

impl Instanced<'_> {
    /// Blending of the model's first material.
    pub fn blending(&self) -> Option<Blending> {
        self.model.materials.first().map(|material| material.blending)
    }

    pub fn is_transparent(&self) -> bool {
        self.blending().is_some_and(|blending| blending.transparent)
    }
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
/// - `Transparent(Instanced)` renders a single transparent instanced object
/// - `Transparents(Vec<Instanced>)` renders a batch of transparent objects
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
///
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Transparent(Instanced<'a>),
    Transparents(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    /// Splits a flat list of draws by their material blending.
    pub fn split(instanced: Vec<Instanced<'a>>) -> Self {
        let (trans, basics): (Vec<_>, Vec<_>) =
            instanced.into_iter().partition(Instanced::is_transparent);
        Render::Composed(vec![Render::Defaults(basics), Render::Transparents(trans)])
    }

    pub(crate) fn set_pipelines(
        self,
        basics: &mut Vec<Instanced<'a>>,
        trans: &mut Vec<Instanced<'a>>,
    ) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Transparent(instanced) => trans.push(instanced),
            Render::Transparents(mut vec) => trans.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, trans)),
            Render::None => (),
        }
    }
}

/// Orders transparent draws farthest first as seen from `eye`.
pub fn sort_back_to_front(trans: &mut [Instanced<'_>], eye: Point3<f32>) {
    let eye = Vector3::new(eye.x, eye.y, eye.z);
    trans.sort_by(|a, b| {
        let da = (a.anchor - eye).magnitude2();
        let db = (b.anchor - eye).magnitude2();
        db.total_cmp(&da)
    });
}
