//! Render composition.
//!
//! The scene describes what to draw as a [`Render`]; the frame loop flattens
//! it into a list of [`Instanced`] draws that all share the lit instanced
//! pipeline.

use crate::data_structures::{batch::InstancedMesh, model::Model};

/// A model plus the instance buffer it is drawn with.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies what should be drawn this frame.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single instanced object
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced objects
/// - `Composed(Vec<Render>)` renders a composition of multiple renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn collect(self, draws: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => draws.push(instanced),
            Render::Defaults(mut vec) => draws.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(draws)),
            Render::None => (),
        }
    }
}

impl<'a> From<&'a InstancedMesh> for Render<'a> {
    fn from(mesh: &'a InstancedMesh) -> Self {
        Render::Default(Instanced {
            instance: &mesh.instance_buffer,
            model: &mesh.model,
            amount: mesh.amount(),
        })
    }
}

impl<'a> From<Option<&'a InstancedMesh>> for Render<'a> {
    fn from(mesh: Option<&'a InstancedMesh>) -> Self {
        mesh.map_or(Render::None, Render::from)
    }
}
