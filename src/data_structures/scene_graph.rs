//! Scene graph and hierarchical scene organization.
//!
//! Provides the [`SceneNode`] trait and the three node kinds the chamber is
//! built from: groups ([`ContainerNode`]), meshes ([`MeshNode`]) and lights
//! ([`LightNode`]). Every node owns its children, its local transform and a
//! cached world transform. GPU resources of a mesh are created on its first
//! buffer write and reused afterwards.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::Instance,
        material::MaterialParams,
        model::Model,
    },
    pipelines::light::{Light, LightSource},
    render::Instanced,
    resources::{load_model, primitives::Shape},
};

pub trait SceneNode {
    fn name(&self) -> &'static str;

    fn local(&self) -> &Instance;

    fn local_mut(&mut self) -> &mut Instance;

    fn world(&self) -> &Instance;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.get_children_mut().push(child);
    }

    /// Recomputes `world = parent * local` for this node and its subtree.
    fn update_world_transforms(&mut self, parents_world_transform: &Instance);

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Instance::default());
    }

    fn material(&self) -> Option<&MaterialParams> {
        None
    }

    fn material_mut(&mut self) -> Option<&mut MaterialParams> {
        None
    }

    fn light(&self) -> Option<&Light> {
        None
    }

    /// Lights in this subtree with their world positions.
    fn collect_lights(&self, out: &mut Vec<LightSource>) {
        if let Some(light) = self.light() {
            out.push(LightSource {
                name: self.name(),
                position: self.world().position,
                light: *light,
            });
        }
        for child in self.get_children() {
            child.collect_lights(out);
        }
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.get_children_mut()
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.get_children()
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }

    /// First node named `name` in this subtree, depth first.
    fn find(&self, name: &str) -> Option<&dyn SceneNode> {
        self.get_children().iter().find_map(|child| {
            if child.name() == name {
                Some(child.as_ref())
            } else {
                child.find(name)
            }
        })
    }

    fn count_nodes(&self) -> usize {
        1 + self
            .get_children()
            .iter()
            .map(|child| child.count_nodes())
            .sum::<usize>()
    }
}

fn propagate(
    local: &Instance,
    world: &mut Instance,
    children: &mut [Box<dyn SceneNode>],
    parent: &Instance,
) {
    *world = parent * local;
    for child in children.iter_mut() {
        child.update_world_transforms(world);
    }
}

/// A group: transforms its children and renders nothing itself.
pub struct ContainerNode {
    name: &'static str,
    pub local: Instance,
    world: Instance,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(name: &'static str, local: Instance) -> Self {
        Self {
            name,
            local,
            world: local,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl SceneNode + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn local(&self) -> &Instance {
        &self.local
    }

    fn local_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn world(&self) -> &Instance {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        propagate(
            &self.local,
            &mut self.world,
            &mut self.children,
            parents_world_transform,
        );
    }
}

struct GpuMesh {
    instance_buffer: wgpu::Buffer,
    model: Model,
}

/// A primitive solid with its material.
pub struct MeshNode {
    name: &'static str,
    pub shape: Shape,
    pub material: MaterialParams,
    pub local: Instance,
    world: Instance,
    children: Vec<Box<dyn SceneNode>>,
    gpu: Option<GpuMesh>,
}

impl MeshNode {
    pub fn new(name: &'static str, shape: Shape, material: MaterialParams, local: Instance) -> Self {
        Self {
            name,
            shape,
            material,
            local,
            world: local,
            children: Vec::new(),
            gpu: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.gpu.is_some()
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn local(&self) -> &Instance {
        &self.local
    }

    fn local_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn world(&self) -> &Instance {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        propagate(
            &self.local,
            &mut self.world,
            &mut self.children,
            parents_world_transform,
        );
    }

    fn material(&self) -> Option<&MaterialParams> {
        Some(&self.material)
    }

    fn material_mut(&mut self) -> Option<&mut MaterialParams> {
        Some(&mut self.material)
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw = [self.world.to_raw()];
        match &mut self.gpu {
            Some(gpu) => {
                queue.write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&raw));
                gpu.model
                    .materials
                    .iter_mut()
                    .for_each(|material| material.write(queue, &self.material));
            }
            None => {
                log::debug!("Mounting mesh {}", self.name);
                let instance_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytemuck::cast_slice(&raw),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                let model = load_model(self.name, &self.shape, &self.material, device, queue);
                self.gpu = Some(GpuMesh {
                    instance_buffer,
                    model,
                });
            }
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain(self.gpu.iter().map(|gpu| Instanced {
                instance: &gpu.instance_buffer,
                model: &gpu.model,
                amount: 1,
                anchor: self.world.position,
            }))
            .collect()
    }
}

/// A punctual light. Its world position is taken from the graph.
pub struct LightNode {
    name: &'static str,
    pub light: Light,
    pub local: Instance,
    world: Instance,
    children: Vec<Box<dyn SceneNode>>,
}

impl LightNode {
    pub fn new(name: &'static str, light: Light, local: Instance) -> Self {
        Self {
            name,
            light,
            local,
            world: local,
            children: Vec::new(),
        }
    }
}

impl SceneNode for LightNode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn local(&self) -> &Instance {
        &self.local
    }

    fn local_mut(&mut self) -> &mut Instance {
        &mut self.local
    }

    fn world(&self) -> &Instance {
        &self.world
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn update_world_transforms(&mut self, parents_world_transform: &Instance) {
        propagate(
            &self.local,
            &mut self.world,
            &mut self.children,
            parents_world_transform,
        );
    }

    fn light(&self) -> Option<&Light> {
        Some(&self.light)
    }
}
