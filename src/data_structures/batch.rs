use wgpu::{Device, Queue};

use crate::data_structures::{instance::InstanceRaw, model};

/**
 * An `InstancedMesh` is one model drawn many times from a per-instance buffer.
 *
 * The buffer grows when more instances are written than it can hold and is
 * otherwise rewritten in place, so a field of balls costs one `write_buffer`
 * per frame.
 */
#[derive(Debug)]
pub struct InstancedMesh {
    pub model: model::Model,
    pub instance_buffer: wgpu::Buffer,
    amount: usize,
    capacity: usize,
    label: String,
}

fn mk_instance_buffer(device: &Device, capacity: usize, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl InstancedMesh {
    pub fn new(
        device: &Device,
        queue: &Queue,
        model: model::Model,
        instances: &[InstanceRaw],
        label: &str,
    ) -> Self {
        let label = format!("{label} Instance Buffer");
        let instance_buffer = mk_instance_buffer(device, instances.len(), &label);
        let mut mesh = Self {
            model,
            instance_buffer,
            amount: 0,
            capacity: instances.len().max(1),
            label,
        };
        mesh.update(device, queue, instances);
        mesh
    }

    /// Replaces the instance data, reallocating only when it no longer fits.
    pub fn update(&mut self, device: &Device, queue: &Queue, instances: &[InstanceRaw]) {
        if instances.len() > self.capacity {
            let capacity = instances.len().next_power_of_two();
            log::debug!("growing {} to {} instances", self.label, capacity);
            self.instance_buffer = mk_instance_buffer(device, capacity, &self.label);
            self.capacity = capacity;
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.amount = instances.len();
    }

    pub fn amount(&self) -> usize {
        self.amount
    }
}
