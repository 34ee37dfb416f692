#![cfg(feature = "integration-tests")]

use std::{iter, time::Duration};

use ballpit::{
    StageConfig,
    camera::fov_for_viewport,
    context::mk_camera,
    data_structures::{
        batch::InstancedMesh,
        instance::Instance,
        model::DrawModel,
        texture::Texture,
    },
    pipelines::{
        basic::mk_instanced_pipeline,
        light::{LightResources, LightUniform},
    },
    resources::{shapes::uv_sphere, upload_model},
};
use cgmath::Vector3;

const SIZE: u32 = 256;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

async fn device() -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await?;
    Ok((device, queue))
}

fn pixel(data: &[u8], x: u32, y: u32) -> [u8; 4] {
    let at = ((y * SIZE + x) * 4) as usize;
    [data[at], data[at + 1], data[at + 2], data[at + 3]]
}

fn near(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
}

#[test]
fn renders_a_ball_over_the_clear_colour() {
    let _ = env_logger::builder().is_test(true).try_init();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let Ok((device, queue)) = runtime.block_on(device()) else {
        log::warn!("no adapter available, skipping");
        return;
    };

    let config = StageConfig::default();
    let camera = mk_camera(&device, &config, SIZE, SIZE, fov_for_viewport(800.0, config.camera.perspective));
    let light = &config.light;
    let light = LightResources::new(
        LightUniform::new(light.position, light.colour, light.intensity, light.ambient),
        &device,
    );
    let pipeline = mk_instanced_pipeline(
        &device,
        FORMAT,
        &camera.bind_group_layout,
        &light.bind_group_layout,
    );

    let ball = Instance {
        position: Vector3::new(0.0, 0.0, 0.0),
        scale: Vector3::new(100.0, 100.0, 100.0),
        ..Default::default()
    };
    let balls = InstancedMesh::new(
        &device,
        &queue,
        upload_model(&device, "ball", &[uv_sphere(config.field.size, 16, 16)]),
        &[ball.to_raw(config.field.colour)],
        "Balls",
    );
    assert_eq!(balls.amount(), 1);

    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Smoke Target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let depth = Texture::create_depth_texture(&device, [SIZE, SIZE], "Smoke Depth");

    let [r, g, b] = config.scene.clear_colour;
    let clear = wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    };

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Smoke Encoder"),
    });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Smoke Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&pipeline);
        render_pass.set_vertex_buffer(1, balls.instance_buffer.slice(..));
        render_pass.draw_model_instanced(
            &balls.model,
            0..balls.amount() as u32,
            &camera.bind_group,
            &light.bind_group,
        );
    }

    let u32_size = std::mem::size_of::<u32>() as u32;
    let output = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Smoke Readback"),
        size: (u32_size * SIZE * SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(u32_size * SIZE),
                rows_per_image: Some(SIZE),
            },
        },
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(iter::once(encoder.finish()));

    let slice = output.slice(..);
    let readback = async {
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .unwrap();
        rx.receive().await.unwrap().unwrap();
        slice.get_mapped_range()
    };
    let data = runtime.block_on(readback);

    let background = [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        255,
    ];
    assert!(near(pixel(&data, 0, 0), background), "corner is {:?}", pixel(&data, 0, 0));
    assert!(near(pixel(&data, SIZE - 1, SIZE - 1), background));
    let centre = pixel(&data, SIZE / 2, SIZE / 2);
    assert!(!near(centre, background), "the ball is missing, centre is {centre:?}");
}
