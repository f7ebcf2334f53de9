mod shadow_pass;
mod triangle;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
};
use winit::window::WindowBuilder;

use crate::shadow_pass::{ShadowBindings, ShadowPass};

pub const NUM_HAIRS: usize = 100;

const LIGHT_POS: [f32; 3] = [1.0, 1.0, 1.0];
const CAMERA_POS: [f32; 3] = [0.0, 0.0, 0.0];
const HAIR_COLOR: [f32; 3] = [0.8, 0.4, 0.1];

/// Uniform block for the shadow shader. Written once at startup; the scene is
/// static so nothing ever writes it again. The padding fields keep the layout
/// in step with WGSL uniform alignment for the vec3 members.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniformBufferInput {
    model_transform: [f32; 16],
    view_transform: [f32; 16],
    projection_transform: [f32; 16],
    light_pos: [f32; 3],
    _pad0: f32,
    camera_pos: [f32; 3],
    _pad1: f32,
    hair_color: [f32; 3],
    _pad2: f32,
    hair_positions: [[f32; 4]; NUM_HAIRS],
}

impl SceneUniformBufferInput {
    fn at_startup() -> Self {
        Self {
            model_transform: flatten_matrix_for_wgpu(Matrix4::identity()),
            view_transform: flatten_matrix_for_wgpu(Matrix4::identity()),
            projection_transform: flatten_matrix_for_wgpu(Matrix4::identity()),
            light_pos: LIGHT_POS,
            _pad0: 0.0,
            camera_pos: CAMERA_POS,
            _pad1: 0.0,
            hair_color: HAIR_COLOR,
            _pad2: 0.0,
            hair_positions: [[0.0; 4]; NUM_HAIRS],
        }
    }
}

fn flatten_matrix_for_wgpu(matrix: Matrix4<f32>) -> [f32; 16] {
    // cgmath is already column-major, matching mat4x4<f32>.
    let columns: [[f32; 4]; 4] = matrix.into();
    let mut result = [0.0; 16];
    for (i, column) in columns.iter().enumerate() {
        result[i * 4..(i + 1) * 4].copy_from_slice(column);
    }
    result
}

async fn arun() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Debug).expect("Couldn't initialize logger");
        } else {
            env_logger::init();
        }
    }

    let event_loop = EventLoop::new().unwrap();
    let window = WindowBuilder::new()
        .with_title("Hair Shadows")
        .with_inner_size(winit::dpi::LogicalSize::new(800, 600))
        .build(&event_loop)
        .unwrap();

    #[cfg(target_arch = "wasm32")]
    {
        // Winit prevents sizing with CSS, so we have to set
        // the size manually when on web.
        use winit::dpi::PhysicalSize;
        let _ = window.request_inner_size(PhysicalSize::new(800, 600));

        use winit::platform::web::WindowExtWebSys;
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let dst = doc.get_element_by_id("wasm-example")?;
                let canvas = web_sys::Element::from(window.canvas()?);
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .expect("Couldn't append canvas to document body.");
    }

    let mut size = window.inner_size();
    size.width = size.width.max(1);
    size.height = size.height.max(1);

    let instance = wgpu::Instance::default();

    let surface = instance.create_surface(&window).unwrap();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            // Request an adapter which can render to our surface
            compatible_surface: Some(&surface),
        })
        .await
        .expect("Failed to find an appropriate adapter");

    log::info!("Rendering with {}", adapter.get_info().name);

    // Create the logical device and command queue
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: wgpu::MemoryHints::MemoryUsage,
            },
            None,
        )
        .await
        .expect("Failed to create device");

    let triangle_vertex_buffer = device.create_buffer_init(
        &wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Vertex Buffer"),
            contents: bytemuck::cast_slice(triangle::VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }
    );

    // The whole scene block is uploaded here and never touched again, so the
    // buffer does not need COPY_DST.
    let scene_uniform_buffer = device.create_buffer_init(
        &wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniformBufferInput::at_startup()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

    let swapchain_capabilities = surface.get_capabilities(&adapter);
    let swapchain_format = swapchain_capabilities.formats[0];

    let shadow_pass = ShadowPass::new(&device, swapchain_format);
    let shadow_bindings = ShadowBindings::new(&device, &shadow_pass, &scene_uniform_buffer);

    let mut config = surface
        .get_default_config(&adapter, size.width, size.height)
        .unwrap();
    surface.configure(&device, &config);

    let window = &window;
    event_loop
        .run(move |event, target| {
            // Have the closure take ownership of the resources.
            // `event_loop.run` never returns, therefore we must do this to ensure
            // the resources are properly cleaned up.
            let _ = (&instance, &adapter, &shadow_pass, &shadow_bindings);

            if let Event::WindowEvent {
                window_id: _,
                event,
            } = event
            {
                match event {
                    WindowEvent::Resized(new_size) => {
                        // Reconfigure the surface with the new size
                        config.width = new_size.width.max(1);
                        config.height = new_size.height.max(1);
                        surface.configure(&device, &config);
                        // On macos the window needs to be redrawn manually after resizing
                        window.request_redraw();
                    }
                    WindowEvent::RedrawRequested => {
                        let frame = surface
                            .get_current_texture()
                            .expect("Failed to acquire next swap chain texture");
                        let view = frame
                            .texture
                            .create_view(&wgpu::TextureViewDescriptor::default());
                        let mut encoder =
                            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                                label: None,
                            });
                        {
                            let mut rpass =
                                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                                    label: None,
                                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                        view: &view,
                                        resolve_target: None,
                                        ops: wgpu::Operations {
                                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                            store: wgpu::StoreOp::Store,
                                        },
                                    })],
                                    depth_stencil_attachment: None,
                                    timestamp_writes: None,
                                    occlusion_query_set: None,
                                });
                            shadow_pass.record(&mut rpass, &shadow_bindings, &triangle_vertex_buffer);
                        }
                        queue.submit(Some(encoder.finish()));
                        frame.present();
                        // The scene is static: no redraw is requested until the
                        // windowing system asks for one.
                    }
                    WindowEvent::CloseRequested => target.exit(),
                    _ => {}
                };
            }
        })
        .unwrap();
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn run() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        pollster::block_on(arun());
    }
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(arun());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn scene_block_matches_wgsl_layout() {
        // mat4x4 ×3, three padded vec3s, then array<vec4, 100>.
        assert_eq!(offset_of!(SceneUniformBufferInput, light_pos), 192);
        assert_eq!(offset_of!(SceneUniformBufferInput, camera_pos), 208);
        assert_eq!(offset_of!(SceneUniformBufferInput, hair_color), 224);
        assert_eq!(offset_of!(SceneUniformBufferInput, hair_positions), 240);
        assert_eq!(size_of::<SceneUniformBufferInput>(), 240 + NUM_HAIRS * 16);
    }

    #[test]
    fn startup_uniforms_hold_the_fixed_scene() {
        let scene = SceneUniformBufferInput::at_startup();
        assert_eq!(scene.light_pos, [1.0, 1.0, 1.0]);
        assert_eq!(scene.camera_pos, [0.0, 0.0, 0.0]);
        assert_eq!(scene.hair_color, [0.8, 0.4, 0.1]);
        assert_eq!(scene.hair_positions, [[0.0; 4]; NUM_HAIRS]);
        assert_eq!(scene.model_transform, flatten_matrix_for_wgpu(Matrix4::identity()));
        assert_eq!(scene.view_transform, scene.model_transform);
        assert_eq!(scene.projection_transform, scene.model_transform);
    }

    #[test]
    fn flatten_is_column_major() {
        let identity = flatten_matrix_for_wgpu(Matrix4::identity());
        for i in 0..16 {
            let expected = if i % 5 == 0 { 1.0 } else { 0.0 };
            assert_eq!(identity[i], expected);
        }

        let translation = flatten_matrix_for_wgpu(
            Matrix4::from_translation(cgmath::Vector3::new(2.0, 3.0, 4.0)),
        );
        assert_eq!(&translation[12..15], &[2.0, 3.0, 4.0]);
    }
}
