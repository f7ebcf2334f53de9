use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

// Single triangle in the XY plane, facing +Z.
pub const VERTICES: &[Vertex] = &[
    Vertex { position: [-0.5, -0.5, 0.0], normal: [0.0, 0.0, 1.0] },
    Vertex { position: [0.5, -0.5, 0.0], normal: [0.0, 0.0, 1.0] },
    Vertex { position: [0.0, 0.5, 0.0], normal: [0.0, 0.0, 1.0] },
];

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_three_vertices() {
        assert_eq!(VERTICES.len(), 3);
        assert_eq!(VERTICES[0].position, [-0.5, -0.5, 0.0]);
        assert_eq!(VERTICES[1].position, [0.5, -0.5, 0.0]);
        assert_eq!(VERTICES[2].position, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn normals_are_unit_plus_z() {
        for vertex in VERTICES {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].shader_location, 1);
    }
}
