use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustshade::bench::{BrdfShader, EdgeFunctionRasterizer, FrameBuffer};
use rustshade::mesh::VertexOut;
use rustshade::prelude::*;

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn fragment_vertex(z: f32, w: f32, uv: Vec2) -> VertexOut {
    VertexOut {
        position: Vec4::new(0.0, 0.0, z, w),
        uv,
        normal: Vec3::new(0.0, 0.0, -1.0),
        tangent: Vec3::UNIT_X,
        view_direction: Vec3::UNIT_Z,
        ..Default::default()
    }
}

fn small_triangle() -> [Vec2; 3] {
    [
        Vec2::new(110.0, 100.0),
        Vec2::new(120.0, 120.0),
        Vec2::new(100.0, 120.0),
    ]
}

fn medium_triangle() -> [Vec2; 3] {
    [
        Vec2::new(200.0, 100.0),
        Vec2::new(300.0, 300.0),
        Vec2::new(100.0, 300.0),
    ]
}

fn large_triangle() -> [Vec2; 3] {
    [
        Vec2::new(400.0, 50.0),
        Vec2::new(750.0, 550.0),
        Vec2::new(50.0, 550.0),
    ]
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    let rasterizer = EdgeFunctionRasterizer::new();
    let material = Material::default();
    let lighting = SceneLighting::default();
    let shader = BrdfShader::new(&material, &lighting, ShadingMode::Combined, true);

    let v0 = fragment_vertex(0.5, 2.0, Vec2::new(0.5, 0.0));
    let v1 = fragment_vertex(0.6, 3.0, Vec2::new(1.0, 1.0));
    let v2 = fragment_vertex(0.7, 4.0, Vec2::new(0.0, 1.0));

    for (name, points) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        group.bench_with_input(BenchmarkId::new("brdf", name), &points, |b, points| {
            let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT, PixelFormat::ARGB8888);
            b.iter(|| {
                fb.clear_depth();
                rasterizer.rasterize_with_shader(
                    [&v0, &v1, &v2],
                    black_box(*points),
                    &mut fb,
                    &shader,
                );
            });
        });
    }

    group.finish();
}

/// A `cells x cells` grid in the XY plane at z = 0, as a triangle list.
fn grid_mesh(cells: u32, size: f32) -> Mesh {
    let step = size / cells as f32;
    let half = size / 2.0;
    let mut vertices = Vec::new();
    for row in 0..=cells {
        for col in 0..=cells {
            vertices.push(Vertex {
                position: Vec3::new(col as f32 * step - half, row as f32 * step - half, 0.0),
                uv: Vec2::new(col as f32 / cells as f32, 1.0 - row as f32 / cells as f32),
                normal: Vec3::new(0.0, 0.0, -1.0),
                tangent: Vec3::UNIT_X,
                ..Default::default()
            });
        }
    }

    let stride = cells + 1;
    let mut indices = Vec::new();
    for row in 0..cells {
        for col in 0..cells {
            let i = row * stride + col;
            indices.extend_from_slice(&[i, i + stride, i + 1]);
            indices.extend_from_slice(&[i + 1, i + stride, i + stride + 1]);
        }
    }

    Mesh::new(vertices, indices, PrimitiveTopology::TriangleList)
}

fn benchmark_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_frame");

    let mut mode = ShadingMode::ObservedArea;
    for _ in 0..4 {
        group.bench_function(BenchmarkId::new("grid_32x32", mode), |b| {
            let camera = Camera::new(
                45.0,
                Vec3::new(0.0, 0.0, -12.0),
                BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32,
            );
            let mut engine =
                Engine::new(BUFFER_WIDTH, BUFFER_HEIGHT, PixelFormat::ARGB8888, camera);
            engine.add_mesh(grid_mesh(32, 8.0));
            engine.settings_mut().shading_mode = mode;
            engine.settings_mut().is_rotating = false;

            b.iter(|| {
                engine.render();
                black_box(engine.frame_buffer());
            });
        });
        mode = mode.next();
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_full_frame);
criterion_main!(benches);
