use bevy::prelude::*;
use bevy::render::mesh::Indices;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;

use crate::atlas::{Atlas, Face, FaceRects};
use crate::material::LayerMaterials;
use crate::types::{CuboidDef, ModelDef};
use crate::uv::{Corner, pixel_to_uv};

#[derive(Debug, Clone)]
pub struct SpawnedModel {
    pub root: Entity,
    /// Bevy entities for each part, in the same order as `model.parts`.
    pub parts: Vec<Entity>,
    /// Every mesh asset created for the model.
    pub meshes: Vec<Handle<Mesh>>,
}

#[derive(Default)]
struct CuboidBuffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

/// Axis-aligned box centered on the origin with each face textured from `faces`.
///
/// Faces are written in `Face::ALL` order, four vertices each in `Corner::ALL` order.
pub fn cuboid_mesh(size: [f32; 3], faces: &FaceRects, atlas: Atlas, scale: f32) -> Mesh {
    let half = Vec3::from_array(size) * (0.5 * scale);
    let mut buffers = CuboidBuffers::default();
    for face in Face::ALL {
        add_face(&mut buffers, face, half, faces, atlas);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, buffers.positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, buffers.normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, buffers.uvs);
    mesh.insert_indices(Indices::U32(buffers.indices));
    mesh
}

/// Position of a quad corner as seen from outside the box, with the texture upright.
fn corner_position(face: Face, corner: Corner, half: Vec3) -> Vec3 {
    // Signs for (top-left, top-right, bottom-left, bottom-right).
    let signs: [[f32; 3]; 4] = match face {
        Face::Right => [
            [1.0, 1.0, 1.0],
            [1.0, 1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
        ],
        Face::Left => [
            [-1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [-1.0, -1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ],
        // Image bottom edge meets the front face.
        Face::Top => [
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
        ],
        // Image top edge meets the front face.
        Face::Bottom => [
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
        ],
        Face::Front => [
            [-1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
        ],
        Face::Back => [
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0],
        ],
    };
    let sign = match corner {
        Corner::TopLeft => signs[0],
        Corner::TopRight => signs[1],
        Corner::BottomLeft => signs[2],
        Corner::BottomRight => signs[3],
    };
    Vec3::from_array(sign) * half
}

fn add_face(buffers: &mut CuboidBuffers, face: Face, half: Vec3, faces: &FaceRects, atlas: Atlas) {
    let uv = pixel_to_uv(faces.rect(face), atlas);
    let base = buffers.positions.len() as u32;
    for corner in Corner::ALL {
        buffers
            .positions
            .push(corner_position(face, corner, half).to_array());
        buffers.normals.push(face.normal());
        buffers.uvs.push(uv.texture_corner(corner));
    }
    // Corner::ALL is (TR, TL, BR, BL); both triangles are counter-clockwise from outside.
    buffers
        .indices
        .extend_from_slice(&[base + 1, base + 3, base, base, base + 3, base + 2]);
}

pub fn part_cuboid_mesh(model: &ModelDef, cuboid: &CuboidDef) -> Mesh {
    cuboid_mesh(cuboid.size, &cuboid.faces, model.atlas, cuboid.scale)
}

pub fn spawn_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &LayerMaterials,
    model: &ModelDef,
    label: &str,
) -> SpawnedModel {
    let root = commands
        .spawn((
            Name::new(format!("{label}Root")),
            Transform::IDENTITY,
            Visibility::Visible,
        ))
        .id();

    let mut part_entities: Vec<Entity> = vec![Entity::PLACEHOLDER; model.parts.len()];
    let mut mesh_handles = Vec::new();

    // First spawn all part pivots.
    for (idx, part) in model.parts.iter().enumerate() {
        let transform = Transform::from_translation(Vec3::from_array(part.pivot))
            .with_rotation(Quat::from_rotation_x(part.tilt));
        part_entities[idx] = commands
            .spawn((
                Name::new(format!("{label}Part[{}]", part.name)),
                transform,
                Visibility::Inherited,
            ))
            .id();
    }

    // Then attach to the appropriate parent and spawn meshes.
    for (idx, part) in model.parts.iter().enumerate() {
        let part_entity = part_entities[idx];
        let parent_entity = part
            .parent
            .and_then(|p| part_entities.get(p).copied())
            .unwrap_or(root);
        commands.entity(parent_entity).add_child(part_entity);

        for cuboid in part.cuboids {
            let mesh = meshes.add(part_cuboid_mesh(model, cuboid));
            mesh_handles.push(mesh.clone());
            let mesh_entity = commands
                .spawn((
                    Name::new(format!("{label}Mesh[{}:{:?}]", part.name, cuboid.layer)),
                    Mesh3d(mesh),
                    MeshMaterial3d(materials.for_layer(cuboid.layer).clone()),
                    Transform::from_translation(Vec3::from_array(cuboid.offset)),
                    Visibility::Inherited,
                    cuboid.layer,
                ))
                .id();
            commands.entity(part_entity).add_child(mesh_entity);
        }
    }

    SpawnedModel {
        root,
        parts: part_entities,
        meshes: mesh_handles,
    }
}
