use bevy::prelude::*;
use tracing::debug;

use crate::cape::CapeModel;
use crate::material::bind_texture;
use crate::player::PlayerModel;

/// Drop every GPU-side resource of a spawned model: the entity tree, its meshes, the
/// textures bound to its materials and the materials themselves.
///
/// Textures are only unbound here, never removed from `Assets<Image>`: they may be clones
/// of a cache entry that other models still render.
fn release(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    root: Entity,
    mesh_handles: &mut Vec<Handle<Mesh>>,
    material_handles: &[&Handle<StandardMaterial>],
) {
    if let Ok(mut entity) = commands.get_entity(root) {
        entity.despawn();
    }
    for mesh in mesh_handles.drain(..) {
        meshes.remove(&mesh);
    }
    for handle in material_handles {
        bind_texture(materials, handle, None);
        materials.remove(*handle);
    }
}

impl PlayerModel {
    /// Safe to call more than once.
    pub fn dispose(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) {
        if self.released {
            return;
        }
        // Despawning the root would cascade into attached capes.
        for cape in self.capes.drain(..) {
            if let Ok(mut entity) = commands.get_entity(cape) {
                entity.try_remove::<ChildOf>();
            }
        }
        release(
            commands,
            meshes,
            materials,
            self.root,
            &mut self.meshes,
            &[&self.materials.base, &self.materials.overlay],
        );
        self.released = true;
        debug!("disposed {} player model", self.variant);
    }
}

impl CapeModel {
    /// Safe to call more than once.
    pub fn dispose(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) {
        if self.released {
            return;
        }
        release(
            commands,
            meshes,
            materials,
            self.root,
            &mut self.meshes,
            &[&self.material],
        );
        self.released = true;
        debug!("disposed cape model");
    }
}
