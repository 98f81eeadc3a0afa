//! Tank assembly shared by the player and enemies

use super::collision::Shape;
use super::entity::EntityCore;
use crate::assets::AssetResolver;
use crate::consts::VEHICLE_COLLIDER_SHRINK;
use crate::error::LoadError;
use crate::renderer::{Geometry, Material, RenderPart};

pub const TANK_MODEL: &str = "tank";
pub const BODY_PART: &str = "Body";
pub const TURRET_PART: &str = "Turret";

/// Texture pair for one tank paint job
#[derive(Debug, Clone, Copy)]
pub struct TankSkin {
    pub body_texture: &'static str,
    pub turret_texture: &'static str,
}

pub const PLAYER_SKIN: TankSkin = TankSkin {
    body_texture: "tank-body",
    turret_texture: "tank-turret",
};

pub const ENEMY_SKIN: TankSkin = TankSkin {
    body_texture: "tank-body-red",
    turret_texture: "tank-turret-red",
};

/// Build the tank renderable from the shared model and derive its collider.
///
/// The collider is the bounding sphere of the assembled parts, shrunk so
/// turret overhang does not block movement.
pub(crate) fn assemble_tank(
    core: &mut EntityCore,
    assets: &dyn AssetResolver,
    skin: TankSkin,
) -> Result<(), LoadError> {
    let model = assets
        .model(TANK_MODEL)
        .ok_or_else(|| LoadError::MissingModel(TANK_MODEL.to_string()))?;

    let missing_part = |part: &str| LoadError::MissingMeshPart {
        model: TANK_MODEL.to_string(),
        part: part.to_string(),
    };
    let body = model.part(BODY_PART).ok_or_else(|| missing_part(BODY_PART))?;
    let turret = model.part(TURRET_PART).ok_or_else(|| missing_part(TURRET_PART))?;

    let body_texture = assets
        .texture(skin.body_texture)
        .ok_or_else(|| LoadError::MissingTexture(skin.body_texture.to_string()))?;
    let turret_texture = assets
        .texture(skin.turret_texture)
        .ok_or_else(|| LoadError::MissingTexture(skin.turret_texture.to_string()))?;

    core.renderable.add(RenderPart::new(
        BODY_PART,
        Geometry::Mesh { bounds: body.bounds },
        Material::textured(body_texture),
    ));
    core.renderable.add(RenderPart::new(
        TURRET_PART,
        Geometry::Mesh { bounds: turret.bounds },
        Material::textured(turret_texture),
    ));

    if let Some(bounds) = core.renderable.world_bounds() {
        let mut collider = Shape::Box(bounds).into_sphere();
        collider.radius *= VEHICLE_COLLIDER_SHRINK;
        core.set_collider(Shape::Sphere(collider));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{HeadlessLoader, ModelHandle, ResourceManager, TextureHandle};
    use crate::sim::entity::{Body, Entity, EntityId};
    use crate::sim::player::PlayerTank;
    use glam::Vec3;

    fn resources_with(model: ModelHandle) -> ResourceManager {
        let mut resources = ResourceManager::default();
        resources.insert_model(TANK_MODEL, model);
        resources.insert_texture("tank-body", TextureHandle(1));
        resources.insert_texture("tank-turret", TextureHandle(2));
        resources
    }

    #[test]
    fn test_collider_is_shrunk_bounding_sphere() {
        let resources = resources_with(HeadlessLoader::tank_model());
        let mut tank = Entity::new(EntityId(1), Vec3::new(4.0, 4.0, 0.0), Body::Player(PlayerTank::new(2.0)));

        assemble_tank(tank.core_mut(), &resources, PLAYER_SKIN).unwrap();

        let bounds = tank.renderable().world_bounds().unwrap();
        let collider = tank.collider().unwrap();
        assert_eq!(collider.center, bounds.center());
        let full = bounds.half_extents().length();
        assert!((collider.radius - full * VEHICLE_COLLIDER_SHRINK).abs() < 1e-6);
        assert_eq!(tank.renderable().parts.len(), 2);
    }

    #[test]
    fn test_missing_turret_is_fatal() {
        let mut model = HeadlessLoader::tank_model();
        model.parts.retain(|p| p.name != TURRET_PART);
        let resources = resources_with(model);
        let mut tank = Entity::new(EntityId(1), Vec3::ZERO, Body::Player(PlayerTank::new(2.0)));

        let err = assemble_tank(tank.core_mut(), &resources, PLAYER_SKIN).unwrap_err();
        assert!(matches!(err, LoadError::MissingMeshPart { ref part, .. } if part == TURRET_PART));
    }

    #[test]
    fn test_missing_skin_texture_is_fatal() {
        let resources = resources_with(HeadlessLoader::tank_model());
        let mut tank = Entity::new(EntityId(1), Vec3::ZERO, Body::Player(PlayerTank::new(2.0)));

        let err = assemble_tank(tank.core_mut(), &resources, ENEMY_SKIN).unwrap_err();
        assert!(matches!(err, LoadError::MissingTexture(ref name) if name == "tank-body-red"));
    }
}
