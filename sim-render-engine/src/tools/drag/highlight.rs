use bevy::prelude::*;

use constants::render_settings::HIGHLIGHT_EMISSIVE;

use crate::tools::drag::state::Highlighted;

/// Request to toggle highlight state on a renderable, raised by the
/// double-click path of the drag controller.
#[derive(Event)]
pub struct HighlightToggleEvent {
    pub target: Entity,
}

/// Toggle highlight state. Highlighting swaps in an emissive clone of the
/// renderable's material and remembers the original; toggling the same
/// renderable again restores the original handle and disposes the clone.
/// Only one renderable holds the highlight at a time, so any other holder is
/// restored first.
pub fn apply_highlight_toggles(
    mut events: EventReader<HighlightToggleEvent>,
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut q_materials: Query<&mut MeshMaterial3d<StandardMaterial>>,
    q_highlighted: Query<(Entity, &Highlighted)>,
) {
    for event in events.read() {
        let was_highlighted = q_highlighted.contains(event.target);

        for (entity, highlighted) in &q_highlighted {
            restore(entity, highlighted, &mut commands, &mut materials, &mut q_materials);
        }
        if was_highlighted {
            continue;
        }

        let Ok(mut material) = q_materials.get_mut(event.target) else {
            continue;
        };
        let mut clone = materials.get(&material.0).cloned().unwrap_or_default();
        clone.emissive = HIGHLIGHT_EMISSIVE;
        let original = material.0.clone();
        material.0 = materials.add(clone);
        commands.entity(event.target).insert(Highlighted { original });
    }
}

fn restore(
    entity: Entity,
    highlighted: &Highlighted,
    commands: &mut Commands,
    materials: &mut Assets<StandardMaterial>,
    q_materials: &mut Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    if let Ok(mut material) = q_materials.get_mut(entity) {
        // Dispose the clone before handing the original back.
        materials.remove(material.0.id());
        material.0 = highlighted.original.clone();
    }
    commands.entity(entity).remove::<Highlighted>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn spawn_renderable(world: &mut World) -> (Entity, Handle<StandardMaterial>) {
        let handle = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: Color::srgb(0.1, 0.6, 0.3),
                ..default()
            });
        let entity = world.spawn(MeshMaterial3d(handle.clone())).id();
        (entity, handle)
    }

    fn toggle(world: &mut World, target: Entity) {
        world.resource_mut::<Events<HighlightToggleEvent>>().clear();
        world.send_event(HighlightToggleEvent { target });
        world.run_system_once(apply_highlight_toggles).unwrap();
    }

    fn setup_world() -> World {
        let mut world = World::new();
        world.init_resource::<Assets<StandardMaterial>>();
        world.init_resource::<Events<HighlightToggleEvent>>();
        world
    }

    #[test]
    fn double_toggle_restores_the_exact_original_material() {
        let mut world = setup_world();
        let (entity, original) = spawn_renderable(&mut world);

        toggle(&mut world, entity);
        let highlighted_handle = world.entity(entity).get::<MeshMaterial3d<StandardMaterial>>().unwrap().0.clone();
        assert_ne!(highlighted_handle, original);
        assert!(world.entity(entity).get::<Highlighted>().is_some());
        {
            let materials = world.resource::<Assets<StandardMaterial>>();
            let clone = materials.get(&highlighted_handle).unwrap();
            assert_eq!(clone.emissive, HIGHLIGHT_EMISSIVE);
        }

        toggle(&mut world, entity);
        let restored = world.entity(entity).get::<MeshMaterial3d<StandardMaterial>>().unwrap().0.clone();
        assert_eq!(restored, original);
        assert!(world.entity(entity).get::<Highlighted>().is_none());
        // The emissive clone is gone from the asset store.
        let materials = world.resource::<Assets<StandardMaterial>>();
        assert_eq!(materials.iter().count(), 1);
    }

    #[test]
    fn highlighting_a_second_renderable_restores_the_first() {
        let mut world = setup_world();
        let (first, first_original) = spawn_renderable(&mut world);
        let (second, _) = spawn_renderable(&mut world);

        toggle(&mut world, first);
        toggle(&mut world, second);

        let first_material = world.entity(first).get::<MeshMaterial3d<StandardMaterial>>().unwrap();
        assert_eq!(first_material.0, first_original);
        assert!(world.entity(first).get::<Highlighted>().is_none());
        assert!(world.entity(second).get::<Highlighted>().is_some());
    }
}
