use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

use bevy::color::Mix;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy_egui::{EguiPrimaryContextPass, egui};
use hexgrove::branch::{Branch, BranchPoint, BranchSegment, BranchTree};
use hexgrove::generator::MeshStats;
use hexgrove::hex::{self, Hex};
use hexgrove::terrain::{CellGridBuffer, CellTerrain, TerrainConfig};

use crate::ViewerState;

const PAN_SPEED: f32 = 8.0;
const ZOOM_SPEED: f32 = 12.0;
const BARK: LinearRgba = LinearRgba::rgb(0.32, 0.2, 0.1);
const LEAF: LinearRgba = LinearRgba::rgb(0.25, 0.7, 0.2);

/// Which generators the viewer spawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "native", derive(clap::ValueEnum))]
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub enum Demo {
    /// Cell terrain only.
    Terrain,
    /// Branch tree only.
    Branch,
    /// Both.
    #[default]
    All,
}

impl Demo {
    fn terrain(self) -> bool {
        matches!(self, Self::Terrain | Self::All)
    }

    fn branch(self) -> bool {
        matches!(self, Self::Branch | Self::All)
    }
}

/// Startup choices of the viewer.
#[derive(Resource, Clone, Debug, Default)]
pub struct ViewerOptions {
    /// Spawned generators.
    pub demo: Demo,
    /// Initial cells in offset coordinates. `None` paints a demo island.
    pub cells: Option<Vec<(IVec2, u8)>>,
}

/// Keyboard hex brush over the terrain grid.
#[derive(Resource, Debug, Reflect)]
pub struct Brush {
    /// Offset coordinate under the brush.
    pub cell: IVec2,
    /// Code written by Space.
    pub code: u8,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            cell: IVec2::new(4, 4),
            code: 1,
        }
    }
}

#[derive(Component)]
struct ViewerCamera;

/// Camera, light, demo entities and input handling.
pub struct ViewerPlugin(pub ViewerOptions);

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Brush>()
            .init_resource::<Brush>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, (setup_scene, spawn_terrain, spawn_branch))
            .add_systems(
                Update,
                (pan_camera, move_brush, paint_cells).run_if(in_state(ViewerState::Viewing)),
            )
            .add_systems(Update, draw_gizmos)
            .add_systems(EguiPrimaryContextPass, draw_overlay);
    }
}

fn setup_scene(mut commands: Commands, terrain: Res<TerrainConfig>) {
    let last = terrain.size.saturating_sub(1) as i32;
    let far = Hex::from_offset(last, last).to_planar(terrain.settings.radius);
    let focus = Vec3::new(far.x * 0.5, 0.0, far.y * 0.5);

    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: 0.05,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        Transform::from_translation(focus + Vec3::new(0.0, 14.0, 18.0)).looking_at(focus, Vec3::Y),
        ViewerCamera,
    ));
    commands.insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.02)));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 6_000.0,
            ..default()
        },
        Transform::from_xyz(3.0, 10.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Demo island: rings of decreasing code around the grid center.
fn demo_cells(size: usize) -> Vec<(IVec2, u8)> {
    let mid = (size / 2) as i32;
    let center = Hex::from_offset(mid, mid);
    let reach = (size as u32 / 4).max(1);
    hex::spiral(center, 0, reach)
        .map(|h| {
            let code = match h.distance_to(center) * 3 / (reach + 1) {
                0 => 3,
                1 => 2,
                _ => 1,
            };
            (h.to_offset(), code)
        })
        .collect()
}

fn spawn_terrain(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    options: Res<ViewerOptions>,
    config: Res<TerrainConfig>,
    mut brush: ResMut<Brush>,
) {
    if !options.demo.terrain() {
        return;
    }
    let mut buffer = CellGridBuffer::new(config.size);
    let cells = options.cells.clone().unwrap_or_else(|| demo_cells(config.size));
    for (offset, code) in &cells {
        buffer.set(offset.x, offset.y, *code);
    }
    info!(
        "terrain: {}x{} grid, {} occupied cells",
        config.size,
        config.size,
        buffer.occupied_count()
    );
    let mid = (config.size / 2) as i32;
    brush.cell = IVec2::splat(mid);

    commands.spawn((
        Name::new("Terrain"),
        CellTerrain::new(buffer, config.settings.clone()),
        MeshMaterial3d(materials.add(StandardMaterial {
            perceptual_roughness: 0.8,
            ..default()
        })),
        // Caps face -Z in terrain space.
        Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
    ));
}

/// Trunk with two limbs and a twig on the second limb.
fn demo_tree() -> BranchTree {
    let mut tree = BranchTree::new();
    let trunk = tree.add_root(
        BranchSegment::new((0..5).map(|i| BranchPoint::new(Vec3::Y * i as f32 * 1.2, BARK)))
            .with_radius_range(Vec2::new(0.45, 0.12)),
    );
    let limb = |dir: Vec3| {
        BranchSegment::new((0..4).map(|i| {
            let p = dir * i as f32 + Vec3::Y * (i * i) as f32 * 0.15;
            BranchPoint::new(p, BARK.mix(&LEAF, i as f32 / 3.0))
        }))
        .with_radius_range(Vec2::new(0.18, 0.05))
    };
    tree.add_child(trunk, 2, limb(Vec3::new(0.9, 0.5, 0.2)));
    if let Some(second) = tree.add_child(trunk, 3, limb(Vec3::new(-0.7, 0.6, -0.4))) {
        tree.add_child(second, 2, limb(Vec3::new(-0.2, 0.5, 0.6) * 0.6));
    }
    tree
}

fn spawn_branch(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    options: Res<ViewerOptions>,
) {
    if !options.demo.branch() {
        return;
    }
    let tree = demo_tree();
    info!("branch: {} segments", tree.len());
    commands.spawn((
        Name::new("Branch"),
        Branch::new(tree),
        MeshMaterial3d(materials.add(StandardMaterial {
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::from_xyz(-3.0, 0.0, 2.0),
    ));
}

fn pan_camera(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut camera_q: Query<&mut Transform, With<ViewerCamera>>,
) {
    let Ok(mut transform) = camera_q.single_mut() else {
        return;
    };
    let forward = transform.forward();
    let forward_xz = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = transform.right();
    let right_xz = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let mut pan = Vec3::ZERO;
    for (key, dir) in [
        (KeyCode::KeyW, forward_xz),
        (KeyCode::KeyS, -forward_xz),
        (KeyCode::KeyD, right_xz),
        (KeyCode::KeyA, -right_xz),
    ] {
        if keys.pressed(key) {
            pan += dir;
        }
    }
    let mut zoom = 0.0;
    if keys.pressed(KeyCode::KeyE) {
        zoom += 1.0;
    }
    if keys.pressed(KeyCode::KeyQ) {
        zoom -= 1.0;
    }

    let dt = time.delta_secs();
    transform.translation += pan.normalize_or_zero() * PAN_SPEED * dt;
    transform.translation += *forward * zoom * ZOOM_SPEED * dt;
}

fn move_brush(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<TerrainConfig>,
    mut brush: ResMut<Brush>,
) {
    let mut step = IVec2::ZERO;
    for (key, dir) in [
        (KeyCode::ArrowRight, IVec2::X),
        (KeyCode::ArrowLeft, IVec2::NEG_X),
        (KeyCode::ArrowUp, IVec2::Y),
        (KeyCode::ArrowDown, IVec2::NEG_Y),
    ] {
        if keys.just_pressed(key) {
            step += dir;
        }
    }
    if step != IVec2::ZERO {
        let max = IVec2::splat(config.size.saturating_sub(1) as i32);
        brush.cell = (brush.cell + step).clamp(IVec2::ZERO, max);
    }
    for (key, code) in [
        (KeyCode::Digit1, 1),
        (KeyCode::Digit2, 2),
        (KeyCode::Digit3, 3),
    ] {
        if keys.just_pressed(key) {
            brush.code = code;
        }
    }
}

fn paint_cells(
    keys: Res<ButtonInput<KeyCode>>,
    brush: Res<Brush>,
    mut terrain_q: Query<&mut CellTerrain>,
) {
    let Ok(mut terrain) = terrain_q.single_mut() else {
        return;
    };
    let hex = Hex::from_offset(brush.cell.x, brush.cell.y);
    if keys.just_pressed(KeyCode::Space) {
        terrain.add_cell(hex, brush.code);
    } else if keys.just_pressed(KeyCode::Backspace) {
        terrain.remove_cell(hex);
    } else if keys.just_pressed(KeyCode::KeyC) {
        terrain.clear();
        info!("terrain: cleared");
    }
}

/// Corners of the hexagon around `hex`, closed.
fn hex_outline(hex: Hex, radius: f32) -> impl Iterator<Item = Vec2> {
    let center = hex.to_planar(radius);
    let circumradius = radius * 2.0 / hex::SQRT_3;
    (0..=6).map(move |i| center + Vec2::from_angle(FRAC_PI_6 + TAU * i as f32 / 6.0) * circumradius)
}

fn draw_gizmos(
    mut gizmos: Gizmos,
    brush: Res<Brush>,
    terrain_q: Query<(&CellTerrain, &GlobalTransform)>,
) {
    let Ok((terrain, gt)) = terrain_q.single() else {
        return;
    };
    let bounds = terrain.bounds();
    let rect = |z: f32| {
        [
            Vec3::new(bounds.min.x, bounds.min.y, z),
            Vec3::new(bounds.max.x, bounds.min.y, z),
            Vec3::new(bounds.max.x, bounds.max.y, z),
            Vec3::new(bounds.min.x, bounds.max.y, z),
            Vec3::new(bounds.min.x, bounds.min.y, z),
        ]
        .map(|p| gt.transform_point(p))
    };
    let (top, bottom) = (rect(bounds.min.z), rect(bounds.max.z));
    let frame = Color::srgb(0.2, 0.3, 0.6);
    gizmos.linestrip(top, frame);
    gizmos.linestrip(bottom, frame);
    for (a, b) in top.iter().zip(&bottom).take(4) {
        gizmos.line(*a, *b, frame);
    }

    let hex = Hex::from_offset(brush.cell.x, brush.cell.y);
    let radius = terrain.settings().radius;
    // Slightly above the caps.
    let outline = hex_outline(hex, radius).map(|p| gt.transform_point(p.extend(-0.02)));
    gizmos.linestrip(outline, Color::srgb(1.0, 0.8, 0.1));
}

fn draw_overlay(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<ViewerCamera>>,
    brush: Res<Brush>,
    terrain_q: Query<(&CellTerrain, &GlobalTransform, Option<&MeshStats>)>,
    branch_q: Query<&MeshStats, With<Branch>>,
) {
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    let mut lines = Vec::new();
    if let Ok((terrain, _, stats)) = terrain_q.single() {
        let stats = stats.copied().unwrap_or_default();
        lines.push(format!(
            "terrain  {} cells  {} verts  {} tris",
            terrain.buffer().occupied_count(),
            stats.vertices,
            stats.triangles
        ));
    }
    for stats in &branch_q {
        lines.push(format!(
            "branch   {} verts  {} tris",
            stats.vertices, stats.triangles
        ));
    }
    lines.push(format!(
        "brush    ({}, {})  code {}",
        brush.cell.x, brush.cell.y, brush.code
    ));
    painter.text(
        egui::pos2(12.0, 12.0),
        egui::Align2::LEFT_TOP,
        lines.join("\n"),
        egui::FontId::monospace(13.0),
        egui::Color32::WHITE,
    );

    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok((terrain, gt, _)) = terrain_q.single() else {
        return;
    };
    let hex = Hex::from_offset(brush.cell.x, brush.cell.y);
    let world = gt.transform_point(hex.to_planar(terrain.settings().radius).extend(-0.05));
    if let Ok(viewport) = camera.world_to_viewport(cam_gt, world) {
        painter.text(
            egui::pos2(viewport.x, viewport.y),
            egui::Align2::CENTER_CENTER,
            format!("{hex} = {}", terrain.cell(hex)),
            egui::FontId::proportional(11.0),
            egui::Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_island_fits_grid() {
        let cells = demo_cells(32);
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|(c, _)| c.cmpge(IVec2::ZERO).all() && c.cmplt(IVec2::splat(32)).all()));
        assert!(cells.iter().any(|&(_, code)| code == 3));
    }

    #[test]
    fn outline_corners_sit_on_circumradius() {
        let radius = 0.5;
        let center = Hex::from_offset(3, 2).to_planar(radius);
        let corners: Vec<_> = hex_outline(Hex::from_offset(3, 2), radius).collect();
        assert_eq!(corners.len(), 7);
        assert!(corners[0].distance(corners[6]) < 1e-5, "outline is closed");
        for c in &corners {
            assert!((c.distance(center) - radius * 2.0 / hex::SQRT_3).abs() < 1e-5);
        }
    }

    #[test]
    fn demo_tree_has_limbs() {
        let tree = demo_tree();
        assert_eq!(tree.len(), 4);
    }
}
