#![warn(missing_docs)]
//! Interactive viewer for the hexgrove mesh builders.
//!
//! Spawns a cell terrain with a keyboard brush and a small branch tree, both
//! regenerated live while their configs are edited in the world inspector.

#[cfg(feature = "native")]
mod cli;
mod viewer;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use hexgrove::branch::{BranchConfig, BranchPlugin};
use hexgrove::terrain::TerrainPlugin;

/// Viewer state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum ViewerState {
    /// Camera and brush take keyboard input.
    #[default]
    Viewing,
    /// World inspector open (Tab to toggle).
    Inspecting,
}

fn main() {
    #[cfg(feature = "native")]
    let (terrain, options) = <cli::Args as clap::Parser>::parse().into_configs();
    #[cfg(not(feature = "native"))]
    let (terrain, options) = (
        hexgrove::terrain::TerrainConfig::default(),
        viewer::ViewerOptions::default(),
    );

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hexgrove".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<ViewerState>()
    .init_state::<ViewerState>()
    .add_plugins(RemotePlugin::default())
    .add_plugins(RemoteHttpPlugin::default())
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(TerrainPlugin(terrain))
    .add_plugins(BranchPlugin(BranchConfig::default()))
    .add_plugins(viewer::ViewerPlugin(options))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(ViewerState::Inspecting)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<ViewerState>>,
    mut next: ResMut<NextState<ViewerState>>,
) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }
    next.set(match state.get() {
        ViewerState::Viewing => ViewerState::Inspecting,
        ViewerState::Inspecting => ViewerState::Viewing,
    });
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
