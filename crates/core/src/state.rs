use bevy::prelude::States;

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppState {
    /// No level is loaded, the tile manager holds no level layer.
    #[default]
    Loading,
    /// A level is loaded and simulated.
    InLevel,
}
