use egui::Vec2;

/// Options for [`crate::DockManager`].
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct DockConfig {
    /// Thickness (in points) of the bar between two splitter children.
    pub splitter_bar_size: f32,

    /// Size of the placeholder a minimized panel shrinks to.
    pub minimized_slot_size: Vec2,

    /// Gap between two neighbouring minimized slots.
    pub minimized_slot_spacing: f32,

    /// Size of a freshly floated panel when no previous dialog rect is known.
    pub default_dialog_size: Vec2,

    /// Extent of a collapsed panel when it slides out of its collapser margin.
    ///
    /// Measured across the margin: the width for left/right collapsers, the height for bottom ones.
    pub collapser_panel_size: f32,

    /// If false, unpinning a docked panel into a collapser is rejected.
    pub enable_collapsers: bool,

    /// If true, run tree integrity checks after every structural change and log issues.
    pub debug_integrity: bool,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            splitter_bar_size: 5.0,
            minimized_slot_size: Vec2::new(200.0, 30.0),
            minimized_slot_spacing: 4.0,
            default_dialog_size: Vec2::new(480.0, 360.0),
            collapser_panel_size: 300.0,
            enable_collapsers: true,
            debug_integrity: cfg!(debug_assertions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: DockConfig =
            serde_json::from_str(r#"{ "splitter_bar_size": 2.0, "enable_collapsers": false }"#)
                .unwrap();
        assert_eq!(config.splitter_bar_size, 2.0);
        assert!(!config.enable_collapsers);
        assert_eq!(config.default_dialog_size, DockConfig::default().default_dialog_size);
    }
}
