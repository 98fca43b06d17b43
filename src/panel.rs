//! Panels: the content-provider contract, the per-panel record kept by the manager,
//! and the panel type registry.

use egui::{Rect, Vec2};

use crate::error::{DockError, DockResult};

/// Identifies a panel for its whole lifetime, across dock/float/popup moves.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct PanelId(u64);

impl PanelId {
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Opaque handle to the surface a panel's content rendered into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Document,
    #[default]
    Panel,
}

/// Whether `create_panel` reuses a live instance of the type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Singleton,
    #[default]
    Transient,
}

/// Attributes a panel's content may change about its own presentation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PanelAttributes {
    pub title: String,
    pub icon: Option<String>,
    pub has_changes: bool,
}

/// The external collaborator supplying what a panel displays.
///
/// Only [`Self::initialize`] is required.
pub trait PanelContent {
    /// Build the content. `attributes` may be updated (title, icon) during the call.
    ///
    /// An `Err` aborts panel creation; no panel is registered.
    fn initialize(
        &mut self,
        attributes: &mut PanelAttributes,
        options: &serde_json::Value,
    ) -> Result<SurfaceHandle, Box<dyn std::error::Error>>;

    /// Veto for closing. Consulted before the panel is removed.
    fn can_close(&self) -> bool {
        true
    }

    fn on_close(&mut self) {}

    fn min_size(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn load_state(&mut self, _state: &serde_json::Value) {}

    fn save_state(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn on_action_invoked(&mut self, _action: &str) {}
}

impl std::fmt::Debug for dyn PanelContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PanelContent")
    }
}

/// Everything the manager knows about one live panel.
#[derive(Debug)]
pub struct Panel {
    pub id: PanelId,
    pub panel_type: String,
    pub view_kind: ViewKind,
    pub attributes: PanelAttributes,
    pub content: Box<dyn PanelContent>,
    pub surface: SurfaceHandle,

    /// Last rect the panel was shown at (docked or floating).
    pub frame_rect: Rect,
    pub header_visible: bool,
    pub visible: bool,
}

impl Panel {
    pub fn min_size(&self) -> Vec2 {
        self.content.min_size()
    }

    pub fn title(&self) -> &str {
        &self.attributes.title
    }
}

// ----------------------------------------------------------------------------

pub type PanelFactory = Box<dyn FnMut() -> Box<dyn PanelContent>>;

pub struct PanelTypeMetadata {
    pub name: String,
    pub view_kind: ViewKind,
    pub instance_type: InstanceType,
    pub factory: PanelFactory,
}

impl PanelTypeMetadata {
    pub fn new(
        name: impl Into<String>,
        factory: impl FnMut() -> Box<dyn PanelContent> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            view_kind: ViewKind::Panel,
            instance_type: InstanceType::Transient,
            factory: Box::new(factory),
        }
    }

    #[must_use]
    pub fn view_kind(mut self, view_kind: ViewKind) -> Self {
        self.view_kind = view_kind;
        self
    }

    #[must_use]
    pub fn instance_type(mut self, instance_type: InstanceType) -> Self {
        self.instance_type = instance_type;
        self
    }
}

impl std::fmt::Debug for PanelTypeMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelTypeMetadata")
            .field("name", &self.name)
            .field("view_kind", &self.view_kind)
            .field("instance_type", &self.instance_type)
            .finish_non_exhaustive()
    }
}

/// Panel types and their live instances. Owned by one manager, never global.
#[derive(Debug, Default)]
pub struct PanelTypeRegistry {
    types: Vec<PanelTypeMetadata>,
    instances: ahash::HashMap<String, Vec<PanelId>>,
}

impl PanelTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// [`DockError::PanelTypeAlreadyRegistered`] if the name is taken.
    pub fn register(&mut self, metadata: PanelTypeMetadata) -> DockResult<()> {
        if self.is_registered(&metadata.name) {
            return Err(DockError::PanelTypeAlreadyRegistered(metadata.name));
        }
        log::debug!("register panel type {:?}", metadata.name);
        self.instances.insert(metadata.name.clone(), Vec::new());
        self.types.push(metadata);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.metadata(name).is_some()
    }

    pub fn metadata(&self, name: &str) -> Option<&PanelTypeMetadata> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Run the factory of `name`.
    ///
    /// # Errors
    /// [`DockError::UnknownPanelType`] if `name` was never registered.
    pub fn create_content(&mut self, name: &str) -> DockResult<Box<dyn PanelContent>> {
        let metadata = self
            .types
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| DockError::UnknownPanelType(name.to_owned()))?;
        Ok((metadata.factory)())
    }

    pub fn register_instance(&mut self, name: &str, panel: PanelId) {
        let instances = self.instances.entry(name.to_owned()).or_default();
        if !instances.contains(&panel) {
            instances.push(panel);
        }
    }

    pub fn unregister_instance(&mut self, panel: PanelId) {
        for instances in self.instances.values_mut() {
            if let Some(index) = instances.iter().position(|&p| p == panel) {
                instances.remove(index);
                break;
            }
        }
    }

    pub fn instances(&self, name: &str) -> &[PanelId] {
        self.instances
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_instances(&self, name: &str) -> bool {
        !self.instances(name).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl PanelContent for Blank {
        fn initialize(
            &mut self,
            _attributes: &mut PanelAttributes,
            _options: &serde_json::Value,
        ) -> Result<SurfaceHandle, Box<dyn std::error::Error>> {
            Ok(SurfaceHandle::default())
        }
    }

    #[test]
    fn duplicate_types_are_rejected() {
        let mut registry = PanelTypeRegistry::new();
        registry
            .register(PanelTypeMetadata::new("editor", || Box::new(Blank)))
            .unwrap();
        let err = registry.register(PanelTypeMetadata::new("editor", || Box::new(Blank)));
        assert!(matches!(
            err,
            Err(DockError::PanelTypeAlreadyRegistered(name)) if name == "editor"
        ));
        assert!(matches!(
            registry.create_content("chart"),
            Err(DockError::UnknownPanelType(_))
        ));
    }

    #[test]
    fn instances_are_tracked_per_type() {
        let mut registry = PanelTypeRegistry::new();
        registry
            .register(PanelTypeMetadata::new("editor", || Box::new(Blank)))
            .unwrap();
        let a = PanelId::from_u64(1);
        registry.register_instance("editor", a);
        registry.register_instance("editor", a);
        assert_eq!(registry.instances("editor"), &[a]);

        registry.unregister_instance(a);
        assert!(!registry.has_instances("editor"));
    }
}
