//! Canvas data model.
//!
//! DESIGN
//! ======
//! A `Canvas` is a named, ordered list of placed components. Components carry
//! a small typed header (id, type tag, placement) and an open-ended `props`
//! bag that is flattened into the same JSON record, so whatever a renderer
//! needs travels with the component without this layer knowing about it.
//!
//! The type tag and placement flag keep their underscore-prefixed spelling on
//! the wire (`_componentType`, `_inCanvas`) because persisted blobs and drag
//! payloads already use it. The bare spellings are accepted on input.

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Open-ended rendering properties for a component.
pub type Props = Map<String, Value>;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 7;

/// Keys owned by the store. Partial updates never overwrite these.
pub(crate) const MANAGED_KEYS: &[&str] = &["componentId", "canvasId", "_inCanvas", "inCanvas"];

// =============================================================================
// COMPONENT
// =============================================================================

/// A placed (or about-to-be-placed) component instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireComponent")]
pub struct CanvasComponent {
    /// Unique across the whole store, not just one canvas. Empty means "not
    /// assigned yet".
    #[serde(rename = "componentId")]
    pub component_id: String,
    /// Registry name of the component (e.g. `"Graph"`).
    #[serde(rename = "_componentType")]
    pub component_type: String,
    /// Set once the component lives on a canvas.
    #[serde(rename = "_inCanvas")]
    pub in_canvas: bool,
    /// Owning canvas. Matches the containing canvas whenever `in_canvas`.
    #[serde(rename = "canvasId", skip_serializing_if = "Option::is_none")]
    pub canvas_id: Option<String>,
    /// Everything else.
    #[serde(flatten)]
    pub props: Props,
}

/// Inbound shape of a component. Header fields may be null or missing, and
/// both spellings of the type tag and placement flag may appear at once; the
/// underscore spelling wins.
#[derive(Deserialize)]
struct WireComponent {
    #[serde(rename = "componentId", default)]
    component_id: Option<String>,
    #[serde(rename = "_componentType", default)]
    tagged_type: Option<String>,
    #[serde(rename = "componentType", default)]
    bare_type: Option<String>,
    #[serde(rename = "_inCanvas", default)]
    tagged_in_canvas: Option<bool>,
    #[serde(rename = "inCanvas", default)]
    bare_in_canvas: Option<bool>,
    #[serde(rename = "canvasId", default)]
    canvas_id: Option<String>,
    #[serde(flatten)]
    props: Props,
}

impl From<WireComponent> for CanvasComponent {
    fn from(wire: WireComponent) -> Self {
        Self {
            component_id: wire.component_id.unwrap_or_default(),
            component_type: wire.tagged_type.or(wire.bare_type).unwrap_or_default(),
            in_canvas: wire.tagged_in_canvas.or(wire.bare_in_canvas).unwrap_or(false),
            canvas_id: wire.canvas_id,
            props: wire.props,
        }
    }
}

impl CanvasComponent {
    /// A fresh, unplaced component of the given type.
    #[must_use]
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_id: String::new(),
            component_type: component_type.into(),
            in_canvas: false,
            canvas_id: None,
            props: Props::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = component_id.into();
        self
    }

    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    /// Returns the component id if one has been assigned.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        if self.component_id.is_empty() { None } else { Some(&self.component_id) }
    }

    /// Whether this component describes an instance already placed on a canvas.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.in_canvas && self.id().is_some() && self.canvas_id.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Shallow-merge `partial` into this component.
    ///
    /// Store-managed keys are skipped. `_componentType` is honoured when it is
    /// a string; every other key lands in `props`, nulls included.
    pub fn merge(&mut self, partial: &Props) {
        for (key, value) in partial {
            if MANAGED_KEYS.contains(&key.as_str()) {
                tracing::debug!(component_id = %self.component_id, %key, "ignoring store-managed key in partial update");
                continue;
            }
            if key == "_componentType" || key == "componentType" {
                if let Some(kind) = value.as_str() {
                    self.component_type = kind.to_owned();
                }
                continue;
            }
            self.props.insert(key.clone(), value.clone());
        }
    }

    /// Props handed to the renderer: everything except the placement header.
    #[must_use]
    pub fn render_props(&self) -> &Props {
        &self.props
    }

    /// Read a string prop.
    #[must_use]
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// CANVAS
// =============================================================================

/// A named, ordered collection of placed components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<CanvasComponent>,
}

impl Canvas {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), components: Vec::new() }
    }

    /// Position of a component within this canvas.
    #[must_use]
    pub fn position_of(&self, component_id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.component_id == component_id)
    }

    #[must_use]
    pub fn component(&self, component_id: &str) -> Option<&CanvasComponent> {
        self.components.iter().find(|c| c.component_id == component_id)
    }

    #[must_use]
    pub fn contains(&self, component_id: &str) -> bool {
        self.position_of(component_id).is_some()
    }
}

// =============================================================================
// IDS
// =============================================================================

/// Generate an id for a canvas or component: `id-{unix millis}-{7 base-36 chars}`.
#[must_use]
pub fn generate_id() -> String {
    format!("id-{}-{}", now_ms(), random_base36(ID_SUFFIX_LEN))
}

/// `len` random lowercase base-36 characters.
#[must_use]
pub fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..ID_SUFFIX_ALPHABET.len());
            ID_SUFFIX_ALPHABET[idx] as char
        })
        .collect()
}

/// Current UTC time as an RFC 3339 string, e.g. `2024-01-01T00:00:00Z`.
#[must_use]
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to format timestamp");
        String::new()
    })
}

fn now_ms() -> u128 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    dur.as_millis()
}

/// Move the element at `from` so it ends up at `to`, clamped to the bounds of
/// the slice after removal.
pub(crate) fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    let bounded = to.min(items.len());
    items.insert(bounded, item);
}
