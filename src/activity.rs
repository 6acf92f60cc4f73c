//! Step-count activity rings
//!
//! The activity widget receives one record per person and shows each
//! person's progress towards their daily step goal as a ring on the surface
//! `activity_<name>`.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressRingRenderer;
use crate::rendering::SurfaceLookup;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonActivity {
    pub name: String,
    #[serde(default)]
    pub steps: u64,
    #[serde(default)]
    pub steps_goal: u64,
    #[serde(default)]
    pub login_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
}

impl PersonActivity {
    /// Completion towards the step goal. A zero goal counts as no progress.
    pub fn fraction(&self) -> f64 {
        if self.steps_goal == 0 {
            0.0
        } else {
            self.steps as f64 / self.steps_goal as f64
        }
    }

    pub fn surface_id(&self) -> String {
        surface_id_for(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    #[serde(default)]
    pub persons: Vec<PersonActivity>,
}

impl ActivityData {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Surface id for a person: `activity_` followed by the lowercased name with
/// anything but ASCII letters and digits replaced by `_`.
pub fn surface_id_for(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("activity_{}", slug)
}

/// Draw one ring per person. Persons who still need to log in are skipped.
///
/// Returns the ids of the surfaces that were drawn.
pub fn draw_activity<L>(
    renderer: &ProgressRingRenderer,
    surfaces: &mut L,
    data: &ActivityData,
) -> Vec<String>
where
    L: SurfaceLookup + ?Sized,
{
    let mut drawn = Vec::new();
    for person in &data.persons {
        if person.login_required {
            warn!("Login required for {}, not drawing activity", person.name);
            continue;
        }
        let fraction = person.fraction();
        info!(
            "{} steps goal: {}, steps: {} ({:.2}%)",
            person.name,
            person.steps_goal,
            person.steps,
            fraction * 100.0
        );
        let id = person.surface_id();
        match renderer.try_draw_progress(surfaces, &id, fraction) {
            Ok(()) => drawn.push(id),
            Err(e) => warn!("Activity ring for {} not drawn: {}", person.name, e),
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{Surface, SurfaceRegistry};

    const PAYLOAD: &str = r#"{
        "persons": [
            {"name": "Ann", "steps": 5000, "steps_goal": 10000, "percent": 0.5},
            {"name": "Bo Li", "steps": 0, "steps_goal": 0},
            {"name": "Cy", "login_required": true, "auth_url": "https://example.com/auth"}
        ]
    }"#;

    #[test]
    fn parses_payload_and_ignores_extra_fields() {
        let data = ActivityData::from_json(PAYLOAD).unwrap();
        assert_eq!(data.persons.len(), 3);
        assert_eq!(data.persons[0].fraction(), 0.5);
        assert_eq!(data.persons[1].fraction(), 0.0);
        assert!(data.persons[2].login_required);
        assert!(ActivityData::from_json("{").is_err());
    }

    #[test]
    fn surface_ids_are_slugged() {
        assert_eq!(surface_id_for("Bo Li"), "activity_bo_li");
        assert_eq!(surface_id_for("ann"), "activity_ann");
    }

    #[test]
    fn draws_rings_for_logged_in_persons() {
        let data = ActivityData::from_json(PAYLOAD).unwrap();
        let mut surfaces = SurfaceRegistry::new();
        surfaces.insert("activity_ann", Surface::new(48, 48));
        surfaces.insert("activity_cy", Surface::new(48, 48));
        // no surface registered for Bo Li

        let drawn = draw_activity(&ProgressRingRenderer::default(), &mut surfaces, &data);
        assert_eq!(drawn, vec!["activity_ann".to_string()]);
        assert!(surfaces.get("activity_ann").unwrap().painted_pixel_count() > 0);
        assert_eq!(surfaces.get("activity_cy").unwrap().painted_pixel_count(), 0);
    }
}
