//! Catalog ingestion and the load-time validation sweep.
//!
//! Parsing is strict about structure (a syntactically broken catalog is a
//! hard error) but lenient about content: malformed effect values and
//! unrecognized tag names survive the load and are reported as warnings
//! here, then degrade to no-ops during runs.

use log::warn;

use crate::effect::{EffectDef, EffectKind};
use crate::geometry::StarCounts;
use crate::item::ItemTemplate;
use crate::tags::{Element, ItemKind};

/// Parse a JSON array of item templates.
pub fn load_catalog(json: &str) -> Result<Vec<ItemTemplate>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Sweep a loaded catalog for content problems. Every finding is logged
/// at warn level and returned for display.
pub fn validate(templates: &[ItemTemplate]) -> Vec<String> {
    let mut findings = Vec::new();
    let mut report = |finding: String| {
        warn!("catalog: {finding}");
        findings.push(finding);
    };

    for template in templates {
        if template.shape.body_anchor().is_none() {
            report(format!("{}: shape has no Body cells", template.name));
        }
        for (kind, def) in template.star_effects.iter_all() {
            check_def(
                &template.name,
                &format!("star {} rule", kind.label()),
                def,
                &mut report,
            );
        }
        for def in &template.passive_effects {
            check_def(&template.name, "passive", def, &mut report);
        }
    }
    findings
}

fn check_def(item: &str, context: &str, def: &EffectDef, report: &mut impl FnMut(String)) {
    if def.kind == EffectKind::AddElementToTarget {
        if def.value.as_element().is_none() {
            report(format!("{item}: {context} grant value is not an element"));
        }
    } else if def.value.resolve(&StarCounts::default()).is_none() {
        report(format!("{item}: {context} value never resolves"));
    }

    let condition = &def.condition;
    if let Some(names) = &condition.requires_element {
        for name in names {
            if Element::from_name(name).is_none() {
                report(format!(
                    "{item}: {context} references unknown element {name:?}"
                ));
            }
        }
    }
    if let Some(names) = &condition.requires_type {
        for name in names {
            if ItemKind::from_name(name).is_none() {
                report(format!(
                    "{item}: {context} references unknown type {name:?}"
                ));
            }
        }
    }
}
