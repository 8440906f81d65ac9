use serde::{Deserialize, Serialize};

use crate::ontology::{Identity, MetaProperties, Rigidity, Unity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Likely a "made of" relation mistaken for "is a".
    ConstitutionTrap,
    IdentityInheritance,
    UnityInheritance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub child: String,
    pub parent: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub child: String,
    pub parent: String,
    pub message: String,
}

/// A rigid child can never specialize an anti-rigid parent.
pub fn check_rigidity(
    child: &str,
    child_props: &MetaProperties,
    parent: &str,
    parent_props: &MetaProperties,
) -> Option<Violation> {
    let violated = child_props.rigidity == Some(Rigidity::Rigid)
        && parent_props.rigidity == Some(Rigidity::AntiRigid);
    violated.then(|| Violation {
        child: child.to_string(),
        parent: parent.to_string(),
        message: format!(
            "Rigid child '{child}' (+R) cannot be a subclass of anti-rigid parent '{parent}' (~R)."
        ),
    })
}

/// Heuristic warnings for one edge; none of them fail a run.
pub fn check_warnings(
    child: &str,
    child_props: &MetaProperties,
    parent: &str,
    parent_props: &MetaProperties,
) -> Vec<Warning> {
    let warning = |kind, message: String| Warning {
        kind,
        child: child.to_string(),
        parent: parent.to_string(),
        message,
    };
    let mut warnings = Vec::new();

    let child_is_object = child_props.identity == Some(Identity::Carries)
        || child_props.unity == Some(Unity::Unifying);
    let parent_is_material = parent_props.identity == Some(Identity::Lacks)
        && parent_props.unity == Some(Unity::NonUnifying);
    if child_is_object && parent_is_material {
        warnings.push(warning(
            WarningKind::ConstitutionTrap,
            format!(
                "Object '{child}' (+I/+U) is classified as subclass of material '{parent}' (-I/-U). Likely a made-of relation."
            ),
        ));
    }

    if child_props.identity == Some(Identity::Lacks)
        && parent_props.identity == Some(Identity::Carries)
    {
        warnings.push(warning(
            WarningKind::IdentityInheritance,
            format!(
                "'{child}' (-I) sits under '{parent}' (+I); identity conditions should be inherited."
            ),
        ));
    }

    if child_props.unity == Some(Unity::Unifying) && parent_props.unity == Some(Unity::AntiUnity) {
        warnings.push(warning(
            WarningKind::UnityInheritance,
            format!("Whole '{child}' (+U) sits under anti-unity '{parent}' (~U)."),
        ));
    }

    warnings
}
