use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fs,
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::ontology::OntologyError;

pub type OntologyCatalogue = BTreeMap<String, OntologyTree>;

/// On-disk shape of one upper ontology in the catalogue file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyDefinition {
    pub root: String,
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub examples: BTreeMap<String, Vec<String>>,
}

/// A fixed class tree, checked at construction and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct OntologyTree {
    name: String,
    root: String,
    children: BTreeMap<String, Vec<String>>,
    descriptions: BTreeMap<String, String>,
    examples: BTreeMap<String, Vec<String>>,
}

impl OntologyTree {
    pub fn from_definition(
        name: impl Into<String>,
        definition: OntologyDefinition,
    ) -> Result<Self, OntologyError> {
        let name = name.into();
        let malformed = |reason: String| OntologyError::MalformedTree {
            ontology: name.clone(),
            reason,
        };

        let root = definition.root.trim().to_string();
        if root.is_empty() {
            return Err(malformed("root class is empty".to_string()));
        }

        let mut parent_of: BTreeMap<&str, &str> = BTreeMap::new();
        for (parent, children) in &definition.classes {
            for child in children {
                if child == &root {
                    return Err(malformed(format!("root `{root}` is listed under `{parent}`")));
                }
                if let Some(previous) = parent_of.insert(child.as_str(), parent.as_str()) {
                    return Err(malformed(format!(
                        "class `{child}` has more than one parent (`{previous}`, `{parent}`)"
                    )));
                }
            }
        }

        let mut reachable = BTreeSet::from([root.as_str()]);
        let mut queue = VecDeque::from([root.as_str()]);
        while let Some(class) = queue.pop_front() {
            for child in definition.classes.get(class).into_iter().flatten() {
                if reachable.insert(child.as_str()) {
                    queue.push_back(child.as_str());
                }
            }
        }

        let orphan = definition
            .classes
            .iter()
            .flat_map(|(parent, children)| std::iter::once(parent).chain(children))
            .find(|class| !reachable.contains(class.as_str()));
        if let Some(orphan) = orphan {
            return Err(malformed(format!("class `{orphan}` is not reachable from root `{root}`")));
        }

        Ok(Self {
            name,
            root,
            children: definition.classes,
            descriptions: definition.descriptions,
            examples: definition.examples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn children(&self, class: &str) -> &[String] {
        self.children.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn description(&self, class: &str) -> Option<&str> {
        self.descriptions.get(class).map(String::as_str)
    }

    pub fn examples(&self, class: &str) -> &[String] {
        self.examples.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, class: &str) -> bool {
        class == self.root
            || self
                .children
                .values()
                .any(|children| children.iter().any(|child| child == class))
    }

    /// Every class of the tree, sorted by name.
    pub fn classes(&self) -> Vec<&str> {
        let mut classes = BTreeSet::from([self.root.as_str()]);
        for (parent, children) in &self.children {
            classes.insert(parent.as_str());
            classes.extend(children.iter().map(String::as_str));
        }
        classes.into_iter().collect()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root.as_str(), 0_usize)];
        while let Some((class, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(
                self.children(class)
                    .iter()
                    .map(|child| (child.as_str(), depth + 1)),
            );
        }
        deepest
    }
}

/// Loads `{name: {root, classes, descriptions, examples}}` and checks every tree.
pub fn load_catalogue(path: &Path) -> Result<OntologyCatalogue, OntologyError> {
    let text = fs::read_to_string(path).map_err(|source| OntologyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let definitions: BTreeMap<String, OntologyDefinition> =
        serde_json::from_str(&text).map_err(|source| OntologyError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    definitions
        .into_iter()
        .map(|(name, definition)| {
            OntologyTree::from_definition(name.clone(), definition).map(|tree| (name, tree))
        })
        .collect()
}
