use crate::ontology::{OntologyTree, Term};

const NO_DEFINITION: &str = "No definition provided.";

/// `- **Class**: definition (e.g. ex1, ex2)` per class, one per line.
pub fn format_class_info<S: AsRef<str>>(tree: &OntologyTree, classes: &[S]) -> String {
    classes
        .iter()
        .map(|class| {
            let class = class.as_ref();
            let description = tree.description(class).unwrap_or(NO_DEFINITION);
            let examples = tree.examples(class);
            if examples.is_empty() {
                format!("- **{class}**: {description}")
            } else {
                format!(
                    "- **{class}**: {description} (e.g. {})",
                    examples.join(", ")
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn descent_system_prompt(
    tree: &OntologyTree,
    term: &Term,
    current: &str,
    children: &[String],
) -> String {
    let ontology = tree.name();
    let name = &term.term;
    let class_info = format_class_info(tree, children);
    format!(
        r#"You are an expert Ontologist specializing in the {ontology} upper ontology.
We are traversing the ontology hierarchically. The entity '{name}' has been identified as a type of '{current}'.
Now, choose the best sub-class for '{name}' from the following candidates.

Candidates:
{class_info}

If the entity clearly belongs to the parent '{current}' but does not fit well into any of the specific children (i.e. it is a leaf at this level or ambiguous), you can choose '{current}' itself.

Return your answer in JSON format:
{{
  "selected_class": "ClassName",
  "reasoning": "Brief explanation referencing the definition."
}}
"#
    )
}

pub fn one_shot_system_prompt(tree: &OntologyTree, classes: &[&str]) -> String {
    let ontology = tree.name();
    let class_info = format_class_info(tree, classes);
    format!(
        r#"You are an expert Ontologist specializing in the {ontology} upper ontology.
Your task is to classify a given domain entity into exactly one of the provided {ontology} classes.
Choose the most specific and ontologically correct class.

Available Classes and Definitions:
{class_info}

Return your answer in JSON format:
{{
  "classification": "ClassName",
  "confidence": "High/Medium/Low",
  "reasoning": "Brief explanation referencing the definition."
}}
"#
    )
}

pub fn entity_user_prompt(term: &Term) -> String {
    format!(
        "Entity: {}\nDescription: {}",
        term.term,
        term.description_or_empty()
    )
}

pub fn one_shot_user_prompt(term: &Term) -> String {
    format!(
        "Classify the following entity:\nTerm: {}\nDescription: {}",
        term.term,
        term.description_or_empty()
    )
}
