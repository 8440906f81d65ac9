use serde_json::json;

use crate::{ontology::MetaProperties, taxonomy::TaxonomyGraph};

pub const TAXONOMIST_PROMPT: &str = r#"You are an expert Taxonomist.
Your goal is to organize a list of terms into a strict "IS-A" (subclass) hierarchy, one term at a time.

Rules:
1. Strict IS-A only. Use true subclass relationships.
   - Sparrow IS-A Bird (YES)
   - Wheel IS-A Car (NO, that is part-of)
   - Baker IS-A Bread (NO)
2. You will be given the full term list and the terms placed so far.
3. For the requested term, assign ONE parent taken from the term list, or the root marker if it is a root concept.
4. If the Critic rejected your previous link, propose a different parent or justify the original one.

Return ONLY the JSON object for the single new link:
{"child": "Term", "parent": "ParentTerm"}
"#;

pub const CRITIC_PROMPT: &str = r#"You are an expert in Formal Ontology and the OntoClean methodology (Guarino & Welty).
Your job is to CRITIQUE proposed "IS-A" (subsumption) links in a taxonomy.

Definitions:
1. Rigidity (+R, -R, ~R)
   - +R (Rigid): essential, holds in all possible worlds (PERSON, ANIMAL).
   - ~R (Anti-Rigid): contingent, instances can stop being this without ceasing to exist (STUDENT, EMPLOYEE, AGENT).
   - Constraint: ~R cannot subsume +R.
     INVALID: Person (+R) IS-A Student (~R).
     VALID: Student (~R) IS-A Person (+R).
2. Identity (+I, -I)
   - +I (Sortal): carries identity criteria (countable nouns such as Apple, Planet).
   - -I (Non-Sortal): no identity criteria (adjectives such as Red, mass nouns such as Water).
   - Constraint: +I cannot subsume -I.
     INVALID: Red (-I) IS-A Apple (+I).
3. Unity (+U, ~U)
   - +U (Whole): holds together (Ocean, Ball).
   - ~U (Anti-Unity): a mere amount (Amount of Water).
   - Constraint: ~U cannot subsume +U.
     INVALID: Vase (+U) IS-A Clay (~U). A vase is constituted by clay, it is not a kind of clay.

Task:
You will receive a proposed link "Child IS-A Parent".
1. Use the meta-properties given for Child and Parent; infer any that are missing.
2. Check for violations, especially a Rigid child under an Anti-Rigid parent.
3. If there is a violation reply "REJECT: <explanation>".
4. If the link is valid reply "APPROVE".
"#;

/// User turn for the Taxonomist. `last_critique` is set on every retry.
pub fn proposal_context(
    domain: &str,
    terms: &[String],
    graph: &TaxonomyGraph,
    term: &str,
    sentinel: &str,
    last_critique: Option<&str>,
) -> String {
    let terms_json = json!(terms).to_string();
    let placed_json = json!(graph).to_string();
    let mut context = format!(
        "Domain: {domain}\n\
         Terms: {terms_json}\n\
         Current Term to Place: \"{term}\"\n\
         Existing Hierarchy (placed terms and their parents): {placed_json}\n\
         \n\
         Task: Assign a parent for \"{term}\".\n\
         If it is a root concept in this list, use \"{sentinel}\".\n\
         Possible parents: {terms_json} or \"{sentinel}\".\n"
    );

    if let Some(critique) = last_critique {
        context.push_str(&format!(
            "\nPrevious attempt REJECTED by Critic:\n{critique}\n\n\
             INSTRUCTION: You MUST either (a) propose a different, valid parent, or \
             (b) if you are certain, strictly justify why the previous choice satisfies the constraints. \
             Output the JSON decision again.\n"
        ));
    }

    context
}

/// User turn for the Critic naming one proposed edge.
pub fn critique_request(
    domain: &str,
    term: &str,
    parent: &str,
    sentinel: &str,
    child_properties: Option<&MetaProperties>,
    parent_properties: Option<&MetaProperties>,
) -> String {
    let mut request = format!(
        "Taxonomist proposes: \"{term}\" IS-A \"{parent}\".\nDomain: {domain}\n"
    );

    if child_properties.is_some() || parent_properties.is_some() {
        let describe = |props: Option<&MetaProperties>| {
            props
                .map(MetaProperties::describe)
                .unwrap_or_else(|| "unknown".to_string())
        };
        request.push_str(&format!(
            "Known meta-properties:\n- {term}: {}\n- {parent}: {}\n",
            describe(child_properties),
            describe(parent_properties)
        ));
    }

    request.push_str(&format!(
        "\nEvaluate this link based on OntoClean (Rigidity, Identity, Unity).\n\
         If \"{parent}\" is \"{sentinel}\", usually APPROVE unless \"{term}\" is not a noun.\n"
    ));
    request
}

/// A critique rejects when it contains `REJECT` in any letter case.
pub fn is_rejection(critique: &str) -> bool {
    critique.to_uppercase().contains("REJECT")
}
