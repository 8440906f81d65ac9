use crate::ontology::{Identity, Property, Term};

fn title(property: Property) -> &'static str {
    match property {
        Property::Rigidity => "Rigidity",
        Property::Identity => "Identity",
        Property::OwnIdentity => "Own Identity",
        Property::Unity => "Unity",
        Property::Dependence => "Dependence",
    }
}

fn guidance(property: Property) -> &'static str {
    match property {
        Property::Rigidity => {
            r#"Rigidity (R): is the property essential to all of its instances?
- +R (Rigid): essential to ALL instances in ALL possible worlds. Examples: Person, Physical Object.
- -R (Non-Rigid): essential to some instances but not others; instances can gain or lose it. Examples: Red Thing, Hard Thing.
- ~R (Anti-Rigid): essential to NO instance, contingent by definition. Examples: roles such as Student or Employee, phases such as Child or Adult."#
        }
        Property::Identity => {
            r#"Identity (I), carries an identity condition: can instances be distinguished and re-identified?
- +I: the property carries an identity condition. Examples: Person, Physical Object.
- -I: no principled way to tell instances apart. Examples: Red, Amount of Matter."#
        }
        Property::OwnIdentity => {
            r#"Own Identity (O), supplies an identity condition: does the property supply its OWN identity condition?
- +O: supplies its own global identity condition. Examples: Person, Physical Object.
- -O: inherits its identity condition from a more general property, or has none. Examples: Student (from Person), Red.
Constraint: +O requires +I. A property cannot supply an identity condition it does not carry."#
        }
        Property::Unity => {
            r#"Unity (U): are instances wholes with integrated parts?
- +U (Unifying): instances are intrinsic wholes. Examples: Person, Car.
- -U (Non-Unifying): instances are not necessarily wholes. Examples: Red Thing, Amount of Water.
- ~U (Anti-Unity): instances are mere aggregates without integration. Examples: Collection, Group, Scattered Object."#
        }
        Property::Dependence => {
            r#"Dependence (D): do instances intrinsically depend on other entities?
- +D (Dependent): instances necessarily depend on something else to exist. Examples: Student (on a school), Parasite (on a host).
- -D (Independent): instances can exist on their own. Examples: Person, Physical Object."#
        }
    }
}

/// System prompt for the agent that judges one property.
pub fn property_system_prompt(
    property: Property,
    background: Option<&str>,
    identity_hint: Option<Identity>,
) -> String {
    let name = title(property);
    let mut prompt = match background {
        Some(background) => format!(
            "You are an expert Ontological Analyst specializing in the {name} meta-property.\n\n\
             Use the following background information:\n\n{background}\n\n\
             Your task is to analyze ONLY the {name} property of the given entity."
        ),
        None => format!(
            "You are an expert Ontological Analyst specializing in the {name} meta-property \
             from Guarino and Welty (2000)."
        ),
    };

    prompt.push_str("\n\n");
    prompt.push_str(guidance(property));
    prompt.push('\n');

    if let Some(identity) = identity_hint {
        prompt.push_str(&format!(
            "\nNote: the Identity analysis determined this entity is {identity}.\n"
        ));
    }

    let allowed = property
        .allowed_symbols()
        .iter()
        .map(|symbol| format!("\"{symbol}\""))
        .collect::<Vec<_>>()
        .join(" | ");
    prompt.push_str(&format!(
        "\nReturn your analysis in strict JSON format:\n\
         {{\n  \"value\": {allowed},\n  \"reasoning\": \"Brief explanation of the {name} value.\"\n}}\n"
    ));
    prompt
}

pub fn property_user_prompt(property: Property, term: &Term) -> String {
    let mut prompt = format!(
        "Analyze the {} property of:\n\nTerm: {}\n",
        title(property),
        term.term
    );
    if let Some(description) = term.description.as_deref().filter(|d| !d.is_empty()) {
        prompt.push_str(&format!("Description: {description}\n"));
    }
    if let Some(usage) = term.usage.as_deref().filter(|u| !u.is_empty()) {
        prompt.push_str(&format!("Usage context: {usage}\n"));
    }
    prompt
}
