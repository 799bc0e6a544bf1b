//! Fixed turn-on/turn-off sentence templates.

/// Placeholder replaced by the entity name.
pub const PLACEHOLDER: &str = "{name}";

/// Template order is part of the output contract: satellites receive the
/// phrases in exactly this order for every entity.
pub const TEMPLATES: [&str; 12] = [
    "turn on the {name}",
    "turn off the {name}",
    "turn on {name}",
    "turn off {name}",
    "switch on the {name}",
    "switch off the {name}",
    "switch on {name}",
    "switch off {name}",
    "activate the {name}",
    "deactivate the {name}",
    "activate {name}",
    "deactivate {name}",
];

/// Expand every entity through every template, entity-major.
///
/// Yields `entities.len() * TEMPLATES.len()` phrases; the name is inserted
/// verbatim.
pub fn expand<S: AsRef<str>>(entities: &[S]) -> Vec<String> {
    entities
        .iter()
        .flat_map(|entity| {
            let name = entity.as_ref();
            TEMPLATES
                .iter()
                .map(move |template| template.replacen(PLACEHOLDER, name, 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_one_placeholder() {
        for template in TEMPLATES {
            assert_eq!(template.matches(PLACEHOLDER).count(), 1, "{template}");
        }
    }

    #[test]
    fn single_entity_expansion() {
        let phrases = expand(&["lamp"]);
        insta::assert_snapshot!(phrases.join("\n"), @r"
        turn on the lamp
        turn off the lamp
        turn on lamp
        turn off lamp
        switch on the lamp
        switch off the lamp
        switch on lamp
        switch off lamp
        activate the lamp
        deactivate the lamp
        activate lamp
        deactivate lamp
        ");
    }

    #[test]
    fn expansion_is_entity_major() {
        let entities = ["ceiling light", "desk lamp", "strip"];
        let phrases = expand(&entities);
        assert_eq!(phrases.len(), entities.len() * TEMPLATES.len());

        for (e, entity) in entities.iter().enumerate() {
            for (t, template) in TEMPLATES.iter().enumerate() {
                assert_eq!(
                    phrases[e * TEMPLATES.len() + t],
                    template.replace(PLACEHOLDER, entity)
                );
            }
        }
    }

    #[test]
    fn no_entities_no_phrases() {
        assert!(expand::<&str>(&[]).is_empty());
    }

    #[test]
    fn names_are_inserted_verbatim() {
        let phrases = expand(&["Kid's Room {name}"]);
        assert_eq!(phrases[0], "turn on the Kid's Room {name}");
    }
}
