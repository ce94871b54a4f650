// src/styles.rs
use crate::errors::StylizeError;
use std::collections::HashMap;

/// Style identifiers the service advertises to clients.
pub const SUPPORTED_STYLES: &[&str] = &[
    "2d-cartoon",
    "lego",
    "pixar",
    "anime",
    "old-school-anime",
    "simpsons",
    "south-park",
    "sock-puppet",
    "claymation",
    "monster",
    "comic-book-villain",
    "comic-book-hero",
    "abstract",
    "watercolor",
    "oil-painting",
];

const STYLE_PROMPTS: &[(&str, &str)] = &[
    (
        "2d-cartoon",
        "From this description, make the style of the image a flat, vectorised 2d cartoon",
    ),
    (
        "lego",
        "From this description, make the style of the image look like any subjects are lego mini figures in a lego world",
    ),
    (
        "pixar",
        "From this description, make the style of the image look like a pixar movie. It should be a still from the movie, not a poster",
    ),
    (
        "anime",
        "From this description, make the style of the image look like an anime",
    ),
    (
        "old-school-anime",
        "Using this description, make the image in the style of a traditional hand-painted cel animation, reminiscent of a simple 1980s Japanese anime",
    ),
    (
        "simpsons",
        "Based off this prompt, make the image in a style that strongly resembles that of a character from the Simpsons. Try to emulate the style from the show when it was on air in the late 90s/early 2000s. It should look like a still from the show. It should be a 2D cartoon and include the signature yellow skin",
    ),
    (
        "south-park",
        "From this description, make the image in the style of something that very closely resembles a south park cartoon from the show 'South Park'. It should look like a still from the show. Think of characters like Stan, Kyle, Cartman, and Kenny. It should be a 2D cartoon and include the signature construction paper cut-out style",
    ),
    (
        "sock-puppet",
        "From this description, make the image in the style of a sock puppet",
    ),
    (
        "claymation",
        "From this description, make the image in the style of a claymation. It should look like a still from a claymation movie and shows made by Aardman with characters like Wallace and Gromit and Shaun the Sheep",
    ),
    (
        "monster",
        "Turn any subjects in the image into their own distinct monster",
    ),
    (
        "comic-book-villain",
        "Turn any subjects in the image into a comic book villain and give the whole image a comic book style. The style of the comic book should be like marvel or dc. Give any subjects their own costume and superpowers. Change the clothes that they are wearing into a new costume.",
    ),
    (
        "comic-book-hero",
        "Turn any subjects in the image into a comic book hero and give the whole image a comic book style. The style of the comic book should be like marvel or dc and should look hand drawn. Give any subjects their own costume and superpowers. Change the clothes that they are wearing into a new costume.",
    ),
    ("abstract", "Make the style of the image abstract"),
    (
        "watercolor",
        "Make the style of the image look like a watercolor painting",
    ),
    (
        "oil-painting",
        "Make the style of the image look like an oil painting",
    ),
];

/// Read-only map from style identifier to the instruction fragment appended
/// after the image description.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    fragments: HashMap<&'static str, &'static str>,
}

impl StyleRegistry {
    pub fn builtin() -> Result<Self, StylizeError> {
        Self::from_entries(SUPPORTED_STYLES, STYLE_PROMPTS)
    }

    /// Builds a registry and checks it is complete: every declared style has
    /// exactly one non-blank fragment and no fragment is left undeclared.
    pub fn from_entries(
        declared: &[&'static str],
        entries: &[(&'static str, &'static str)],
    ) -> Result<Self, StylizeError> {
        let mut fragments = HashMap::with_capacity(entries.len());

        for &(style, fragment) in entries {
            if fragment.trim().is_empty() {
                return Err(StylizeError::Config(format!(
                    "style '{}' has an empty prompt fragment",
                    style
                )));
            }
            if fragments.insert(style, fragment).is_some() {
                return Err(StylizeError::Config(format!(
                    "style '{}' is defined more than once",
                    style
                )));
            }
        }

        if let Some(missing) = declared.iter().find(|s| !fragments.contains_key(*s)) {
            return Err(StylizeError::Config(format!(
                "style '{}' has no prompt fragment",
                missing
            )));
        }
        if fragments.len() != declared.len() {
            return Err(StylizeError::Config(
                "prompt fragments exist for undeclared styles".to_string(),
            ));
        }

        Ok(Self { fragments })
    }

    pub fn lookup(&self, style: &str) -> Result<&'static str, StylizeError> {
        self.fragments
            .get(style)
            .copied()
            .ok_or_else(|| StylizeError::UnknownStyle(style.to_string()))
    }

    pub fn styles(&self) -> Vec<&'static str> {
        let mut styles: Vec<_> = self.fragments.keys().copied().collect();
        styles.sort_unstable();
        styles
    }
}
