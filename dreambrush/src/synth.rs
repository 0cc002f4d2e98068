use color_eyre::{
    Result,
    eyre::{Context, bail},
};
use indoc::indoc;
use log::debug;
use serde::Deserialize;

use crate::llm::{InputMessage, Llm, Request};

/// The structured prompt the model is asked to produce: tag lists for the
/// image backend, in the order the model emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuredPrompt {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    /// Requested by the v2 profile. Held but never joined into the prompt
    /// strings sent to the backend.
    #[serde(default)]
    pub styles: Option<Vec<String>>,
}

/// Everything that varies between the two prompt-generation flavors,
/// collapsed into one selectable record.
#[derive(Debug, Clone)]
pub struct Profile {
    pub model: &'static str,
    pub system_instruction: &'static str,
    pub example_exchange: (&'static str, &'static str),
    pub join_delimiter: &'static str,
    pub include_styles: bool,
}

impl Profile {
    pub fn v1() -> Self {
        Self {
            model: "gemini-2.5-flash",
            system_instruction: indoc! {r#"
                You are a Stable Diffusion prompt generator. For the idea the user
                provides, output the matching positive and negative prompt tags.
                Output strict JSON only: no prose, no markdown syntax, no code
                fences, nothing besides the JSON object. The object has the keys
                "positive" and "negative", each an array of English tag strings.

                Make the tags as detailed as possible. If the idea has salient
                features (for example a character), express them in the tags.

                Do not include common negative boilerplate such as `bad arms`;
                uncommon, scene-specific negative tags are welcome.

                Unless the user explicitly asks for NSFW output, do not produce
                NSFW content.
            "#},
            example_exchange: (
                "a lighthouse in a storm",
                indoc! {r#"
                    ```json
                    {
                      "positive": ["lighthouse on a cliff", "storm clouds", "crashing waves", "dramatic lighting"],
                      "negative": ["calm sea", "daylight"]
                    }
                    ```
                "#},
            ),
            join_delimiter: ", ",
            include_styles: false,
        }
    }

    pub fn v2() -> Self {
        Self {
            model: "gemini-2.5-pro",
            system_instruction: indoc! {r#"
                You are a Stable Diffusion prompt generator. For the idea the user
                provides, output the matching positive and negative prompt tags,
                plus a list of fitting art styles. Output strict JSON only: no
                prose, no markdown syntax, no code fences, nothing besides the
                JSON object. The object has the keys "positive", "negative" and
                "styles", each an array of English tag strings.

                Make the tags as detailed as possible. If the idea has salient
                features (for example a character), express them in the tags.

                Unless the user explicitly asks for NSFW output, do not produce
                NSFW content.
            "#},
            example_exchange: (
                "a lighthouse in a storm",
                indoc! {r#"
                    ```json
                    {
                      "positive": ["lighthouse on a cliff", "storm clouds", "crashing waves", "dramatic lighting"],
                      "negative": ["calm sea", "daylight"],
                      "styles": ["romanticism", "oil painting"]
                    }
                    ```
                "#},
            ),
            join_delimiter: " ",
            include_styles: true,
        }
    }
}

/// Expands the operator's idea into a [`StructuredPrompt`] via the LLM.
///
/// Fails when the model returns nothing, or when its output is not the
/// expected JSON object. Neither case is retried.
pub async fn synthesize(
    llm: &dyn Llm,
    profile: &Profile,
    idea: &str,
) -> Result<StructuredPrompt> {
    let (example_user, example_model) = profile.example_exchange;
    let req = Request {
        system: profile.system_instruction.to_string(),
        messages: vec![
            InputMessage::user(example_user),
            InputMessage::model(example_model),
            InputMessage::user(idea),
        ],
    };

    let text = llm.complete(req).await?;
    if text.trim().is_empty() {
        bail!("no prompt generated: the model returned an empty response");
    }
    debug!("raw model output:\n{text}");

    let json = strip_code_fence(&text);
    let mut prompt: StructuredPrompt = serde_json::from_str(json)
        .with_context(|| format!("parsing model output as JSON:\n{text}"))?;

    // the v1 flavor never asks for styles, so it ignores them should the
    // model volunteer some
    if !profile.include_styles {
        prompt.styles = None;
    }
    Ok(prompt)
}

/// Models sometimes fence their output despite being told not to. Removes
/// the first and last line when, and only when, both are fence markers;
/// anything else is left for the JSON parser to reject.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let mut lines = trimmed.lines();
    let (Some(first), Some(last)) = (lines.next(), lines.next_back()) else {
        return trimmed;
    };
    if first.starts_with("```") && last == "```" {
        trimmed[first.len()..trimmed.len() - last.len()].trim()
    } else {
        trimmed
    }
}
