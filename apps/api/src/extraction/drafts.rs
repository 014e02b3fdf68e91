// Tier-2 extraction shapes and prompts.
// Items that are not plausible skill strings are dropped, not rejected wholesale.

use serde::Deserialize;
use serde_json::Value;

use crate::extraction::rules::is_plausible_skill;
use crate::generation::{ExpectedShape, PromptContext, ShapeViolation};
use crate::llm_client::prompts::{clip, JSON_ONLY_SYSTEM};

const RESUME_SYSTEM: &str = "You are a resume parser. Extract technical skills, \
    programming languages, frameworks, tools and domain knowledge.";

const JOB_SYSTEM: &str = "You are a job description analyzer. Separate the skills a \
    candidate must have from the ones that are only nice to have.";

const RESUME_PROMPT_TEMPLATE: &str = r#"Extract every skill named in the resume below.

Return JSON exactly in this form:
{"skills": ["skill one", "skill two"]}

Use short skill names (at most six words each). Do not invent skills.

RESUME:
{text}"#;

const JOB_PROMPT_TEMPLATE: &str = r#"Extract the skills from the job description below.

Return JSON exactly in this form:
{"required": ["skill"], "preferred": ["skill"]}

Required skills are the ones the role cannot do without, including domain knowledge and
tools. Preferred skills are described as a plus, bonus or nice to have.

JOB DESCRIPTION:
{text}"#;

fn system_prompt(role: &str) -> String {
    format!("{role}\n{JSON_ONLY_SYSTEM}")
}

pub fn resume_prompt(text: &str) -> PromptContext {
    PromptContext::new(
        system_prompt(RESUME_SYSTEM),
        RESUME_PROMPT_TEMPLATE.replace("{text}", clip(text)),
    )
}

pub fn job_prompt(text: &str) -> PromptContext {
    PromptContext::new(
        system_prompt(JOB_SYSTEM),
        JOB_PROMPT_TEMPLATE.replace("{text}", clip(text)),
    )
}

fn plausible_strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if is_plausible_skill(&s) => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct SkillListDraft {
    skills: Vec<Value>,
}

impl ExpectedShape for SkillListDraft {
    const NAME: &'static str = "resume_skills";
    type Context = ();
    type Output = Vec<String>;

    fn adapt(self, _ctx: &()) -> Result<Vec<String>, ShapeViolation> {
        Ok(plausible_strings(self.skills))
    }
}

#[derive(Debug, Deserialize)]
pub struct JobSkillsDraft {
    #[serde(default)]
    required: Vec<Value>,
    #[serde(default)]
    preferred: Vec<Value>,
}

impl ExpectedShape for JobSkillsDraft {
    const NAME: &'static str = "job_skills";
    type Context = ();
    type Output = (Vec<String>, Vec<String>);

    fn adapt(self, _ctx: &()) -> Result<Self::Output, ShapeViolation> {
        if self.required.is_empty() && self.preferred.is_empty() {
            return Err(ShapeViolation::new(Self::NAME, "no skills in either list"));
        }
        Ok((
            plausible_strings(self.required),
            plausible_strings(self.preferred),
        ))
    }
}
