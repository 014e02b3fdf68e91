// Prompts for curriculum generation.
// Every field the test doubles key on is written as a `KEY: value` line.

pub const MODULE_SYSTEM: &str = "You are an instructional designer who writes focused, \
    practical training modules for working professionals.";

pub const MODULE_PROMPT_TEMPLATE: &str = r#"Design one training module that closes a skill gap.

SKILL: {skill}
IMPORTANCE: {importance}
WHY IT MATTERS: {reason}
ROLE: {job_title}
DOMAIN: {domain}
CANDIDATE ALREADY KNOWS: {existing_skills}

{context_instruction}

Return JSON exactly in this form:
{
  "title": "string",
  "description": "string",
  "learning_objectives": ["string"],
  "content_sections": [{"heading": "string", "body": "string"}],
  "exercises": [{"title": "string", "description": "string"}],
  "estimated_hours": 12,
  "difficulty": "beginner | intermediate | advanced"
}

Build on what the candidate already knows where it helps."#;

pub const PHASES_SYSTEM: &str = "You are a technical lead planning how a new team member \
    ramps up on a specific project.";

pub const PHASES_PROMPT_TEMPLATE: &str = r#"Plan the project-specific phases of a training program.

PROJECT: {project_name}
DESCRIPTION: {project_description}
TEAM ROLE: {team_role}
ORGANIZATION: {organization}
TECH STACK: {tech_stack}
GOALS: {goals}
TIMELINE: {timeline}
ROLE: {job_title}
DOMAIN: {domain}
REMAINING SKILL GAPS: {gaps}

Phase 1 (skill-gap foundations) already exists. Write the phases that follow it.

{context_instruction}

Return JSON exactly in this form:
{
  "phases": [
    {
      "name": "string",
      "description": "string",
      "modules": [
        {
          "title": "string",
          "description": "string",
          "learning_objectives": ["string"],
          "content_sections": [{"heading": "string", "body": "string"}],
          "exercises": [{"title": "string", "description": "string"}],
          "estimated_hours": 10,
          "difficulty": "beginner | intermediate | advanced"
        }
      ]
    }
  ]
}"#;

pub const MILESTONES_SYSTEM: &str = "You are a project manager setting checkpoints for a \
    training plan.";

pub const MILESTONES_PROMPT_TEMPLATE: &str = r#"Set milestones for this training plan.

PROJECT: {project_name}
TOTAL WEEKS: {total_weeks}
PHASES:
{phases}

Return JSON exactly in this form:
{"milestones": [{"week": 1, "label": "string", "deliverable": "string"}]}

Weeks must be between 1 and the total number of weeks."#;
