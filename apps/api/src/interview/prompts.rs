// Prompt builders for the interview coach. Every prompt asks for one JSON object.

use crate::models::interview::InterviewMode;
use crate::models::job::JobAnalysis;

/// Job analysis prompt template. Replace `{job_description}` before sending.
pub const JOB_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Read the following job description and extract the requested information.
Return ONLY valid minified JSON with the keys: skills, responsibilities, competencies, values, themes, summary.
Each list must contain concise bullet phrases (max 12 words each). The summary must be a single sentence.

Job Description:
{job_description}
"#;

/// Role question prompt template. Replace `{job_json}` before sending.
pub const ROLE_QUESTION_PROMPT_TEMPLATE: &str = r#"Given the analyzed job data below, craft ONE thoughtful role-specific interview question
that probes the candidate's fit for the themes and responsibilities. Return JSON like:
{"question": "..."}

Job Analysis:
{job_json}
"#;

pub fn build_job_analysis_prompt(job_description: &str) -> String {
    JOB_ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description)
}

pub fn build_role_question_prompt(job_analysis: &JobAnalysis) -> String {
    ROLE_QUESTION_PROMPT_TEMPLATE.replace("{job_json}", &job_json(job_analysis))
}

/// Asks for a STAR evaluation; `next_question` is requested only for generative modes.
pub fn build_star_prompt(
    question: &str,
    answer: &str,
    job_analysis: &JobAnalysis,
    mode: InterviewMode,
) -> String {
    let include_next_question = mode.is_generative();
    let (extra_key, next_question_instruction) = if include_next_question {
        (
            ", next_question",
            "Include a `next_question` field with a follow-up question aligned to the job themes.",
        )
    } else {
        ("", "Do NOT include `next_question`.")
    };

    format!(
        "You are an expert interview coach analyzing a candidate's answer.\n\
         Use the STAR method and evaluate the response to the provided question.\n\
         Return ONLY JSON with keys: star, strengths, weaknesses, fit_summary, score, improvements{extra_key}.\n\
         score must be an integer between 1 and 5.\n\
         STAR must contain situation, task, action, result fields.\n\
         {next_question_instruction}\n\n\
         Interview mode: {mode}\n\
         Job analysis:\n\
         {job}\n\n\
         Question: {question}\n\
         Answer: {answer}\n",
        job = job_json(job_analysis),
    )
}

fn job_json(job_analysis: &JobAnalysis) -> String {
    serde_json::to_string_pretty(job_analysis).unwrap_or_default()
}
