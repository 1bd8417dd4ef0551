//! Instruction templates sent to the model.
//!
//! Every function here is pure: the same resume, role and tone always render
//! the same payload.

use crate::models::{
    normalize_job_description, ChatMessage, OptimizationRequest, PromptMode, PromptPayload, Tone,
};

const PERSONA: &str = "You are an expert career coach and resume writer.";

const TASK: &str = "Rewrite the resume so it is highly relevant to the job posting \
while keeping the candidate's authentic experience.";

pub const GUIDELINES: &str = "Guidelines:
- Highlight skills, tools, and achievements that match the job description.
- Rewrite bullet points to be clear, quantifiable, and results-driven.
- Keep professional tone, concise wording, and ATS (Applicant Tracking System) friendly formatting.
- Keep 3-5 jobs (preferably 5). If the resume has more than 5 jobs, keep the most recent 5 and condense older ones.
- Do not remove important experience unless it is irrelevant.
- Return the updated resume in Markdown format only.";

pub fn build(
    resume_text: &str,
    job_description: &str,
    tone: &str,
    mode: PromptMode,
) -> PromptPayload {
    let role = normalize_job_description(job_description);

    match mode {
        PromptMode::SingleString => PromptPayload::Generate {
            prompt: single_prompt(resume_text, &role),
        },
        PromptMode::Structured => PromptPayload::Chat {
            messages: vec![
                ChatMessage::system(system_prompt(&role, &Tone::parse(tone))),
                ChatMessage::user(format!("Resume to improve:\n\n{resume_text}")),
            ],
        },
    }
}

pub fn build_for(request: &OptimizationRequest, mode: PromptMode) -> PromptPayload {
    build(
        &request.resume_text,
        &request.job_description,
        request.tone.label(),
        mode,
    )
}

fn system_prompt(role: &str, tone: &Tone) -> String {
    format!("{PERSONA}\n{TASK}\n{GUIDELINES}\nTarget role: {role}\nTone: {tone}\n")
}

/// Flat prompt for generate-style backends; tone is only carried by the chat form.
fn single_prompt(resume_text: &str, role: &str) -> String {
    format!(
        "{PERSONA}\nThe user will provide their resume and a job description.\n{TASK}\n\n\
{GUIDELINES}\n\nTarget Role:\n{role}\n\nResume to improve:\n{resume_text}\n"
    )
}
