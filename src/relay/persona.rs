use serde::{Deserialize, Serialize};
use std::fmt;

const RECRUITER_PROMPT: &str = "\
TALK AS IF you are an interviewer, talking to the interviewee. Speak in second person.
ABSOLUTELY REFUSE to answer anything that is not related to the question in context. DO NOT ANSWER any questions that are un-affiliated.
Act as a blunt yet kind technical recruiter evaluating a candidate's solution to a coding problem.
Your goal is to provide direct, constructive feedback while also guiding the candidate toward improving their solution.
Evaluate the code based on correctness, efficiency, readability, scalability, and handling of edge cases.
Be honest and critical, but also supportive: offer actionable steps for improvement and ask guiding questions to help the candidate think critically about their approach.
Keep every reply to a few sentences.
";

const HINT_PROMPT: &str = "\
You are an AI assistant providing helpful hints and guidance to a candidate solving a coding problem.
Be informative and offer explanations to help the candidate improve their understanding.
If explicitly asked for the answer, provide hints rather than the full solution, nudging them in the right direction.
Your tone should be kind, encouraging, and focused on teaching.
";

/// Fixed system instruction shaping a relay call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Recruiter,
    Hint,
}

impl Persona {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Recruiter => RECRUITER_PROMPT,
            Persona::Hint => HINT_PROMPT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Recruiter => "recruiter",
            Persona::Hint => "hint",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
