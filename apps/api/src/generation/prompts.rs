// All LLM prompt templates for the Generation module.
// Placeholders in `{braces}` are filled by generator.rs before sending.

/// Summary suggestions. Replace `{job_title}`.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Job Title: {job_title}. Generate 3 professional \
    summaries for different experience levels (Mid-Level, Senior, and Fresher) in 3-4 lines \
    each. Format as JSON array with 'summary' and 'experience_level' fields.";

/// Experience bullets for one position. Replace `{position_title}`.
pub const EXPERIENCE_PROMPT_TEMPLATE: &str = r#"Create a JSON object with the following fields:
    "position_Title": A string representing the job title.
    "experience": An array of strings, each representing a bullet point describing relevant experience for the given job title in html format.
For the Job Title "{position_title}", create a JSON object with the following fields:
The experience array should contain 5-7 bullet points. Each bullet point should be a concise description of a relevant skill, responsibility, or achievement."#;

/// Cover letter. Replace every `{candidate_name}`, `{job_title}`,
/// `{company_name}`, `{background}`, `{experience}`, `{skills}`, `{tone}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Generate a professional cover letter based on the following information:

Candidate Name: {candidate_name}
Job Title: {job_title}
Company Name: {company_name}
Background: {background}
Key Experience: {experience}
Key Skills: {skills}
Tone: {tone}

Create a well-structured cover letter with:
1. Professional greeting
2. Strong opening paragraph expressing interest
3. 2-3 body paragraphs highlighting relevant experience and skills
4. Compelling closing paragraph
5. Professional sign-off

Return ONLY a valid JSON object with this structure:
{
  "coverLetter": "The complete cover letter text with proper paragraphs separated by double line breaks (\n\n)"
}

IMPORTANT:
- Make it specific to the job and company
- Use the specified tone ({tone})
- Keep it between 250-400 words
- Return ONLY valid JSON without any markdown formatting
- DO NOT include any inappropriate or unprofessional content"#;

/// ATS scoring. Replace `{resume_json}` and `{job_description}`.
pub const RESUME_SCORE_PROMPT_TEMPLATE: &str = r#"Role: ATS Expert.
Task: Analyze the following Resume JSON against the Job Description.

Resume: {resume_json}

Job Description: {job_description}

Output JSON ONLY:
{
  "score": number (0-100),
  "matchLevel": "High" | "Medium" | "Low",
  "missingKeywords": ["string"],
  "tips": ["string"]
}"#;

/// Interview preparation. Replace `{resume_json}`.
pub const INTERVIEW_PREP_PROMPT_TEMPLATE: &str = r#"Role: Senior Interviewer.
Task: Generate 5 interview questions based on the following Resume JSON.

Resume: {resume_json}

Output JSON ONLY:
[
  {
    "question": "string",
    "type": "Technical" | "Behavioral" | "Situational",
    "suggestedAnswer": "string (STAR format)"
  }
]"#;
