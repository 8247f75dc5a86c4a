// LLM prompt templates for the analysis stages.
// Wording is part of the contract with the model. Change with care.

use crate::llm_client::prompts::PromptTemplate;

pub const RESUME_PARSING: PromptTemplate = PromptTemplate {
    name: "resume_parsing",
    variables: &["resumeText"],
    text: r#"You are an expert resume parser. Extract structured information from the following resume text.

Resume Text:
{resumeText}

Extract and return the following information in JSON format:
- candidateName: Full name of the candidate
- email: Email address
- phone: Phone number
- summary: Professional summary or objective (if present)
- skills: Array of technical and soft skills
- experiences: Array of work experiences with company, position, duration, description, and achievements
- educations: Array of education entries with institution, degree, field, and year
- certifications: Array of certifications

Return ONLY valid JSON, no additional text.
"#,
};

pub const MATCH_ANALYSIS: PromptTemplate = PromptTemplate {
    name: "match_analysis",
    variables: &[
        "candidateName",
        "skills",
        "experience",
        "education",
        "jobTitle",
        "requiredSkills",
        "responsibilities",
        "qualifications",
    ],
    text: r#"You are an expert recruiter analyzing how well a resume matches a job description.

Resume Summary:
- Candidate: {candidateName}
- Skills: {skills}
- Experience: {experience}
- Education: {education}

Job Description:
- Title: {jobTitle}
- Required Skills: {requiredSkills}
- Responsibilities: {responsibilities}
- Qualifications: {qualifications}

Analyze the match and provide:
1. Match score (0.0 to 1.0)
2. List of matched skills
3. List of missing critical skills
4. Detailed analysis (2-3 sentences)
5. Specific recommendations for improvement

Return the response in this JSON format:
{
  "matchScore": 0.0,
  "matchedSkills": [],
  "missingSkills": [],
  "analysis": "",
  "recommendations": []
}

Return ONLY valid JSON, no additional text.
"#,
};

pub const ATS_OPTIMIZATION: PromptTemplate = PromptTemplate {
    name: "ats_optimization",
    variables: &["resumeText"],
    text: r#"You are an ATS (Applicant Tracking System) optimization expert. Analyze this resume for ATS-friendliness.

Resume:
{resumeText}

Evaluate the resume based on:
1. Keyword optimization and density
2. Formatting and structure (sections, headers)
3. Contact information completeness
4. Use of standard section names
5. Avoidance of complex formatting (tables, graphics)
6. Action verbs and quantifiable achievements

Provide:
- ATS Score (0-100)
- Specific suggestions for improvement with priority (HIGH/MEDIUM/LOW)
- Overall assessment

Return the response in this JSON format:
{
  "atsScore": 0.0,
  "suggestions": [
    {
      "category": "Keywords",
      "issue": "Low keyword density",
      "recommendation": "Add more relevant technical skills",
      "priority": "HIGH"
    }
  ],
  "overallAssessment": ""
}

Provide at least 5 actionable suggestions. Return ONLY valid JSON, no additional text.
"#,
};

pub const KEYWORD_EXTRACTION: PromptTemplate = PromptTemplate {
    name: "keyword_extraction",
    variables: &["text"],
    text: r#"Extract the most important keywords and technical terms from this text.
Return only a comma-separated list of keywords, no additional text.

Text: {text}
"#,
};
