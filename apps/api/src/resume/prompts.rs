// Resume extraction prompt template.
// The template is a process-wide constant; callers only append resume text.

/// Bumped whenever the wording or the requested schema changes.
pub const RESUME_PROMPT_VERSION: &str = "2024-06-v1";

pub const RESUME_PROMPT_TEMPLATE: &str = r#"Please create a JSON structure from the given resume data. Follow the exact format below:

{
  "phoneNumber": "string",
  "educationalQualification": [
    {
      "institutionName": "string",
      "countryOfInstitution": "string",
      "degree": "string",
      "yearOfGraduation": "integer"
    }
  ],
  "EmpProfessionalExperience": [
    {
      "companyName": "string",
      "workStartDate": "string(date)",
      "workEndDate": "string(date)",
      "positionTitle": "string"
    }
  ]
}

Notes:
- Return only the JSON structure without any additional information.
- If date is like October 2021, use the format "01/10/2021".
- If any field is missing, leave it blank.
- don't use any explanations or comments in the JSON structure.

Here is the resume data:
"#;

/// Appends the extracted resume text to the fixed instruction template.
pub fn build_resume_prompt(resume_text: &str) -> String {
    let mut prompt = String::with_capacity(RESUME_PROMPT_TEMPLATE.len() + resume_text.len());
    prompt.push_str(RESUME_PROMPT_TEMPLATE);
    prompt.push_str(resume_text);
    prompt
}
