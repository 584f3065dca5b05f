// Prompt text sent to the completion backend.

pub(super) fn improve_section(section: &str, content: &str) -> String {
    format!(
        "**Output ONLY the refined content for the {section} section.**\n\
         Refine the following resume {section} description.\n\
         Make it significantly more professional, impactful, and concise.\n\
         Utilize strong action verbs, quantify achievements where possible with metrics, \
         and focus on the results and impact.\n\
         Crucially, retain all original factual information, only enhancing the language and structure.\n\
         Do not add or remove any specific factual details; focus purely on rephrasing \
         and improving the presentation.\n\
         Do not include any introductory phrases, explanations, or conversational text \
         before or after the improved content.\n\
         \n\
         Original content:\n\
         {content}"
    )
}

pub(super) fn summary(personal_info: &str, experiences: &str, skills: &str) -> String {
    format!(
        "**Output ONLY the 3-5 sentence professional summary.**\n\
         Craft a highly compelling and professional resume summary (3-5 sentences) \
         based on the provided information.\n\
         The summary must strategically highlight key strengths, significant accomplishments, \
         and relevant skills.\n\
         Incorporate strong action verbs and quantify achievements with measurable results \
         wherever possible.\n\
         Ensure the summary is tailored to immediately convey value to a potential employer \
         and capture attention.\n\
         Do not include any introductory phrases, explanations, or conversational text \
         before or after the summary.\n\
         \n\
         Personal Information:\n\
         {personal_info}\n\
         \n\
         Work Experience:\n\
         {experiences}\n\
         \n\
         Skills:\n\
         {skills}"
    )
}
