//! Prompts for poster content extraction.
//!
//! Every prompt lives here so unit tests can inspect them without a live
//! model. Callers can replace the system prompt via
//! [`crate::config::PosterConfig::system_prompt`]; the user prompt always
//! carries the key list below, because the populator depends on those keys.

/// Default system message.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are an expert in academic writing and research poster design.";

/// Instructions placed before the manuscript text.
pub const EXTRACTION_INSTRUCTIONS: &str = r#"Given the following research manuscript text, extract content for an academic A0-size research poster.

Follow these rules precisely:

1. OUTPUT FORMAT
   - Return a single valid JSON object and nothing else
   - Use double quotes for every key and string value
   - Do NOT add an introduction, explanation or code fences
   - Every value is a single-line string; use an empty string when a value is missing
   - Do NOT add keys beyond the ones listed below

2. COMPLETENESS
   - List ALL authors and ALL affiliations; never abbreviate with "et al"
   - Count words carefully and respect the limits below

3. KEYS
   - "headline": a short, punchy phrase (3-8 words) summarising the main finding. Surround 2-5 important words with asterisks, e.g. *BOOSTS* or *DIGITAL HEALTH*
   - "title": the full manuscript title
   - "authors": the complete author list
   - "affiliations": the complete affiliation list
   - "subtitle": a subtitle if the manuscript has one, else ""
   - "Introduction": 65-75 words; keep the manuscript's citation style
   - "Objective": 15-25 words
   - "Methods": 80-90 words; keep the manuscript's citation style
   - "Results": 80-90 words; include the key numbers
   - "Discussion": 60-80 words; keep the manuscript's citation style
   - "Conclusions": 65-75 words
   - "References": only the references cited in the sections above, in the manuscript's format, with complete author lists

4. EXAMPLE
{
  "headline": "DIGITAL HEALTH *BOOSTS* OUTCOMES in chronic pain",
  "title": "A Randomised Trial of App-Based Self-Management for Chronic Low Back Pain",
  "authors": "Jane Smith, Ali Rahman, Maria Costa",
  "affiliations": "1 University of Somewhere; 2 City Hospital",
  "subtitle": "",
  "Introduction": "…",
  "Objective": "…",
  "Methods": "…",
  "Results": "…",
  "Discussion": "…",
  "Conclusions": "…",
  "References": "1. Smith J, Rahman A. …"
}"#;

/// The user message: instructions followed by the (already truncated)
/// manuscript.
pub fn extraction_prompt(manuscript: &str) -> String {
    format!("{EXTRACTION_INSTRUCTIONS}\n\n**TEXT:**\n{manuscript}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Field;

    #[test]
    fn prompt_names_every_field() {
        for field in Field::ALL {
            assert!(
                EXTRACTION_INSTRUCTIONS.contains(&format!("\"{}\":", field.key())),
                "missing {}",
                field.key()
            );
        }
    }

    #[test]
    fn manuscript_follows_instructions() {
        let p = extraction_prompt("We studied things.");
        assert!(p.starts_with("Given the following research manuscript"));
        assert!(p.ends_with("**TEXT:**\nWe studied things."));
    }
}
