// Resume analysis pipeline: structured extraction, match scoring, ATS optimization.
// Every stage makes one gateway call and falls back to a complete default result.

pub mod ats;
pub mod extraction;
pub mod fallback;
pub mod handlers;
pub mod matching;
pub mod prompts;
