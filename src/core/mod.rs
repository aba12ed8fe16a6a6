
pub mod llm;

// Validated generation pipeline (skill trees, character descriptions)
pub mod generation;
