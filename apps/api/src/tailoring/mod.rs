// Résumé tailoring: tone selection, prompt construction and the pipeline
// that sends one prompt through the completion service.
// All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod tone;
