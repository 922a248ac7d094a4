// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System message sent ahead of every résumé-writing prompt.
pub const RESUME_WRITER_SYSTEM: &str = "You are a professional résumé writer.";

/// Instruction that keeps the model from inventing experience.
pub const PRESERVE_FACTS_INSTRUCTION: &str = "Preserve facts. \
    Do NOT invent employers, titles, dates, degrees or certifications \
    that are not present in the résumé.";
