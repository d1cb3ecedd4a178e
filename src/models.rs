mod answer;
mod citation;
mod generated;
mod question;
mod verdict;

pub use answer::{AnswerResult, GENERATION_GUARDRAIL_REASON, NO_ANSWER_FALLBACK, RefusalKind};
pub use citation::{EXCERPT_LIMIT, RetrievalCitation, truncate_excerpt};
pub use generated::{GeneratedAnswer, RetrievedReference};
pub use question::Question;
pub use verdict::ModerationVerdict;
