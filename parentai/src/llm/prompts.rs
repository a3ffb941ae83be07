//! Prompt and canned-response templates.
//!
//! Everything here is a pure function of its inputs: no clock, no
//! randomness. The same inputs always render the same bytes.

use crate::config::AssistantConfig;
use crate::knowledge::{Guidance, KnowledgeRecord};
use crate::models::{AgeBand, ScoredChunk, Topic};

/// Topics suggested when no relevant guidance was found.
const SUGGESTED_TOPICS: [Topic; 5] = [
    Topic::CryingAndComfort,
    Topic::SleepIssues,
    Topic::DisciplineAndBoundaries,
    Topic::DevelopmentMilestones,
    Topic::AttachmentTheory,
];

/// Knowledge to ground a prompt in.
#[derive(Debug, Clone, Copy)]
pub enum KnowledgeContext<'a> {
    /// A structured record from the knowledge table.
    Record {
        topic: Topic,
        band: AgeBand,
        record: &'a KnowledgeRecord,
    },
    /// Passages retrieved from the reference document, best first.
    Passages(&'a [ScoredChunk]),
}

/// Everything the prompt for one question depends on.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub topic: Topic,
    pub band: AgeBand,
    pub caller_context: &'a str,
    pub question: &'a str,
    pub knowledge: KnowledgeContext<'a>,
}

/// Turns a category key into a heading.
///
/// ```
/// use parentai::llm::prompts::category_heading;
///
/// assert_eq!(category_heading("common_causes"), "Common Causes");
/// ```
pub fn category_heading(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a record as headed bullet lists, categories in authored order.
pub fn render_record(topic: Topic, band: AgeBand, record: &KnowledgeRecord) -> String {
    let mut out = format!(
        "{} GUIDANCE FOR {}:\n",
        topic.as_str().to_uppercase(),
        band.label().to_uppercase()
    );
    for category in &record.categories {
        out.push_str(&format!("\n{}:\n", category_heading(&category.name)));
        for item in &category.items {
            out.push_str(&format!("- {item}\n"));
        }
    }
    out
}

/// Renders retrieved passages as a numbered list, best first.
pub fn render_passages(passages: &[ScoredChunk]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| format!("[Passage {}]\n{}", i + 1, passage.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Renders the prompt and the two canned responses for one assistant persona.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    assistant_name: String,
    source_title: Option<String>,
}

impl PromptAssembler {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            assistant_name: config.name.clone(),
            source_title: config.source_title.clone(),
        }
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    fn source_phrase(&self) -> String {
        match &self.source_title {
            Some(title) => format!("\"{title}\""),
            None => "the reference material".to_string(),
        }
    }

    /// The system instruction for one question.
    pub fn assemble(&self, ctx: &PromptContext<'_>) -> String {
        let (knowledge_heading, knowledge, grounding) = match ctx.knowledge {
            KnowledgeContext::Record {
                topic,
                band,
                record,
            } => (
                "PROFESSIONAL KNOWLEDGE BASE".to_string(),
                render_record(topic, band, record),
                "Base your advice on the knowledge base above".to_string(),
            ),
            KnowledgeContext::Passages(passages) => (
                format!("RELEVANT PASSAGES FROM {}", self.source_phrase().to_uppercase()),
                render_passages(passages),
                "Base your answer only on the passages above".to_string(),
            ),
        };

        let caller_context = if ctx.caller_context.trim().is_empty() {
            "(none given)"
        } else {
            ctx.caller_context.trim()
        };

        format!(
            r#"You are {name}, an assistant that answers questions about the development, upbringing and health of children aged 0-3 years, and about parenthood. You give evidence-based advice grounded in {source}.

CHILD'S AGE GROUP: {band}
TOPIC: {topic}
USER CONTEXT: {caller_context}

{knowledge_heading}:
{knowledge}

RESPONSE STRUCTURE:
Answer in the language the question was asked in. Keep the tone warm, friendly and empathetic.

1. UNDERSTANDING THE PROBLEM (2-3 sentences): show you understand the parent's situation and why it happens at this stage of development.
2. SHORT ANSWER (1-2 sentences): the core of the solution.
3. DETAILED SOLUTION (5-7 points): concrete steps; what, how and when to do each; phrases to say to the child; what to do if it does not help.
4. PRACTICAL EXAMPLES: real situations, short dialogues with the child, games or rituals.
5. WHAT NOT TO DO (2-3 points): common mistakes and why they do not work.
6. ADDITIONAL ADVICE: prevention, long-term strategies, when to see a specialist.
7. SOURCES AND FURTHER READING: where in {source} to read more.
8. SUPPORT: an encouraging closing line and an offer of further help.

CONSTRAINTS:
- {grounding}
- Take the child's age group into account
- Always prioritise child safety
- When appropriate, suggest consulting a pediatrician
- If the question is outside your expertise, say so and suggest professional consultation

USER QUESTION: {question}
"#,
            name = self.assistant_name,
            source = self.source_phrase(),
            band = ctx.band.label(),
            topic = ctx.topic.as_str(),
            caller_context = caller_context,
            knowledge_heading = knowledge_heading,
            knowledge = knowledge.trim_end(),
            grounding = grounding,
            question = ctx.question,
        )
    }

    /// Served when no relevant knowledge was found for the question.
    pub fn fallback_response(&self, question: &str, band: AgeBand, guidance: &Guidance<'_>) -> String {
        let guidance_text = match guidance {
            Guidance::Record {
                topic,
                band,
                record,
            } => render_record(*topic, *band, record),
            Guidance::Passage { text, .. } => text.to_string(),
            Guidance::Generic(text) => text.to_string(),
        };

        let suggestions = SUGGESTED_TOPICS
            .iter()
            .map(|topic| format!("• {}", topic.display_name()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Sorry, I could not find relevant information in {source} to answer your question.\n\n\
             Question: {question}\n\
             Age group: {band}\n\n\
             {guidance}\n\n\
             Try rephrasing the question, or ask about another topic:\n\
             {suggestions}\n\n\
             How else can I help?",
            source = self.source_phrase(),
            question = question,
            band = band.label(),
            guidance = guidance_text.trim_end(),
            suggestions = suggestions,
        )
    }

    /// Served when the completion service could not produce an answer.
    ///
    /// `reason` must already be safe to show to an end user.
    pub fn error_response(&self, question: &str, band: AgeBand, reason: &str) -> String {
        format!(
            "Sorry, a technical problem occurred while preparing your answer ({reason}).\n\n\
             Question: {question}\n\
             Age group: {band}\n\n\
             Please try:\n\
             1. Rephrasing the question\n\
             2. Asking about another topic\n\
             3. Trying again later\n\n\
             {name} answers questions about the development, upbringing and health of young children.\n\n\
             How else can I help?",
            reason = reason,
            question = question,
            band = band.label(),
            name = self.assistant_name,
        )
    }
}
